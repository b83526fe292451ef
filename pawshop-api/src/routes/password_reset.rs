/// Password reset endpoints
///
/// The request endpoint answers with the exact same body whether or not
/// the email exists, so it cannot be used to enumerate accounts. When
/// the account does exist, a 256-bit token is generated, its digest
/// stored (one live token per user), and the raw token emailed as a
/// reset link. The reset endpoint consumes the token: it is single-use
/// and expires after one hour.
///
/// # Endpoints
///
/// - `POST /api/request-reset`
/// - `POST /api/reset-password`

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use pawshop_shared::{
    auth::{
        password,
        reset_token::{expiry_from_now, generate_reset_token, hash_reset_token},
    },
    models::{reset_token::PasswordResetToken, user::User},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Reset request
#[derive(Debug, Deserialize)]
pub struct RequestResetRequest {
    pub email: Option<String>,
}

/// Reset submission
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

/// The one response body for every reset request outcome.
fn reset_requested_body() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "If the email exists, a reset link has been sent",
    }))
}

/// Request a password-reset link
///
/// # Errors
///
/// - `400 Bad Request`: missing email
/// - `500 Internal Server Error`: store or mail transport failure
///
/// A non-existent email is NOT an error: the response is byte-identical
/// to the success case and no token row is written.
pub async fn request_reset(
    State(state): State<AppState>,
    Json(req): Json<RequestResetRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let email = req
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Email is required".to_string()))?;

    let Some(user) = User::find_by_email(&state.db, email).await? else {
        return Ok(reset_requested_body());
    };

    let (token, digest) = generate_reset_token();
    PasswordResetToken::upsert(&state.db, user.user_id, &digest, expiry_from_now()).await?;

    state
        .mailer
        .send_reset_link(&user.email, &token)
        .await
        .map_err(|e| ApiError::Gateway(format!("Failed to send reset mail: {}", e)))?;

    tracing::info!(user_id = user.user_id, "Password reset link sent");

    Ok(reset_requested_body())
}

/// Reset a password with a token from the emailed link
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, or an unknown/expired token —
///   the password table is never touched in that case
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (token, new_password) = match (&req.token, &req.new_password) {
        (Some(token), Some(pw)) if !token.is_empty() && !pw.is_empty() => (token, pw),
        _ => {
            return Err(ApiError::BadRequest(
                "Token and new password are required".to_string(),
            ))
        }
    };

    let digest = hash_reset_token(token);

    let stored =
        PasswordResetToken::find_valid(&state.db, &digest, Utc::now().timestamp_millis())
            .await?
            .ok_or_else(|| ApiError::BadRequest("Invalid or expired token".to_string()))?;

    let password_hash = password::hash_password(new_password)?;
    User::update_password(&state.db, stored.user_id, &password_hash).await?;

    // Single use
    PasswordResetToken::delete_for_user(&state.db, stored.user_id).await?;

    tracing::info!(user_id = stored.user_id, "Password reset completed");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password reset successfully",
    })))
}
