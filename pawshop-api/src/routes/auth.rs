/// Authentication endpoints
///
/// Signup, login, logout, and session introspection. User and admin
/// signup are separate handlers on separate paths; registering both on
/// one path would leave whichever is mounted second unreachable.
///
/// # Endpoints
///
/// - `POST /api/auth/signup` - register a storefront customer
/// - `POST /api/admin/auth/signup` - register an admin (secret-gated)
/// - `POST /api/auth/login` - authenticate and set the session cookie
/// - `POST /api/auth/logout` - clear the session cookie
/// - `GET /api/auth/me` - current session identity

use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use validator::Validate;

use pawshop_shared::{
    auth::{password, session::{create_session_token, SessionClaims, SESSION_COOKIE}},
    models::user::{CreateUser, User, UserRole},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::session_from_jar,
};

/// Signup request (user and admin; admin additionally sends the secret)
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: Option<String>,

    /// Shared secret, required for admin signup only
    pub secret_key: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Session identity as surfaced to the client
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&SessionClaims> for SessionUser {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username.clone(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: SessionUser,
}

/// The error body is identical for an unknown email and a wrong
/// password, so responses cannot be used to enumerate accounts.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn validated_signup(req: &SignupRequest) -> Result<(String, String, String), ApiError> {
    req.validate()?;

    match (&req.username, &req.email, &req.password) {
        (Some(username), Some(email), Some(pw))
            if !username.is_empty() && !email.is_empty() && !pw.is_empty() =>
        {
            Ok((username.clone(), email.clone(), pw.clone()))
        }
        _ => Err(ApiError::BadRequest("All fields are required".to_string())),
    }
}

async fn register(
    state: &AppState,
    username: String,
    email: String,
    plaintext: String,
    role: UserRole,
) -> ApiResult<Response> {
    if User::email_exists(&state.db, &email, role).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&plaintext)?;

    User::create(
        &state.db,
        CreateUser {
            username,
            email,
            password_hash,
            role,
        },
    )
    .await?;

    let message = match role {
        UserRole::User => "User registered successfully",
        UserRole::Admin => "Admin registered successfully",
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "message": message })),
    )
        .into_response())
}

/// Register a storefront customer
///
/// # Errors
///
/// - `400 Bad Request`: missing field or malformed email
/// - `409 Conflict`: email already registered as a user
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Response> {
    let (username, email, plaintext) = validated_signup(&req)?;
    register(&state, username, email, plaintext, UserRole::User).await
}

/// Register an admin account
///
/// Requires the shared admin signup secret on top of the usual fields.
///
/// # Errors
///
/// - `400 Bad Request`: missing field or malformed email
/// - `403 Forbidden`: wrong or missing secret
/// - `409 Conflict`: email already registered as an admin
pub async fn admin_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Response> {
    let (username, email, plaintext) = validated_signup(&req)?;

    let supplied = req.secret_key.as_deref().unwrap_or_default();
    if supplied.is_empty() {
        return Err(ApiError::BadRequest(
            "All fields and secret key are required".to_string(),
        ));
    }
    if supplied != state.config.auth.admin_signup_secret {
        return Err(ApiError::Forbidden("Invalid secret key".to_string()));
    }

    register(&state, username, email, plaintext, UserRole::Admin).await
}

/// Authenticate and establish a session
///
/// On success the signed session token is set as an HTTP-only,
/// SameSite=Lax cookie and the session identity is echoed in the body.
///
/// # Errors
///
/// - `400 Bad Request`: missing email or password
/// - `401 Unauthorized`: unknown email or wrong password (same body for
///   both)
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let (email, plaintext) = match (&req.email, &req.password) {
        (Some(email), Some(pw)) if !email.is_empty() && !pw.is_empty() => (email, pw),
        _ => {
            return Err(ApiError::BadRequest(
                "Email and password are required".to_string(),
            ))
        }
    };

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let valid = password::verify_password(plaintext, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let claims = SessionClaims::for_user(&user);
    let token = create_session_token(&claims, state.session_secret())
        .map_err(|e| ApiError::Internal(format!("Failed to create session: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            success: true,
            message: "Logged in successfully".to_string(),
            user: SessionUser::from(&claims),
        }),
    ))
}

/// Clear the session cookie; idempotent
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());

    (
        jar,
        Json(serde_json::json!({ "success": true, "message": "Logged out successfully" })),
    )
}

/// Current session identity
///
/// # Errors
///
/// - `401 Unauthorized`: no valid session cookie
pub async fn me(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Json<serde_json::Value>> {
    let claims = session_from_jar(&jar, state.session_secret())
        .ok_or_else(|| ApiError::Unauthorized("Not logged in".to_string()))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "user": SessionUser::from(&claims),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_signup_requires_all_fields() {
        let req = SignupRequest {
            username: Some("alice".to_string()),
            email: Some("alice@example.com".to_string()),
            password: None,
            secret_key: None,
        };

        assert!(matches!(
            validated_signup(&req),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_validated_signup_rejects_bad_email() {
        let req = SignupRequest {
            username: Some("alice".to_string()),
            email: Some("not-an-email".to_string()),
            password: Some("hunter22".to_string()),
            secret_key: None,
        };

        assert!(matches!(
            validated_signup(&req),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_validated_signup_accepts_complete_request() {
        let req = SignupRequest {
            username: Some("alice".to_string()),
            email: Some("alice@example.com".to_string()),
            password: Some("hunter22".to_string()),
            secret_key: None,
        };

        let (username, email, password) = validated_signup(&req).unwrap();
        assert_eq!(username, "alice");
        assert_eq!(email, "alice@example.com");
        assert_eq!(password, "hunter22");
    }

    #[test]
    fn test_session_user_from_claims() {
        let claims = SessionClaims::new(9, "carol", "carol@example.com", UserRole::Admin);
        let user = SessionUser::from(&claims);

        assert_eq!(user.user_id, 9);
        assert_eq!(user.username, "carol");
        assert_eq!(user.role, UserRole::Admin);
    }
}
