/// Customer administration endpoints
///
/// Back-office CRUD over the users table. Deletion is destructive and
/// unguarded: nothing cascades, so a deleted customer's cart rows and
/// payments stay behind.
///
/// # Endpoints
///
/// - `GET /api/customer/all`
/// - `GET /api/customer/:id`
/// - `POST /api/customer/add`
/// - `PUT /api/customer/update/:id`
/// - `DELETE /api/customer/delete/:id`

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use pawshop_shared::models::user::{CreateUser, User, UserRole};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Customer create / update request
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

fn required(req: &CustomerRequest) -> Result<(&str, &str), ApiError> {
    match (req.username.as_deref(), req.email.as_deref()) {
        (Some(username), Some(email)) if !username.is_empty() && !email.is_empty() => {
            Ok((username, email))
        }
        _ => Err(ApiError::BadRequest(
            "username and email are required".to_string(),
        )),
    }
}

/// List all customers (password hashes are never serialized)
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let customers = User::list(&state.db).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "customers": customers,
    })))
}

/// Fetch one customer
///
/// # Errors
///
/// - `404 Not Found`: no such customer
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let customer = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "customer": customer,
    })))
}

/// Create a customer record without credentials
///
/// The account carries an empty password hash and can never log in
/// until a password reset sets one.
pub async fn add_customer(
    State(state): State<AppState>,
    Json(req): Json<CustomerRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (username, email) = required(&req)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            role: UserRole::User,
        },
    )
    .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Customer Added Successfully",
        "customer_id": user.user_id,
    })))
}

/// Overwrite a customer's username and email
///
/// # Errors
///
/// - `404 Not Found`: no such customer
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CustomerRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (username, email) = required(&req)?;

    let updated = User::update_contact(&state.db, id, username, email).await?;
    if !updated {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Customer Updated Successfully",
    })))
}

/// Delete a customer
///
/// # Errors
///
/// - `404 Not Found`: no such customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Customer Deleted Successfully",
    })))
}
