/// Cart endpoints
///
/// All of these sit behind the session gate; an unauthenticated request
/// never reaches a handler here. The user id comes from the session, so
/// one user can never touch another's cart.
///
/// Quantities are validated by hand rather than by serde types: the
/// contract is "quantity must be a number", answered with 400, not a
/// deserializer rejection.
///
/// # Endpoints
///
/// - `POST /api/cart` - add or increment
/// - `PUT /api/cart` - set exact quantity
/// - `DELETE /api/cart` - remove one item (idempotent)
/// - `DELETE /api/cart/all` - clear the cart
/// - `GET /api/cart` - list, most recently added first

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use pawshop_shared::{
    auth::session::SessionClaims,
    models::cart_item::{CartAddOutcome, CartItem},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Add / set request body
///
/// `quantity` stays a raw JSON value so a string or missing quantity
/// maps to 400 instead of a deserializer error.
#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: Option<i64>,
    pub quantity: Option<serde_json::Value>,
}

/// Remove request body
#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: Option<i64>,
}

fn parse_quantity(req: &CartItemRequest) -> Result<(i64, i32), ApiError> {
    let product_id = req
        .product_id
        .ok_or_else(|| ApiError::BadRequest("Missing or invalid product_id".to_string()))?;

    let quantity = req
        .quantity
        .as_ref()
        .and_then(|q| q.as_i64())
        .and_then(|q| i32::try_from(q).ok())
        .filter(|q| *q >= 1)
        .ok_or_else(|| ApiError::BadRequest("Missing or invalid quantity".to_string()))?;

    Ok((product_id, quantity))
}

/// Add a product to the cart, incrementing the quantity when the line
/// already exists
///
/// Responds 201 for a fresh line, 200 for an increment.
///
/// # Errors
///
/// - `400 Bad Request`: missing product id, or quantity not an integer >= 1
pub async fn add_item(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Json(req): Json<CartItemRequest>,
) -> ApiResult<Response> {
    let (product_id, quantity) = parse_quantity(&req)?;

    let outcome = CartItem::add(&state.db, session.sub, product_id, quantity).await?;

    let response = match outcome {
        CartAddOutcome::Created => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "success": true, "message": "Item added to cart" })),
        ),
        CartAddOutcome::Updated => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "message": "Cart item quantity updated" })),
        ),
    };

    Ok(response.into_response())
}

/// Overwrite the quantity of an existing cart line
///
/// # Errors
///
/// - `400 Bad Request`: quantity not an integer >= 1
/// - `404 Not Found`: the product is not in the cart
pub async fn set_item(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Json(req): Json<CartItemRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (product_id, quantity) = parse_quantity(&req)?;

    let updated = CartItem::set_quantity(&state.db, session.sub, product_id, quantity).await?;
    if !updated {
        return Err(ApiError::NotFound("Item not found in cart".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Quantity updated",
    })))
}

/// Remove one product from the cart; succeeds even when it was absent
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Json(req): Json<RemoveItemRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let product_id = req
        .product_id
        .ok_or_else(|| ApiError::BadRequest("Missing product_id".to_string()))?;

    CartItem::remove(&state.db, session.sub, product_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Item removed from cart",
    })))
}

/// Clear every line in the user's cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
) -> ApiResult<Json<serde_json::Value>> {
    CartItem::clear(&state.db, session.sub).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Cart cleared",
    })))
}

/// List the cart with product display fields, newest first
pub async fn list_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
) -> ApiResult<Json<serde_json::Value>> {
    let items = CartItem::list(&state.db, session.sub).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "items": items,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(product_id: Option<i64>, quantity: serde_json::Value) -> CartItemRequest {
        CartItemRequest {
            product_id,
            quantity: Some(quantity),
        }
    }

    #[test]
    fn test_parse_quantity_accepts_integers() {
        let (product_id, quantity) = parse_quantity(&req(Some(5), serde_json::json!(3))).unwrap();
        assert_eq!(product_id, 5);
        assert_eq!(quantity, 3);
    }

    #[test]
    fn test_parse_quantity_rejects_non_numbers() {
        for quantity in [
            serde_json::json!("3"),
            serde_json::json!(2.5),
            serde_json::json!(null),
            serde_json::json!([]),
        ] {
            assert!(
                matches!(
                    parse_quantity(&req(Some(5), quantity.clone())),
                    Err(ApiError::BadRequest(_))
                ),
                "{} should be rejected",
                quantity
            );
        }
    }

    #[test]
    fn test_parse_quantity_rejects_zero_and_negative() {
        assert!(parse_quantity(&req(Some(5), serde_json::json!(0))).is_err());
        assert!(parse_quantity(&req(Some(5), serde_json::json!(-2))).is_err());
    }

    #[test]
    fn test_parse_quantity_requires_product_id() {
        assert!(matches!(
            parse_quantity(&req(None, serde_json::json!(1))),
            Err(ApiError::BadRequest(_))
        ));
    }
}
