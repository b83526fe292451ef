/// Checkout endpoint
///
/// Turns a cart into one payment row plus one order line per cart line,
/// then drains the cart — a single transaction, so a failure at any
/// step leaves no half-written order behind. Unit prices and the order
/// total are read from the catalog at placement time; amounts supplied
/// by the client are ignored.
///
/// Cash on delivery is recorded as `pending`. Anything else is recorded
/// as `paid` at placement, before any gateway confirmation — a known
/// gap preserved for compatibility with the existing storefront flow.
///
/// # Endpoint
///
/// - `POST /api/order/place-order`

use axum::{extract::State, Json};
use serde::Deserialize;

use pawshop_shared::models::{
    payment::{Payment, PaymentStatus, PricedLine},
    product::Product,
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// One requested order line; prices are never taken from the client
#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i32,
}

/// Order placement request
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: Option<i64>,
    pub address: Option<serde_json::Value>,
    pub payment_method: Option<String>,
    pub currency: Option<String>,
    pub cart_items: Option<Vec<OrderLineRequest>>,
}

/// Place an order from the submitted cart lines
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, an empty cart, a non-positive
///   quantity, or a product id that no longer exists in the catalog
/// - `500 Internal Server Error`: any store failure (the transaction is
///   rolled back)
pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let user_id = req
        .user_id
        .ok_or_else(|| ApiError::BadRequest("Missing user_id".to_string()))?;
    let payment_method = req
        .payment_method
        .as_deref()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing payment_method".to_string()))?;
    let currency = req
        .currency
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing currency".to_string()))?;
    let cart_items = req
        .cart_items
        .as_deref()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Cart is empty".to_string()))?;
    let address = req.address.clone().unwrap_or(serde_json::Value::Null);

    let status = if payment_method == "COD" {
        PaymentStatus::Pending
    } else {
        PaymentStatus::Paid
    };

    // Reprice every line from the catalog; the client's numbers are not
    // trusted.
    let mut lines = Vec::with_capacity(cart_items.len());
    for item in cart_items {
        if item.quantity < 1 {
            return Err(ApiError::BadRequest(format!(
                "Invalid quantity for product {}",
                item.product_id
            )));
        }

        let price = Product::price_of(&state.db, item.product_id)
            .await?
            .ok_or_else(|| {
                ApiError::BadRequest(format!("Unknown product {}", item.product_id))
            })?;

        lines.push(PricedLine {
            product_id: item.product_id,
            quantity: item.quantity,
            price,
        });
    }

    let payment_id =
        Payment::place_order(&state.db, user_id, status, currency, address, &lines).await?;

    tracing::info!(
        user_id,
        payment_id,
        lines = lines.len(),
        status = status.as_str(),
        "Order placed"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Order Placed Successfully",
        "payment_id": payment_id,
    })))
}
