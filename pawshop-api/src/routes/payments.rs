/// Payment gateway endpoints
///
/// Two halves of the hosted-checkout handshake: creating a remote order
/// the storefront hands to the gateway widget, and reconciling the
/// callback the widget posts back.
///
/// The verify endpoint always answers HTTP 200 with a boolean `success`
/// flag — a signature mismatch is a normal outcome for the caller, not
/// an HTTP error. That shape is load-bearing for the existing
/// storefront.
///
/// # Endpoints
///
/// - `POST /api/payment/create-order`
/// - `POST /api/payment/verify`

use axum::{extract::State, Json};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use pawshop_shared::models::payment::Payment;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    gateway::GatewayOrder,
};

/// Gateway order creation request
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: Decimal,
    pub currency: String,
    pub user_id: i64,
}

/// Gateway callback verification request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

/// Create an order at the remote gateway and record it
///
/// The gateway's order object is returned bare, exactly as the checkout
/// widget expects it.
///
/// # Errors
///
/// - `500 Internal Server Error`: gateway or store failure; no retry
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Json<GatewayOrder>> {
    let receipt = format!("receipt_{}", Utc::now().timestamp_millis());

    let order = state
        .gateway
        .create_order(req.amount, &req.currency, &receipt)
        .await
        .map_err(|e| ApiError::Gateway(format!("Order creation failed: {}", e)))?;

    Payment::create_for_gateway(&state.db, req.user_id, req.amount, &req.currency, &order.id)
        .await?;

    tracing::info!(user_id = req.user_id, gateway_order_id = %order.id, "Gateway order created");

    Ok(Json(order))
}

/// Verify a gateway payment callback
///
/// Recomputes the HMAC over `"{order_id}|{payment_id}"` and compares it
/// to the supplied signature. A match settles the payment as `paid`; a
/// mismatch marks it `failed`. Either way the payment never leaves a
/// terminal state again.
///
/// # Errors
///
/// - `400 Bad Request`: missing callback fields
/// - `500 Internal Server Error`: store failure
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (order_id, payment_id, signature) = match (&req.order_id, &req.payment_id, &req.signature)
    {
        (Some(order_id), Some(payment_id), Some(signature)) => (order_id, payment_id, signature),
        _ => {
            return Err(ApiError::BadRequest(
                "order_id, payment_id and signature are required".to_string(),
            ))
        }
    };

    if state.gateway.verify_signature(order_id, payment_id, signature) {
        Payment::mark_paid(&state.db, order_id, payment_id, signature).await?;
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        tracing::warn!(gateway_order_id = %order_id, "Payment signature mismatch");
        Payment::mark_failed(&state.db, order_id).await?;
        Ok(Json(serde_json::json!({ "success": false })))
    }
}
