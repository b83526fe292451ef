/// Payment gateway client
///
/// Talks to the external payment processor over HTTPS: creating remote
/// orders and verifying the signature the gateway attaches to payment
/// callbacks. The gateway is an opaque collaborator; nothing here retries
/// or interprets beyond the documented order/verify contract.
///
/// # Signature Scheme
///
/// The callback signature is HMAC-SHA256 over `"{order_id}|{payment_id}"`
/// keyed with the API secret, hex-encoded. Verification is constant-time.

use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::GatewayConfig;

type HmacSha256 = Hmac<Sha256>;

/// Error type for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request to the gateway failed or returned an error status
    #[error("Gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The amount could not be expressed in minor currency units
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),
}

/// An order created at the remote gateway
///
/// Returned to the caller verbatim; the storefront hands it to the
/// gateway's checkout widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Opaque gateway order id
    pub id: String,

    /// Amount in minor currency units
    pub amount: i64,

    pub currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

/// HTTP client for the payment gateway
#[derive(Clone)]
pub struct PaymentGateway {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl PaymentGateway {
    /// Creates a gateway client from configuration
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }

    /// Creates a remote order for the given amount
    ///
    /// The amount arrives in major units and is sent to the gateway in
    /// minor units (times 100).
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidAmount` when the amount does not fit
    /// in minor units, or `GatewayError::Request` on any transport or
    /// non-2xx failure. No retries; the failure is terminal for the
    /// request.
    pub async fn create_order(
        &self,
        amount: Decimal,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let amount_minor = to_minor_units(amount).ok_or(GatewayError::InvalidAmount(amount))?;

        let order = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount: amount_minor,
                currency,
                receipt,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<GatewayOrder>()
            .await?;

        Ok(order)
    }

    /// Verifies a callback signature against the shared secret
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_signature(&self.key_secret, order_id, payment_id, signature)
    }
}

/// Converts a major-unit amount to minor units (times 100)
///
/// Returns None when the amount has sub-minor precision or overflows.
fn to_minor_units(amount: Decimal) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;

    let minor = amount.checked_mul(Decimal::from(100))?;
    if minor.fract() != Decimal::ZERO {
        return None;
    }
    minor.to_i64()
}

/// Recomputes the callback HMAC and compares it to the supplied signature
///
/// The signed message is `"{order_id}|{payment_id}"`; the comparison is
/// constant-time via the Mac verifier.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature_match() {
        let signature = sign("secret", "order_1", "pay_1");
        assert!(verify_signature("secret", "order_1", "pay_1", &signature));
    }

    #[test]
    fn test_verify_signature_mismatch() {
        let signature = sign("secret", "order_1", "pay_1");
        assert!(!verify_signature("secret", "order_1", "pay_2", &signature));
        assert!(!verify_signature("other-secret", "order_1", "pay_1", &signature));
    }

    #[test]
    fn test_verify_signature_rejects_non_hex() {
        assert!(!verify_signature("secret", "order_1", "pay_1", "not-hex!"));
        assert!(!verify_signature("secret", "order_1", "pay_1", ""));
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(1999, 2)), Some(1999)); // 19.99
        assert_eq!(to_minor_units(Decimal::from(500)), Some(50000));
        assert_eq!(to_minor_units(Decimal::new(19999, 3)), None); // 19.999
    }

    #[test]
    fn test_gateway_order_roundtrip() {
        let json = r#"{"id":"order_abc","amount":50000,"currency":"INR","receipt":"receipt_1","status":"created"}"#;
        let order: GatewayOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, "order_abc");
        assert_eq!(order.amount, 50000);
    }
}
