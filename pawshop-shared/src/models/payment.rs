/// Payment model, order lines, and the checkout transition
///
/// A payment row is created either at order placement (cart checkout) or
/// when a remote gateway order is opened. Order lines snapshot the unit
/// price at purchase time so later catalog changes never rewrite order
/// history.
///
/// # State Machine
///
/// ```text
/// created → paid
///         → failed
/// pending                (cash on delivery, settled offline)
/// paid / failed          (terminal, never rewritten)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE payment_status AS ENUM ('created', 'pending', 'paid', 'failed');
///
/// CREATE TABLE payments (
///     payment_id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL,
///     amount NUMERIC(10, 2) NOT NULL,
///     currency VARCHAR(8) NOT NULL,
///     payment_status payment_status NOT NULL DEFAULT 'created',
///     gateway_order_id VARCHAR(128),
///     gateway_payment_id VARCHAR(128),
///     gateway_signature VARCHAR(256),
///     shipping_address JSONB,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE order_items (
///     order_item_id BIGSERIAL PRIMARY KEY,
///     payment_id BIGINT NOT NULL REFERENCES payments (payment_id) ON DELETE CASCADE,
///     product_id BIGINT NOT NULL,
///     quantity INTEGER NOT NULL,
///     price NUMERIC(10, 2) NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

/// Payment lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// A gateway order exists but no money has moved
    Created,

    /// Cash on delivery, settled offline
    Pending,

    /// Settled
    Paid,

    /// Gateway verification failed
    Failed,
}

impl PaymentStatus {
    /// Converts state to string for logging and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Checks if the state is terminal
    ///
    /// Terminal rows are never rewritten by gateway callbacks.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Failed)
    }
}

/// One payment row, as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub payment_id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,

    /// Address snapshot captured at order placement
    pub shipping_address: Option<JsonValue>,

    pub created_at: DateTime<Utc>,
}

/// One order line, as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub order_item_id: i64,
    pub payment_id: i64,
    pub product_id: i64,
    pub quantity: i32,

    /// Unit price snapshot at purchase time
    pub price: Decimal,
}

/// A cart line priced from the catalog, ready to become an order line
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product_id: i64,
    pub quantity: i32,

    /// Server-side catalog price, not a client-supplied amount
    pub price: Decimal,
}

impl PricedLine {
    /// Line total (unit price times quantity)
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

const PAYMENT_COLUMNS: &str = "payment_id, user_id, amount, currency, payment_status, \
     gateway_order_id, gateway_payment_id, gateway_signature, shipping_address, created_at";

impl Payment {
    /// Places an order: one payment row, one order line per cart line,
    /// and the user's cart cleared — all inside a single transaction
    ///
    /// Any failing step rolls the whole sequence back, so a half-written
    /// order can never be observed. Returns the new payment id.
    pub async fn place_order(
        pool: &PgPool,
        user_id: i64,
        status: PaymentStatus,
        currency: &str,
        address: JsonValue,
        lines: &[PricedLine],
    ) -> Result<i64, sqlx::Error> {
        let total: Decimal = lines.iter().map(PricedLine::total).sum();

        let mut tx = pool.begin().await?;

        let (payment_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO payments (user_id, amount, currency, payment_status, shipping_address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING payment_id
            "#,
        )
        .bind(user_id)
        .bind(total)
        .bind(currency)
        .bind(status)
        .bind(&address)
        .fetch_one(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                "INSERT INTO order_items (payment_id, product_id, quantity, price)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(payment_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(payment_id)
    }

    /// Records a freshly created gateway order with status `created`
    pub async fn create_for_gateway(
        pool: &PgPool,
        user_id: i64,
        amount: Decimal,
        currency: &str,
        gateway_order_id: &str,
    ) -> Result<i64, sqlx::Error> {
        let (payment_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO payments (user_id, amount, currency, payment_status, gateway_order_id)
            VALUES ($1, $2, $3, 'created', $4)
            RETURNING payment_id
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(currency)
        .bind(gateway_order_id)
        .fetch_one(pool)
        .await?;

        Ok(payment_id)
    }

    /// Marks a payment paid after a verified gateway callback
    ///
    /// The WHERE clause skips terminal rows, so a late or repeated
    /// callback can never rewrite a settled payment. Returns false when
    /// no (non-terminal) row matched the gateway order id.
    pub async fn mark_paid(
        pool: &PgPool,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        gateway_signature: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET payment_status = 'paid', gateway_payment_id = $1, gateway_signature = $2
            WHERE gateway_order_id = $3
              AND payment_status NOT IN ('paid', 'failed')
            "#,
        )
        .bind(gateway_payment_id)
        .bind(gateway_signature)
        .bind(gateway_order_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks a payment failed after a signature mismatch
    ///
    /// Terminal rows are left untouched, same as [`Payment::mark_paid`].
    pub async fn mark_failed(pool: &PgPool, gateway_order_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET payment_status = 'failed'
            WHERE gateway_order_id = $1
              AND payment_status NOT IN ('paid', 'failed')
            "#,
        )
        .bind(gateway_order_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds a payment by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE payment_id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    /// Finds a payment by its gateway order id
    pub async fn find_by_gateway_order_id(
        pool: &PgPool,
        gateway_order_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE gateway_order_id = $1"
        ))
        .bind(gateway_order_id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }

    /// Lists the order lines belonging to a payment
    pub async fn order_items(pool: &PgPool, payment_id: i64) -> Result<Vec<OrderItem>, sqlx::Error> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT order_item_id, payment_id, product_id, quantity, price
             FROM order_items WHERE payment_id = $1 ORDER BY order_item_id",
        )
        .bind(payment_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(PaymentStatus::Created.as_str(), "created");
        assert_eq!(PaymentStatus::Pending.as_str(), "pending");
        assert_eq!(PaymentStatus::Paid.as_str(), "paid");
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_terminal_states() {
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(!PaymentStatus::Created.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"paid\""
        );
    }

    #[test]
    fn test_priced_line_total() {
        let line = PricedLine {
            product_id: 5,
            quantity: 5,
            price: Decimal::new(1000, 2), // 10.00
        };

        assert_eq!(line.total(), Decimal::new(5000, 2)); // 50.00
    }

    #[test]
    fn test_order_total_sums_lines() {
        let lines = vec![
            PricedLine {
                product_id: 1,
                quantity: 2,
                price: Decimal::new(250, 2), // 2.50
            },
            PricedLine {
                product_id: 2,
                quantity: 1,
                price: Decimal::new(1999, 2), // 19.99
            },
        ];

        let total: Decimal = lines.iter().map(PricedLine::total).sum();
        assert_eq!(total, Decimal::new(2499, 2)); // 24.99
    }
}
