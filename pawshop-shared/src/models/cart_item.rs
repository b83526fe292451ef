/// Cart item model
///
/// One row per (user, product) pair, kept unique by a database
/// constraint. Adding the same product again increments the existing row
/// inside a single upsert statement, so two concurrent adds can never
/// produce a lost update or a duplicate row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cart_items (
///     cart_item_id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL,
///     product_id BIGINT NOT NULL,
///     quantity INTEGER NOT NULL CHECK (quantity >= 1),
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, product_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Outcome of an add-to-cart upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAddOutcome {
    /// A new row was inserted
    Created,

    /// An existing row's quantity was incremented
    Updated,
}

/// One cart row, as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItem {
    pub cart_item_id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

/// One cart row joined with the product fields the storefront displays
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub cart_item_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

impl CartItem {
    /// Adds a product to a user's cart, or increments the existing row
    ///
    /// A single `ON CONFLICT` upsert backed by the unique constraint on
    /// `(user_id, product_id)`; the increment also refreshes `added_at`
    /// so the line moves to the top of the cart. The `xmax = 0` check
    /// reports whether the row was freshly inserted.
    pub async fn add(
        pool: &PgPool,
        user_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartAddOutcome, sqlx::Error> {
        let (inserted,): (bool,) = sqlx::query_as(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          added_at = NOW()
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(pool)
        .await?;

        Ok(if inserted {
            CartAddOutcome::Created
        } else {
            CartAddOutcome::Updated
        })
    }

    /// Overwrites the quantity of an existing cart row
    ///
    /// Returns false when the (user, product) pair is not in the cart.
    pub async fn set_quantity(
        pool: &PgPool,
        user_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = $1, added_at = NOW()
             WHERE user_id = $2 AND product_id = $3",
        )
        .bind(quantity)
        .bind(user_id)
        .bind(product_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes one product from the cart; idempotent
    pub async fn remove(pool: &PgPool, user_id: i64, product_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Clears every cart row for a user, returning how many were removed
    pub async fn clear(pool: &PgPool, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists a user's cart, most recently added first
    pub async fn list(pool: &PgPool, user_id: i64) -> Result<Vec<CartLine>, sqlx::Error> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT ci.cart_item_id, ci.product_id, ci.quantity, ci.added_at,
                   p.name, p.price, p.image_url
            FROM cart_items ci
            JOIN products p ON ci.product_id = p.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.added_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(lines)
    }
}
