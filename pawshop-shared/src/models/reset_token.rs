/// Stored password-reset token digests
///
/// Only the SHA-256 digest of a token is ever written here; the raw
/// token lives exclusively in the emailed reset link. One live token per
/// user — requesting a second reset overwrites the first.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE password_reset_tokens (
///     user_id BIGINT PRIMARY KEY,
///     token_hash VARCHAR(64) NOT NULL,
///     expires_at BIGINT NOT NULL
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// One stored token digest
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub user_id: i64,

    /// SHA-256 hex digest of the raw token
    pub token_hash: String,

    /// Expiry, epoch milliseconds
    pub expires_at: i64,
}

impl PasswordResetToken {
    /// Creates or overwrites the token for a user
    pub async fn upsert(
        pool: &PgPool,
        user_id: i64,
        token_hash: &str,
        expires_at: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET token_hash = EXCLUDED.token_hash, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Looks up a non-expired token by digest
    ///
    /// `now_millis` is passed in rather than read here so callers and
    /// tests agree on the clock.
    pub async fn find_valid(
        pool: &PgPool,
        token_hash: &str,
        now_millis: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT user_id, token_hash, expires_at
             FROM password_reset_tokens
             WHERE token_hash = $1 AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now_millis)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Deletes the token for a user after a successful reset
    pub async fn delete_for_user(pool: &PgPool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
