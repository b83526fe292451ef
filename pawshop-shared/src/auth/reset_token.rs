/// Password-reset token utilities
///
/// These work in conjunction with the `models::reset_token` module for
/// database operations.
///
/// # Security
///
/// - **Format**: 64 lowercase hex chars (32 random bytes)
/// - **Storage**: only the SHA-256 digest of the token is persisted; the
///   raw token exists solely in the reset link emailed to the user
/// - **Expiry**: one hour, tracked as epoch milliseconds
/// - **Single use**: the row is deleted on successful reset
///
/// # Example
///
/// ```
/// use pawshop_shared::auth::reset_token::{generate_reset_token, hash_reset_token};
///
/// let (token, digest) = generate_reset_token();
/// assert_eq!(token.len(), 64);
/// assert_eq!(hash_reset_token(&token), digest);
/// ```

use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Token lifetime in milliseconds (one hour)
pub const RESET_TOKEN_TTL_MILLIS: i64 = 60 * 60 * 1000;

/// Number of random bytes in a token
const TOKEN_BYTES: usize = 32;

/// Generates a new reset token
///
/// Returns the raw hex token (to be emailed) and its SHA-256 hex digest
/// (to be stored). The raw token must never be persisted.
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let token = hex::encode(bytes);
    let digest = hash_reset_token(&token);
    (token, digest)
}

/// Computes the SHA-256 hex digest of a token
///
/// Deterministic, so a token arriving in a reset request can be matched
/// against the stored digest without ever storing the token itself.
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Expiry timestamp for a token issued now (epoch milliseconds)
pub fn expiry_from_now() -> i64 {
    Utc::now().timestamp_millis() + RESET_TOKEN_TTL_MILLIS
}

/// Checks whether a stored expiry is still in the future
pub fn is_expired(expires_at_millis: i64) -> bool {
    Utc::now().timestamp_millis() >= expires_at_millis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reset_token_format() {
        let (token, digest) = generate_reset_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_tokens_are_unique() {
        let (token1, _) = generate_reset_token();
        let (token2, _) = generate_reset_token();
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let (token, digest) = generate_reset_token();
        assert_eq!(hash_reset_token(&token), digest);
        assert_eq!(hash_reset_token(&token), hash_reset_token(&token));
    }

    #[test]
    fn test_hash_differs_per_token() {
        assert_ne!(hash_reset_token("aaaa"), hash_reset_token("aaab"));
    }

    #[test]
    fn test_known_digest() {
        // SHA-256 of the ASCII string "token"
        assert_eq!(
            hash_reset_token("token"),
            "3c469e9d6c5875d37a43f353d4f88e61fcf812c66eee3457465a40b0da4153e0"
        );
    }

    #[test]
    fn test_expiry_window() {
        let expiry = expiry_from_now();
        assert!(!is_expired(expiry));
        assert!(is_expired(expiry - RESET_TOKEN_TTL_MILLIS - 1));
    }
}
