/// Session token generation and validation
///
/// A session is a signed HS256 token carried in an HTTP-only cookie. The
/// token embeds the full session identity (user id, username, email,
/// role), so every request resolves its identity from the cookie alone —
/// there is no server-side session table to consult.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 24 hours
/// - **Validation**: signature, expiration, and issuer checks
/// - **Secret Management**: the signing secret must be at least 32 bytes
///
/// # Example
///
/// ```
/// use pawshop_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
/// use pawshop_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = SessionClaims::new(42, "alice", "alice@example.com", UserRole::User);
/// let token = create_session_token(&claims, "a-secret-key-at-least-32-bytes-long")?;
///
/// let validated = validate_session_token(&token, "a-secret-key-at-least-32-bytes-long")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::{User, UserRole};

/// Name of the cookie that carries the session token
pub const SESSION_COOKIE: &str = "pawshop_session";

/// Session lifetime in seconds (24 hours, matching the cookie max-age)
pub const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

const ISSUER: &str = "pawshop";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate session token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,
}

/// Claims embedded in a session token
///
/// # Standard Claims
///
/// - `sub`: user id
/// - `iss`: issuer (always "pawshop")
/// - `iat` / `exp` / `nbf`: issue, expiry, and not-before timestamps
///
/// # Custom Claims
///
/// - `username`, `email`, `role`: the session identity surfaced to the
///   client by login and `GET /api/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user id
    pub sub: i64,

    /// Issuer - always "pawshop"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Username (custom claim)
    pub username: String,

    /// Email address (custom claim)
    pub email: String,

    /// Account role (custom claim)
    pub role: UserRole,
}

impl SessionClaims {
    /// Creates new claims with the default 24 hour expiration
    pub fn new(user_id: i64, username: &str, email: &str, role: UserRole) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::seconds(SESSION_TTL_SECONDS);

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            username: username.to_string(),
            email: email.to_string(),
            role,
        }
    }

    /// Creates claims for a stored user row
    pub fn for_user(user: &User) -> Self {
        Self::new(user.user_id, &user.username, &user.email, user.role)
    }

    /// Creates claims with a custom expiration, used by tests
    pub fn with_expiration(
        user_id: i64,
        username: &str,
        email: &str,
        role: UserRole,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            username: username.to_string(),
            email: email.to_string(),
            role,
        }
    }

    /// Checks if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs session claims into a token string
///
/// # Errors
///
/// Returns `SessionError::CreateError` if encoding fails
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts its claims
///
/// Verifies the signature, expiry, not-before time, and issuer.
///
/// # Errors
///
/// Returns `SessionError::Expired` for an expired token and
/// `SessionError::ValidationError` for any other failure (bad signature,
/// wrong issuer, malformed token).
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data =
        decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::ValidationError(format!("Token validation failed: {}", e)),
        })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = SessionClaims::new(7, "alice", "alice@example.com", UserRole::Admin);

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.iss, "pawshop");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECONDS);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = SessionClaims::new(42, "bob", "bob@example.com", UserRole::User);
        let token = create_session_token(&claims, SECRET).expect("Should create token");

        let validated = validate_session_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, 42);
        assert_eq!(validated.username, "bob");
        assert_eq!(validated.role, UserRole::User);
        assert_eq!(validated.iss, "pawshop");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = SessionClaims::new(1, "eve", "eve@example.com", UserRole::User);
        let token = create_session_token(&claims, SECRET).expect("Should create token");

        let result = validate_session_token(&token, "wrong-secret-also-32-bytes-long!!");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = SessionClaims::with_expiration(
            1,
            "late",
            "late@example.com",
            UserRole::User,
            Duration::seconds(-3600), // already expired
        );

        assert!(claims.is_expired());

        let token = create_session_token(&claims, SECRET).expect("Should create token");
        let result = validate_session_token(&token, SECRET);

        assert!(matches!(result.unwrap_err(), SessionError::Expired));
    }

    #[test]
    fn test_validate_garbage_token() {
        let result = validate_session_token("not-a-token", SECRET);
        assert!(matches!(
            result.unwrap_err(),
            SessionError::ValidationError(_)
        ));
    }
}
