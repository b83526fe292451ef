/// Configuration management for the API server
///
/// This module loads configuration from environment variables and
/// provides a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `HOST`: host to bind to (default: 0.0.0.0)
/// - `PORT`: port to bind to (default: 9292)
/// - `SESSION_SECRET`: secret for signing session tokens (required, min 32 bytes)
/// - `ADMIN_SIGNUP_SECRET`: shared secret gating admin signup (required)
/// - `CORS_ORIGINS`: comma-separated allowed origins ("*" for permissive)
/// - `PUBLIC_BASE_URL`: base URL used to build product image URLs
/// - `CLIENT_URL`: frontend base URL used in password-reset links
/// - `UPLOAD_DIR`: directory for uploaded images (default: uploads)
/// - `GATEWAY_URL`, `GATEWAY_KEY_ID`, `GATEWAY_KEY_SECRET`: payment gateway
/// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
///   `EMAIL_FROM`: outbound mail
/// - `RUST_LOG`: log level (default: info)

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session and signup secrets
    pub auth: AuthConfig,

    /// Payment gateway credentials
    pub gateway: GatewayConfig,

    /// Outbound email settings
    pub email: EmailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; "*" enables permissive mode
    pub cors_origins: Vec<String>,

    /// Base URL prefixed onto stored product image filenames
    pub public_base_url: String,

    /// Frontend base URL, used in password-reset links
    pub client_url: String,

    /// Directory where uploaded images are written and served from
    pub upload_dir: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session and signup secrets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret for signing session tokens
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub session_secret: String,

    /// Shared secret that gates admin signup
    pub admin_signup_secret: String,
}

/// Payment gateway credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway API base URL
    pub url: String,

    /// API key id (basic auth username)
    pub key_id: String,

    /// API key secret; also the HMAC key for signature verification
    pub key_secret: String,
}

/// Outbound email settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,

    /// From address on outbound mail
    pub from_address: String,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("{} environment variable is required", name))
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a numeric
    /// variable fails to parse, or the session secret is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "9292".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));
        let client_url = env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let database_url = required("DATABASE_URL")?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }
        let admin_signup_secret = required("ADMIN_SIGNUP_SECRET")?;

        let gateway = GatewayConfig {
            url: required("GATEWAY_URL")?,
            key_id: required("GATEWAY_KEY_ID")?,
            key_secret: required("GATEWAY_KEY_SECRET")?,
        };

        let email = EmailConfig {
            smtp_host: required("SMTP_HOST")?,
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse::<u16>()?,
            smtp_username: required("SMTP_USERNAME")?,
            smtp_password: required("SMTP_PASSWORD")?,
            from_address: required("EMAIL_FROM")?,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                public_base_url,
                client_url,
                upload_dir,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                session_secret,
                admin_signup_secret,
            },
            gateway,
            email,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 9292,
                cors_origins: vec!["*".to_string()],
                public_base_url: "http://localhost:9292".to_string(),
                client_url: "http://localhost:3000".to_string(),
                upload_dir: "uploads".to_string(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                admin_signup_secret: "admin-secret".to_string(),
            },
            gateway: GatewayConfig {
                url: "https://gateway.test".to_string(),
                key_id: "key_id".to_string(),
                key_secret: "key_secret".to_string(),
            },
            email: EmailConfig {
                smtp_host: "smtp.test".to_string(),
                smtp_port: 587,
                smtp_username: "mailer".to_string(),
                smtp_password: "password".to_string(),
                from_address: "shop@example.com".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        let config = test_config();
        assert_eq!(config.bind_address(), "127.0.0.1:9292");
    }

    #[test]
    fn test_default_cors_is_permissive() {
        let config = test_config();
        assert!(config.api.cors_origins.contains(&"*".to_string()));
    }
}
