/// Email service for password-reset notifications.
///
/// Uses SMTP via lettre. The transport is lazy: nothing connects until a
/// message is actually sent, so constructing the service at startup is
/// cheap and test-safe.

use lettre::{
    message::header::ContentType,
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::{ApiConfig, EmailConfig};

/// Errors that can occur when sending email.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for transactional mail.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    client_url: String,
}

impl EmailService {
    /// Creates an email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay host is invalid.
    pub fn new(email: &EmailConfig, api: &ApiConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(email.smtp_username.clone(), email.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&email.smtp_host)?
            .port(email.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: email.from_address.clone(),
            client_url: api.client_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends the password-reset link for a raw token.
    ///
    /// The raw token only ever exists inside this link; storage keeps the
    /// digest.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient address is invalid or the SMTP
    /// send fails. Failures are terminal for the request; there is no
    /// retry.
    pub async fn send_reset_link(&self, to: &str, token: &str) -> Result<(), EmailError> {
        let reset_link = reset_link(&self.client_url, token);

        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject("Password Reset Link")
            .header(ContentType::TEXT_HTML)
            .body(format!(
                "<p>Click <a href=\"{}\">here</a> to reset your password. \
                 This link expires in 1 hour.</p>",
                reset_link
            ))?;

        self.mailer.send(message).await?;
        Ok(())
    }
}

/// Builds the frontend reset link for a raw token
fn reset_link(client_url: &str, token: &str) -> String {
    format!("{}/reset-password/{}", client_url, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_link_format() {
        assert_eq!(
            reset_link("https://shop.example.com", "abc123"),
            "https://shop.example.com/reset-password/abc123"
        );
    }
}
