//! Outbound e-mail.
//!
//! [`Mailer`] is the seam between the application and the mail transport.
//! [`SmtpMailer`](email::SmtpMailer) sends through `lettre`; [`LogMailer`]
//! only writes the message to the log and is used when SMTP is not
//! configured.

pub mod email;

use async_trait::async_trait;

use self::email::EmailError;

/// Sends plain-text e-mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;

    /// Whether messages actually leave the process.
    fn delivers(&self) -> bool {
        true
    }
}

/// Mailer that logs instead of sending.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        tracing::info!(to, subject, body, "SMTP not configured, e-mail logged only");
        Ok(())
    }

    fn delivers(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer;
        assert!(mailer.send("a@b.io", "Hi", "Body").await.is_ok());
        assert!(!mailer.delivers());
    }
}
