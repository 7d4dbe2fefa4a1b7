use async_trait::async_trait;
use tracing::info;

/// Outbound mail contract. Delivery is an external collaborator; the core
/// only hands over recipient, subject and body.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Default implementation: writes the outbound message to the log. Used
/// until a real delivery provider is wired in deployment.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(%to, %subject, body_len = body.len(), "outbound mail (log only)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer;
        assert!(mailer
            .send("user@example.org", "Sujet", "Corps du message")
            .await
            .is_ok());
    }
}
