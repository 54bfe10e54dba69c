use async_trait::async_trait;
use tracing::info;

/// Outbound delivery of the activation mail. SMTP transports live behind
/// this seam; handlers only see the trait object in [`crate::state::AppState`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_activation(&self, to: &str, full_name: &str, code: &str) -> anyhow::Result<()>;
}

/// Records the send instead of talking to an SMTP server.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_activation(&self, to: &str, full_name: &str, code: &str) -> anyhow::Result<()> {
        info!(to = %to, recipient = %full_name, code = %code, "activation mail queued");
        Ok(())
    }
}
