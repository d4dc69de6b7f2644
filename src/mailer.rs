use axum::async_trait;
use tracing::info;

/// What a verification code is being sent for. Only sign-up style codes exist
/// today, but the resend path reports itself separately for log filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailPurpose {
    SignUp,
    Resend,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        purpose: MailPurpose,
    ) -> anyhow::Result<()>;
}

/// Default mailer: logs the send instead of talking to a provider.
/// Swapped for a real transport at deploy time; the flow only decides
/// when to send and what code.
#[derive(Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_code(
        &self,
        to: &str,
        _code: &str,
        purpose: MailPurpose,
    ) -> anyhow::Result<()> {
        info!(recipient = %to, purpose = ?purpose, "verification code email queued");
        Ok(())
    }
}
