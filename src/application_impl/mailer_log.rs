use crate::domain_port::{MailError, OtpMailer};
use tracing::info;

/// Development backend: writes the code to the log instead of sending
/// mail. Real delivery belongs to an external mail collaborator.
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp_email(&self, to: &str, code: &str) -> Result<(), MailError> {
        info!(%to, %code, "otp email (log backend)");
        Ok(())
    }
}
