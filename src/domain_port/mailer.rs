#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Out-of-band delivery of one-time codes. Generation and storage never
/// depend on this; the orchestration hands the code over after the fact.
#[async_trait::async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp_email(&self, to: &str, code: &str) -> Result<(), MailError>;
}
