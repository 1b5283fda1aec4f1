use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for OtpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(e) => OtpError::StoreUnavailable(e),
            StoreError::Store(e) => OtpError::Store(e),
        }
    }
}

/// One-time codes and password-reset tokens. Verification never consumes;
/// deletion is a separate explicit step so the caller decides when a
/// successful check spends the credential.
#[async_trait::async_trait]
pub trait OtpService: Send + Sync {
    /// CSPRNG-backed code generation. Numeric mode draws from the digits,
    /// otherwise from a fixed upper/lower-case alphabet.
    fn generate_code(&self, length: usize, numeric_only: bool) -> String;

    /// Generate and store a code for `recipient`, replacing any live one.
    /// Returns the code for out-of-band delivery by the caller.
    async fn send_code(&self, recipient: &str) -> Result<String, OtpError>;

    /// True iff a code is stored for `recipient` and equals `candidate`.
    async fn verify_code(&self, recipient: &str, candidate: &str) -> Result<bool, OtpError>;

    async fn delete_code(&self, recipient: &str) -> Result<(), OtpError>;

    /// Mint an unguessable single-use reset token for `recipient`. Drawn
    /// from a different space than the short codes.
    async fn issue_reset_token(&self, recipient: &str) -> Result<String, OtpError>;

    async fn validate_reset_token(&self, recipient: &str, token: &str) -> Result<bool, OtpError>;

    /// Delete the reset token once the guarded side effect has happened.
    async fn consume_reset_token(&self, recipient: &str) -> Result<(), OtpError>;
}
