use super::{OtpError, TokenError, TokenPair};
use crate::domain_model::Identity;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is inactive")]
    InactiveAccount,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("unknown email")]
    UnknownEmail,
    #[error("invalid or expired code")]
    InvalidCode,
    #[error("invalid or expired reset token")]
    InvalidResetToken,
    #[error("password confirmation does not match")]
    PasswordMismatch,
    #[error("no tokens provided")]
    MissingTokens,
    #[error("tokens already invalidated")]
    AlreadyInvalidated,
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<OtpError> for AuthError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::StoreUnavailable(e) => AuthError::StoreUnavailable(e),
            OtpError::Store(e) => AuthError::Internal(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SessionOutput {
    pub user: Identity,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone)]
pub struct ResetPasswordInput {
    pub email: String,
    pub reset_token: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Front door for the credential lifecycle: login, refresh, logout and the
/// forgotten-password recovery chain. The HTTP layer maps these verbs
/// one-to-one onto endpoints.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, input: LoginInput) -> Result<SessionOutput, AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<SessionOutput, AuthError>;

    async fn logout(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError>;

    async fn send_otp(&self, email: &str) -> Result<(), AuthError>;

    /// On success returns the reset token and consumes the code; the code
    /// cannot gate a second exchange.
    async fn verify_otp(&self, email: &str, code: &str) -> Result<String, AuthError>;

    async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthError>;
}
