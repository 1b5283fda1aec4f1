use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token malformed")]
    Malformed,
    #[error("token signature invalid")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token revoked")]
    Revoked,
    #[error("user not found")]
    UserNotFound,
    #[error("account is not active")]
    InactiveAccount,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: IssuedToken,
    pub refresh_token: IssuedToken,
}

#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    async fn issue_access_token(&self, identity: &Identity) -> Result<IssuedToken, TokenError>;

    async fn issue_refresh_token(&self, identity: &Identity) -> Result<IssuedToken, TokenError>;

    /// Full check: signature, expiry, kind, then the revocation store.
    /// A store failure here is fail-closed.
    async fn verify(&self, token: &str, expected: TokenKind) -> Result<Identity, TokenError>;

    /// Rotate a refresh token into a fresh pair. The identity is re-read
    /// from the directory so role and status changes take effect, and the
    /// old refresh token is blacklisted for its remaining lifetime.
    async fn refresh(&self, refresh_token: &str) -> Result<(TokenPair, Identity), TokenError>;

    /// Best-effort blacklisting of whatever tokens are supplied. Expired or
    /// undecodable tokens are skipped, store failures are logged and
    /// swallowed; this never fails.
    async fn invalidate(&self, access_token: Option<&str>, refresh_token: Option<&str>);
}
