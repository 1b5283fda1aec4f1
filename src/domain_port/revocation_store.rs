use crate::domain_model::TokenKind;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store error: {0}")]
    Store(String),
}

/// TTL-scoped blacklist of session tokens. A record lives exactly as long
/// as the token it revokes and then vanishes on its own.
#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record `token` as revoked for `ttl`. Overwriting an existing record
    /// is fine; it carries the same remaining lifetime.
    async fn revoke(&self, kind: TokenKind, token: &str, ttl: Duration) -> Result<(), StoreError>;

    async fn is_revoked(&self, kind: TokenKind, token: &str) -> Result<bool, StoreError>;
}
