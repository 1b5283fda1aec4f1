use super::StoreError;
use std::time::Duration;

/// Keyed store for one-time codes and password-reset tokens, both scoped
/// to a recipient email and a TTL. At most one live value per recipient
/// and concern; a new write replaces the previous one.
#[async_trait::async_trait]
pub trait OtpStore: Send + Sync {
    async fn save_code(&self, recipient: &str, code: &str, ttl: Duration)
    -> Result<(), StoreError>;

    async fn fetch_code(&self, recipient: &str) -> Result<Option<String>, StoreError>;

    async fn delete_code(&self, recipient: &str) -> Result<(), StoreError>;

    async fn save_reset_token(
        &self,
        recipient: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    async fn fetch_reset_token(&self, recipient: &str) -> Result<Option<String>, StoreError>;

    async fn delete_reset_token(&self, recipient: &str) -> Result<(), StoreError>;
}
