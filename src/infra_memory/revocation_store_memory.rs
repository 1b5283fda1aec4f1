use crate::domain_model::TokenKind;
use crate::domain_port::{RevocationStore, StoreError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

/// In-process stand-in for the keyed store. TTLs are honored lazily: an
/// entry past its deadline reads as absent and is dropped on that read.
pub struct MemoryRevocationStore {
    entries: DashMap<(TokenKind, String), DateTime<Utc>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        MemoryRevocationStore {
            entries: DashMap::new(),
        }
    }
}

impl Default for MemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, kind: TokenKind, token: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries
            .insert((kind, token.to_string()), Utc::now() + ttl);
        Ok(())
    }

    async fn is_revoked(&self, kind: TokenKind, token: &str) -> Result<bool, StoreError> {
        let key = (kind, token.to_string());
        let expired = match self.entries.get(&key) {
            Some(deadline) => {
                if Utc::now() < *deadline {
                    return Ok(true);
                }
                true
            }
            None => return Ok(false),
        };
        if expired {
            self.entries.remove(&key);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_expires_with_its_ttl() {
        let store = MemoryRevocationStore::new();
        store
            .revoke(TokenKind::Access, "tok", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(store.is_revoked(TokenKind::Access, "tok").await.unwrap());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!store.is_revoked(TokenKind::Access, "tok").await.unwrap());
    }

    #[tokio::test]
    async fn kinds_are_separate_namespaces() {
        let store = MemoryRevocationStore::new();
        store
            .revoke(TokenKind::Access, "tok", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(!store.is_revoked(TokenKind::Refresh, "tok").await.unwrap());
    }
}
