use crate::domain_model::TokenKind;
use crate::domain_port::{RevocationStore, StoreError};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;

const ACCESS_NAMESPACE: &str = "BLACKLIST";
const REFRESH_NAMESPACE: &str = "REFRESH_BLACKLIST";

/// The record's presence is the signal; the value is a placeholder.
const REVOKED_SENTINEL: &str = "1";

pub struct RedisRevocationStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisRevocationStore {
    pub fn new(conn: ConnectionManager, op_timeout: Duration) -> Self {
        RedisRevocationStore { conn, op_timeout }
    }

    fn key(kind: TokenKind, token: &str) -> String {
        match kind {
            TokenKind::Access => format!("{ACCESS_NAMESPACE}:{token}"),
            TokenKind::Refresh => format!("{REFRESH_NAMESPACE}:{token}"),
        }
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Store(e.to_string())),
            Err(_) => Err(StoreError::Unavailable(format!(
                "redis did not answer within {:?}",
                self.op_timeout
            ))),
        }
    }
}

#[async_trait::async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, kind: TokenKind, token: &str, ttl: Duration) -> Result<(), StoreError> {
        let key = Self::key(kind, token);
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry; a sub-second remainder still gets
        // one full second.
        let secs = ttl.as_secs().max(1);
        self.bounded(async move {
            let _: () = conn.set_ex(&key, REVOKED_SENTINEL, secs).await?;
            Ok(())
        })
        .await
    }

    async fn is_revoked(&self, kind: TokenKind, token: &str) -> Result<bool, StoreError> {
        let key = Self::key(kind, token);
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.exists(&key).await }).await
    }
}
