use crate::domain_port::{OtpStore, StoreError};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;

const CODE_NAMESPACE: &str = "OTP";
const RESET_NAMESPACE: &str = "RESET_TOKEN";

pub struct RedisOtpStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisOtpStore {
    pub fn new(conn: ConnectionManager, op_timeout: Duration) -> Self {
        RedisOtpStore { conn, op_timeout }
    }

    fn code_key(recipient: &str) -> String {
        format!("{CODE_NAMESPACE}:{recipient}")
    }

    fn reset_key(recipient: &str) -> String {
        format!("{RESET_NAMESPACE}:{recipient}")
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

    async fn put(&self, key: String, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let value = value.to_string();
        let secs = ttl.as_secs().max(1);
        self.bounded(async move {
            let _: () = conn.set_ex(&key, &value, secs).await?;
            Ok(())
        })
        .await
    }

    async fn get(&self, key: String) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.get(&key).await }).await
    }

    async fn delete(&self, key: String) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(async move {
            let _: () = conn.del(&key).await?;
            Ok(())
        })
        .await
    }
}

#[async_trait::async_trait]
impl OtpStore for RedisOtpStore {
    async fn save_code(
        &self,
        recipient: &str,
        code: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.put(Self::code_key(recipient), code, ttl).await
    }

    async fn fetch_code(&self, recipient: &str) -> Result<Option<String>, StoreError> {
        self.get(Self::code_key(recipient)).await
    }

    async fn delete_code(&self, recipient: &str) -> Result<(), StoreError> {
        self.delete(Self::code_key(recipient)).await
    }

    async fn save_reset_token(
        &self,
        recipient: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.put(Self::reset_key(recipient), token, ttl).await
    }

    async fn fetch_reset_token(&self, recipient: &str) -> Result<Option<String>, StoreError> {
        self.get(Self::reset_key(recipient)).await
    }

    async fn delete_reset_token(&self, recipient: &str) -> Result<(), StoreError> {
        self.delete(Self::reset_key(recipient)).await
    }
}
