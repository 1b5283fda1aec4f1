use crate::domain_port::{OtpStore, StoreError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

pub struct MemoryOtpStore {
    entries: DashMap<String, (String, DateTime<Utc>)>,
}

impl MemoryOtpStore {
    pub fn new() -> Self {
        MemoryOtpStore {
            entries: DashMap::new(),
        }
    }

    fn code_key(recipient: &str) -> String {
        format!("OTP:{recipient}")
    }

    fn reset_key(recipient: &str) -> String {
        format!("RESET_TOKEN:{recipient}")
    }

    fn put(&self, key: String, value: &str, ttl: Duration) {
        self.entries
            .insert(key, (value.to_string(), Utc::now() + ttl));
    }

    fn get_live(&self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                let (value, deadline) = entry.value();
                if Utc::now() < *deadline {
                    return Some(value.clone());
                }
                true
            }
            None => return None,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }
}

impl Default for MemoryOtpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl OtpStore for MemoryOtpStore {
    async fn save_code(
        &self,
        recipient: &str,
        code: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.put(Self::code_key(recipient), code, ttl);
        Ok(())
    }

    async fn fetch_code(&self, recipient: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_live(&Self::code_key(recipient)))
    }

    async fn delete_code(&self, recipient: &str) -> Result<(), StoreError> {
        self.entries.remove(&Self::code_key(recipient));
        Ok(())
    }

    async fn save_reset_token(
        &self,
        recipient: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.put(Self::reset_key(recipient), token, ttl);
        Ok(())
    }

    async fn fetch_reset_token(&self, recipient: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_live(&Self::reset_key(recipient)))
    }

    async fn delete_reset_token(&self, recipient: &str) -> Result<(), StoreError> {
        self.entries.remove(&Self::reset_key(recipient));
        Ok(())
    }
}
