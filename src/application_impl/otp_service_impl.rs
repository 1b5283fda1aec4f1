use crate::application_port::{OtpError, OtpService};
use crate::domain_port::OtpStore;
use nanoid::nanoid;
use rand::Rng;
use rand::rngs::OsRng;
use std::sync::Arc;
use std::time::Duration;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of a minted reset token. nanoid's url-safe 64-char alphabet at
/// this length is far beyond brute-force reach within the TTL.
const RESET_TOKEN_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub code_length: usize,
    pub code_ttl: Duration,
    pub reset_token_ttl: Duration,
}

pub struct RealOtpService {
    store: Arc<dyn OtpStore>,
    cfg: OtpConfig,
}

impl RealOtpService {
    pub fn new(store: Arc<dyn OtpStore>, cfg: OtpConfig) -> Self {
        Self { store, cfg }
    }
}

#[async_trait::async_trait]
impl OtpService for RealOtpService {
    fn generate_code(&self, length: usize, numeric_only: bool) -> String {
        let mut rng = OsRng;
        let mut code = String::with_capacity(length);
        if numeric_only {
            for _ in 0..length {
                code.push(char::from(b'0' + rng.gen_range(0..10u8)));
            }
        } else {
            for _ in 0..length {
                code.push(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char);
            }
        }
        code
    }

    async fn send_code(&self, recipient: &str) -> Result<String, OtpError> {
        let code = self.generate_code(self.cfg.code_length, true);
        self.store
            .save_code(recipient, &code, self.cfg.code_ttl)
            .await?;
        Ok(code)
    }

    async fn verify_code(&self, recipient: &str, candidate: &str) -> Result<bool, OtpError> {
        let stored = self.store.fetch_code(recipient).await?;
        Ok(stored.as_deref() == Some(candidate))
    }

    async fn delete_code(&self, recipient: &str) -> Result<(), OtpError> {
        self.store.delete_code(recipient).await?;
        Ok(())
    }

    async fn issue_reset_token(&self, recipient: &str) -> Result<String, OtpError> {
        let token = nanoid!(RESET_TOKEN_LEN);
        self.store
            .save_reset_token(recipient, &token, self.cfg.reset_token_ttl)
            .await?;
        Ok(token)
    }

    async fn validate_reset_token(&self, recipient: &str, token: &str) -> Result<bool, OtpError> {
        let stored = self.store.fetch_reset_token(recipient).await?;
        Ok(stored.as_deref() == Some(token))
    }

    async fn consume_reset_token(&self, recipient: &str) -> Result<(), OtpError> {
        self.store.delete_reset_token(recipient).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryOtpStore;

    fn test_service() -> RealOtpService {
        RealOtpService::new(
            Arc::new(MemoryOtpStore::new()),
            OtpConfig {
                code_length: 6,
                code_ttl: Duration::from_secs(300),
                reset_token_ttl: Duration::from_secs(1800),
            },
        )
    }

    #[test]
    fn numeric_codes_are_digits_of_requested_length() {
        let svc = test_service();
        for _ in 0..32 {
            let code = svc.generate_code(6, true);
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn alphanumeric_codes_draw_from_the_fixed_alphabet() {
        let svc = test_service();
        let code = svc.generate_code(24, false);
        assert_eq!(code.len(), 24);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn code_verifies_until_deleted() {
        let svc = test_service();
        let code = svc.send_code("a@example.com").await.unwrap();

        assert!(svc.verify_code("a@example.com", &code).await.unwrap());
        // Verification alone does not consume.
        assert!(svc.verify_code("a@example.com", &code).await.unwrap());

        svc.delete_code("a@example.com").await.unwrap();
        assert!(!svc.verify_code("a@example.com", &code).await.unwrap());
    }

    #[tokio::test]
    async fn a_new_code_replaces_the_previous_one() {
        let svc = test_service();
        let first = svc.send_code("a@example.com").await.unwrap();
        let second = svc.send_code("a@example.com").await.unwrap();

        assert!(svc.verify_code("a@example.com", &second).await.unwrap());
        if first != second {
            assert!(!svc.verify_code("a@example.com", &first).await.unwrap());
        }
    }

    #[tokio::test]
    async fn wrong_recipient_never_verifies() {
        let svc = test_service();
        let code = svc.send_code("a@example.com").await.unwrap();
        assert!(!svc.verify_code("b@example.com", &code).await.unwrap());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let svc = test_service();
        svc.delete_code("nobody@example.com").await.unwrap();
        svc.delete_code("nobody@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn reset_token_validates_exactly_until_consumed() {
        let svc = test_service();
        let token = svc.issue_reset_token("a@example.com").await.unwrap();
        assert_eq!(token.len(), RESET_TOKEN_LEN);

        assert!(svc.validate_reset_token("a@example.com", &token).await.unwrap());
        assert!(!svc.validate_reset_token("a@example.com", "wrong").await.unwrap());
        assert!(!svc.validate_reset_token("b@example.com", &token).await.unwrap());

        svc.consume_reset_token("a@example.com").await.unwrap();
        assert!(!svc.validate_reset_token("a@example.com", &token).await.unwrap());
    }

    #[tokio::test]
    async fn reset_tokens_are_unique_per_issue() {
        let svc = test_service();
        let t1 = svc.issue_reset_token("a@example.com").await.unwrap();
        let t2 = svc.issue_reset_token("a@example.com").await.unwrap();
        assert_ne!(t1, t2);
    }
}
