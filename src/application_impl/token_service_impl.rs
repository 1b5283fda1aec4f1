use crate::application_port::{IssuedToken, TokenError, TokenPair, TokenService};
use crate::domain_model::*;
use crate::domain_port::{RevocationStore, UserDirectory};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String, // username
    user_id: String,
    email: String,
    role: UserRole,
    iat: i64,
    exp: i64,
    kind: TokenKind,
}

fn encode_claims(
    identity: &Identity,
    kind: TokenKind,
    ttl: Duration,
    cfg: &TokenConfig,
) -> Result<(String, DateTime<Utc>), TokenError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + ttl;
    let claims = SessionClaims {
        sub: identity.username.clone(),
        user_id: identity.user_id.to_string(),
        email: identity.email.clone(),
        role: identity.role,
        iat: iat_dt.timestamp(),
        exp: exp_dt.timestamp(),
        kind,
    };
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(&cfg.signing_key),
    )
    .map_err(|e| TokenError::Internal(e.to_string()))?;
    Ok((token, exp_dt))
}

fn decode_claims(
    token: &str,
    cfg: &TokenConfig,
    validate_exp: bool,
) -> Result<SessionClaims, TokenError> {
    let mut v = Validation::new(Algorithm::HS512);
    v.validate_exp = validate_exp;
    // Validity is exactly `now < exp`; no clock slack.
    v.leeway = 0;
    let data = decode::<SessionClaims>(token, &DecodingKey::from_secret(&cfg.signing_key), &v)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;
    Ok(data.claims)
}

fn identity_from_claims(claims: SessionClaims) -> Result<Identity, TokenError> {
    let user_id = claims
        .user_id
        .parse::<UserId>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(Identity {
        user_id,
        username: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}

pub struct JwtTokenService {
    cfg: TokenConfig,
    revocations: Arc<dyn RevocationStore>,
    directory: Arc<dyn UserDirectory>,
}

impl JwtTokenService {
    pub fn new(
        cfg: TokenConfig,
        revocations: Arc<dyn RevocationStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            cfg,
            revocations,
            directory,
        }
    }

    async fn revoke_remaining(&self, kind: TokenKind, token: &str) {
        // Expiry is read from the claims, not re-validated; a token past
        // its exp is already unusable and gets no record.
        let claims = match decode_claims(token, &self.cfg, false) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(?kind, "skipping revocation of undecodable token: {e}");
                return;
            }
        };
        let remaining = claims.exp - Utc::now().timestamp();
        if remaining <= 0 {
            return;
        }
        if let Err(e) = self
            .revocations
            .revoke(kind, token, Duration::from_secs(remaining as u64))
            .await
        {
            // Logout must not fail on a store outage, but operators need
            // to see the miss.
            warn!(?kind, "revocation write failed: {e}");
        }
    }
}

#[async_trait::async_trait]
impl TokenService for JwtTokenService {
    async fn issue_access_token(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        let (token, expires_at) =
            encode_claims(identity, TokenKind::Access, self.cfg.access_ttl, &self.cfg)?;
        Ok(IssuedToken { token, expires_at })
    }

    async fn issue_refresh_token(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        let (token, expires_at) =
            encode_claims(identity, TokenKind::Refresh, self.cfg.refresh_ttl, &self.cfg)?;
        Ok(IssuedToken { token, expires_at })
    }

    async fn verify(&self, token: &str, expected: TokenKind) -> Result<Identity, TokenError> {
        let claims = decode_claims(token, &self.cfg, true)?;
        if claims.kind != expected {
            return Err(TokenError::Malformed);
        }
        // Fail closed: an unreachable store must not let a possibly
        // revoked token through.
        let revoked = self
            .revocations
            .is_revoked(expected, token)
            .await
            .map_err(|e| TokenError::StoreUnavailable(e.to_string()))?;
        if revoked {
            return Err(TokenError::Revoked);
        }
        identity_from_claims(claims)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<(TokenPair, Identity), TokenError> {
        let stale = self.verify(refresh_token, TokenKind::Refresh).await?;

        // Re-resolve so role and status changes since issuance take effect.
        let account = self
            .directory
            .find_by_username(&stale.username)
            .await
            .map_err(|e| TokenError::Internal(e.to_string()))?
            .ok_or(TokenError::UserNotFound)?;
        if account.status != UserStatus::Active {
            return Err(TokenError::InactiveAccount);
        }
        let identity = account.identity();

        let access_token = self.issue_access_token(&identity).await?;
        let new_refresh_token = self.issue_refresh_token(&identity).await?;

        // Rotation retires the old refresh token for its remaining life.
        self.revoke_remaining(TokenKind::Refresh, refresh_token).await;

        Ok((
            TokenPair {
                access_token,
                refresh_token: new_refresh_token,
            },
            identity,
        ))
    }

    async fn invalidate(&self, access_token: Option<&str>, refresh_token: Option<&str>) {
        if let Some(token) = access_token {
            self.revoke_remaining(TokenKind::Access, token).await;
        }
        if let Some(token) = refresh_token {
            self.revoke_remaining(TokenKind::Refresh, token).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::Argon2PasswordHasher;
    use crate::domain_port::CredentialHasher;
    use crate::infra_memory::{MemoryRevocationStore, MemoryUserDirectory};

    fn test_identity() -> Identity {
        Identity {
            user_id: UserId(uuid::Uuid::new_v4()),
            username: "nguyen.van.a".into(),
            email: "nguyen.van.a@example.com".into(),
            role: UserRole::User,
        }
    }

    fn test_service(access_ttl: Duration, refresh_ttl: Duration) -> JwtTokenService {
        test_service_with(access_ttl, refresh_ttl, b"unit-test-signing-key".to_vec())
    }

    fn test_service_with(
        access_ttl: Duration,
        refresh_ttl: Duration,
        signing_key: Vec<u8>,
    ) -> JwtTokenService {
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        JwtTokenService::new(
            TokenConfig {
                access_ttl,
                refresh_ttl,
                signing_key,
            },
            Arc::new(MemoryRevocationStore::new()),
            Arc::new(MemoryUserDirectory::new(hasher)),
        )
    }

    #[tokio::test]
    async fn access_token_roundtrip() {
        let svc = test_service(Duration::from_secs(60), Duration::from_secs(600));
        let identity = test_identity();

        let issued = svc.issue_access_token(&identity).await.unwrap();
        assert_eq!(issued.token.split('.').count(), 3);

        let verified = svc.verify(&issued.token, TokenKind::Access).await.unwrap();
        assert_eq!(verified, identity);
    }

    #[tokio::test]
    async fn wrong_kind_is_rejected() {
        let svc = test_service(Duration::from_secs(60), Duration::from_secs(600));
        let identity = test_identity();

        let access = svc.issue_access_token(&identity).await.unwrap();
        let refresh = svc.issue_refresh_token(&identity).await.unwrap();

        let err = svc.verify(&access.token, TokenKind::Refresh).await.unwrap_err();
        assert!(matches!(err, TokenError::Malformed));
        let err = svc.verify(&refresh.token, TokenKind::Access).await.unwrap_err();
        assert!(matches!(err, TokenError::Malformed));
    }

    #[tokio::test]
    async fn foreign_signature_is_rejected() {
        let svc = test_service(Duration::from_secs(60), Duration::from_secs(600));
        let other = test_service_with(
            Duration::from_secs(60),
            Duration::from_secs(600),
            b"some-other-key".to_vec(),
        );

        let issued = other.issue_access_token(&test_identity()).await.unwrap();
        let err = svc.verify(&issued.token, TokenKind::Access).await.unwrap_err();
        assert!(matches!(err, TokenError::InvalidSignature));
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let svc = test_service(Duration::from_secs(60), Duration::from_secs(600));
        let err = svc.verify("not-a-token", TokenKind::Access).await.unwrap_err();
        assert!(matches!(err, TokenError::Malformed));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let svc = test_service(Duration::ZERO, Duration::from_secs(600));
        let issued = svc.issue_access_token(&test_identity()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let err = svc.verify(&issued.token, TokenKind::Access).await.unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[tokio::test]
    async fn invalidate_blacklists_for_remaining_life() {
        let svc = test_service(Duration::from_secs(60), Duration::from_secs(600));
        let issued = svc.issue_access_token(&test_identity()).await.unwrap();

        svc.invalidate(Some(issued.token.as_str()), None).await;

        let err = svc.verify(&issued.token, TokenKind::Access).await.unwrap_err();
        assert!(matches!(err, TokenError::Revoked));
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let svc = test_service(Duration::from_secs(60), Duration::from_secs(600));
        let issued = svc.issue_access_token(&test_identity()).await.unwrap();

        svc.invalidate(Some(issued.token.as_str()), None).await;
        svc.invalidate(Some(issued.token.as_str()), None).await;

        let err = svc.verify(&issued.token, TokenKind::Access).await.unwrap_err();
        assert!(matches!(err, TokenError::Revoked));
    }

    #[tokio::test]
    async fn invalidate_skips_expired_tokens() {
        let store = Arc::new(MemoryRevocationStore::new());
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let svc = JwtTokenService::new(
            TokenConfig {
                access_ttl: Duration::ZERO,
                refresh_ttl: Duration::from_secs(600),
                signing_key: b"unit-test-signing-key".to_vec(),
            },
            store.clone(),
            Arc::new(MemoryUserDirectory::new(hasher)),
        );
        let issued = svc.issue_access_token(&test_identity()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;
        svc.invalidate(Some(issued.token.as_str()), None).await;

        assert!(!store.is_revoked(TokenKind::Access, &issued.token).await.unwrap());
    }

    #[tokio::test]
    async fn invalidate_ignores_garbage() {
        let svc = test_service(Duration::from_secs(60), Duration::from_secs(600));
        svc.invalidate(Some("not-a-token"), Some("")).await;
    }
}
