//! Integration tests for the credential lifecycle services, wired over
//! the in-memory adapters.

use docuflow::application_impl::{
    Argon2PasswordHasher, JwtTokenService, OtpConfig, RealAuthService, RealOtpService, TokenConfig,
};
use docuflow::application_port::{
    AuthError, AuthService, LoginInput, OtpService, ResetPasswordInput, TokenError, TokenService,
};
use docuflow::domain_model::{TokenKind, UserId, UserRole, UserStatus};
use docuflow::domain_port::{
    CredentialHasher, MailError, OtpMailer, RevocationStore, UserAccount,
};
use docuflow::infra_memory::{MemoryOtpStore, MemoryRevocationStore, MemoryUserDirectory};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mailer that remembers the last code instead of delivering it.
struct RecordingMailer {
    last_code: Mutex<Option<String>>,
}

impl RecordingMailer {
    fn new() -> Self {
        Self {
            last_code: Mutex::new(None),
        }
    }

    fn last_code(&self) -> Option<String> {
        self.last_code.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl OtpMailer for RecordingMailer {
    async fn send_otp_email(&self, _to: &str, code: &str) -> Result<(), MailError> {
        *self.last_code.lock().unwrap() = Some(code.to_string());
        Ok(())
    }
}

struct Harness {
    directory: Arc<MemoryUserDirectory>,
    revocations: Arc<MemoryRevocationStore>,
    tokens: Arc<JwtTokenService>,
    auth: Arc<dyn AuthService>,
    mailer: Arc<RecordingMailer>,
}

fn account(username: &str, email: &str, status: UserStatus) -> UserAccount {
    UserAccount {
        user_id: UserId(uuid::Uuid::new_v4()),
        username: username.into(),
        email: email.into(),
        role: UserRole::User,
        status,
    }
}

async fn setup() -> Harness {
    setup_with_ttls(Duration::from_secs(3600), Duration::from_secs(7200)).await
}

async fn setup_with_ttls(access_ttl: Duration, refresh_ttl: Duration) -> Harness {
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
    let directory = Arc::new(MemoryUserDirectory::new(hasher));
    directory
        .insert(
            account("alice", "alice@example.com", UserStatus::Active),
            "correct-horse-battery",
        )
        .await
        .unwrap();
    directory
        .insert(
            account("bob", "bob@example.com", UserStatus::Inactive),
            "correct-horse-battery",
        )
        .await
        .unwrap();

    let revocations = Arc::new(MemoryRevocationStore::new());
    let tokens = Arc::new(JwtTokenService::new(
        TokenConfig {
            access_ttl,
            refresh_ttl,
            signing_key: b"integration-test-signing-key".to_vec(),
        },
        revocations.clone(),
        directory.clone(),
    ));

    let otp_service = Arc::new(RealOtpService::new(
        Arc::new(MemoryOtpStore::new()),
        OtpConfig {
            code_length: 6,
            code_ttl: Duration::from_secs(300),
            reset_token_ttl: Duration::from_secs(1800),
        },
    ));

    let mailer = Arc::new(RecordingMailer::new());
    let auth: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
        directory.clone(),
        tokens.clone(),
        otp_service,
        mailer.clone(),
    ));

    Harness {
        directory,
        revocations,
        tokens,
        auth,
        mailer,
    }
}

fn login_input(username: &str, password: &str) -> LoginInput {
    LoginInput {
        username: username.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn login_returns_verifiable_tokens() {
    let h = setup().await;

    let session = h
        .auth
        .login(login_input("alice", "correct-horse-battery"))
        .await
        .unwrap();
    assert!(!session.tokens.access_token.token.is_empty());
    assert!(!session.tokens.refresh_token.token.is_empty());

    let identity = h
        .tokens
        .verify(&session.tokens.access_token.token, TokenKind::Access)
        .await
        .unwrap();
    assert_eq!(identity, session.user);
    assert_eq!(identity.username, "alice");
}

#[tokio::test]
async fn login_inactive_account_is_rejected() {
    let h = setup().await;
    let err = h
        .auth
        .login(login_input("bob", "correct-horse-battery"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InactiveAccount));
}

#[tokio::test]
async fn login_wrong_password_is_rejected() {
    let h = setup().await;
    let err = h
        .auth
        .login(login_input("alice", "tr0ub4dor"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = h
        .auth
        .login(login_input("nobody", "whatever"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn logout_revokes_live_tokens() {
    let h = setup().await;
    let session = h
        .auth
        .login(login_input("alice", "correct-horse-battery"))
        .await
        .unwrap();
    let access = session.tokens.access_token.token;
    let refresh = session.tokens.refresh_token.token;

    h.auth.logout(Some(access.as_str()), Some(refresh.as_str())).await.unwrap();

    let err = h.tokens.verify(&access, TokenKind::Access).await.unwrap_err();
    assert!(matches!(err, TokenError::Revoked));
    let err = h.tokens.verify(&refresh, TokenKind::Refresh).await.unwrap_err();
    assert!(matches!(err, TokenError::Revoked));

    // A second logout with the same tokens is a client error, not a crash.
    let err = h
        .auth
        .logout(Some(access.as_str()), Some(refresh.as_str()))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AlreadyInvalidated));
}

#[tokio::test]
async fn logout_without_tokens_is_rejected() {
    let h = setup().await;
    let err = h.auth.logout(None, None).await.unwrap_err();
    assert!(matches!(err, AuthError::MissingTokens));
}

#[tokio::test]
async fn refresh_rotates_the_pair() {
    let h = setup().await;
    let session = h
        .auth
        .login(login_input("alice", "correct-horse-battery"))
        .await
        .unwrap();
    let old_refresh = session.tokens.refresh_token.token;

    let rotated = h.auth.refresh(&old_refresh).await.unwrap();
    h.tokens
        .verify(&rotated.tokens.access_token.token, TokenKind::Access)
        .await
        .unwrap();

    // The old refresh token died with the rotation.
    let err = h
        .tokens
        .verify(&old_refresh, TokenKind::Refresh)
        .await
        .unwrap_err();
    assert!(matches!(err, TokenError::Revoked));
    let err = h.auth.refresh(&old_refresh).await.unwrap_err();
    assert!(matches!(err, AuthError::Token(TokenError::Revoked)));
}

#[tokio::test]
async fn refresh_rejects_access_tokens() {
    let h = setup().await;
    let session = h
        .auth
        .login(login_input("alice", "correct-horse-battery"))
        .await
        .unwrap();

    let err = h
        .auth
        .refresh(&session.tokens.access_token.token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Token(TokenError::Malformed)));
}

#[tokio::test]
async fn refresh_sees_directory_changes() {
    let h = setup().await;
    let session = h
        .auth
        .login(login_input("alice", "correct-horse-battery"))
        .await
        .unwrap();
    assert_eq!(session.user.role, UserRole::User);

    h.directory.set_role("alice", UserRole::Admin);
    let rotated = h
        .auth
        .refresh(&session.tokens.refresh_token.token)
        .await
        .unwrap();
    assert_eq!(rotated.user.role, UserRole::Admin);

    h.directory.set_status("alice", UserStatus::Inactive);
    let err = h
        .auth
        .refresh(&rotated.tokens.refresh_token.token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Token(TokenError::InactiveAccount)));
}

#[tokio::test]
async fn revocation_record_expires_with_the_token() {
    let h = setup_with_ttls(Duration::from_secs(2), Duration::from_secs(7200)).await;
    let session = h
        .auth
        .login(login_input("alice", "correct-horse-battery"))
        .await
        .unwrap();
    let access = session.tokens.access_token.token;

    h.tokens.invalidate(Some(access.as_str()), None).await;
    assert!(h
        .revocations
        .is_revoked(TokenKind::Access, &access)
        .await
        .unwrap());

    // Claim timestamps have second resolution; sleep well past the TTL.
    tokio::time::sleep(Duration::from_millis(3300)).await;

    // The record is gone no later than the token's own expiry, and the
    // token is still unusable because it has expired.
    assert!(!h
        .revocations
        .is_revoked(TokenKind::Access, &access)
        .await
        .unwrap());
    let err = h.tokens.verify(&access, TokenKind::Access).await.unwrap_err();
    assert!(matches!(err, TokenError::Expired));
}

#[tokio::test]
async fn otp_exchange_succeeds_exactly_once() {
    let h = setup().await;

    h.auth.send_otp("alice@example.com").await.unwrap();
    let code = h.mailer.last_code().unwrap();
    assert_eq!(code.len(), 6);

    let wrong = if code == "000000" { "111111" } else { "000000" };
    let err = h
        .auth
        .verify_otp("alice@example.com", wrong)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode));

    let reset_token = h.auth.verify_otp("alice@example.com", &code).await.unwrap();
    assert!(!reset_token.is_empty());

    // The code was consumed by the successful exchange.
    let err = h
        .auth
        .verify_otp("alice@example.com", &code)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode));
}

#[tokio::test]
async fn send_otp_rejects_unknown_and_inactive_recipients() {
    let h = setup().await;

    let err = h.auth.send_otp("nobody@example.com").await.unwrap_err();
    assert!(matches!(err, AuthError::UnknownEmail));

    let err = h.auth.send_otp("bob@example.com").await.unwrap_err();
    assert!(matches!(err, AuthError::InactiveAccount));
}

#[tokio::test]
async fn expired_code_reads_as_never_sent() {
    let store = Arc::new(MemoryOtpStore::new());
    let otp = RealOtpService::new(
        store,
        OtpConfig {
            code_length: 6,
            code_ttl: Duration::ZERO,
            reset_token_ttl: Duration::from_secs(1800),
        },
    );

    let code = otp.send_code("alice@example.com").await.unwrap();
    assert!(!otp.verify_code("alice@example.com", &code).await.unwrap());
}

#[tokio::test]
async fn reset_password_end_to_end() {
    let h = setup().await;

    h.auth.send_otp("alice@example.com").await.unwrap();
    let code = h.mailer.last_code().unwrap();
    let reset_token = h.auth.verify_otp("alice@example.com", &code).await.unwrap();

    // Confirmation mismatch leaves the token valid for a retry.
    let err = h
        .auth
        .reset_password(ResetPasswordInput {
            email: "alice@example.com".into(),
            reset_token: reset_token.clone(),
            new_password: "brand-new-password".into(),
            confirm_password: "something-else".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::PasswordMismatch));

    h.auth
        .reset_password(ResetPasswordInput {
            email: "alice@example.com".into(),
            reset_token: reset_token.clone(),
            new_password: "brand-new-password".into(),
            confirm_password: "brand-new-password".into(),
        })
        .await
        .unwrap();

    // The token was single-use.
    let err = h
        .auth
        .reset_password(ResetPasswordInput {
            email: "alice@example.com".into(),
            reset_token,
            new_password: "another-password".into(),
            confirm_password: "another-password".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResetToken));

    // The directory saw the change.
    h.auth
        .login(login_input("alice", "brand-new-password"))
        .await
        .unwrap();
    let err = h
        .auth
        .login(login_input("alice", "correct-horse-battery"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn reset_token_is_scoped_to_its_email() {
    let h = setup().await;

    h.auth.send_otp("alice@example.com").await.unwrap();
    let code = h.mailer.last_code().unwrap();
    let reset_token = h.auth.verify_otp("alice@example.com", &code).await.unwrap();

    let err = h
        .auth
        .reset_password(ResetPasswordInput {
            email: "bob@example.com".into(),
            reset_token,
            new_password: "brand-new-password".into(),
            confirm_password: "brand-new-password".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResetToken));
}
