use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::info;

pub struct RealAuthService {
    directory: Arc<dyn UserDirectory>,
    token_service: Arc<dyn TokenService>,
    otp_service: Arc<dyn OtpService>,
    mailer: Arc<dyn OtpMailer>,
}

impl RealAuthService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        token_service: Arc<dyn TokenService>,
        otp_service: Arc<dyn OtpService>,
        mailer: Arc<dyn OtpMailer>,
    ) -> Self {
        Self {
            directory,
            token_service,
            otp_service,
            mailer,
        }
    }

    async fn issue_session(&self, identity: Identity) -> Result<SessionOutput, AuthError> {
        let access_token = self.token_service.issue_access_token(&identity).await?;
        let refresh_token = self.token_service.issue_refresh_token(&identity).await?;
        Ok(SessionOutput {
            user: identity,
            tokens: TokenPair {
                access_token,
                refresh_token,
            },
        })
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, input: LoginInput) -> Result<SessionOutput, AuthError> {
        let LoginInput { username, password } = input;

        let account = self
            .directory
            .find_by_username(&username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        // Status gates the attempt before the password is even checked.
        if account.status != UserStatus::Active {
            return Err(AuthError::InactiveAccount);
        }

        let account = match self.directory.verify_password(&username, &password).await {
            Ok(account) => account,
            Err(DirectoryError::NotFound | DirectoryError::InvalidCredentials) => {
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Internal(e.to_string())),
        };

        info!(username = %account.username, "login");
        self.issue_session(account.identity()).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionOutput, AuthError> {
        let (tokens, user) = self.token_service.refresh(refresh_token).await?;
        Ok(SessionOutput { user, tokens })
    }

    async fn logout(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        if access_token.is_none() && refresh_token.is_none() {
            return Err(AuthError::MissingTokens);
        }

        // Every supplied token must still be live; logging out twice with
        // the same tokens is reported, not silently absorbed.
        if let Some(token) = access_token {
            self.token_service
                .verify(token, TokenKind::Access)
                .await
                .map_err(|_| AuthError::AlreadyInvalidated)?;
        }
        if let Some(token) = refresh_token {
            self.token_service
                .verify(token, TokenKind::Refresh)
                .await
                .map_err(|_| AuthError::AlreadyInvalidated)?;
        }

        self.token_service.invalidate(access_token, refresh_token).await;
        Ok(())
    }

    async fn send_otp(&self, email: &str) -> Result<(), AuthError> {
        let account = self
            .directory
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UnknownEmail)?;
        if account.status != UserStatus::Active {
            return Err(AuthError::InactiveAccount);
        }

        let code = self.otp_service.send_code(email).await?;
        self.mailer
            .send_otp_email(email, &code)
            .await
            .map_err(|e| AuthError::Delivery(e.to_string()))?;

        info!(%email, "one-time code issued");
        Ok(())
    }

    async fn verify_otp(&self, email: &str, code: &str) -> Result<String, AuthError> {
        // Whether the email is unknown, the code is wrong or the code has
        // expired is invisible to the caller.
        let account = self
            .directory
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if account.is_none() {
            return Err(AuthError::InvalidCode);
        }

        if !self.otp_service.verify_code(email, code).await? {
            return Err(AuthError::InvalidCode);
        }

        let reset_token = self.otp_service.issue_reset_token(email).await?;
        // Consume only after the reset token exists; a failure above
        // leaves the flow exactly where it was.
        self.otp_service.delete_code(email).await?;

        info!(%email, "one-time code exchanged for reset token");
        Ok(reset_token)
    }

    async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthError> {
        let ResetPasswordInput {
            email,
            reset_token,
            new_password,
            confirm_password,
        } = input;

        if !self
            .otp_service
            .validate_reset_token(&email, &reset_token)
            .await?
        {
            return Err(AuthError::InvalidResetToken);
        }

        if new_password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let account = self
            .directory
            .find_by_email(&email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidResetToken)?;

        self.directory
            .update_password(account.user_id, &new_password)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        // The token is spent only once the password change has landed; if
        // the change fails the token stays valid for a retry.
        self.otp_service.consume_reset_token(&email).await?;

        info!(%email, "password reset");
        Ok(())
    }
}
