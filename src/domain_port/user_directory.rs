use crate::domain_model::*;

#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
}

impl UserAccount {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Password hashing capability used by directory adapters. The services
/// above the ports never see a hash.
#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, DirectoryError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, DirectoryError>;
}

/// Read-mostly view of the user store. The one write, `update_password`,
/// is the password-recovery side effect delegated back to user management.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, DirectoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DirectoryError>;

    /// Resolve the account and check the password against its stored hash.
    async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserAccount, DirectoryError>;

    async fn update_password(
        &self,
        user_id: UserId,
        new_password: &str,
    ) -> Result<(), DirectoryError>;
}
