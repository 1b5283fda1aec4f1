use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::sync::Arc;

struct StoredUser {
    account: UserAccount,
    password_hash: String,
}

/// Directory stand-in for the memory backend and for tests. Hashing goes
/// through the same `CredentialHasher` as the real adapter.
pub struct MemoryUserDirectory {
    users: DashMap<String, StoredUser>,
    hasher: Arc<dyn CredentialHasher>,
}

impl MemoryUserDirectory {
    pub fn new(hasher: Arc<dyn CredentialHasher>) -> Self {
        MemoryUserDirectory {
            users: DashMap::new(),
            hasher,
        }
    }

    pub async fn insert(
        &self,
        account: UserAccount,
        password: &str,
    ) -> Result<(), DirectoryError> {
        let password_hash = self.hasher.hash_password(password).await?;
        self.users.insert(
            account.username.clone(),
            StoredUser {
                account,
                password_hash,
            },
        );
        Ok(())
    }

    pub fn set_status(&self, username: &str, status: UserStatus) {
        if let Some(mut user) = self.users.get_mut(username) {
            user.account.status = status;
        }
    }

    pub fn set_role(&self, username: &str, role: UserRole) {
        if let Some(mut user) = self.users.get_mut(username) {
            user.account.role = role;
        }
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, DirectoryError> {
        Ok(self.users.get(username).map(|u| u.account.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DirectoryError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.account.email == email)
            .map(|u| u.account.clone()))
    }

    async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserAccount, DirectoryError> {
        let (account, password_hash) = match self.users.get(username) {
            Some(user) => (user.account.clone(), user.password_hash.clone()),
            None => return Err(DirectoryError::NotFound),
        };

        if !self.hasher.verify_password(password, &password_hash).await? {
            return Err(DirectoryError::InvalidCredentials);
        }
        Ok(account)
    }

    async fn update_password(
        &self,
        user_id: UserId,
        new_password: &str,
    ) -> Result<(), DirectoryError> {
        let username = self
            .users
            .iter()
            .find(|u| u.account.user_id == user_id)
            .map(|u| u.account.username.clone())
            .ok_or(DirectoryError::NotFound)?;

        let password_hash = self.hasher.hash_password(new_password).await?;

        match self.users.get_mut(&username) {
            Some(mut user) => {
                user.password_hash = password_hash;
                Ok(())
            }
            None => Err(DirectoryError::NotFound),
        }
    }
}
