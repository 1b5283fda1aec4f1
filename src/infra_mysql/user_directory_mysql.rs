use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

pub struct MySqlUserDirectory {
    pool: MySqlPool,
    hasher: Arc<dyn CredentialHasher>,
}

impl MySqlUserDirectory {
    pub fn new(pool: MySqlPool, hasher: Arc<dyn CredentialHasher>) -> Self {
        MySqlUserDirectory { pool, hasher }
    }

    #[inline]
    fn uid_as_bytes(id: &UserId) -> &[u8] {
        id.0.as_bytes()
    }

    #[inline]
    fn uid_from_bytes(bytes: &[u8]) -> Result<UserId, DirectoryError> {
        Ok(UserId(
            Uuid::from_slice(bytes).map_err(|e| DirectoryError::Store(e.to_string()))?,
        ))
    }

    fn row_to_account(row: &MySqlRow) -> Result<UserAccount, DirectoryError> {
        let user_id_bytes: Vec<u8> = row
            .try_get("user_id")
            .map_err(|e| DirectoryError::Store(e.to_string()))?;
        let user_id = Self::uid_from_bytes(&user_id_bytes)?;

        let username: String = row
            .try_get("username")
            .map_err(|e| DirectoryError::Store(e.to_string()))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| DirectoryError::Store(e.to_string()))?;

        let role_raw: String = row
            .try_get("role")
            .map_err(|e| DirectoryError::Store(e.to_string()))?;
        let role = UserRole::from_str(&role_raw).map_err(DirectoryError::Store)?;

        let status_raw: String = row
            .try_get("status")
            .map_err(|e| DirectoryError::Store(e.to_string()))?;
        let status = UserStatus::from_str(&status_raw).map_err(DirectoryError::Store)?;

        Ok(UserAccount {
            user_id,
            username,
            email,
            role,
            status,
        })
    }

    async fn fetch_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(UserAccount, String)>, DirectoryError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, username, email, role, status, password_hash
FROM user
WHERE username = ?
"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::Store(e.to_string()))?;

        row_opt
            .map(|row| {
                let account = Self::row_to_account(&row)?;
                let password_hash: String = row
                    .try_get("password_hash")
                    .map_err(|e| DirectoryError::Store(e.to_string()))?;
                Ok((account, password_hash))
            })
            .transpose()
    }
}

#[async_trait::async_trait]
impl UserDirectory for MySqlUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, DirectoryError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, username, email, role, status
FROM user
WHERE username = ?
"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::Store(e.to_string()))?;

        row_opt.as_ref().map(Self::row_to_account).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DirectoryError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, username, email, role, status
FROM user
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::Store(e.to_string()))?;

        row_opt.as_ref().map(Self::row_to_account).transpose()
    }

    async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserAccount, DirectoryError> {
        let (account, password_hash) = self
            .fetch_with_hash(username)
            .await?
            .ok_or(DirectoryError::NotFound)?;

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
        let password_hash = self.hasher.hash_password(new_password).await?;

        let result = sqlx::query(
            r#"
UPDATE user
SET password_hash = ?
WHERE user_id = ?
"#,
        )
        .bind(&password_hash)
        .bind(Self::uid_as_bytes(&user_id))
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::Store(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }
}
