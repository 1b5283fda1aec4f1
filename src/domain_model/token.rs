use crate::domain_model::{UserId, UserRole};
use serde::{Deserialize, Serialize};

/// Which validation path a session token belongs to. A refresh token is
/// never accepted where an access token is required, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// The identity a verified session token vouches for. Immutable once a
/// token is issued; refresh re-reads it from the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}
