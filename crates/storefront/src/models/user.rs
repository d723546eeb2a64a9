//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use jewelbox_core::{Email, UserId, UserRole};

/// A shop account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Public view of an account, as returned by the users API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    pub is_admin: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            is_admin: user.role.is_admin(),
        }
    }
}

impl From<&super::CurrentUser> for UserProfile {
    fn from(user: &super::CurrentUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            is_admin: user.role.is_admin(),
        }
    }
}
