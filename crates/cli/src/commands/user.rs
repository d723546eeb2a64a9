//! User management.

use jewelbox_core::UserRole;
use jewelbox_storefront::services::{AuthError, AuthService};

use super::{ConnectError, connect};

/// Environment variable read when `--password` is omitted.
pub const PASSWORD_ENV: &str = "JB_USER_PASSWORD";

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid role: {0} (expected customer or admin)")]
    InvalidRole(String),

    #[error("No password given: pass --password or set {PASSWORD_ENV}")]
    MissingPassword,

    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error(transparent)]
    Auth(AuthError),
}

/// Pick the password from the flag or the environment.
fn resolve_password(flag: Option<String>) -> Result<String, UserError> {
    flag.or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
        .ok_or(UserError::MissingPassword)
}

/// Create a user with an argon2-hashed password.
///
/// Returns the new user's ID.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: Option<String>,
) -> Result<i32, UserError> {
    let role: UserRole = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;

    // Load .env before reading the password fallback.
    let pool = connect().await?;
    let password = resolve_password(password)?;

    tracing::info!("Creating user: {} ({})", email, role);

    let user = AuthService::new(&pool)
        .register(name, email, &password, role)
        .await
        .map_err(|e| match e {
            AuthError::UserAlreadyExists => UserError::UserExists(email.to_owned()),
            other => UserError::Auth(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id.as_i32())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_password_wins() {
        assert_eq!(
            resolve_password(Some("hunter22!".to_string())).unwrap(),
            "hunter22!"
        );
    }

    #[test]
    fn test_empty_flag_is_rejected() {
        assert!(matches!(
            resolve_password(Some(String::new())),
            Err(UserError::MissingPassword)
        ));
    }
}
