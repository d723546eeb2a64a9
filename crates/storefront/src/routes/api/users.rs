//! User API handlers: registration, login, logout and profile.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::{info, instrument};

use jewelbox_core::UserRole;

use super::ApiJson;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User, UserProfile};
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn sign_in(session: &Session, user: &User) -> Result<UserProfile> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(UserProfile::from(user))
}

/// `POST /api/users`
///
/// Self-registration always creates a customer; admins come from the CLI.
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let user = AuthService::new(state.pool())
        .register(
            &request.name,
            &request.email,
            &request.password,
            UserRole::Customer,
        )
        .await?;

    info!(user_id = %user.id, "User registered");
    let profile = sign_in(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `POST /api/users/auth`
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<UserProfile>> {
    let user = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(sign_in(&session, &user).await?))
}

/// `POST /api/users/logout`
#[instrument(skip(session, user), fields(user_id = %user.id))]
pub async fn logout(RequireAuth(user): RequireAuth, session: Session) -> Result<Json<Value>> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// `GET /api/users/profile`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<UserProfile>> {
    let user = AuthService::new(state.pool()).get_user(user.id).await?;
    Ok(Json(UserProfile::from(&user)))
}
