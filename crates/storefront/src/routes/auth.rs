//! Authentication route handlers.
//!
//! Handles login, registration and logout for the server-rendered pages.
//! The JSON equivalents live in `api::users`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};

use jewelbox_core::UserRole;

use super::layout::Layout;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
}

fn login_error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password",
        _ => "Something went wrong, please try again",
    }
}

async fn sign_in(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Where to land after signing in.
fn home_for(user: &User) -> &'static str {
    if user.role.is_admin() { "/admin" } else { "/" }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> LoginTemplate {
    LoginTemplate {
        layout: Layout::load(&state, &session, user).await,
        error: query.error.as_deref().map(|c| login_error_message(c).to_string()),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            sign_in(&session, &user).await?;
            info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to(home_for(&user)).into_response())
        }
        Err(AuthError::InvalidCredentials | AuthError::UserNotFound) => {
            warn!("Login failed: invalid credentials");
            Ok(Redirect::to("/login?error=credentials").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> RegisterTemplate {
    RegisterTemplate {
        layout: Layout::load(&state, &session, user).await,
        error: None,
        name: String::new(),
        email: String::new(),
    }
}

/// Handle registration form submission. New accounts are customers.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let result = if form.password == form.password_confirm {
        AuthService::new(state.pool())
            .register(&form.name, &form.email, &form.password, UserRole::Customer)
            .await
    } else {
        Err(AuthError::WeakPassword("Passwords do not match".to_string()))
    };

    match result {
        Ok(user) => {
            sign_in(&session, &user).await?;
            info!(user_id = %user.id, "User registered");
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::Repository(e)) => Err(AppError::Auth(AuthError::Repository(e))),
        Err(AuthError::PasswordHash) => Err(AppError::Auth(AuthError::PasswordHash)),
        Err(e) => {
            let page = RegisterTemplate {
                layout: Layout::load(&state, &session, None).await,
                error: Some(AppError::Auth(e).public_message()),
                name: form.name,
                email: form.email,
            };
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}

/// Handle logout. The cart stays in the session.
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
