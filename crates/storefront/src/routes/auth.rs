//! Authentication route handlers.
//!
//! Login and registration proxy the backend's session auth: the backend
//! issues a session cookie, which the storefront stores alongside the
//! user's profile. Logout clears both but deliberately keeps the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tiffinbox_core::{Email, UserRole};

use crate::filters;
use crate::middleware::{clear_auth, set_backend_session, set_current_user};
use crate::models::{CurrentUser, PendingCartAdd, session_keys};
use crate::state::AppState;

// =============================================================================
// Form & Query Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    /// CUSTOMER (default) or PROVIDER.
    pub role: Option<String>,
}

/// Query parameters for error/success display and post-login destination.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Only same-site paths are allowed as post-login destinations.
fn sanitize_next(next: Option<&str>) -> Option<&str> {
    next.filter(|next| next.starts_with('/') && !next.starts_with("//"))
}

/// Where a freshly logged-in user lands when no destination was requested.
const fn default_destination(role: UserRole) -> &'static str {
    match role {
        UserRole::Provider => "/provider/orders",
        UserRole::Customer | UserRole::Admin => "/",
    }
}

fn login_redirect(error: &str, next: Option<&str>) -> Redirect {
    let mut target = format!("/auth/login?error={}", urlencoding::encode(error));
    if let Some(next) = sanitize_next(next) {
        target.push_str(&format!("&next={}", urlencoding::encode(next)));
    }
    Redirect::to(&target)
}

/// Replay an add-to-cart action stashed before the login redirect.
///
/// Consumed exactly once; a failed removal leaves it for the next login
/// rather than replaying it twice in one session.
async fn replay_pending_add(state: &AppState, session: &Session) {
    let pending = session
        .remove::<PendingCartAdd>(session_keys::PENDING_CART_ADD)
        .await
        .ok()
        .flatten();

    if let Some(pending) = pending {
        state.cart_store(session.clone()).add(pending.into()).await;
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
        next: query.next.unwrap_or_default(),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if Email::parse(&form.email).is_err() {
        return login_redirect("Please enter a valid email address", form.next.as_deref())
            .into_response();
    }

    match state.backend().login(&form.email, &form.password).await {
        Ok((profile, backend_session)) => {
            let user = CurrentUser::from(profile);

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to store user in session: {e}");
            }
            if let Err(e) = set_backend_session(&session, &backend_session).await {
                tracing::error!("Failed to store backend session: {e}");
            }

            replay_pending_add(&state, &session).await;

            let destination = sanitize_next(form.next.as_deref())
                .unwrap_or_else(|| default_destination(user.role));
            Redirect::to(destination).into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            login_redirect(&e.user_message(), form.next.as_deref()).into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate { error: query.error }
}

/// Handle registration form submission.
///
/// Registers against the backend, then logs straight in with the same
/// credentials.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let error_redirect = |error: &str| {
        Redirect::to(&format!(
            "/auth/register?error={}",
            urlencoding::encode(error)
        ))
        .into_response()
    };

    if form.name.trim().is_empty() {
        return error_redirect("Please enter your name");
    }
    if Email::parse(&form.email).is_err() {
        return error_redirect("Please enter a valid email address");
    }
    if form.password != form.password_confirm {
        return error_redirect("Passwords do not match");
    }

    let role = match form.role.as_deref() {
        None | Some("CUSTOMER") => "CUSTOMER",
        Some("PROVIDER") => "PROVIDER",
        Some(_) => return error_redirect("Unknown role"),
    };

    if let Err(e) = state
        .backend()
        .register(form.name.trim(), &form.email, &form.password, role)
        .await
    {
        tracing::warn!("Registration failed: {e}");
        return error_redirect(&e.user_message());
    }

    match state.backend().login(&form.email, &form.password).await {
        Ok((profile, backend_session)) => {
            let user = CurrentUser::from(profile);
            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to store user in session: {e}");
            }
            if let Err(e) = set_backend_session(&session, &backend_session).await {
                tracing::error!("Failed to store backend session: {e}");
            }

            replay_pending_add(&state, &session).await;
            Redirect::to(default_destination(user.role)).into_response()
        }
        Err(e) => {
            tracing::warn!("Post-registration login failed: {e}");
            Redirect::to(&format!(
                "/auth/login?success={}",
                urlencoding::encode("Account created, please log in")
            ))
            .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Invalidates the backend session best-effort and clears auth state. The
/// cart record stays: it belongs to the browser profile, not the account.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    let backend_session = session
        .get::<crate::api::types::BackendSession>(session_keys::BACKEND_SESSION)
        .await
        .ok()
        .flatten();

    if let Some(backend_session) = backend_session
        && let Err(e) = state.backend().logout(&backend_session).await
    {
        tracing::warn!("Backend logout failed: {e}");
    }

    if let Err(e) = clear_auth(&session).await {
        tracing::error!("Failed to clear session auth state: {e}");
    }

    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_next_rejects_offsite() {
        assert_eq!(sanitize_next(Some("/cart")), Some("/cart"));
        assert_eq!(sanitize_next(Some("//evil.example")), None);
        assert_eq!(sanitize_next(Some("https://evil.example")), None);
        assert_eq!(sanitize_next(None), None);
    }

    #[test]
    fn test_default_destination_by_role() {
        assert_eq!(default_destination(UserRole::Customer), "/");
        assert_eq!(default_destination(UserRole::Provider), "/provider/orders");
    }
}
