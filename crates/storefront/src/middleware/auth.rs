//! Authentication middleware and extractors.
//!
//! The storefront holds two things for a logged-in visitor: the
//! [`CurrentUser`] profile and the [`BackendSession`] cookie captured at
//! login, each under its own session key. Extractors pull them out together
//! and gate role-specific surfaces.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use tiffinbox_core::UserRole;

use crate::api::types::BackendSession;
use crate::models::{CurrentUser, session_keys};

/// A fully authenticated visitor: profile plus backend credentials.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: CurrentUser,
    pub api: BackendSession,
}

/// Error returned when authentication or a role requirement is not met.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (no session at all).
    Unauthorized,
    /// Logged in, but the role does not permit this surface.
    Forbidden(&'static str),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message).into_response(),
        }
    }
}

async fn authenticated_from_parts(parts: &mut Parts) -> Result<Authenticated, AuthRejection> {
    // Get the session from extensions (set by SessionManagerLayer)
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let user: Option<CurrentUser> = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten();
    let api: Option<BackendSession> = session
        .get(session_keys::BACKEND_SESSION)
        .await
        .ok()
        .flatten();

    match (user, api) {
        (Some(user), Some(api)) => Ok(Authenticated { user, api }),
        _ => Err(AuthRejection::RedirectToLogin),
    }
}

/// Extractor that requires a logged-in visitor of any role.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(auth): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user.name)
/// }
/// ```
pub struct RequireAuth(pub Authenticated);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticated_from_parts(parts).await?))
    }
}

/// Extractor that requires the customer role (checkout, cancel, reviews).
pub struct RequireCustomer(pub Authenticated);

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = authenticated_from_parts(parts).await?;
        if auth.user.role != UserRole::Customer {
            return Err(AuthRejection::Forbidden("Only customers can do this"));
        }
        Ok(Self(auth))
    }
}

/// Extractor that requires the provider role (order dashboard, advancing).
pub struct RequireProvider(pub Authenticated);

impl<S> FromRequestParts<S> for RequireProvider
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = authenticated_from_parts(parts).await?;
        if auth.user.role != UserRole::Provider {
            return Err(AuthRejection::Forbidden("Only providers can do this"));
        }
        Ok(Self(auth))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the visitor is
/// not logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to set the backend session cookie in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_backend_session(
    session: &Session,
    backend: &BackendSession,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::BACKEND_SESSION, backend).await
}

/// Helper to clear authentication state (logout).
///
/// Removes the user and backend credentials. The cart record deliberately
/// stays: it is scoped to the browser profile, not the account.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session
        .remove::<BackendSession>(session_keys::BACKEND_SESSION)
        .await?;
    Ok(())
}
