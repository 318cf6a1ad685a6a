//! Authentication extractors.
//!
//! The session carries the commerce API bearer token and the user it was
//! issued to ([`SessionAuth`]); these extractors pull it out for route
//! handlers. There is no local credential checking - the backend decides
//! who is logged in, the storefront only replays the token.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::models::session::{SessionAuth, keys};

/// Where to send a browser that needs to log in.
const LOGIN_PATH: &str = "/auth/login";

/// Extractor for routes that require a logged-in customer.
///
/// Browser navigations get a redirect to the login page; HTMX fragment
/// requests get a 401 with an `HX-Redirect` header so the whole page
/// navigates instead of swapping a login page into a fragment slot.
pub struct RequireAuth(pub SessionAuth);

/// Extractor for routes that adapt to login state but work without it.
pub struct OptionalAuth(pub Option<SessionAuth>);

/// Rejection for [`RequireAuth`].
#[derive(Debug)]
pub enum AuthRejection {
    RedirectToLogin,
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(
                    header::HeaderName::from_static("hx-redirect"),
                    HeaderValue::from_static(LOGIN_PATH),
                )],
                "Session expired",
            )
                .into_response(),
        }
    }
}

async fn session_auth(parts: &mut Parts) -> Option<SessionAuth> {
    let session = parts.extensions.get::<Session>()?;
    session.get::<SessionAuth>(keys::AUTH).await.ok().flatten()
}

fn is_htmx(parts: &Parts) -> bool {
    parts.headers.contains_key("hx-request")
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_auth(parts).await {
            Some(auth) => Ok(Self(auth)),
            None if is_htmx(parts) => Err(AuthRejection::Unauthorized),
            None => Err(AuthRejection::RedirectToLogin),
        }
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_auth(parts).await))
    }
}
