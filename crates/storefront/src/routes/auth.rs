//! Authentication route handlers.
//!
//! Login is delegated to the commerce backend: it checks the password,
//! decides whether a one-time code is needed, and issues the bearer token
//! the rest of the session replays. The storefront only keeps that token
//! in the session cookie store.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::warn;

use pasal_core::Email;

use crate::commerce::CommerceError;
use crate::commerce::types::{AuthSession, LoginOutcome};
use crate::error::{self, AppError};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::session::{SessionAuth, SessionUser, keys};
use crate::services::auth::{
    BAD_CREDENTIALS_MESSAGE, INVALID_EMAIL_MESSAGE, INVALID_OTP_MESSAGE, is_valid_otp,
};
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
    pub logged_in: bool,
}

/// OTP verification page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_otp.html")]
pub struct VerifyOtpTemplate {
    pub email: String,
    pub error: Option<String>,
    pub info: Option<String>,
    pub logged_in: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpForm {
    pub otp: String,
}

/// Display the login page.
pub async fn login_page(OptionalAuth(auth): OptionalAuth) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        email: String::new(),
        error: None,
        logged_in: false,
    }
    .into_response()
}

/// Attempt a password login.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let Ok(email) = Email::parse(form.email.trim()) else {
        return Ok(login_error(&form.email, INVALID_EMAIL_MESSAGE));
    };

    match state.commerce().login(&email, &form.password).await {
        Ok(LoginOutcome::LoggedIn(outcome)) => {
            establish_session(&session, outcome).await?;
            Ok(Redirect::to("/").into_response())
        }
        Ok(LoginOutcome::OtpRequired) => {
            session
                .insert(keys::PENDING_OTP_EMAIL, email.as_str())
                .await
                .map_err(session_error)?;
            Ok(Redirect::to("/auth/verify-otp").into_response())
        }
        Err(CommerceError::Unauthorized) => Ok(login_error(&form.email, BAD_CREDENTIALS_MESSAGE)),
        Err(err) => {
            warn!(error = %err, "Login attempt failed");
            Ok(login_error(
                &form.email,
                "Something went wrong. Please try again.",
            ))
        }
    }
}

/// Display the OTP verification page.
pub async fn verify_otp_page(session: Session) -> Result<Response, AppError> {
    let Some(email) = pending_email(&session).await? else {
        return Ok(Redirect::to("/auth/login").into_response());
    };

    Ok(VerifyOtpTemplate {
        email,
        error: None,
        info: None,
        logged_in: false,
    }
    .into_response())
}

/// Verify the submitted one-time code.
///
/// Malformed codes are refused locally; the backend is only asked about
/// codes that could possibly be valid.
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpForm>,
) -> Result<Response, AppError> {
    let Some(email) = pending_email(&session).await? else {
        return Ok(Redirect::to("/auth/login").into_response());
    };

    let otp = form.otp.trim();
    if !is_valid_otp(otp) {
        return Ok(otp_error(&email, INVALID_OTP_MESSAGE));
    }

    let Ok(parsed_email) = Email::parse(&email) else {
        return Ok(Redirect::to("/auth/login").into_response());
    };

    match state.commerce().verify_login_otp(&parsed_email, otp).await {
        Ok(outcome) => {
            establish_session(&session, outcome).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(err) => {
            warn!(error = %err, "OTP verification failed");
            let message = err
                .backend_message()
                .unwrap_or("Invalid or expired code")
                .to_string();
            Ok(otp_error(&email, &message))
        }
    }
}

/// Send a fresh one-time code.
pub async fn resend_otp(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let Some(email) = pending_email(&session).await? else {
        return Ok(Redirect::to("/auth/login").into_response());
    };

    let Ok(parsed_email) = Email::parse(&email) else {
        return Ok(Redirect::to("/auth/login").into_response());
    };

    match state.commerce().resend_login_otp(&parsed_email).await {
        Ok(()) => Ok(VerifyOtpTemplate {
            email,
            error: None,
            info: Some("A new code has been sent to your email.".to_string()),
            logged_in: false,
        }
        .into_response()),
        Err(err) => {
            warn!(error = %err, "Failed to resend OTP");
            Ok(otp_error(&email, "Could not resend the code. Please try again."))
        }
    }
}

/// Log out: destroy the session and return home.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    session.flush().await.map_err(session_error)?;
    error::clear_sentry_user();
    Ok(Redirect::to("/"))
}

/// Store a fresh login in the session.
///
/// The session id is cycled on privilege change so a pre-login cookie
/// can never be replayed into a logged-in session.
async fn establish_session(session: &Session, outcome: AuthSession) -> Result<(), AppError> {
    session.cycle_id().await.map_err(session_error)?;
    error::set_sentry_user(outcome.user.id.as_str(), Some(&outcome.user.email));

    let auth = SessionAuth {
        token: outcome.token,
        user: SessionUser {
            id: outcome.user.id,
            email: outcome.user.email,
            name: outcome.user.name,
        },
    };
    session.insert(keys::AUTH, &auth).await.map_err(session_error)?;
    session
        .remove::<String>(keys::PENDING_OTP_EMAIL)
        .await
        .map_err(session_error)?;
    Ok(())
}

async fn pending_email(session: &Session) -> Result<Option<String>, AppError> {
    session
        .get::<String>(keys::PENDING_OTP_EMAIL)
        .await
        .map_err(session_error)
}

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session store failure: {err}"))
}

fn login_error(email: &str, message: &str) -> Response {
    LoginTemplate {
        email: email.to_string(),
        error: Some(message.to_string()),
        logged_in: false,
    }
    .into_response()
}

fn otp_error(email: &str, message: &str) -> Response {
    VerifyOtpTemplate {
        email: email.to_string(),
        error: Some(message.to_string()),
        info: None,
        logged_in: false,
    }
    .into_response()
}
