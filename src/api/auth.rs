//! Session login state, the principal extractor, and the account pages.

use axum::{
    Form,
    extract::{FromRequestParts, Query, State},
    http::{Uri, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{info, warn};

use super::htmx::render;
use super::permissions::require_login;
use super::templates::{HomeTemplate, Layout, LoginTemplate, RegisterTemplate};
use super::{ApiError, AppState, flash};
use crate::constants::routes::HOME;
use crate::constants::session::USER_ID_KEY;
use crate::domain::Principal;
use crate::forms::{FieldErrors, LoginForm, NON_FIELD, RegistrationForm};
use crate::services::AccountError;

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidCredentials => Self::Forbidden(INVALID_LOGIN.to_string()),
            AccountError::UserNotFound(name) => Self::not_found("User", name),
            AccountError::Validation(errors) => Self::BadRequest(errors.to_string()),
            AccountError::Database(msg) => Self::DatabaseError(msg),
            AccountError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// Resolves the principal from the session. Missing sessions, unknown ids
/// and inactive accounts are all anonymous.
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| ApiError::internal(msg))?;

        let Some(user_id) = session.get::<i32>(USER_ID_KEY).await? else {
            return Ok(Self::Anonymous);
        };

        match state.accounts().load_account(user_id).await? {
            Some(account) if account.is_active => {
                tracing::Span::current().record("user_id", account.id);
                Ok(Self::Account(account))
            }
            _ => {
                session.remove::<i32>(USER_ID_KEY).await?;
                Ok(Self::Anonymous)
            }
        }
    }
}

/// Only same-site absolute paths are followed after login.
#[must_use]
pub fn safe_next(next: &str) -> &str {
    let next = next.trim();
    let is_local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control);

    if is_local { next } else { HOME }
}

async fn log_in(session: &Session, user_id: i32) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    Ok(())
}

/// GET /
pub async fn home(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    session: Session,
    uri: Uri,
) -> Result<Response, ApiError> {
    require_login(&principal, &uri, state.login_url())?;

    let messages = flash::take(&session).await?;
    render(&HomeTemplate {
        layout: Layout::new(&principal, state.config()).with_messages(messages),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextQuery {
    pub next: String,
}

/// GET /accounts/login/
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<NextQuery>,
) -> Result<Response, ApiError> {
    render(&LoginTemplate {
        layout: Layout::new(&principal, state.config()),
        username: String::new(),
        next: query.next,
        non_field_errors: Vec::new(),
        username_errors: Vec::new(),
        password_errors: Vec::new(),
    })
}

/// POST /accounts/login/
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let errors = match form.validate() {
        Ok(()) => match state.accounts().authenticate(&form.username, &form.password).await {
            Ok(account) => {
                log_in(&session, account.id).await?;
                info!(user_id = account.id, username = %account.username, "User logged in");
                return Ok(Redirect::to(safe_next(&form.next)).into_response());
            }
            Err(AccountError::InvalidCredentials) => {
                warn!(username = %form.username, "Failed login attempt");
                FieldErrors::single(NON_FIELD, INVALID_LOGIN)
            }
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    render(&LoginTemplate {
        layout: Layout::new(&Principal::Anonymous, state.config()),
        username: form.username,
        next: form.next,
        non_field_errors: errors.get(NON_FIELD).to_vec(),
        username_errors: errors.get("username").to_vec(),
        password_errors: errors.get("password").to_vec(),
    })
}

/// POST /accounts/logout/
pub async fn logout(State(state): State<Arc<AppState>>, session: Session) -> Result<Response, ApiError> {
    session.flush().await?;
    Ok(Redirect::to(state.login_url()).into_response())
}

fn registration_closed() -> ApiError {
    ApiError::Forbidden("Registration is closed.".to_string())
}

/// GET /accounts/register/
pub async fn register_form(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Response, ApiError> {
    if !state.config().server.allow_registration {
        return Err(registration_closed());
    }

    render(&RegisterTemplate {
        layout: Layout::new(&principal, state.config()),
        username: String::new(),
        username_errors: Vec::new(),
        password1_errors: Vec::new(),
        password2_errors: Vec::new(),
    })
}

/// POST /accounts/register/
///
/// Creates the account (the first one becomes superuser), logs it in and
/// goes home.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, ApiError> {
    if !state.config().server.allow_registration {
        return Err(registration_closed());
    }

    match state.accounts().register(&form).await {
        Ok(account) => {
            log_in(&session, account.id).await?;
            Ok(Redirect::to(HOME).into_response())
        }
        Err(AccountError::Validation(errors)) => render(&RegisterTemplate {
            layout: Layout::new(&Principal::Anonymous, state.config()),
            username: form.username,
            username_errors: errors.get("username").to_vec(),
            password1_errors: errors.get("password1").to_vec(),
            password2_errors: errors.get("password2").to_vec(),
        }),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next("/list/?page=2"), "/list/?page=2");
        assert_eq!(safe_next(""), "/");
        assert_eq!(safe_next("https://evil.example/"), "/");
        assert_eq!(safe_next("//evil.example/"), "/");
        assert_eq!(safe_next("/\\evil.example"), "/");
        assert_eq!(safe_next("list/"), "/");
    }
}
