use askama::Template;
use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::fmt;

use super::templates::ErrorTemplate;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    /// The principal is anonymous. Carries the login location and the
    /// path (with query) to come back to.
    LoginRequired { login_url: String, next: String },

    Forbidden(String),

    BadRequest(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::LoginRequired { next, .. } => write!(f, "Login required for {next}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            Self::LoginRequired { login_url, next } => {
                return Redirect::to(&login_redirect_location(login_url, next)).into_response();
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "Access Denied", msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server Error",
                    "A database error occurred".to_string(),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server Error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let page = ErrorTemplate {
            status: status.as_u16(),
            title: title.to_string(),
            message,
        };

        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (
                    status,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    title,
                )
                    .into_response()
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        Self::InternalError(format!("Template error: {err}"))
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::InternalError(format!("Session error: {err}"))
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn login_required(login_url: &str, next: impl Into<String>) -> Self {
        Self::LoginRequired {
            login_url: login_url.to_string(),
            next: next.into(),
        }
    }

    pub fn forbidden() -> Self {
        Self::Forbidden("You do not have permission to perform this action.".to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

/// `<login_url>?next=<encoded next>`, appending with `&` when the login URL
/// already carries a query.
#[must_use]
pub fn login_redirect_location(login_url: &str, next: &str) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{login_url}{separator}next={}", urlencoding::encode(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_location_encodes_next() {
        assert_eq!(
            login_redirect_location("/accounts/login/", "/list/?q=a b&page=2"),
            "/accounts/login/?next=%2Flist%2F%3Fq%3Da%20b%26page%3D2"
        );
        assert_eq!(
            login_redirect_location("/login?x=1", "/"),
            "/login?x=1&next=%2F"
        );
    }

    #[test]
    fn test_login_required_redirects_with_see_other() {
        let response = ApiError::login_required("/accounts/login/", "/list/").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/accounts/login/?next=%2Flist%2F"
        );
    }

    #[test]
    fn test_forbidden_renders_html_page() {
        let response = ApiError::forbidden().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
    }
}
