//! Helpers shared by the integration tests. Each test gets its own
//! in-memory database and session store.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use moduletrack::api::{self, AppState};
use moduletrack::config::Config;
use moduletrack::domain::{Account, Permission};
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-1";

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub async fn spawn_app() -> (Arc<AppState>, Router) {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> (Arc<AppState>, Router) {
    let state = api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    let router = api::router(state.clone());
    (state, router)
}

/// Creates an account holding exactly `permissions`. The first account of a
/// fresh database is promoted by the bootstrap rule, so tests that need a
/// plain account create an `admin` first.
pub async fn create_account(
    state: &AppState,
    username: &str,
    permissions: &[Permission],
) -> Account {
    let account = state
        .accounts()
        .create_account(username, PASSWORD)
        .await
        .expect("failed to create account");
    if !permissions.is_empty() {
        state
            .accounts()
            .grant(username, permissions)
            .await
            .expect("failed to grant permissions");
    }
    account
}

pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.split(';').next().map(str::to_string))
}

/// Logs in through the login form and returns the session cookie.
pub async fn login(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/accounts/login/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form_body(&[
                    ("username", username),
                    ("password", PASSWORD),
                ])))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 303, "login failed for {username}");
    session_cookie(&response).expect("login did not set a session cookie")
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>, htmx: bool) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    if htmx {
        request = request.header("HX-Request", "true");
    }

    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(
    app: &Router,
    uri: &str,
    pairs: &[(&str, &str)],
    cookie: Option<&str>,
    htmx: bool,
) -> Response<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    if htmx {
        request = request.header("HX-Request", "true");
    }

    app.clone()
        .oneshot(request.body(Body::from(form_body(pairs))).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location<B>(response: &Response<B>) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}
