//! End-to-end account flows through the browser-facing routes.

mod common;

use axum::http::StatusCode;
use common::{
    PASSWORD, body_string, create_account, get, location, post_form, session_cookie, spawn_app,
    spawn_app_with, test_config,
};

#[tokio::test]
async fn test_register_logs_in_and_first_user_can_use_the_list() {
    let (state, app) = spawn_app().await;

    let response = get(&app, "/accounts/register/", None, false).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_form(
        &app,
        "/accounts/register/",
        &[
            ("username", "founder"),
            ("password1", PASSWORD),
            ("password2", PASSWORD),
        ],
        None,
        false,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookie = session_cookie(&response).expect("registration logs in");

    let response = get(&app, "/", Some(&cookie), false).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Welcome, founder"));
    assert!(body.contains("Browse PCB types"));

    let response = get(&app, "/list/", Some(&cookie), false).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Add PCB Type"));
    assert!(body.contains("No PCB types yet."));

    let founder = state
        .store()
        .get_user_by_username("founder")
        .await
        .unwrap()
        .unwrap();
    assert!(founder.is_superuser);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let (state, app) = spawn_app().await;
    create_account(&state, "taken", &[]).await;

    let response = post_form(
        &app,
        "/accounts/register/",
        &[
            ("username", "taken"),
            ("password1", PASSWORD),
            ("password2", "something-else"),
        ],
        None,
        false,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("A user with that username already exists."));
    assert!(body.contains("The two password fields didn’t match."));
    assert_eq!(state.accounts().list_accounts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_registration_can_be_closed() {
    let mut config = test_config();
    config.server.allow_registration = false;
    let (_state, app) = spawn_app_with(config).await;

    let response = get(&app, "/accounts/register/", None, false).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_follows_next_and_logout_ends_the_session() {
    let (state, app) = spawn_app().await;
    create_account(&state, "admin", &[]).await;

    let response = get(&app, "/list/?page=2", None, false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let login_location = location(&response);
    assert_eq!(login_location, "/accounts/login/?next=%2Flist%2F%3Fpage%3D2");

    let response = get(&app, &login_location, None, false).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("page=2"));

    let response = post_form(
        &app,
        "/accounts/login/",
        &[
            ("username", "admin"),
            ("password", "wrong-password"),
            ("next", "/list/?page=2"),
        ],
        None,
        false,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());

    let response = post_form(
        &app,
        "/accounts/login/",
        &[
            ("username", "admin"),
            ("password", PASSWORD),
            ("next", "/list/?page=2"),
        ],
        None,
        false,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/list/?page=2");
    let cookie = session_cookie(&response).unwrap();

    let response = get(&app, "/list/", Some(&cookie), false).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_form(&app, "/accounts/logout/", &[], Some(&cookie), false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login/");

    let response = get(&app, "/list/", Some(&cookie), false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let (state, app) = spawn_app().await;
    create_account(&state, "admin", &[]).await;

    let response = post_form(
        &app,
        "/accounts/login/",
        &[
            ("username", "admin"),
            ("password", PASSWORD),
            ("next", "https://evil.example/"),
        ],
        None,
        false,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_inactive_account_is_treated_as_anonymous() {
    let (state, app) = spawn_app().await;
    create_account(&state, "admin", &[]).await;
    let cookie = common::login(&app, "admin").await;

    let user = state
        .store()
        .get_user_by_username("admin")
        .await
        .unwrap()
        .unwrap();
    state.store().set_user_active(user.id, false).await.unwrap();

    let response = get(&app, "/list/", Some(&cookie), false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
