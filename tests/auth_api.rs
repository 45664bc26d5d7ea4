mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{ADMIN_USERNAME, TestApp};
use snippets_backend::db::entities::user;
use snippets_backend::db::services::user_service;

async fn register(app: &TestApp, username: &str, password: &str) -> (StatusCode, Value) {
    app.call(
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

async fn login(app: &TestApp, username: &str, password: &str) -> (StatusCode, Value) {
    app.call(
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

#[tokio::test]
async fn health_check_answers_without_credentials() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn register_login_and_me() {
    let app = TestApp::new().await;

    let (status, registered) = register(&app, "alice", "correct horse").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registered["username"], "alice");

    let (status, logged_in) = login(&app, "alice", "correct horse").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["user_id"], registered["id"]);
    let token = logged_in["token"].as_str().unwrap().to_string();

    let (status, me) = app
        .call(Method::GET, "/api/auth/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], registered["id"]);
    assert_eq!(me["username"], "alice");

    // The issued token works on the snippet endpoints too.
    let (status, overview) = app.call(Method::GET, "/overview/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["total_snippets"], 0);
}

#[tokio::test]
async fn login_sets_token_cookie_accepted_by_the_gate() {
    let app = TestApp::new().await;
    register(&app, "alice", "correct horse").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "alice", "password": "correct horse" }).to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/overview/")
        .header(header::COOKIE, cookie_pair)
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_snippets"], 0);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = TestApp::new().await;
    let (status, _) = register(&app, "alice", "correct horse").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = register(&app, "alice", "another password").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username is already taken.");
}

#[tokio::test]
async fn weak_registration_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = register(&app, "alice", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(&app, "", "correct horse").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(Method::POST, "/api/auth/register", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": 5, "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let app = TestApp::new().await;
    register(&app, "alice", "correct horse").await;

    let (status, wrong_password) = login(&app, "alice", "wrong password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = login(&app, "nobody", "correct horse").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);

    let (status, _) = login(&app, "alice", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn configured_admin_usernames_register_as_admins() {
    let app = TestApp::new().await;
    register(&app, ADMIN_USERNAME, "correct horse").await;
    register(&app, "alice", "correct horse").await;

    let root = user_service::get_user_by_username(&app.db, ADMIN_USERNAME)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(root.role, user::ROLE_ADMIN);

    let alice = user_service::get_user_by_username(&app.db, "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alice.role, user::ROLE_USER);
    assert_ne!(alice.password_hash, "correct horse");
}

#[tokio::test]
async fn me_requires_a_token() {
    let app = TestApp::new().await;
    let (status, _) = app.call(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
