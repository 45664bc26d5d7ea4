#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

use snippets_backend::db;
use snippets_backend::db::entities::user;
use snippets_backend::db::services::user_service;
use snippets_backend::server::config::ServerConfig;
use snippets_backend::services::auth_service;
use snippets_backend::web;

pub const ADMIN_USERNAME: &str = "root";

pub fn test_config() -> ServerConfig {
    let vars = [
        ("DATABASE_URL", "sqlite::memory:"),
        ("JWT_SECRET", "test-secret"),
        // An in-memory SQLite database lives and dies with its connection.
        ("DB_MAX_CONNECTIONS", "1"),
        ("ADMIN_USERNAMES", ADMIN_USERNAME),
        ("PASSWORD_HASH_COST", "4"),
    ];
    ServerConfig::load_from(
        None,
        vars.iter().map(|(k, v)| (k.to_string(), v.to_string())),
    )
    .expect("test config should load")
}

pub struct TestUser {
    pub id: i32,
    pub username: String,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub config: Arc<ServerConfig>,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = Arc::new(test_config());
        let db = db::connect(&config).await.expect("in-memory database should open");
        let router = web::create_axum_router(db.clone(), config.clone());
        TestApp { router, db, config }
    }

    /// Inserts a user straight into the store and mints a token for it.
    pub async fn user(&self, username: &str) -> TestUser {
        self.user_with_role(username, user::ROLE_USER).await
    }

    pub async fn admin(&self, username: &str) -> TestUser {
        self.user_with_role(username, user::ROLE_ADMIN).await
    }

    async fn user_with_role(&self, username: &str, role: &str) -> TestUser {
        let model = user_service::create_user(&self.db, username, "not-a-real-hash", role)
            .await
            .expect("user insert");
        let login = auth_service::create_jwt_for_user(&model, &self.config.jwt_secret, 1)
            .expect("token");
        TestUser {
            id: model.id,
            username: model.username,
            token: login.token,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");
        self.send(request).await
    }

    /// Sends `body` verbatim as JSON, for payloads `serde_json` cannot build.
    pub async fn call_raw(
        &self,
        method: Method,
        uri: &str,
        user: &TestUser,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", user.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request should build");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(&user.token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(&user.token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, Some(&user.token), Some(body)).await
    }

    /// Creates a snippet through the API and returns its id.
    pub async fn create_snippet(&self, user: &TestUser, title: &str, tags: &[&str]) -> i64 {
        let (status, body) = self
            .post(
                "/create/",
                user,
                serde_json::json!({ "title": title, "note": format!("note for {title}"), "tags": tags }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["id"].as_i64().expect("id in create response")
    }
}

/// Tag titles of a projection as plain strings.
pub fn tag_titles(projection: &Value) -> Vec<String> {
    projection["tags"]
        .as_array()
        .expect("tags array")
        .iter()
        .map(|t| t.as_str().expect("tag title").to_string())
        .collect()
}
