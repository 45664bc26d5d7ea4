use axum::{
    extract::{State, rejection::JsonRejection},
    middleware as axum_middleware,
    http::{Method, header},
    response::IntoResponse,
    routing::{get, post},
    Json,
    Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::server::config::ServerConfig;
use crate::services::auth_service;
use crate::web::{
    models::{LoginRequest, RegisterRequest},
    middleware::auth,
    routes::*,
};

pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub config: Arc<ServerConfig>,
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<models::UserResponse>, AppError> {
    let payload = extract::json_body(payload)?;
    let user_response =
        auth_service::register_user(&app_state.db_pool, payload, &app_state.config).await?;
    Ok(Json(user_response))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = extract::json_body(payload)?;
    let login_response =
        auth_service::login_user(&app_state.db_pool, payload, &app_state.config).await?;

    let auth_cookie = Cookie::build(("token", login_response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build();
    let cookie_value = auth_cookie
        .to_string()
        .parse()
        .map_err(|e| AppError::InternalServerError(format!("Invalid cookie header: {e}")))?;

    let mut response = Json(login_response).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie_value);

    Ok(response)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(db_pool: DatabaseConnection, config: Arc<ServerConfig>) -> Router {
    let cors_allow_any = config.cors_allow_any;
    let app_state = Arc::new(AppState { db_pool, config });

    let router = Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route(
            "/api/auth/me",
            get(auth_service::me)
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .merge(
            snippet_routes::create_snippets_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .merge(
            tag_routes::create_tags_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/admin",
            admin_routes::create_admin_router()
                // The last layer added runs first: auth gate, then the admin check.
                .route_layer(axum_middleware::from_fn(auth::require_admin))
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .with_state(app_state);

    if cors_allow_any {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}
