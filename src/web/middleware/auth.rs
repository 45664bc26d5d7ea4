use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use std::sync::Arc;
use tracing::warn;

use crate::db::entities::user;
use crate::db::services::user_service;
use crate::web::models::{AuthenticatedUser, Claims};
use crate::web::{AppState, error::AppError};

/// Auth gate: resolves the caller from a JWT and stores it as an
/// [`AuthenticatedUser`] request extension.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let jwt_secret = &state.config.jwt_secret;

    // Try to get token from Authorization header first, then fall back to cookie
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| jar.get("token").map(|c| c.value().to_string()))
        .ok_or(AppError::InvalidCredentials)?;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!(error = ?e, "JWT decoding error during auth middleware.");
        AppError::InvalidCredentials
    })?;

    // The token may outlive its user.
    let user = user_service::get_user_by_id(&state.db_pool, token_data.claims.user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = token_data.claims.user_id, "Token refers to a user that no longer exists.");
            AppError::InvalidCredentials
        })?;

    let authenticated_user = AuthenticatedUser {
        id: user.id,
        username: user.username,
        role: user.role,
    };
    req.extensions_mut().insert(authenticated_user);
    Ok(next.run(req).await)
}

/// Lets the request through only for admins. Must run after [`auth`].
pub async fn require_admin(req: Request<AxumBody>, next: Next) -> Result<Response, AppError> {
    let caller = req
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(AppError::InvalidCredentials)?;

    if caller.role != user::ROLE_ADMIN {
        warn!(user_id = caller.id, "Non-admin attempted to access admin listing.");
        return Err(AppError::Forbidden("Admin access required.".to_string()));
    }
    Ok(next.run(req).await)
}
