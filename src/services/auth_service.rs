use axum::Extension;
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use tracing::info;

use crate::db::entities::user;
use crate::db::services::user_service;
use crate::server::config::ServerConfig;
use crate::web::error::AppError;
use crate::web::models::{
    AuthenticatedUser, Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse,
};

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register_user(
    db: &DatabaseConnection,
    req: RegisterRequest,
    config: &ServerConfig,
) -> Result<UserResponse, AppError> {
    if req.username.is_empty() || req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Username must not be empty and password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    let existing_user = user_service::get_user_by_username(db, &req.username).await?;
    if existing_user.is_some() {
        return Err(AppError::UserAlreadyExists("Username is already taken.".to_string()));
    }

    let password_hash = hash(&req.password, config.password_hash_cost)
        .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    let role = if config.admin_usernames.iter().any(|name| name == &req.username) {
        user::ROLE_ADMIN
    } else {
        user::ROLE_USER
    };

    // The lookup above can race another registration; the unique index decides.
    let user_model = user_service::create_user(db, &req.username, &password_hash, role)
        .await
        .map_err(map_user_insert_error)?;
    info!(user_id = user_model.id, role, "User registered.");

    Ok(UserResponse {
        id: user_model.id,
        username: user_model.username,
    })
}

fn map_user_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::UserAlreadyExists("Username is already taken.".to_string())
        }
        _ => err.into(),
    }
}

pub async fn login_user(
    db: &DatabaseConnection,
    req: LoginRequest,
    config: &ServerConfig,
) -> Result<LoginResponse, AppError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password must not be empty.".to_string(),
        ));
    }

    let user = user_service::get_user_by_username(db, &req.username)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, &config.jwt_secret, config.token_ttl_hours)
}

pub fn create_jwt_for_user(
    user: &user::Model,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<LoginResponse, AppError> {
    let expiration = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user.username.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
        username: user.username.clone(),
    })
}

pub async fn me(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<axum::Json<UserResponse>, AppError> {
    Ok(axum::Json(UserResponse {
        id: user.id,
        username: user.username,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    fn sample_user() -> user::Model {
        let now = Utc::now();
        user::Model {
            id: 7,
            username: "alice".to_string(),
            password_hash: String::new(),
            role: user::ROLE_USER.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_jwt_round_trips_claims() {
        let login = create_jwt_for_user(&sample_user(), "secret", 1).unwrap();
        assert_eq!(login.user_id, 7);

        let data = decode::<Claims>(
            &login.token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "alice");
        assert_eq!(data.claims.user_id, 7);
    }

    #[tokio::test]
    async fn test_duplicate_insert_maps_to_conflict() {
        let vars = [
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("DB_MAX_CONNECTIONS", "1"),
        ];
        let config = ServerConfig::load_from(
            None,
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap();
        let db = crate::db::connect(&config).await.unwrap();

        user_service::create_user(&db, "alice", "hash", user::ROLE_USER)
            .await
            .unwrap();
        let err = user_service::create_user(&db, "alice", "hash", user::ROLE_USER)
            .await
            .unwrap_err();
        assert!(matches!(
            map_user_insert_error(err),
            AppError::UserAlreadyExists(_)
        ));

        let other = map_user_insert_error(DbErr::Custom("boom".to_string()));
        assert!(matches!(other, AppError::DatabaseError(_)));
    }

    #[test]
    fn test_expired_jwt_is_rejected() {
        let login = create_jwt_for_user(&sample_user(), "secret", -2).unwrap();
        let result = decode::<Claims>(
            &login.token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
