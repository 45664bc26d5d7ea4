use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use crate::db::entities::user;

// --- User Service Functions ---

/// Creates a new user.
pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    password_hash: &str,
    role: &str,
) -> Result<user::Model, DbErr> {
    let now = Utc::now();
    let new_user = user::ActiveModel {
        username: Set(username.to_owned()),
        password_hash: Set(password_hash.to_owned()),
        role: Set(role.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_user.insert(db).await
}

/// Retrieves a user by their ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i32) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(user_id).one(db).await
}

/// Retrieves a user by their username.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
}

/// Makes stored roles follow the configured admin list: listed users become
/// admins, admins that are no longer listed drop back to `user`. Returns
/// `(promoted, demoted)`.
pub async fn sync_admin_roles(
    db: &DatabaseConnection,
    admin_usernames: &[String],
) -> Result<(u64, u64), DbErr> {
    let now = Utc::now();

    let promoted = user::Entity::update_many()
        .col_expr(user::Column::Role, Expr::value(user::ROLE_ADMIN))
        .col_expr(user::Column::UpdatedAt, Expr::value(now))
        .filter(user::Column::Username.is_in(admin_usernames.iter().cloned()))
        .filter(user::Column::Role.ne(user::ROLE_ADMIN))
        .exec(db)
        .await?
        .rows_affected;

    let demoted = user::Entity::update_many()
        .col_expr(user::Column::Role, Expr::value(user::ROLE_USER))
        .col_expr(user::Column::UpdatedAt, Expr::value(now))
        .filter(user::Column::Username.is_not_in(admin_usernames.iter().cloned()))
        .filter(user::Column::Role.eq(user::ROLE_ADMIN))
        .exec(db)
        .await?
        .rows_affected;

    Ok((promoted, demoted))
}
