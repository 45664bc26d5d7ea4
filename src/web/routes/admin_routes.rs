use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::db::services;
use crate::web::models::admin_models::{AdminSnippetList, AdminSnippetQuery, AdminTagList, AdminTagQuery};
use crate::web::{AppError, AppState};

async fn admin_snippets_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<AdminSnippetQuery>,
) -> Result<Json<AdminSnippetList>, AppError> {
    let list = services::admin_list_snippets(&app_state.db_pool, &query).await?;
    Ok(Json(list))
}

async fn admin_tags_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<AdminTagQuery>,
) -> Result<Json<AdminTagList>, AppError> {
    let list = services::admin_list_tags(&app_state.db_pool, &query).await?;
    Ok(Json(list))
}

pub fn create_admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/snippets/", get(admin_snippets_handler))
        .route("/tags/", get(admin_tags_handler))
}
