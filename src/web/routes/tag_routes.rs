use axum::{
    extract::{Extension, Path, State, rejection::PathRejection},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::db::services;
use crate::web::models::snippet_models::{TagDetailResponse, TagListResponse};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

// Tags are global: any authenticated caller sees every tag.
async fn list_tags_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<TagListResponse>, AppError> {
    let tags = services::get_all_tags(&app_state.db_pool).await?;
    Ok(Json(tags))
}

async fn tag_detail_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    tag_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<TagDetailResponse>, AppError> {
    let Path(tag_id) = tag_id.map_err(|_| AppError::tag_not_found())?;
    let detail = services::get_tag_detail(&app_state.db_pool, tag_id, user.id).await?;
    Ok(Json(detail))
}

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tags/", get(list_tags_handler))
        .route("/tags/{tag_id}/", get(tag_detail_handler))
}
