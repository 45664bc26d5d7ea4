use axum::{
    extract::{
        Extension, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;

use crate::db::services;
use crate::web::models::snippet_models::{
    CreateSnippetRequest, DeleteSnippetsRequest, DeleteSnippetsResponse, SnippetDetail,
    SnippetOverview, UpdateSnippetRequest,
};
use crate::web::extract::json_body;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn overview_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<SnippetOverview>, AppError> {
    let overview = services::get_snippet_overview(&app_state.db_pool, user.id).await?;
    Ok(Json(overview))
}

async fn create_snippet_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateSnippetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SnippetDetail>), AppError> {
    let payload = json_body(payload)?;
    let detail = services::create_snippet(&app_state.db_pool, user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn detail_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    snippet_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<SnippetDetail>, AppError> {
    let Path(snippet_id) = snippet_id.map_err(|_| AppError::snippet_not_found())?;
    let detail = services::get_snippet_detail(&app_state.db_pool, snippet_id, user.id).await?;
    Ok(Json(detail))
}

async fn update_snippet_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    snippet_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateSnippetRequest>, JsonRejection>,
) -> Result<Json<SnippetDetail>, AppError> {
    // An id that does not parse cannot name a stored snippet.
    let Path(snippet_id) = snippet_id.map_err(|_| AppError::snippet_not_found())?;
    let payload = match json_body(payload) {
        Ok(payload) => payload,
        Err(err) => {
            // A foreign id stays a 404 even when the body is unreadable.
            services::find_owned_snippet(&app_state.db_pool, snippet_id, user.id)
                .await?
                .ok_or_else(AppError::snippet_not_found)?;
            return Err(err);
        }
    };
    let detail = services::update_snippet(&app_state.db_pool, snippet_id, user.id, payload).await?;
    Ok(Json(detail))
}

async fn delete_snippets_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<DeleteSnippetsRequest>, JsonRejection>,
) -> Result<Json<DeleteSnippetsResponse>, AppError> {
    let payload = json_body(payload)?;
    let response = services::delete_snippets(&app_state.db_pool, user.id, payload).await?;
    Ok(Json(response))
}

// --- Router ---

pub fn create_snippets_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/overview/", get(overview_handler))
        .route("/create/", post(create_snippet_handler))
        .route("/detail/{snippet_id}/", get(detail_handler))
        .route("/update/{snippet_id}/", put(update_snippet_handler))
        .route("/delete/", delete(delete_snippets_handler))
}
