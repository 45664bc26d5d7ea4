use axum::{Json, extract::rejection::JsonRejection};
use tracing::debug;

use crate::web::error::AppError;

/// Unwraps a JSON request body.
///
/// A request that carries no JSON body at all reads as an empty payload, so
/// the service-level validation reports which fields are missing. A body that
/// does not parse into `T` is a 400.
pub fn json_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(payload)) => Ok(payload),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => {
            debug!(status = %rejection.status(), "Rejected request body.");
            Err(AppError::InvalidInput(rejection.body_text()))
        }
    }
}
