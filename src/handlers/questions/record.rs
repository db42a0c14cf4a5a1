use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::ApiError;
use crate::models::question::{QuestionInput, QuestionResponse};
use crate::store::QuestionStore;

/// GET /api/questions/:id - Get a single question by ID
pub async fn question_get(
    State(store): State<Arc<QuestionStore>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let Path(id) = id.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let question = store.get(id).await?;
    Ok(Json(QuestionResponse::from(&question)))
}

/// PUT /api/questions/:id - Replace a question by ID
pub async fn question_update(
    State(store): State<Arc<QuestionStore>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<QuestionInput>, JsonRejection>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let Path(id) = id.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let Json(input) =
        payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    input.validate()?;

    let question = store.update(id, input).await?;
    Ok(Json(QuestionResponse::from(&question)))
}

/// DELETE /api/questions/:id - Delete a question by ID
pub async fn question_delete(
    State(store): State<Arc<QuestionStore>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
