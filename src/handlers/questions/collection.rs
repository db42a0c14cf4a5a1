use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::ApiError;
use crate::models::question::{QuestionInput, QuestionResponse};
use crate::store::QuestionStore;

/// GET /api/questions - List all questions
pub async fn question_list(
    State(store): State<Arc<QuestionStore>>,
) -> Json<Vec<QuestionResponse>> {
    let questions = store.list().await;
    Json(questions.iter().map(QuestionResponse::from).collect())
}

/// GET /api/questions/json - Read-only list endpoint
pub async fn question_list_json(
    state: State<Arc<QuestionStore>>,
) -> Json<Vec<QuestionResponse>> {
    question_list(state).await
}

/// POST /api/questions - Validate and create a question
pub async fn question_create(
    State(store): State<Arc<QuestionStore>>,
    payload: Result<Json<QuestionInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) =
        payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    input.validate()?;

    let question = store.create(input).await?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(&question))))
}
