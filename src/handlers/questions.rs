// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError, models::question::SaveQuestionRequest, state::AppState,
    utils::html::clean_html,
};

/// Runs the rich stem through the HTML whitelist before it reaches storage.
fn sanitized(mut payload: SaveQuestionRequest) -> SaveQuestionRequest {
    if let Some(html) = payload.question_stem_html.take() {
        payload.question_stem_html = Some(clean_html(&html));
    }
    payload
}

/// Creates a new question.
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<SaveQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let payload = sanitized(payload);
    let id = state.store.create_question(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"status": "created", "question_id": id})),
    ))
}

/// Replaces an existing question by ID.
pub async fn edit_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SaveQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let payload = sanitized(payload);
    state.store.update_question(id, &payload).await?;

    Ok(Json(
        serde_json::json!({"status": "updated", "question_id": id}),
    ))
}

/// Deletes a question by ID. Its options go with it.
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.store.delete_question(id).await?;

    Ok(Json(
        serde_json::json!({"status": "deleted", "question_id": id}),
    ))
}
