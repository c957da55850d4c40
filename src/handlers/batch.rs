// src/handlers/batch.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::{
    draft::batch::{BatchReport, DraftBatch},
    error::AppError,
    models::draft::{AssessmentMeta, QuestionDraft},
    state::AppState,
    utils::html::clean_html,
};

/// A whole edit session's worth of drafts, saved in one request.
#[derive(Debug, Deserialize)]
pub struct SaveBatchRequest {
    pub drafts: Vec<QuestionDraft>,
    /// When set, `shared` is applied to every draft before saving
    /// (grouped-assessment mode).
    #[serde(default)]
    pub grouped: bool,
    #[serde(default)]
    pub shared: AssessmentMeta,
}

#[derive(Debug, Serialize)]
pub struct SaveBatchResponse {
    #[serde(flatten)]
    pub report: BatchReport,
    /// The drafts after the save: freshly created ones carry their
    /// server-assigned ids.
    pub drafts: Vec<QuestionDraft>,
}

/// Saves a batch of drafts: stems are validated up front (a missing stem
/// blocks the whole batch before any store call), then each draft is
/// created or updated sequentially, best-effort.
pub async fn save_batch(
    State(state): State<AppState>,
    Json(payload): Json<SaveBatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut batch = DraftBatch {
        drafts: payload.drafts,
        shared: payload.shared,
    };
    if payload.grouped {
        batch.apply_shared();
    }
    for draft in &mut batch.drafts {
        if let Some(html) = draft.question_stem_html.take() {
            draft.question_stem_html = Some(clean_html(&html));
        }
    }

    let report = batch.save_all(state.store.as_ref()).await?;
    tracing::info!(
        created = report.created,
        updated = report.updated,
        failed = report.failed,
        "batch save finished"
    );

    Ok(Json(SaveBatchResponse {
        report,
        drafts: batch.drafts,
    }))
}
