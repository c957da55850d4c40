// src/draft/batch.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::draft::metadata;
use crate::models::draft::{AssessmentMeta, QuestionDraft};
use crate::storage::{QuestionStore, StoreError};

/// Raised before a batch save when a draft is missing its stem. The whole
/// save is blocked and no store call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingStem {
    /// 1-based position of the offending draft.
    pub position: usize,
}

impl fmt::Display for MissingStem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "question {} is missing a question stem", self.position)
    }
}

impl std::error::Error for MissingStem {}

/// What happened to one draft during a batch save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemStatus {
    Created,
    Updated,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    /// 0-based position of the draft in the batch.
    pub index: usize,
    /// Persisted id after the attempt; 0 when a create failed.
    pub question_base_id: i64,
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// Summary of a batch save: per-item outcomes plus counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub results: Vec<ItemResult>,
}

impl BatchReport {
    fn record(&mut self, index: usize, question_base_id: i64, status: ItemStatus) {
        match status {
            ItemStatus::Created => self.created += 1,
            ItemStatus::Updated => self.updated += 1,
            ItemStatus::Failed { .. } => self.failed += 1,
        }
        self.results.push(ItemResult {
            index,
            question_base_id,
            status,
        });
    }
}

/// The ordered set of drafts being edited together in one session, plus the
/// shared grouped-assessment metadata.
///
/// The batch is owned by a single edit session; nothing here is shared
/// across sessions, so all mutation is plain synchronous state.
#[derive(Debug, Clone, Default)]
pub struct DraftBatch {
    pub drafts: Vec<QuestionDraft>,
    pub shared: AssessmentMeta,
}

impl DraftBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_drafts(drafts: Vec<QuestionDraft>) -> Self {
        let shared = metadata::shared_meta_for(&drafts);
        Self { drafts, shared }
    }

    /// Whether the batch currently qualifies for grouped-assessment editing.
    pub fn is_grouped(&self) -> bool {
        metadata::is_uniform(&self.drafts)
    }

    /// Recomputes the shared metadata from the members: pre-filled when the
    /// batch is uniform, cleared otherwise.
    pub fn refresh_shared(&mut self) {
        self.shared = metadata::shared_meta_for(&self.drafts);
    }

    /// Explicitly applies the shared metadata to every member.
    pub fn apply_shared(&mut self) {
        metadata::apply_meta(&mut self.drafts, &self.shared);
    }

    /// Appends a blank draft to the batch.
    pub fn push_blank(&mut self) {
        self.drafts.push(QuestionDraft::new());
    }

    /// Every draft needs a non-blank stem before anything is sent to the
    /// store; the first offender blocks the whole save.
    pub fn validate_for_save(&self) -> Result<(), MissingStem> {
        for (index, draft) in self.drafts.iter().enumerate() {
            if draft.question_stem.trim().is_empty() {
                return Err(MissingStem { position: index + 1 });
            }
        }
        Ok(())
    }

    /// Saves every draft in array order, one store call at a time.
    ///
    /// Best-effort per-item loop, not a transaction: a failure on one draft
    /// is recorded and the remaining drafts are still attempted. Unsaved
    /// drafts are created and adopt the returned id; persisted drafts are
    /// updated in place. There is no cancellation once the loop starts.
    pub async fn save_all(
        &mut self,
        store: &dyn QuestionStore,
    ) -> Result<BatchReport, MissingStem> {
        self.validate_for_save()?;

        let mut report = BatchReport {
            created: 0,
            updated: 0,
            failed: 0,
            results: Vec::with_capacity(self.drafts.len()),
        };

        for (index, draft) in self.drafts.iter_mut().enumerate() {
            let payload = draft.to_request();
            if draft.is_persisted() {
                match store.update_question(draft.question_base_id, &payload).await {
                    Ok(()) => report.record(index, draft.question_base_id, ItemStatus::Updated),
                    Err(err) => {
                        tracing::warn!(index, id = draft.question_base_id, %err, "batch update failed");
                        report.record(
                            index,
                            draft.question_base_id,
                            ItemStatus::Failed { error: err.to_string() },
                        );
                    }
                }
            } else {
                match store.create_question(&payload).await {
                    Ok(id) => {
                        draft.question_base_id = id;
                        report.record(index, id, ItemStatus::Created);
                    }
                    Err(err) => {
                        tracing::warn!(index, %err, "batch create failed");
                        report.record(index, 0, ItemStatus::Failed { error: err.to_string() });
                    }
                }
            }
        }

        Ok(report)
    }

    /// Removes one draft from the batch.
    ///
    /// Unsaved drafts are dropped locally with no store call. Persisted
    /// drafts are deleted from the store first and removed locally only on
    /// confirmation; on failure the batch is left untouched so the caller
    /// can retry.
    pub async fn remove_draft(
        &mut self,
        index: usize,
        store: &dyn QuestionStore,
    ) -> Result<(), StoreError> {
        let Some(draft) = self.drafts.get(index) else {
            return Err(StoreError::NotFound);
        };
        if draft.is_persisted() {
            store.delete_question(draft.question_base_id).await?;
        }
        self.drafts.remove(index);
        Ok(())
    }
}
