// tests/batch_tests.rs
//
// Draft batch semantics against a recording store: what gets called, in
// which order, and what happens when individual items fail.

use std::sync::Mutex;

use async_trait::async_trait;
use quizbank_backend::draft::batch::{DraftBatch, ItemStatus};
use quizbank_backend::models::draft::QuestionDraft;
use quizbank_backend::models::question::{
    QuestionFilter, QuestionRecord, QuestionType, SaveQuestionRequest,
};
use quizbank_backend::storage::{QuestionStore, StoreError};

/// Store double that records every call and can be told to fail creates for
/// a given stem, or all deletes.
#[derive(Default)]
struct RecordingStore {
    calls: Mutex<Vec<String>>,
    next_id: Mutex<i64>,
    fail_create_stem: Option<String>,
    fail_deletes: bool,
}

impl RecordingStore {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl QuestionStore for RecordingStore {
    async fn create_question(&self, question: &SaveQuestionRequest) -> Result<i64, StoreError> {
        self.record(format!("create:{}", question.question_stem));
        if self.fail_create_stem.as_deref() == Some(question.question_stem.as_str()) {
            return Err(StoreError::Database("injected create failure".to_string()));
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        Ok(*next_id)
    }

    async fn update_question(
        &self,
        id: i64,
        question: &SaveQuestionRequest,
    ) -> Result<(), StoreError> {
        self.record(format!("update:{}:{}", id, question.question_stem));
        Ok(())
    }

    async fn delete_question(&self, id: i64) -> Result<(), StoreError> {
        self.record(format!("delete:{}", id));
        if self.fail_deletes {
            return Err(StoreError::Database("injected delete failure".to_string()));
        }
        Ok(())
    }

    async fn get_question(&self, _id: i64) -> Result<Option<QuestionRecord>, StoreError> {
        Ok(None)
    }

    async fn list_questions(
        &self,
        _filter: &QuestionFilter,
    ) -> Result<Vec<QuestionRecord>, StoreError> {
        Ok(Vec::new())
    }
}

fn draft(stem: &str) -> QuestionDraft {
    QuestionDraft {
        question_type: Some(QuestionType::OpenEnded),
        question_stem: stem.to_string(),
        ..QuestionDraft::new()
    }
}

#[tokio::test]
async fn missing_stem_blocks_the_save_with_zero_store_calls() {
    let store = RecordingStore::default();
    let mut batch = DraftBatch::from_drafts(vec![draft("Complete question"), draft("  ")]);

    let err = batch
        .save_all(&store)
        .await
        .expect_err("blank stem must block the batch");
    assert_eq!(err.position, 2);
    assert_eq!(err.to_string(), "question 2 is missing a question stem");
    assert!(store.calls().is_empty(), "no store call may happen");
}

#[tokio::test]
async fn save_attempts_every_item_past_a_failure() {
    let store = RecordingStore {
        fail_create_stem: Some("Second".to_string()),
        ..RecordingStore::default()
    };
    let mut batch = DraftBatch::from_drafts(vec![draft("First"), draft("Second"), draft("Third")]);

    let report = batch.save_all(&store).await.expect("validation passes");

    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.results.len(), 3);
    assert!(matches!(report.results[1].status, ItemStatus::Failed { .. }));

    // All three were attempted, in array order.
    assert_eq!(
        store.calls(),
        vec!["create:First", "create:Second", "create:Third"]
    );

    // Successes adopted their ids; the failure kept the unsaved sentinel.
    assert!(batch.drafts[0].question_base_id > 0);
    assert_eq!(batch.drafts[1].question_base_id, 0);
    assert!(batch.drafts[2].question_base_id > 0);
}

#[tokio::test]
async fn resaving_a_batch_updates_instead_of_creating() {
    let store = RecordingStore::default();
    let mut batch = DraftBatch::from_drafts(vec![draft("Only question")]);

    let first = batch.save_all(&store).await.unwrap();
    assert_eq!(first.created, 1);
    let id = batch.drafts[0].question_base_id;
    assert!(id > 0);

    let second = batch.save_all(&store).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 1);

    assert_eq!(
        store.calls(),
        vec![
            "create:Only question".to_string(),
            format!("update:{}:Only question", id),
        ]
    );
}

#[tokio::test]
async fn removing_an_unsaved_draft_makes_no_store_call() {
    let store = RecordingStore::default();
    let mut batch = DraftBatch::from_drafts(vec![draft("Unsaved")]);

    batch.remove_draft(0, &store).await.expect("local removal");
    assert!(batch.drafts.is_empty());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn removing_a_persisted_draft_deletes_from_the_store_first() {
    let store = RecordingStore::default();
    let mut persisted = draft("Persisted");
    persisted.question_base_id = 42;
    let mut batch = DraftBatch::from_drafts(vec![persisted]);

    batch.remove_draft(0, &store).await.expect("delete confirmed");
    assert!(batch.drafts.is_empty());
    assert_eq!(store.calls(), vec!["delete:42"]);
}

#[tokio::test]
async fn failed_delete_leaves_the_draft_in_place_for_retry() {
    let store = RecordingStore {
        fail_deletes: true,
        ..RecordingStore::default()
    };
    let mut persisted = draft("Persisted");
    persisted.question_base_id = 42;
    let mut batch = DraftBatch::from_drafts(vec![persisted]);

    batch
        .remove_draft(0, &store)
        .await
        .expect_err("delete failure must surface");
    assert_eq!(batch.drafts.len(), 1, "draft stays for a retry");
    assert_eq!(batch.drafts[0].question_base_id, 42);
}

#[tokio::test]
async fn grouped_batch_roundtrip_prefills_and_applies_shared_meta() {
    use quizbank_backend::models::question::AssessmentType;

    let mut uniform = vec![draft("One"), draft("Two")];
    for member in &mut uniform {
        member.course = Some("CS101".to_string());
        member.year = Some(2024);
        member.semester = Some("S1".to_string());
        member.assessment_type = Some(AssessmentType::Final);
    }

    let mut batch = DraftBatch::from_drafts(uniform);
    assert!(batch.is_grouped());
    assert_eq!(batch.shared.course.as_deref(), Some("CS101"));

    // Editing the shared metadata and applying it reaches every member.
    batch.shared.semester = Some("S2".to_string());
    batch.apply_shared();
    assert!(batch.drafts.iter().all(|d| d.semester.as_deref() == Some("S2")));

    // A diverging member breaks grouping; shared metadata clears.
    batch.drafts[1].course = Some("CS102".to_string());
    assert!(!batch.is_grouped());
    batch.refresh_shared();
    assert_eq!(batch.shared.course, None);
}
