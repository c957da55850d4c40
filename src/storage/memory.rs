// src/storage/memory.rs

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::draft::options::normalize_options;
use crate::models::draft::WireOption;
use crate::models::question::{
    OrderBy, QuestionFilter, QuestionRecord, SaveQuestionRequest, SortDir,
};
use crate::storage::{QuestionStore, StoreError};

/// In-memory question store.
///
/// Backs the integration tests (no external database needed) and doubles as
/// a scratch backend for local development. Filtering, ordering and
/// pagination mirror the PostgreSQL implementation.
#[derive(Default)]
pub struct MemoryQuestionStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, QuestionRecord>,
}

impl MemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-write; the data is
        // still usable for the remaining assertions.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn build_record(id: i64, question: &SaveQuestionRequest) -> QuestionRecord {
    let options: Vec<WireOption> = normalize_options(
        &[],
        &question.question_options,
        &question.question_answer,
        Some(question.question_type),
    )
    .into_iter()
    .map(|opt| WireOption {
        label: opt.label,
        text: opt.text,
        is_correct: Some(opt.is_correct),
    })
    .collect();

    let now = Utc::now();
    QuestionRecord {
        id,
        question_no: question.question_no.clone(),
        question_type: question.question_type,
        question_stem: question.question_stem.clone(),
        question_stem_html: question.question_stem_html.clone(),
        question_options: options,
        question_answer: question.question_answer.clone(),
        course: question.course.clone(),
        year: question.year,
        semester: question.semester.clone(),
        assessment_type: question.assessment_type,
        difficulty_rating_manual: question.difficulty_rating_manual,
        concept_tags: question.concept_tags.clone(),
        question_media: question.question_media.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn matches(record: &QuestionRecord, filter: &QuestionFilter) -> bool {
    if let Some(keyword) = &filter.keyword {
        if !record
            .question_stem
            .to_lowercase()
            .contains(&keyword.to_lowercase())
        {
            return false;
        }
    }
    if let Some(course) = &filter.course {
        if record.course.as_deref() != Some(course.as_str()) {
            return false;
        }
    }
    if let Some(year) = filter.year {
        if record.year != Some(year) {
            return false;
        }
    }
    if let Some(semester) = &filter.semester {
        if record.semester.as_deref() != Some(semester.as_str()) {
            return false;
        }
    }
    if let Some(assessment_type) = filter.assessment_type {
        if record.assessment_type != Some(assessment_type) {
            return false;
        }
    }
    if let Some(question_type) = filter.question_type {
        if record.question_type != question_type {
            return false;
        }
    }
    if let Some(question_no) = &filter.question_no {
        if record.question_no.as_deref() != Some(question_no.as_str()) {
            return false;
        }
    }
    if let Some(difficulty) = filter.difficulty {
        if record.difficulty_rating_manual != Some(difficulty) {
            return false;
        }
    }
    filter
        .concept_tags
        .iter()
        .all(|tag| record.concept_tags.iter().any(|have| have == tag))
}

fn compare(a: &QuestionRecord, b: &QuestionRecord, order_by: OrderBy) -> Ordering {
    match order_by {
        OrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
        OrderBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        OrderBy::Difficulty => a
            .difficulty_rating_manual
            .partial_cmp(&b.difficulty_rating_manual)
            .unwrap_or(Ordering::Equal),
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn create_question(&self, question: &SaveQuestionRequest) -> Result<i64, StoreError> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        let record = build_record(id, question);
        inner.rows.insert(id, record);
        Ok(id)
    }

    async fn update_question(
        &self,
        id: i64,
        question: &SaveQuestionRequest,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let Some(existing) = inner.rows.get(&id) else {
            return Err(StoreError::NotFound);
        };
        let created_at = existing.created_at;
        let mut record = build_record(id, question);
        record.created_at = created_at;
        inner.rows.insert(id, record);
        Ok(())
    }

    async fn delete_question(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.rows.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_question(&self, id: i64) -> Result<Option<QuestionRecord>, StoreError> {
        Ok(self.lock().rows.get(&id).cloned())
    }

    async fn list_questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Vec<QuestionRecord>, StoreError> {
        let inner = self.lock();
        let mut items: Vec<QuestionRecord> = inner
            .rows
            .values()
            .filter(|record| matches(record, filter))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            let ordering = compare(a, b, filter.order_by);
            match filter.sort {
                SortDir::Asc => ordering,
                SortDir::Desc => ordering.reverse(),
            }
        });

        let offset = filter.offset.max(0) as usize;
        let limit = filter.limit.max(0) as usize;
        Ok(items.into_iter().skip(offset).take(limit).collect())
    }
}
