// src/storage/mod.rs

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::models::question::{QuestionFilter, QuestionRecord, SaveQuestionRequest};

/// Error surface of the question store, kept independent of HTTP concerns.
/// Handlers convert it into an `AppError` at the boundary.
#[derive(Debug)]
pub enum StoreError {
    NotFound,
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "question not found"),
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Persistence boundary for questions.
///
/// The draft model and the handlers only ever see this trait; the concrete
/// backend is chosen at startup (PostgreSQL in production, the in-memory
/// store in tests).
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Persists a new question and returns its server-assigned id.
    async fn create_question(&self, question: &SaveQuestionRequest) -> Result<i64, StoreError>;

    /// Replaces an existing question. `NotFound` if the id is unknown.
    async fn update_question(
        &self,
        id: i64,
        question: &SaveQuestionRequest,
    ) -> Result<(), StoreError>;

    /// Deletes a question together with its options.
    async fn delete_question(&self, id: i64) -> Result<(), StoreError>;

    async fn get_question(&self, id: i64) -> Result<Option<QuestionRecord>, StoreError>;

    async fn list_questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Vec<QuestionRecord>, StoreError>;
}
