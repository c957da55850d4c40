// src/storage/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::draft::options::normalize_options;
use crate::models::draft::WireOption;
use crate::models::question::{
    AssessmentType, QuestionFilter, QuestionRecord, QuestionRow, QuestionType,
    SaveQuestionRequest, SortDir,
};
use crate::storage::{QuestionStore, StoreError};

const QUESTION_COLUMNS: &str = "id, question_no, question_type, question_stem, \
     question_stem_html, question_answer, course, year, semester, assessment_type, \
     difficulty_rating_manual, concept_tags, question_media, created_at, updated_at";

/// PostgreSQL-backed question store.
///
/// Options are persisted in their canonical form: the normalizer resolves
/// correctness (explicit flags, or the legacy answer-string fallback) before
/// the rows are written, so reads never have to guess.
pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_options(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<WireOption>>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<OptionRow> = sqlx::query_as(
            "SELECT question_id, label, option_text, is_correct \
             FROM question_options WHERE question_id = ANY($1) \
             ORDER BY question_id, position",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<WireOption>> = HashMap::new();
        for row in rows {
            grouped.entry(row.question_id).or_default().push(WireOption {
                label: row.label,
                text: row.option_text,
                is_correct: Some(row.is_correct),
            });
        }
        Ok(grouped)
    }
}

/// Helper struct for fetching option rows.
#[derive(Debug, sqlx::FromRow)]
struct OptionRow {
    question_id: i64,
    label: String,
    option_text: String,
    is_correct: bool,
}

async fn replace_options(
    tx: &mut Transaction<'_, Postgres>,
    question_id: i64,
    question: &SaveQuestionRequest,
) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM question_options WHERE question_id = $1")
        .bind(question_id)
        .execute(&mut **tx)
        .await?;

    let options = normalize_options(
        &[],
        &question.question_options,
        &question.question_answer,
        Some(question.question_type),
    );
    for (position, opt) in options.iter().enumerate() {
        sqlx::query(
            "INSERT INTO question_options (question_id, position, label, option_text, is_correct) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(question_id)
        .bind(position as i32)
        .bind(&opt.label)
        .bind(&opt.text)
        .bind(opt.is_correct)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn row_to_record(row: QuestionRow, options: Vec<WireOption>) -> QuestionRecord {
    let question_type = QuestionType::parse(&row.question_type).unwrap_or_else(|| {
        tracing::warn!(
            id = row.id,
            value = %row.question_type,
            "unrecognized question type in storage, treating as 'others'"
        );
        QuestionType::Others
    });
    let assessment_type = row
        .assessment_type
        .as_deref()
        .map(|value| AssessmentType::parse(value).unwrap_or(AssessmentType::Unknown));

    QuestionRecord {
        id: row.id,
        question_no: row.question_no,
        question_type,
        question_stem: row.question_stem,
        question_stem_html: row.question_stem_html,
        question_options: options,
        question_answer: row.question_answer,
        course: row.course,
        year: row.year,
        semester: row.semester,
        assessment_type,
        difficulty_rating_manual: row.difficulty_rating_manual,
        concept_tags: row.concept_tags.0,
        question_media: row.question_media.0,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl QuestionStore for PgQuestionStore {
    async fn create_question(&self, question: &SaveQuestionRequest) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO questions \
             (question_no, question_type, question_stem, question_stem_html, question_answer, \
              course, year, semester, assessment_type, difficulty_rating_manual, \
              concept_tags, question_media) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING id",
        )
        .bind(&question.question_no)
        .bind(question.question_type.as_str())
        .bind(&question.question_stem)
        .bind(&question.question_stem_html)
        .bind(&question.question_answer)
        .bind(&question.course)
        .bind(question.year)
        .bind(&question.semester)
        .bind(question.assessment_type.map(AssessmentType::as_str))
        .bind(question.difficulty_rating_manual)
        .bind(Json(&question.concept_tags))
        .bind(Json(&question.question_media))
        .fetch_one(&mut *tx)
        .await?;

        replace_options(&mut tx, id, question).await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn update_question(
        &self,
        id: i64,
        question: &SaveQuestionRequest,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE questions SET \
             question_no = $1, question_type = $2, question_stem = $3, \
             question_stem_html = $4, question_answer = $5, course = $6, year = $7, \
             semester = $8, assessment_type = $9, difficulty_rating_manual = $10, \
             concept_tags = $11, question_media = $12, updated_at = NOW() \
             WHERE id = $13",
        )
        .bind(&question.question_no)
        .bind(question.question_type.as_str())
        .bind(&question.question_stem)
        .bind(&question.question_stem_html)
        .bind(&question.question_answer)
        .bind(&question.course)
        .bind(question.year)
        .bind(&question.semester)
        .bind(question.assessment_type.map(AssessmentType::as_str))
        .bind(question.difficulty_rating_manual)
        .bind(Json(&question.concept_tags))
        .bind(Json(&question.question_media))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        replace_options(&mut tx, id, question).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_question(&self, id: i64) -> Result<(), StoreError> {
        // question_options rows go with the question via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_question(&self, id: i64) -> Result<Option<QuestionRecord>, StoreError> {
        let row: Option<QuestionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut options = self.load_options(&[row.id]).await?;
        let opts = options.remove(&row.id).unwrap_or_default();
        Ok(Some(row_to_record(row, opts)))
    }

    async fn list_questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Vec<QuestionRecord>, StoreError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM questions WHERE 1 = 1",
            QUESTION_COLUMNS
        ));

        if let Some(keyword) = &filter.keyword {
            builder.push(" AND question_stem ILIKE ");
            builder.push_bind(format!("%{}%", keyword));
        }
        if let Some(course) = &filter.course {
            builder.push(" AND course = ");
            builder.push_bind(course);
        }
        if let Some(year) = filter.year {
            builder.push(" AND year = ");
            builder.push_bind(year);
        }
        if let Some(semester) = &filter.semester {
            builder.push(" AND semester = ");
            builder.push_bind(semester);
        }
        if let Some(assessment_type) = filter.assessment_type {
            builder.push(" AND assessment_type = ");
            builder.push_bind(assessment_type.as_str());
        }
        if let Some(question_type) = filter.question_type {
            builder.push(" AND question_type = ");
            builder.push_bind(question_type.as_str());
        }
        if let Some(question_no) = &filter.question_no {
            builder.push(" AND question_no = ");
            builder.push_bind(question_no);
        }
        if let Some(difficulty) = filter.difficulty {
            builder.push(" AND difficulty_rating_manual = ");
            builder.push_bind(difficulty);
        }
        if !filter.concept_tags.is_empty() {
            // AND logic: the stored tag array must contain every listed tag.
            builder.push(" AND concept_tags @> ");
            builder.push_bind(Json(&filter.concept_tags));
        }

        // order_by went through the whitelist; only known columns reach SQL.
        builder.push(" ORDER BY ");
        builder.push(filter.order_by.column());
        builder.push(match filter.sort {
            SortDir::Asc => " ASC",
            SortDir::Desc => " DESC",
        });
        builder.push(" LIMIT ");
        builder.push_bind(filter.limit);
        builder.push(" OFFSET ");
        builder.push_bind(filter.offset);

        let rows: Vec<QuestionRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut options = self.load_options(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let opts = options.remove(&row.id).unwrap_or_default();
                row_to_record(row, opts)
            })
            .collect())
    }
}
