// src/handlers/search.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::question::{AssessmentType, OrderBy, QuestionFilter, QuestionType, SortDir},
    state::AppState,
};

/// Query parameters for `/getquestion`, named after the original read
/// endpoint's contract.
#[derive(Debug, Deserialize)]
pub struct GetQuestionParams {
    pub course: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub assessment_type: Option<String>,
    pub question_type: Option<String>,
    pub question_no: Option<String>,
    pub difficulty_level: Option<f64>,
    /// Comma-separated; all listed tags must be present on a match.
    pub concept_tags: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Option<String>,
    pub sort: Option<String>,
}

/// Query parameters for `/search`: a keyword over the stem plus the same
/// filters (the year filter is spelled `academic_year` here).
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub course: Option<String>,
    pub academic_year: Option<i32>,
    pub semester: Option<String>,
    pub assessment_type: Option<String>,
    pub question_type: Option<String>,
    pub concept_tags: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Option<String>,
    pub sort: Option<String>,
}

fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_assessment_type(raw: Option<&str>) -> Result<Option<AssessmentType>, AppError> {
    match raw {
        None => Ok(None),
        Some(value) => AssessmentType::parse(value).map(Some).ok_or_else(|| {
            AppError::BadRequest(format!("Unknown assessment type '{}'", value))
        }),
    }
}

fn parse_question_type(raw: Option<&str>) -> Result<Option<QuestionType>, AppError> {
    match raw {
        None => Ok(None),
        Some(value) => QuestionType::parse(value)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown question type '{}'", value))),
    }
}

impl GetQuestionParams {
    fn into_filter(self) -> Result<QuestionFilter, AppError> {
        Ok(QuestionFilter {
            keyword: None,
            course: self.course,
            year: self.year,
            semester: self.semester,
            assessment_type: parse_assessment_type(self.assessment_type.as_deref())?,
            question_type: parse_question_type(self.question_type.as_deref())?,
            question_no: self.question_no,
            difficulty: self.difficulty_level,
            concept_tags: split_tags(self.concept_tags.as_deref()),
            limit: self.limit.unwrap_or(QuestionFilter::DEFAULT_LIMIT),
            offset: self.offset.unwrap_or(0),
            order_by: OrderBy::from_param(self.order_by.as_deref()),
            sort: SortDir::from_param(self.sort.as_deref()),
        })
    }
}

impl SearchParams {
    fn into_filter(self) -> Result<QuestionFilter, AppError> {
        Ok(QuestionFilter {
            keyword: self.keyword.filter(|keyword| !keyword.trim().is_empty()),
            course: self.course,
            year: self.academic_year,
            semester: self.semester,
            assessment_type: parse_assessment_type(self.assessment_type.as_deref())?,
            question_type: parse_question_type(self.question_type.as_deref())?,
            question_no: None,
            difficulty: None,
            concept_tags: split_tags(self.concept_tags.as_deref()),
            limit: self.limit.unwrap_or(QuestionFilter::DEFAULT_LIMIT),
            offset: self.offset.unwrap_or(0),
            order_by: OrderBy::from_param(self.order_by.as_deref()),
            sort: SortDir::from_param(self.sort.as_deref()),
        })
    }
}

/// Filterable read endpoint over the question bank.
pub async fn get_questions(
    State(state): State<AppState>,
    Query(params): Query<GetQuestionParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = params.into_filter()?;
    let items = state.store.list_questions(&filter).await?;

    Ok(Json(
        serde_json::json!({"total": items.len(), "items": items}),
    ))
}

/// Keyword search over question stems, with the same filters.
pub async fn search_questions(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = params.into_filter()?;
    let items = state.store.list_questions(&filter).await?;

    Ok(Json(
        serde_json::json!({"total": items.len(), "items": items}),
    ))
}
