// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::models::draft::WireOption;

/// Question kind, modeled as a closed set rather than a free-form string so
/// that handlers and the draft core can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    OpenEnded,
    Coding,
    Others,
    FillInTheBlanks,
    Mcq,
    Mrq,
}

impl QuestionType {
    /// MCQ and MRQ carry an option list; every other kind is free-text.
    pub fn has_options(self) -> bool {
        matches!(self, QuestionType::Mcq | QuestionType::Mrq)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::OpenEnded => "open-ended",
            QuestionType::Coding => "coding",
            QuestionType::Others => "others",
            QuestionType::FillInTheBlanks => "fill-in-the-blanks",
            QuestionType::Mcq => "mcq",
            QuestionType::Mrq => "mrq",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open-ended" => Some(QuestionType::OpenEnded),
            "coding" => Some(QuestionType::Coding),
            "others" => Some(QuestionType::Others),
            "fill-in-the-blanks" => Some(QuestionType::FillInTheBlanks),
            "mcq" => Some(QuestionType::Mcq),
            "mrq" => Some(QuestionType::Mrq),
            _ => None,
        }
    }
}

/// Assessment a question was originally set for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
    Final,
    Midterm,
    Quiz,
    Assignment,
    Other,
    Unknown,
}

impl AssessmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentType::Final => "final",
            AssessmentType::Midterm => "midterm",
            AssessmentType::Quiz => "quiz",
            AssessmentType::Assignment => "assignment",
            AssessmentType::Other => "other",
            AssessmentType::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "final" => Some(AssessmentType::Final),
            "midterm" => Some(AssessmentType::Midterm),
            "quiz" => Some(AssessmentType::Quiz),
            "assignment" => Some(AssessmentType::Assignment),
            "other" => Some(AssessmentType::Other),
            "unknown" => Some(AssessmentType::Unknown),
            _ => None,
        }
    }
}

/// Represents the 'questions' table in the database.
///
/// Type columns stay TEXT at this level; conversion into the enums happens
/// when a row is assembled into a [`QuestionRecord`], so a legacy row with an
/// unrecognized value degrades instead of failing the whole query.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub question_no: Option<String>,
    pub question_type: String,
    pub question_stem: String,
    pub question_stem_html: Option<String>,
    pub question_answer: String,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub assessment_type: Option<String>,
    pub difficulty_rating_manual: Option<f64>,

    /// Concept tags, stored as a JSON array in the database.
    pub concept_tags: Json<Vec<String>>,

    /// Page-image paths attached to the question.
    pub question_media: Json<Vec<String>>,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Fully assembled question as returned by the read endpoints: the row plus
/// its option list, with type columns decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    pub question_no: Option<String>,
    pub question_type: QuestionType,
    pub question_stem: String,
    pub question_stem_html: Option<String>,
    pub question_options: Vec<WireOption>,
    pub question_answer: String,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub assessment_type: Option<AssessmentType>,
    pub difficulty_rating_manual: Option<f64>,
    pub concept_tags: Vec<String>,
    pub question_media: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating or replacing a question. This is also the contract the
/// draft batch serializes each draft into before handing it to the store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveQuestionRequest {
    #[validate(length(max = 20))]
    pub course: Option<String>,
    pub year: Option<i32>,
    #[validate(length(max = 20))]
    pub semester: Option<String>,
    pub assessment_type: Option<AssessmentType>,

    pub question_type: QuestionType,

    #[validate(length(max = 20))]
    pub question_no: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Question stem must not be empty."))]
    pub question_stem: String,

    #[validate(length(max = 50000))]
    pub question_stem_html: Option<String>,

    #[serde(default)]
    #[validate(custom(function = validate_options))]
    pub question_options: Vec<WireOption>,

    #[serde(default)]
    pub question_answer: String,

    #[serde(default)]
    #[validate(custom(function = validate_concept_tags))]
    pub concept_tags: Vec<String>,

    #[serde(default)]
    pub question_media: Vec<String>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub difficulty_rating_manual: Option<f64>,
}

fn validate_options(options: &[WireOption]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.text.len() > 2000 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
        if opt.label.len() > 4 {
            return Err(validator::ValidationError::new("option_label_too_long"));
        }
    }
    Ok(())
}

fn validate_concept_tags(tags: &[String]) -> Result<(), validator::ValidationError> {
    if tags.len() > 20 {
        return Err(validator::ValidationError::new("too_many_tags"));
    }
    for tag in tags {
        if tag.len() > 100 {
            return Err(validator::ValidationError::new("tag_too_long"));
        }
    }
    Ok(())
}

/// Sort column whitelist for the list endpoints. Whatever the caller sends,
/// only these three columns ever reach the ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    CreatedAt,
    Difficulty,
    #[default]
    UpdatedAt,
}

impl OrderBy {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("created_at") => OrderBy::CreatedAt,
            Some("difficulty") => OrderBy::Difficulty,
            _ => OrderBy::UpdatedAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            OrderBy::CreatedAt => "created_at",
            OrderBy::Difficulty => "difficulty_rating_manual",
            OrderBy::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => SortDir::Asc,
            _ => SortDir::Desc,
        }
    }
}

/// Resolved filter set shared by `/getquestion` and `/search`.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    /// Case-insensitive substring match over the question stem.
    pub keyword: Option<String>,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub assessment_type: Option<AssessmentType>,
    pub question_type: Option<QuestionType>,
    pub question_no: Option<String>,
    pub difficulty: Option<f64>,
    /// AND logic: every listed tag must be present on a matching question.
    pub concept_tags: Vec<String>,
    pub limit: i64,
    pub offset: i64,
    pub order_by: OrderBy,
    pub sort: SortDir,
}

impl QuestionFilter {
    /// Default page size, matching the read endpoint's historical behavior.
    pub const DEFAULT_LIMIT: i64 = 50;
}
