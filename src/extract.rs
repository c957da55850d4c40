// src/extract.rs
//
// Turns uploaded extraction output into editable drafts. The upload payload
// is the JSON the document-parsing pipeline emits: an array of question
// objects, often wrapped in Markdown code fences and occasionally polluted
// with stray control characters.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::draft::options::{format_answer, normalize_options};
use crate::models::draft::{QuestionDraft, WireOption};
use crate::models::question::QuestionType;

#[derive(Debug)]
pub enum ExtractError {
    InvalidJson(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::InvalidJson(msg) => write!(f, "invalid extraction payload: {}", msg),
        }
    }
}

impl std::error::Error for ExtractError {}

/// One question object as emitted by the extraction pipeline. Everything is
/// lenient: missing fields default rather than failing the whole upload.
#[derive(Debug, Deserialize)]
pub struct ExtractedQuestion {
    #[serde(default)]
    pub question_no: Option<String>,
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub difficulty_rating_manual: Option<f64>,
    #[serde(default)]
    pub question_stem: String,
    #[serde(default)]
    pub question_options: Vec<WireOption>,
    #[serde(default)]
    pub question_answer: Option<String>,
    #[serde(default)]
    pub concept_tags: Vec<String>,
    #[serde(default)]
    pub page_image_paths: Vec<String>,
}

/// Strips a Markdown code fence from around a payload.
///
/// Extraction output frequently arrives as
/// ```` ```json\n[ ... ]\n``` ````; this takes the fenced body and drops a
/// leading "json" language line. Text without a fence passes through.
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }
    let parts: Vec<&str> = text.split("```").collect();
    if parts.len() < 3 {
        return text.to_string();
    }
    let inner = parts[1];
    let inner = if inner.trim_start().starts_with("json") {
        match inner.split_once('\n') {
            Some((_lang, rest)) => rest,
            None => "",
        }
    } else {
        inner
    };
    inner.trim().to_string()
}

fn control_char_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\x00-\x1f\x7f-\x9f]").expect("control pattern is valid"))
}

/// Removes stray control characters that would make the JSON unparseable.
pub fn scrub_control_chars(text: &str) -> String {
    control_char_pattern().replace_all(text, "").into_owned()
}

/// Parses an uploaded extraction document into normalized drafts.
///
/// A single top-level object is accepted and treated as a one-element
/// array. Every draft comes back unsaved (`question_base_id = 0`) with its
/// option list in canonical form and the answer string re-derived for
/// option-bearing types.
pub fn parse_extracted(raw: &str) -> Result<Vec<QuestionDraft>, ExtractError> {
    let cleaned = scrub_control_chars(&strip_code_fences(raw));

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|err| ExtractError::InvalidJson(err.to_string()))?;
    let items: Vec<ExtractedQuestion> = match value {
        Value::Array(_) => serde_json::from_value(value)
            .map_err(|err| ExtractError::InvalidJson(err.to_string()))?,
        other => vec![
            serde_json::from_value(other)
                .map_err(|err| ExtractError::InvalidJson(err.to_string()))?,
        ],
    };

    tracing::info!(count = items.len(), "parsed extraction payload");
    Ok(items.into_iter().map(draft_from_extracted).collect())
}

fn draft_from_extracted(item: ExtractedQuestion) -> QuestionDraft {
    let question_type = item.question_type.as_deref().and_then(|value| {
        let parsed = QuestionType::parse(value);
        if parsed.is_none() {
            tracing::warn!(value, "unrecognized question type in extraction payload");
        }
        parsed
    });

    let answer = item.question_answer.unwrap_or_default();
    let options = normalize_options(&[], &item.question_options, &answer, question_type);
    let question_answer = if question_type.is_some_and(QuestionType::has_options) {
        format_answer(&options)
    } else {
        answer
    };

    QuestionDraft {
        question_base_id: 0,
        question_no: item.question_no,
        question_type,
        question_stem: item.question_stem,
        question_stem_html: None,
        options,
        question_answer,
        course: None,
        year: None,
        semester: None,
        assessment_type: None,
        concept_tags: item.concept_tags,
        question_media: item.page_image_paths,
        difficulty_rating_manual: item
            .difficulty_rating_manual
            .filter(|value| (0.0..=1.0).contains(value)),
    }
}
