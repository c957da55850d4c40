// src/models/draft.rs

use serde::{Deserialize, Serialize};

use crate::models::question::{AssessmentType, QuestionRecord, QuestionType, SaveQuestionRequest};

/// Option as it travels over the wire and sits in storage payloads.
///
/// `is_correct` is optional on purpose: extraction output and legacy records
/// encode correctness only inside the answer string, and the normalizer falls
/// back to parsing it out when the flag is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOption {
    pub label: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

/// Normalized option used internally by the draft model regardless of where
/// the question came from.
///
/// `label` is derived from array position and never independently settable;
/// `id` is stable for the lifetime of the draft session so edits can target
/// an option across relabelings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalOption {
    #[serde(default)]
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// The shared assessment metadata of a batch in grouped mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentMeta {
    pub course: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub assessment_type: Option<AssessmentType>,
}

/// An in-memory, possibly-unsaved question being edited.
///
/// `question_base_id == 0` marks a draft that has not been persisted yet; a
/// successful create replaces the sentinel with the server-assigned id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionDraft {
    pub question_base_id: i64,
    pub question_no: Option<String>,
    pub question_type: Option<QuestionType>,
    pub question_stem: String,
    pub question_stem_html: Option<String>,
    pub options: Vec<CanonicalOption>,
    pub question_answer: String,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub assessment_type: Option<AssessmentType>,
    pub concept_tags: Vec<String>,
    pub question_media: Vec<String>,
    pub difficulty_rating_manual: Option<f64>,
}

impl QuestionDraft {
    /// A blank, unsaved draft.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_persisted(&self) -> bool {
        self.question_base_id != 0
    }

    /// Whether the current type carries an option list.
    pub fn has_options(&self) -> bool {
        self.question_type.is_some_and(QuestionType::has_options)
    }

    /// Serializes the draft into the store contract. A draft whose type was
    /// never committed goes out as "others" so the free-text answer survives.
    pub fn to_request(&self) -> SaveQuestionRequest {
        SaveQuestionRequest {
            course: self.course.clone(),
            year: self.year,
            semester: self.semester.clone(),
            assessment_type: self.assessment_type,
            question_type: self.question_type.unwrap_or(QuestionType::Others),
            question_no: self.question_no.clone(),
            question_stem: self.question_stem.clone(),
            question_stem_html: self.question_stem_html.clone(),
            question_options: self
                .options
                .iter()
                .map(|opt| WireOption {
                    label: opt.label.clone(),
                    text: opt.text.clone(),
                    is_correct: Some(opt.is_correct),
                })
                .collect(),
            question_answer: self.question_answer.clone(),
            concept_tags: self.concept_tags.clone(),
            question_media: self.question_media.clone(),
            difficulty_rating_manual: self.difficulty_rating_manual,
        }
    }

    /// Builds an editable draft from a persisted record, e.g. when search
    /// results are loaded into a batch for bulk edit.
    pub fn from_record(record: &QuestionRecord) -> Self {
        let question_type = Some(record.question_type);
        let options = crate::draft::options::normalize_options(
            &[],
            &record.question_options,
            &record.question_answer,
            question_type,
        );
        let question_answer = if record.question_type.has_options() {
            crate::draft::options::format_answer(&options)
        } else {
            record.question_answer.clone()
        };

        Self {
            question_base_id: record.id,
            question_no: record.question_no.clone(),
            question_type,
            question_stem: record.question_stem.clone(),
            question_stem_html: record.question_stem_html.clone(),
            options,
            question_answer,
            course: record.course.clone(),
            year: record.year,
            semester: record.semester.clone(),
            assessment_type: record.assessment_type,
            concept_tags: record.concept_tags.clone(),
            question_media: record.question_media.clone(),
            difficulty_rating_manual: record.difficulty_rating_manual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;

    fn paris_record() -> QuestionRecord {
        let now = chrono::Utc::now();
        QuestionRecord {
            id: 7,
            question_no: Some("1a".into()),
            question_type: QuestionType::Mcq,
            question_stem: "Capital of France?".into(),
            question_stem_html: None,
            question_options: vec![
                WireOption {
                    label: "A".into(),
                    text: "Paris".into(),
                    is_correct: Some(true),
                },
                WireOption {
                    label: "B".into(),
                    text: "Berlin".into(),
                    is_correct: Some(false),
                },
            ],
            question_answer: "A. Paris".into(),
            course: Some("CS101".into()),
            year: Some(2024),
            semester: Some("S1".into()),
            assessment_type: None,
            difficulty_rating_manual: Some(0.4),
            concept_tags: vec!["geography".into()],
            question_media: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn record_round_trips_through_a_draft() {
        let record = paris_record();
        let draft = QuestionDraft::from_record(&record);

        assert_eq!(draft.question_base_id, 7);
        assert!(draft.is_persisted());
        assert_eq!(draft.options.len(), 2);
        assert!(draft.options[0].is_correct);
        assert_eq!(draft.question_answer, "A. Paris");

        let request = draft.to_request();
        assert_eq!(request.question_type, QuestionType::Mcq);
        assert_eq!(request.question_answer, "A. Paris");
        assert_eq!(request.question_options[0].is_correct, Some(true));
        assert_eq!(request.question_options[1].is_correct, Some(false));
    }

    #[test]
    fn unsaved_draft_with_no_type_saves_as_others() {
        let draft = QuestionDraft {
            question_stem: "Anything".into(),
            ..QuestionDraft::new()
        };
        assert!(!draft.is_persisted());
        assert_eq!(draft.to_request().question_type, QuestionType::Others);
    }
}
