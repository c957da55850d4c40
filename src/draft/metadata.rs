// src/draft/metadata.rs

use crate::models::draft::{AssessmentMeta, QuestionDraft};

fn filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Whether the draft carries any assessment metadata at all.
fn has_any_meta(draft: &QuestionDraft) -> bool {
    filled(draft.course.as_deref())
        || draft.year.is_some()
        || filled(draft.semester.as_deref())
        || draft.assessment_type.is_some()
}

/// Whether all four assessment fields are present on the draft.
fn has_full_meta(draft: &QuestionDraft) -> bool {
    filled(draft.course.as_deref())
        && draft.year.is_some()
        && filled(draft.semester.as_deref())
        && draft.assessment_type.is_some()
}

/// Whether a batch shares uniform assessment metadata, i.e. qualifies for
/// grouped-assessment editing.
///
/// An empty batch is not grouped. A batch whose first draft carries no
/// metadata at all is not grouped either, even though it is trivially
/// uniform — that asymmetry is inherited behavior and kept deliberately.
/// Otherwise every draft must match the first on all four fields, and all
/// four must be non-null on every draft.
pub fn is_uniform(drafts: &[QuestionDraft]) -> bool {
    let Some(first) = drafts.first() else {
        return false;
    };
    if !has_any_meta(first) {
        return false;
    }
    drafts.iter().all(|draft| {
        has_full_meta(draft)
            && draft.course == first.course
            && draft.year == first.year
            && draft.semester == first.semester
            && draft.assessment_type == first.assessment_type
    })
}

/// Shared metadata for the batch: pre-filled from the first draft when the
/// batch is uniform, cleared otherwise (per-question values govern).
pub fn shared_meta_for(drafts: &[QuestionDraft]) -> AssessmentMeta {
    if !is_uniform(drafts) {
        return AssessmentMeta::default();
    }
    let first = &drafts[0];
    AssessmentMeta {
        course: first.course.clone(),
        year: first.year,
        semester: first.semester.clone(),
        assessment_type: first.assessment_type,
    }
}

/// Applies shared metadata to every draft in the batch.
///
/// This is an explicit, on-demand operation: shared metadata never
/// broadcasts into drafts as a side effect of unrelated edits.
pub fn apply_meta(drafts: &mut [QuestionDraft], meta: &AssessmentMeta) {
    for draft in drafts.iter_mut() {
        draft.course = meta.course.clone();
        draft.year = meta.year;
        draft.semester = meta.semester.clone();
        draft.assessment_type = meta.assessment_type;
    }
}
