// src/draft/options.rs

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::models::draft::{CanonicalOption, QuestionDraft, WireOption};
use crate::models::question::QuestionType;

/// Label for the option at `position`: A, B, ... Z, then AA, AB, ...
pub fn option_label(position: usize) -> String {
    let mut label = String::new();
    let mut n = position;
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

/// Session-unique option id, so freshly added options never collide with ids
/// already present in a loaded record.
fn new_option_id() -> String {
    format!("opt-{}", Uuid::new_v4())
}

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // A single uppercase letter followed by a period, e.g. "A." or "C.".
    PATTERN.get_or_init(|| Regex::new(r"\b([A-Z])\.").expect("label pattern is valid"))
}

/// Fallback parser for legacy string-encoded answers ("A. Paris, C. Lyon").
///
/// This is a heuristic: free text that happens to contain "X." patterns will
/// match too, so it only runs when an option carries no explicit correctness
/// flag, and it logs whenever it recovers anything.
pub fn parse_answer_labels(answer: &str) -> HashSet<String> {
    let labels: HashSet<String> = label_pattern()
        .captures_iter(answer)
        .map(|cap| cap[1].to_string())
        .collect();
    if !labels.is_empty() {
        tracing::debug!(
            ?labels,
            "recovered option correctness from a legacy answer string"
        );
    }
    labels
}

/// Four blank options labeled A-D, none correct.
pub fn default_options() -> Vec<CanonicalOption> {
    (0..4)
        .map(|position| CanonicalOption {
            id: new_option_id(),
            label: option_label(position),
            text: String::new(),
            is_correct: false,
        })
        .collect()
}

/// Derives the canonical option list for a draft.
///
/// * Non-option question types get an empty list.
/// * A non-empty locally-edited list is authoritative and returned unchanged,
///   so in-progress edits are never clobbered by stale source data.
/// * Otherwise each source option maps to a canonical one. An explicit
///   `is_correct` flag wins; without one, correctness comes from the
///   label-parsing fallback over the answer string.
/// * Zero mapped options fall back to four blank defaults.
///
/// Pure function: callers re-derive dependent state (the answer string)
/// after any structural change.
pub fn normalize_options(
    existing: &[CanonicalOption],
    source: &[WireOption],
    answer: &str,
    question_type: Option<QuestionType>,
) -> Vec<CanonicalOption> {
    if !question_type.is_some_and(QuestionType::has_options) {
        return Vec::new();
    }
    if !existing.is_empty() {
        return existing.to_vec();
    }

    let mut parsed_labels: Option<HashSet<String>> = None;
    let mut out = Vec::with_capacity(source.len());
    for (position, src) in source.iter().enumerate() {
        let is_correct = match src.is_correct {
            Some(flag) => flag,
            None => parsed_labels
                .get_or_insert_with(|| parse_answer_labels(answer))
                .contains(src.label.trim()),
        };
        out.push(CanonicalOption {
            id: new_option_id(),
            label: option_label(position),
            text: src.text.clone(),
            is_correct,
        });
    }

    if out.is_empty() {
        return default_options();
    }
    out
}

/// Persisted answer representation for an option list: comma-joined
/// `"<label>. <text>"` over the correct, non-empty options.
pub fn format_answer(options: &[CanonicalOption]) -> String {
    options
        .iter()
        .filter(|opt| opt.is_correct && !opt.text.trim().is_empty())
        .map(|opt| format!("{}. {}", opt.label, opt.text.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Appends a blank option with the next sequential label.
pub fn add_option(options: &[CanonicalOption]) -> Vec<CanonicalOption> {
    let mut next = options.to_vec();
    next.push(CanonicalOption {
        id: new_option_id(),
        label: option_label(options.len()),
        text: String::new(),
        is_correct: false,
    });
    next
}

/// Removes one option and relabels the survivors to A, B, C... by position.
///
/// Correctness tracking survives relabeling because it rides on the option,
/// not on the label. Deleting the last remaining option is rejected: the
/// list is returned unchanged and the refusal is logged.
pub fn delete_option(options: &[CanonicalOption], option_id: &str) -> Vec<CanonicalOption> {
    if options.len() < 2 {
        tracing::warn!(option_id, "refusing to delete the last remaining option");
        return options.to_vec();
    }

    let mut next: Vec<CanonicalOption> = options
        .iter()
        .filter(|opt| opt.id != option_id)
        .cloned()
        .collect();
    if next.len() == options.len() {
        // Unknown id, nothing to do.
        return next;
    }
    for (position, opt) in next.iter_mut().enumerate() {
        opt.label = option_label(position);
    }
    next
}

/// Updates one option's text in place.
pub fn set_option_text(
    options: &[CanonicalOption],
    option_id: &str,
    text: &str,
) -> Vec<CanonicalOption> {
    options
        .iter()
        .map(|opt| {
            if opt.id == option_id {
                CanonicalOption {
                    text: text.to_string(),
                    ..opt.clone()
                }
            } else {
                opt.clone()
            }
        })
        .collect()
}

/// Sets or toggles correctness depending on the question type.
///
/// MCQ has radio semantics: the target becomes the single correct option.
/// MRQ has checkbox semantics: only the target's flag flips.
pub fn toggle_correct(
    options: &[CanonicalOption],
    option_id: &str,
    question_type: QuestionType,
) -> Vec<CanonicalOption> {
    options
        .iter()
        .map(|opt| {
            let is_correct = match question_type {
                QuestionType::Mcq => opt.id == option_id,
                QuestionType::Mrq if opt.id == option_id => !opt.is_correct,
                _ => opt.is_correct,
            };
            CanonicalOption {
                is_correct,
                ..opt.clone()
            }
        })
        .collect()
}

impl QuestionDraft {
    /// Re-derives the answer string from the option list. Only meaningful
    /// for option-bearing types; free-text answers are left alone.
    pub fn refresh_answer(&mut self) {
        if self.has_options() {
            self.question_answer = format_answer(&self.options);
        }
    }

    pub fn add_option(&mut self) {
        if !self.has_options() {
            tracing::debug!("ignoring option add on a non-option question type");
            return;
        }
        self.options = add_option(&self.options);
        self.refresh_answer();
    }

    pub fn delete_option(&mut self, option_id: &str) {
        if !self.has_options() {
            return;
        }
        self.options = delete_option(&self.options, option_id);
        self.refresh_answer();
    }

    pub fn set_option_text(&mut self, option_id: &str, text: &str) {
        self.options = set_option_text(&self.options, option_id, text);
        self.refresh_answer();
    }

    pub fn toggle_correct(&mut self, option_id: &str) {
        let Some(question_type) = self.question_type.filter(|qt| qt.has_options()) else {
            tracing::debug!("ignoring correctness toggle on a non-option question type");
            return;
        };
        self.options = toggle_correct(&self.options, option_id, question_type);
        self.refresh_answer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, label: &str, text: &str, is_correct: bool) -> CanonicalOption {
        CanonicalOption {
            id: id.to_string(),
            label: label.to_string(),
            text: text.to_string(),
            is_correct,
        }
    }

    fn three_cities() -> Vec<CanonicalOption> {
        vec![
            option("o1", "A", "Paris", true),
            option("o2", "B", "Berlin", false),
            option("o3", "C", "Lyon", true),
        ]
    }

    #[test]
    fn labels_follow_the_alphabet() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(3), "D");
        assert_eq!(option_label(25), "Z");
        assert_eq!(option_label(26), "AA");
        assert_eq!(option_label(27), "AB");
    }

    #[test]
    fn format_joins_correct_nonempty_options() {
        assert_eq!(format_answer(&three_cities()), "A. Paris, C. Lyon");
    }

    #[test]
    fn format_skips_blank_text_and_handles_empty_input() {
        let options = vec![
            option("o1", "A", "   ", true),
            option("o2", "B", "", true),
        ];
        assert_eq!(format_answer(&options), "");
        assert_eq!(format_answer(&[]), "");
    }

    #[test]
    fn parse_recovers_labels_from_legacy_answers() {
        let labels = parse_answer_labels("A. Paris, C. Lyon");
        assert!(labels.contains("A"));
        assert!(labels.contains("C"));
        assert!(!labels.contains("B"));
        assert!(parse_answer_labels("forty-two").is_empty());
    }

    #[test]
    fn normalize_returns_empty_for_free_text_types() {
        let source = vec![WireOption {
            label: "A".into(),
            text: "Paris".into(),
            is_correct: None,
        }];
        assert!(normalize_options(&[], &source, "A. Paris", Some(QuestionType::OpenEnded)).is_empty());
        assert!(normalize_options(&[], &source, "A. Paris", None).is_empty());
    }

    #[test]
    fn normalize_keeps_local_edits_authoritative() {
        let existing = three_cities();
        let stale = vec![WireOption {
            label: "A".into(),
            text: "Madrid".into(),
            is_correct: None,
        }];
        let out = normalize_options(&existing, &stale, "", Some(QuestionType::Mcq));
        assert_eq!(out, existing);
    }

    #[test]
    fn normalize_marks_correctness_from_the_answer_string() {
        let source = vec![
            WireOption { label: "A".into(), text: "Paris".into(), is_correct: None },
            WireOption { label: "B".into(), text: "Berlin".into(), is_correct: None },
            WireOption { label: "C".into(), text: "Lyon".into(), is_correct: None },
        ];
        let out = normalize_options(&[], &source, "A. Paris, C. Lyon", Some(QuestionType::Mrq));
        assert_eq!(
            out.iter().map(|o| o.is_correct).collect::<Vec<_>>(),
            vec![true, false, true]
        );
        assert_eq!(
            out.iter().map(|o| o.label.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn normalize_prefers_explicit_flags_over_the_fallback() {
        let source = vec![
            WireOption { label: "A".into(), text: "Paris".into(), is_correct: Some(false) },
            WireOption { label: "B".into(), text: "Berlin".into(), is_correct: Some(true) },
        ];
        // The answer string claims A, but the explicit flags say otherwise.
        let out = normalize_options(&[], &source, "A. Paris", Some(QuestionType::Mcq));
        assert!(!out[0].is_correct);
        assert!(out[1].is_correct);
    }

    #[test]
    fn normalize_falls_back_to_four_blanks() {
        let out = normalize_options(&[], &[], "", Some(QuestionType::Mcq));
        assert_eq!(out.len(), 4);
        assert_eq!(
            out.iter().map(|o| o.label.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C", "D"]
        );
        assert!(out.iter().all(|o| !o.is_correct && o.text.is_empty()));
    }

    #[test]
    fn delete_relabels_survivors_in_order() {
        for victim in ["o1", "o2", "o3"] {
            let out = delete_option(&three_cities(), victim);
            assert_eq!(out.len(), 2);
            assert_eq!(
                out.iter().map(|o| o.label.as_str()).collect::<Vec<_>>(),
                vec!["A", "B"]
            );
        }
    }

    #[test]
    fn delete_preserves_correctness_by_position_not_label() {
        // Deleting A promotes Lyon from C to B; it must stay correct.
        let out = delete_option(&three_cities(), "o1");
        let lyon = out.iter().find(|o| o.text == "Lyon").expect("Lyon survives");
        assert_eq!(lyon.label, "B");
        assert!(lyon.is_correct);
    }

    #[test]
    fn deleting_the_last_option_is_a_no_op() {
        let single = vec![option("o1", "A", "Paris", true)];
        let out = delete_option(&single, "o1");
        assert_eq!(out, single);
    }

    #[test]
    fn deleting_an_unknown_id_changes_nothing() {
        let out = delete_option(&three_cities(), "nope");
        assert_eq!(out, three_cities());
    }

    #[test]
    fn add_appends_a_blank_with_the_next_label() {
        let out = add_option(&three_cities());
        assert_eq!(out.len(), 4);
        assert_eq!(out[3].label, "D");
        assert!(out[3].text.is_empty());
        assert!(!out[3].is_correct);
        assert!(out.iter().take(3).all(|o| !o.id.is_empty()));
        assert_ne!(out[3].id, "");
    }

    #[test]
    fn mcq_toggle_has_radio_semantics() {
        let mut options = three_cities();
        // Regardless of prior state, toggling X leaves exactly X correct.
        for target in ["o2", "o1", "o2"] {
            options = toggle_correct(&options, target, QuestionType::Mcq);
            let correct: Vec<&str> = options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.id.as_str())
                .collect();
            assert_eq!(correct, vec![target]);
        }
    }

    #[test]
    fn mrq_toggle_flips_only_the_target() {
        let before = three_cities();
        let after = toggle_correct(&before, "o2", QuestionType::Mrq);
        assert!(after[1].is_correct);
        assert_eq!(after[0].is_correct, before[0].is_correct);
        assert_eq!(after[2].is_correct, before[2].is_correct);

        let again = toggle_correct(&after, "o2", QuestionType::Mrq);
        assert!(!again[1].is_correct);
    }

    #[test]
    fn format_normalize_round_trip_is_stable() {
        for question_type in [QuestionType::Mcq, QuestionType::Mrq] {
            let options = three_cities();
            let answer = format_answer(&options);
            let wire: Vec<WireOption> = options
                .iter()
                .map(|o| WireOption {
                    label: o.label.clone(),
                    text: o.text.clone(),
                    is_correct: None,
                })
                .collect();
            let normalized = normalize_options(&[], &wire, &answer, Some(question_type));
            assert_eq!(format_answer(&normalized), answer);
        }
    }

    #[test]
    fn draft_mutators_keep_the_answer_in_sync() {
        let mut draft = QuestionDraft {
            question_type: Some(QuestionType::Mcq),
            options: three_cities(),
            ..QuestionDraft::new()
        };
        draft.refresh_answer();
        assert_eq!(draft.question_answer, "A. Paris, C. Lyon");

        draft.toggle_correct("o2");
        assert_eq!(draft.question_answer, "B. Berlin");

        draft.set_option_text("o2", "Hamburg");
        assert_eq!(draft.question_answer, "B. Hamburg");

        draft.delete_option("o1");
        // Hamburg moves up to A and stays the single correct option.
        assert_eq!(draft.question_answer, "A. Hamburg");
    }

    #[test]
    fn free_text_answers_are_never_overwritten() {
        let mut draft = QuestionDraft {
            question_type: Some(QuestionType::Coding),
            question_answer: "fn main() {}".into(),
            ..QuestionDraft::new()
        };
        draft.refresh_answer();
        draft.add_option();
        assert!(draft.options.is_empty());
        assert_eq!(draft.question_answer, "fn main() {}");
    }
}
