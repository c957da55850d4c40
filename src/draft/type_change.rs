// src/draft/type_change.rs

use crate::draft::options::{default_options, format_answer};
use crate::models::draft::QuestionDraft;
use crate::models::question::QuestionType;

impl QuestionDraft {
    /// Commits a question-type change and reconciles dependent state.
    ///
    /// * Switching to MCQ/MRQ resets the options to four fresh blanks when
    ///   the draft has none yet or the previous type differed from the
    ///   target, so stale content from a prior type never carries over. The
    ///   answer string is re-derived from whatever options remain.
    /// * Leaving MCQ/MRQ clears the option list and the answer string, so
    ///   the free-text answer field starts clean instead of inheriting a
    ///   formatted option answer.
    /// * `None` is the placeholder menu sentinel, never a committed state:
    ///   passing it leaves the draft untouched.
    pub fn change_question_type(&mut self, next: Option<QuestionType>) {
        let Some(next) = next else {
            tracing::debug!("ignoring attempt to commit the placeholder question type");
            return;
        };

        let previous = self.question_type;
        self.question_type = Some(next);

        if next.has_options() {
            if self.options.is_empty() || previous != Some(next) {
                self.options = default_options();
            }
            self.question_answer = format_answer(&self.options);
        } else if previous.is_some_and(QuestionType::has_options) {
            self.options.clear();
            self.question_answer.clear();
        }
    }
}
