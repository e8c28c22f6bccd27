use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bank::{Domain, Question, QuestionKind};
use crate::error::QuizError;
use crate::normalize::normalize;
use crate::session::answer::AnswerRecord;

/// What a quiz covers: everything in the domain, or one topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "topic_id", rename_all = "lowercase")]
pub enum QuizScope {
    Overall,
    Topic(u32),
}

/// Mode label recorded in score history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    Overall,
    Topic,
}

impl QuizScope {
    pub fn topic_id(self) -> Option<u32> {
        match self {
            QuizScope::Overall => None,
            QuizScope::Topic(id) => Some(id),
        }
    }

    pub fn mode(self) -> QuizMode {
        match self {
            QuizScope::Overall => QuizMode::Overall,
            QuizScope::Topic(_) => QuizMode::Topic,
        }
    }

    /// Key under which score history for this scope is stored.
    pub fn topic_key(self) -> String {
        match self {
            QuizScope::Overall => "overall".to_string(),
            QuizScope::Topic(id) => id.to_string(),
        }
    }
}

/// Result of a forward navigation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing advanced (no answer yet, or feedback was just revealed).
    Stayed,
    /// Moved to the next question.
    Advanced,
    /// The last question is done; the session should be finished.
    Completed,
}

/// Presentation-ready header state pulled by the rendering layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderStatus {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub score: u32,
    pub progress_percent: u32,
    pub paused: bool,
}

/// The state machine for one quiz attempt.
///
/// Pure state plus transitions: no IO and no clock reads happen here. The
/// engine supplies timestamps and persists a snapshot after each mutating
/// transition, which is why the whole session derives serde.
///
/// Invalid slot transitions (re-answering a checked slot, navigating past the
/// ends) are silent no-ops; the score can only ever grow by one per slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    pub domain: Domain,
    pub scope: QuizScope,
    pub questions: Vec<Question>,
    pub answers: Vec<Option<AnswerRecord>>,
    pub current: usize,
    pub score: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub paused: bool,
}

impl QuizSession {
    /// Build a session over an already-sampled question sequence.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyQuestionSet` if `questions` is empty; a
    /// session with no valid current index is never created.
    pub fn new(
        domain: Domain,
        scope: QuizScope,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuestionSet);
        }

        let answers = vec![None; questions.len()];
        Ok(Self {
            domain,
            scope,
            questions,
            answers,
            current: 0,
            score: 0,
            started_at,
            ended_at: None,
            paused: false,
        })
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn current_answer(&self) -> Option<&AnswerRecord> {
        self.answers[self.current].as_ref()
    }

    fn current_checked(&self) -> bool {
        self.current_answer().is_some_and(|r| r.checked)
    }

    /// Record a multiple-choice selection for the current slot. Selecting
    /// never checks, scores, or advances; the learner can change their mind
    /// until the slot is checked.
    pub fn select_option(&mut self, option: &str) {
        if !self.is_active() || self.current_checked() {
            return;
        }
        if self.current_question().kind != QuestionKind::MultipleChoice {
            return;
        }
        self.answers[self.current] = Some(AnswerRecord::with_selection(option));
    }

    /// Submit free text for the current fill-in slot. Unlike multiple choice,
    /// fill-in answers check themselves immediately.
    pub fn submit_text(&mut self, text: &str) {
        if !self.is_active() || self.current_checked() {
            return;
        }
        if self.current_question().kind != QuestionKind::FillIn {
            return;
        }
        self.answers[self.current] = Some(AnswerRecord::with_text(text, normalize(text)));
        self.check_answer();
    }

    /// Check the current slot: freeze `checked`/`is_correct`, then apply the
    /// exactly-once scoring rule. Safe to call any number of times; the score
    /// for a slot can only ever be counted once, gated on `score_counted`.
    pub fn check_answer(&mut self) {
        if !self.is_active() {
            return;
        }
        let question = &self.questions[self.current];
        let correct_answer = question.correct_answer.clone();
        let kind = question.kind;

        let record = self.answers[self.current].get_or_insert_with(AnswerRecord::default);

        if !record.checked {
            record.checked = true;
            record.is_correct = match kind {
                QuestionKind::MultipleChoice => {
                    record.selected_option.as_deref() == Some(correct_answer.as_str())
                }
                QuestionKind::FillIn => {
                    record.normalized_text.as_deref() == Some(normalize(&correct_answer).as_str())
                }
            };
        }

        if record.is_correct && !record.score_counted {
            record.score_counted = true;
            self.score += 1;
        }
    }

    /// Move forward. An unchecked slot with a pending selection is checked in
    /// place so the learner sees feedback before moving on; an unchecked slot
    /// with nothing chosen stays put. A checked slot advances, or reports
    /// `Completed` on the last question.
    pub fn next(&mut self) -> StepOutcome {
        if !self.is_active() {
            return StepOutcome::Stayed;
        }

        if !self.current_checked() {
            let has_selection = self
                .current_answer()
                .is_some_and(|r| r.selected_option.is_some());
            if has_selection {
                self.check_answer();
            }
            return StepOutcome::Stayed;
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            StepOutcome::Advanced
        } else {
            StepOutcome::Completed
        }
    }

    /// Step back for review. No scoring side effects; allowed regardless of
    /// checked state.
    pub fn previous(&mut self) {
        if self.is_active() && self.current > 0 {
            self.current -= 1;
        }
    }

    /// Skip the current question. The slot becomes checked and incorrect and
    /// never counts toward the score, then the session advances like a
    /// checked `next()`.
    pub fn skip(&mut self) -> StepOutcome {
        if !self.is_active() {
            return StepOutcome::Stayed;
        }
        self.answers[self.current] = Some(AnswerRecord::skipped());

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            StepOutcome::Advanced
        } else {
            StepOutcome::Completed
        }
    }

    /// The engine does not gate input while paused; the flag is the single
    /// source of truth the presentation layer gates on.
    pub fn pause(&mut self) {
        if self.is_active() {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Terminal transition: after this every mutating operation is a no-op.
    pub fn finish(&mut self, ended_at: DateTime<Utc>) {
        if self.ended_at.is_none() {
            self.ended_at = Some(ended_at);
            self.paused = false;
        }
    }

    /// `round((current + 1) / total * 100)`.
    pub fn progress_percent(&self) -> u32 {
        let position = (self.current + 1) as f64;
        (position / self.total() as f64 * 100.0).round() as u32
    }

    pub fn header_status(&self) -> HeaderStatus {
        HeaderStatus {
            position: self.current + 1,
            total: self.total(),
            score: self.score,
            progress_percent: self.progress_percent(),
            paused: self.paused,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::{fill_in, fixed_now, multiple_choice, session_of};

    #[test]
    fn test_empty_question_set_rejected() {
        let err = QuizSession::new(Domain::Grammar, QuizScope::Overall, Vec::new(), fixed_now())
            .unwrap_err();
        assert!(matches!(err, QuizError::EmptyQuestionSet));
    }

    #[test]
    fn test_new_session_shape() {
        let session = session_of(vec![multiple_choice(1), fill_in(2)]);
        assert_eq!(session.current, 0);
        assert_eq!(session.score, 0);
        assert_eq!(session.answers.len(), 2);
        assert!(session.answers.iter().all(Option::is_none));
        assert!(session.is_active());
        assert!(!session.paused);
    }

    #[test]
    fn test_select_then_check_scores_once() {
        let mut session = session_of(vec![multiple_choice(1)]);
        session.select_option("right");
        assert_eq!(session.score, 0, "selection alone never scores");

        session.check_answer();
        assert_eq!(session.score, 1);

        // Repeated checks must never double-count.
        for _ in 0..5 {
            session.check_answer();
        }
        assert_eq!(session.score, 1);
        let record = session.current_answer().unwrap();
        assert!(record.checked);
        assert!(record.is_correct);
        assert!(record.score_counted);
    }

    #[test]
    fn test_select_is_noop_once_checked() {
        let mut session = session_of(vec![multiple_choice(1)]);
        session.select_option("wrong");
        session.check_answer();
        assert!(!session.current_answer().unwrap().is_correct);

        // Changing the answer after feedback is rejected silently.
        session.select_option("right");
        let record = session.current_answer().unwrap();
        assert_eq!(record.selected_option.as_deref(), Some("wrong"));
        assert!(!record.is_correct);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_reselect_before_check_overwrites() {
        let mut session = session_of(vec![multiple_choice(1)]);
        session.select_option("wrong");
        session.select_option("right");
        session.check_answer();
        assert_eq!(session.score, 1);
    }

    #[test]
    fn test_submit_text_self_checks() {
        let mut session = session_of(vec![fill_in(1)]);
        session.submit_text("  The ANSWER. ");
        let record = session.current_answer().unwrap();
        assert!(record.checked);
        assert!(record.is_correct, "normalization should make this match");
        assert_eq!(record.raw_text.as_deref(), Some("  The ANSWER. "));
        assert_eq!(record.normalized_text.as_deref(), Some("the answer"));
        assert_eq!(session.score, 1);

        // A second submit on a checked slot is ignored.
        session.submit_text("something else");
        assert_eq!(
            session.current_answer().unwrap().raw_text.as_deref(),
            Some("  The ANSWER. ")
        );
        assert_eq!(session.score, 1);
    }

    #[test]
    fn test_submit_text_on_multiple_choice_is_noop() {
        let mut session = session_of(vec![multiple_choice(1)]);
        session.submit_text("right");
        assert!(session.current_answer().is_none());
    }

    #[test]
    fn test_select_on_fill_in_is_noop() {
        let mut session = session_of(vec![fill_in(1)]);
        session.select_option("the answer");
        assert!(session.current_answer().is_none());
    }

    #[test]
    fn test_next_forces_feedback_before_advancing() {
        let mut session = session_of(vec![multiple_choice(1), multiple_choice(2)]);
        session.select_option("right");

        // First next() reveals feedback without moving.
        assert_eq!(session.next(), StepOutcome::Stayed);
        assert_eq!(session.current, 0);
        assert!(session.current_answer().unwrap().checked);
        assert_eq!(session.score, 1);

        // Second next() advances.
        assert_eq!(session.next(), StepOutcome::Advanced);
        assert_eq!(session.current, 1);
    }

    #[test]
    fn test_next_with_nothing_chosen_stays() {
        let mut session = session_of(vec![multiple_choice(1), multiple_choice(2)]);
        assert_eq!(session.next(), StepOutcome::Stayed);
        assert_eq!(session.current, 0);
        assert!(session.current_answer().is_none());
    }

    #[test]
    fn test_next_on_last_question_completes() {
        let mut session = session_of(vec![multiple_choice(1)]);
        session.select_option("right");
        session.check_answer();
        assert_eq!(session.next(), StepOutcome::Completed);
        // Completion is reported, not applied; the engine calls finish().
        assert!(session.is_active());
    }

    #[test]
    fn test_previous_bounds_and_review() {
        let mut session = session_of(vec![multiple_choice(1), multiple_choice(2)]);
        session.previous();
        assert_eq!(session.current, 0);

        session.select_option("right");
        session.check_answer();
        session.next();
        assert_eq!(session.current, 1);

        session.previous();
        assert_eq!(session.current, 0);
        assert_eq!(session.score, 1, "review navigation never rescores");
    }

    #[test]
    fn test_skip_never_scores() {
        let mut session = session_of(vec![multiple_choice(1), multiple_choice(2)]);
        assert_eq!(session.skip(), StepOutcome::Advanced);
        let record = session.answers[0].as_ref().unwrap();
        assert!(record.skipped);
        assert!(record.checked);
        assert!(!record.is_correct);
        assert!(!record.score_counted);
        assert_eq!(session.score, 0);

        // Re-checking a skipped slot must stay incorrect and uncounted.
        session.previous();
        session.check_answer();
        assert!(!session.answers[0].as_ref().unwrap().is_correct);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_skip_on_last_question_completes() {
        let mut session = session_of(vec![multiple_choice(1)]);
        assert_eq!(session.skip(), StepOutcome::Completed);
    }

    #[test]
    fn test_pause_resume_flag_only() {
        let mut session = session_of(vec![multiple_choice(1)]);
        session.pause();
        assert!(session.paused);
        assert!(session.header_status().paused);
        session.resume();
        assert!(!session.paused);
    }

    #[test]
    fn test_finish_is_terminal() {
        let mut session = session_of(vec![multiple_choice(1), multiple_choice(2)]);
        session.finish(fixed_now());
        assert!(!session.is_active());

        session.select_option("right");
        session.check_answer();
        assert_eq!(session.next(), StepOutcome::Stayed);
        assert!(session.current_answer().is_none());
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_progress_percent_rounds() {
        let session = session_of(vec![multiple_choice(1), multiple_choice(2), multiple_choice(3)]);
        assert_eq!(session.progress_percent(), 33);
        let status = session.header_status();
        assert_eq!(status.position, 1);
        assert_eq!(status.total, 3);
    }

    #[test]
    fn test_session_snapshot_roundtrip() {
        let mut session = session_of(vec![multiple_choice(1), fill_in(2)]);
        session.select_option("right");
        session.check_answer();
        session.next();

        let json = serde_json::to_string(&session).unwrap();
        let restored: QuizSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
