//! One quiz attempt: answer slots, the session state machine, and the
//! aggregates derived from a finished session.

pub mod answer;
pub mod quiz;
pub mod results;

pub use answer::AnswerRecord;
#[cfg(test)]
pub(crate) use quiz::test_support;
pub use quiz::{HeaderStatus, QuizMode, QuizScope, QuizSession, StepOutcome};
pub use results::{QuizResults, SectionScore, section_breakdown};
