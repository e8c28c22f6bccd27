use serde::{Deserialize, Serialize};

use crate::session::quiz::QuizSession;

/// How many questions share one breakdown bucket.
const SECTION_SIZE: usize = 5;

/// Aggregates derived from a terminal session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResults {
    pub total: usize,
    pub correct: usize,
    /// Checked, not correct, and not skipped.
    pub incorrect: usize,
    pub skipped: usize,
    pub score_percent: u32,
    pub elapsed_secs: i64,
}

impl QuizResults {
    pub fn from_session(session: &QuizSession) -> Self {
        let total = session.total();
        let mut correct = 0;
        let mut incorrect = 0;
        let mut skipped = 0;

        for record in session.answers.iter().flatten() {
            if record.skipped {
                skipped += 1;
            } else if record.is_correct {
                correct += 1;
            } else if record.checked {
                incorrect += 1;
            }
        }

        let ended_at = session.ended_at.unwrap_or(session.started_at);
        Self {
            total,
            correct,
            incorrect,
            skipped,
            score_percent: percent(correct, total),
            elapsed_secs: ended_at
                .signed_duration_since(session.started_at)
                .num_seconds(),
        }
    }
}

/// Per-bucket score over fixed groups of five consecutive questions.
///
/// Sampling discards topic identity, so this positional bucketing is the
/// stand-in for a true per-topic breakdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    /// 1-based position of the first question in the bucket.
    pub first: usize,
    /// 1-based position of the last question in the bucket.
    pub last: usize,
    pub correct: usize,
    pub total: usize,
    pub percent: u32,
}

pub fn section_breakdown(session: &QuizSession) -> Vec<SectionScore> {
    let mut sections = Vec::new();
    for (index, chunk) in session.answers.chunks(SECTION_SIZE).enumerate() {
        let correct = chunk
            .iter()
            .flatten()
            .filter(|r| r.is_correct)
            .count();
        let first = index * SECTION_SIZE + 1;
        sections.push(SectionScore {
            first,
            last: first + chunk.len() - 1,
            correct,
            total: chunk.len(),
            percent: percent(correct, chunk.len()),
        });
    }
    sections
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}
