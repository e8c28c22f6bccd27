//! Flat CSV report for a finished quiz.

use chrono::{DateTime, NaiveDate, Utc};

use crate::session::quiz::QuizSession;
use crate::session::results::QuizResults;

/// Answer column for a slot that exists but holds no answer value.
const SKIPPED_ANSWER: &str = "(skipped)";
/// Answer column for a slot the learner never touched.
const NOT_ANSWERED: &str = "(not answered)";

/// `{prefix}-{ISO date}.csv`. Writing the file is a presentation concern.
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{date}.csv")
}

/// Serialize a session into tabular text: one row per question in original
/// order, then a summary block. Fields containing a comma, quote, or newline
/// are quoted with internal quotes doubled.
pub fn csv_report(session: &QuizSession, exported_at: DateTime<Utc>) -> String {
    let results = QuizResults::from_session(session);
    let mut out = String::new();

    out.push_str("Question,Your Answer,Correct Answer,Result\n");

    for (question, record) in session.questions.iter().zip(&session.answers) {
        let answer = match record {
            Some(r) => r.answer_text().unwrap_or(SKIPPED_ANSWER),
            None => NOT_ANSWERED,
        };
        // Unchecked slots carry an answer value but no verdict; they must
        // line up with the summary, which counts neither correct nor
        // incorrect for them.
        let result = match record {
            Some(r) if r.skipped => "Skipped",
            Some(r) if !r.checked => "Not Answered",
            Some(r) if r.is_correct => "Correct",
            Some(_) => "Incorrect",
            None => "Not Answered",
        };

        out.push_str(&escape_field(&question.prompt));
        out.push(',');
        out.push_str(&escape_field(answer));
        out.push(',');
        out.push_str(&escape_field(&question.correct_answer));
        out.push(',');
        out.push_str(result);
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format!("Total Questions,{}\n", results.total));
    out.push_str(&format!("Correct,{}\n", results.correct));
    out.push_str(&format!("Score,{}%\n", results.score_percent));
    out.push_str(&format!("Exported,{}\n", exported_at.format("%Y-%m-%d")));

    out
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
