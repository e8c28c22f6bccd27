use serde::{Deserialize, Serialize};

/// The answer slot for one question position.
///
/// Created on first interaction and mutable until `checked` flips to true;
/// after that `is_correct` is frozen and the only legal change left is the
/// one-time `score_counted` transition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub selected_option: Option<String>,
    pub raw_text: Option<String>,
    pub normalized_text: Option<String>,
    pub skipped: bool,
    pub checked: bool,
    pub is_correct: bool,
    pub score_counted: bool,
}

impl AnswerRecord {
    /// Fresh slot holding a chosen multiple-choice option, not yet checked.
    pub fn with_selection(option: &str) -> Self {
        Self {
            selected_option: Some(option.to_string()),
            ..Self::default()
        }
    }

    /// Fresh slot holding submitted free text, not yet checked.
    pub fn with_text(raw: &str, normalized: String) -> Self {
        Self {
            raw_text: Some(raw.to_string()),
            normalized_text: Some(normalized),
            ..Self::default()
        }
    }

    /// A skipped slot: checked, incorrect, and never eligible for scoring.
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            checked: true,
            ..Self::default()
        }
    }

    /// The learner-visible answer, if the slot holds one.
    pub fn answer_text(&self) -> Option<&str> {
        self.selected_option
            .as_deref()
            .or(self.raw_text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_record_shape() {
        let record = AnswerRecord::skipped();
        assert!(record.skipped);
        assert!(record.checked);
        assert!(!record.is_correct);
        assert!(!record.score_counted);
        assert!(record.answer_text().is_none());
    }

    #[test]
    fn test_answer_text_prefers_selection() {
        let record = AnswerRecord::with_selection("goes");
        assert_eq!(record.answer_text(), Some("goes"));
        let record = AnswerRecord::with_text("  Watches ", "watches".into());
        assert_eq!(record.answer_text(), Some("  Watches "));
    }
}
