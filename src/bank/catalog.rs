use crate::bank::{Domain, QuestionSource, Topic};

const GRAMMAR_TOPICS: &str = include_str!("../../assets/grammar.json");
const VOCABULARY_TOPICS: &str = include_str!("../../assets/vocabulary.json");

/// Builtin catalog backed by the datasets embedded at compile time.
pub struct Catalog {
    grammar: Vec<Topic>,
    vocabulary: Vec<Topic>,
}

impl Catalog {
    pub fn load() -> Self {
        let grammar: Vec<Topic> = serde_json::from_str(GRAMMAR_TOPICS).unwrap_or_default();
        let vocabulary: Vec<Topic> = serde_json::from_str(VOCABULARY_TOPICS).unwrap_or_default();

        Self {
            grammar,
            vocabulary,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::load()
    }
}

impl QuestionSource for Catalog {
    fn topics(&self, domain: Domain) -> &[Topic] {
        match domain {
            Domain::Grammar => &self.grammar,
            Domain::Vocabulary => &self.vocabulary,
        }
    }
}
