//! Read-only question catalog: topics, questions, and the sampling contract.

pub mod catalog;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

pub use catalog::Catalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Grammar,
    Vocabulary,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Grammar => "grammar",
            Domain::Vocabulary => "vocabulary",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "fill-in")]
    FillIn,
}

/// One quiz item. Immutable after load; `options` is empty for fill-in
/// questions. Questions ride inside session checkpoints, hence serde.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// Bilingual example sentence attached to a topic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExamplePair {
    pub source: String,
    pub translation: String,
}

/// A lesson unit: id unique per domain, plus its question set. The
/// explanation/form/keywords/common-mistakes/examples fields are reference
/// material passed through to the presentation layer untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub common_mistakes: Vec<String>,
    #[serde(default)]
    pub examples: Vec<ExamplePair>,
}

/// Read-only source of topics and sampled question sets.
///
/// Sampling is a provided method so every implementation keeps the same
/// contract: gather the scope's questions, uniformly shuffle the whole pool,
/// then truncate to `limit` (truncation happens after the shuffle, never
/// before).
pub trait QuestionSource {
    fn topics(&self, domain: Domain) -> &[Topic];

    fn topic(&self, domain: Domain, id: u32) -> Option<&Topic> {
        self.topics(domain).iter().find(|t| t.id == id)
    }

    fn sample_questions(
        &self,
        domain: Domain,
        topic_id: Option<u32>,
        limit: usize,
        rng: &mut SmallRng,
    ) -> Vec<Question> {
        let mut pool: Vec<Question> = match topic_id {
            Some(id) => self
                .topic(domain, id)
                .map(|t| t.questions.clone())
                .unwrap_or_default(),
            None => self
                .topics(domain)
                .iter()
                .flat_map(|t| t.questions.iter().cloned())
                .collect(),
        };

        pool.shuffle(rng);
        pool.truncate(limit);
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn question(id: u32) -> Question {
        Question {
            id,
            kind: QuestionKind::MultipleChoice,
            prompt: format!("q{id}"),
            options: vec!["a".into(), "b".into()],
            correct_answer: "a".into(),
            explanation: String::new(),
        }
    }

    fn topic(id: u32, question_ids: &[u32]) -> Topic {
        Topic {
            id,
            title: format!("t{id}"),
            description: String::new(),
            questions: question_ids.iter().map(|&q| question(q)).collect(),
            explanation: None,
            form: None,
            keywords: Vec::new(),
            common_mistakes: Vec::new(),
            examples: Vec::new(),
        }
    }

    struct FixedBank {
        topics: Vec<Topic>,
    }

    impl QuestionSource for FixedBank {
        fn topics(&self, _domain: Domain) -> &[Topic] {
            &self.topics
        }
    }

    #[test]
    fn test_sample_truncates_after_shuffle() {
        let bank = FixedBank {
            topics: vec![topic(1, &(1..=20).collect::<Vec<_>>())],
        };
        // Across a handful of seeds the leading questions must differ; a
        // truncate-before-shuffle bug would always return ids 1..=5.
        let mut saw_late_id = false;
        for seed in 0..10 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let sample = bank.sample_questions(Domain::Grammar, None, 5, &mut rng);
            assert_eq!(sample.len(), 5);
            if sample.iter().any(|q| q.id > 5) {
                saw_late_id = true;
            }
        }
        assert!(saw_late_id, "sampling never reached past the first 5 ids");
    }

    #[test]
    fn test_sample_scoped_to_topic() {
        let bank = FixedBank {
            topics: vec![topic(1, &[101, 102, 103]), topic(2, &[201, 202])],
        };
        let mut rng = SmallRng::seed_from_u64(7);
        let sample = bank.sample_questions(Domain::Vocabulary, Some(2), 10, &mut rng);
        assert_eq!(sample.len(), 2);
        assert!(sample.iter().all(|q| q.id / 100 == 2));
    }

    #[test]
    fn test_sample_unknown_topic_is_empty() {
        let bank = FixedBank {
            topics: vec![topic(1, &[101])],
        };
        let mut rng = SmallRng::seed_from_u64(0);
        let sample = bank.sample_questions(Domain::Grammar, Some(99), 10, &mut rng);
        assert!(sample.is_empty());
    }

    #[test]
    fn test_topic_lookup() {
        let bank = FixedBank {
            topics: vec![topic(1, &[101]), topic(2, &[201])],
        };
        assert_eq!(bank.topic(Domain::Grammar, 2).unwrap().id, 2);
        assert!(bank.topic(Domain::Grammar, 3).is_none());
    }
}
