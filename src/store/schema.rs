use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bank::Domain;
use crate::session::quiz::{QuizMode, QuizSession};

pub const SCHEMA_VERSION: u32 = 1;

/// How long a checkpoint stays resumable. Strictly older is discarded.
pub const CHECKPOINT_MAX_AGE_HOURS: i64 = 24;

/// Score history entries kept per key; the oldest is evicted first.
pub const HISTORY_LIMIT: usize = 10;

/// Snapshot of an in-flight session, written after every mutating transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointData {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub session: QuizSession,
}

impl CheckpointData {
    pub fn new(session: QuizSession, saved_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at,
            session,
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.saved_at) > Duration::hours(CHECKPOINT_MAX_AGE_HOURS)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistoryEntry {
    /// Score percentage, 0-100.
    pub score: u32,
    pub timestamp: DateTime<Utc>,
    pub mode: QuizMode,
}

/// Completed-quiz score history, keyed `"{domain}/{topic_key}"` where the
/// topic key is a topic id or the literal `overall`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub schema_version: u32,
    pub history: BTreeMap<String, Vec<ScoreHistoryEntry>>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            history: BTreeMap::new(),
        }
    }
}

pub fn history_key(domain: Domain, topic_key: &str) -> String {
    format!("{}/{}", domain.as_str(), topic_key)
}

impl UserProgress {
    /// Append an entry, evicting the oldest past [`HISTORY_LIMIT`].
    pub fn record(&mut self, domain: Domain, topic_key: &str, entry: ScoreHistoryEntry) {
        let list = self
            .history
            .entry(history_key(domain, topic_key))
            .or_default();
        list.push(entry);
        while list.len() > HISTORY_LIMIT {
            list.remove(0);
        }
    }

    pub fn entries(&self, domain: Domain, topic_key: &str) -> &[ScoreHistoryEntry] {
        self.history
            .get(&history_key(domain, topic_key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::{fixed_now, multiple_choice, session_of};

    fn entry(score: u32, offset_secs: i64) -> ScoreHistoryEntry {
        ScoreHistoryEntry {
            score,
            timestamp: fixed_now() + Duration::seconds(offset_secs),
            mode: QuizMode::Topic,
        }
    }

    #[test]
    fn test_history_bounded_fifo() {
        let mut progress = UserProgress::default();
        for i in 0..11 {
            progress.record(Domain::Vocabulary, "2", entry(i, i as i64));
        }

        let entries = progress.entries(Domain::Vocabulary, "2");
        assert_eq!(entries.len(), HISTORY_LIMIT);
        // Oldest (score 0) evicted, newest present.
        assert_eq!(entries[0].score, 1);
        assert_eq!(entries[9].score, 10);
    }

    #[test]
    fn test_history_keys_are_scoped() {
        let mut progress = UserProgress::default();
        progress.record(Domain::Grammar, "overall", entry(80, 0));
        progress.record(Domain::Vocabulary, "overall", entry(60, 0));

        assert_eq!(progress.entries(Domain::Grammar, "overall").len(), 1);
        assert_eq!(progress.entries(Domain::Vocabulary, "overall").len(), 1);
        assert!(progress.entries(Domain::Grammar, "3").is_empty());
    }

    #[test]
    fn test_checkpoint_staleness_boundary() {
        let session = session_of(vec![multiple_choice(1)]);
        let checkpoint = CheckpointData::new(session, fixed_now());

        // Exactly 24h old is still fresh; strictly older is stale.
        assert!(!checkpoint.is_stale(fixed_now() + Duration::hours(24)));
        assert!(checkpoint.is_stale(fixed_now() + Duration::hours(24) + Duration::seconds(1)));
        assert!(!checkpoint.is_stale(fixed_now()));
    }
}
