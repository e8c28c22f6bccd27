//! Durable state: a narrow key-value contract plus the typed gateway the
//! engine checkpoints and records history through.

pub mod json_store;
pub mod schema;

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::bank::Domain;
use crate::session::quiz::QuizSession;
use crate::store::schema::{CheckpointData, SCHEMA_VERSION, ScoreHistoryEntry, UserProgress};

pub use json_store::JsonFileStore;

/// Logical key for the in-flight session snapshot.
pub const CHECKPOINT_KEY: &str = "checkpoint";
/// Logical key for completed-quiz score history.
pub const PROGRESS_KEY: &str = "progress";

/// Minimal durable key-value contract the engine depends on. Any backend
/// (file, memory, embedded database) satisfies it.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// HashMap-backed store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Typed persistence gateway over a [`KeyValueStore`].
///
/// Writes propagate errors (the engine surfaces them without rolling back);
/// reads never fail — a missing, corrupt, stale, or version-mismatched blob
/// is simply absent, so a broken store can never take the application down.
pub struct ProgressStore<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn save_checkpoint(
        &mut self,
        session: &QuizSession,
        saved_at: DateTime<Utc>,
    ) -> Result<()> {
        let checkpoint = CheckpointData::new(session.clone(), saved_at);
        let json = serde_json::to_string(&checkpoint)?;
        self.kv.set(CHECKPOINT_KEY, &json)
    }

    /// The checkpoint, if one exists, parses, matches the current schema, and
    /// is no older than the freshness window.
    pub fn load_checkpoint(&self, now: DateTime<Utc>) -> Option<CheckpointData> {
        let raw = self.kv.get(CHECKPOINT_KEY).ok()??;
        let checkpoint: CheckpointData = serde_json::from_str(&raw).ok()?;
        if checkpoint.schema_version != SCHEMA_VERSION || checkpoint.is_stale(now) {
            return None;
        }
        Some(checkpoint)
    }

    pub fn clear_checkpoint(&mut self) -> Result<()> {
        self.kv.remove(CHECKPOINT_KEY)
    }

    pub fn append_history(
        &mut self,
        domain: Domain,
        topic_key: &str,
        entry: ScoreHistoryEntry,
    ) -> Result<()> {
        let mut progress = self.load_history();
        progress.record(domain, topic_key, entry);
        let json = serde_json::to_string(&progress)?;
        self.kv.set(PROGRESS_KEY, &json)
    }

    /// Corrupt or missing history starts over empty, never fails.
    pub fn load_history(&self) -> UserProgress {
        match self.kv.get(PROGRESS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            _ => UserProgress::default(),
        }
    }
}
