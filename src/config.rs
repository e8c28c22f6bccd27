use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Questions drawn for an overall quiz (sampled across every topic).
    #[serde(default = "default_overall_question_count")]
    pub overall_question_count: usize,
    /// Questions drawn for a single-topic quiz.
    #[serde(default = "default_topic_question_count")]
    pub topic_question_count: usize,
    /// Filename prefix for exported CSV reports.
    #[serde(default = "default_export_prefix")]
    pub export_prefix: String,
}

fn default_overall_question_count() -> usize {
    30
}
fn default_topic_question_count() -> usize {
    10
}
fn default_export_prefix() -> String {
    "langdr-results".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overall_question_count: default_overall_question_count(),
            topic_question_count: default_topic_question_count(),
            export_prefix: default_export_prefix(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("langdr")
            .join("config.toml")
    }
}
