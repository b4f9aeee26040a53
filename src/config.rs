//! Runtime configuration utilities for guji-relex.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// NER model endpoint (`POST {text}`).
    pub ner_url: String,
    /// Relation classifier endpoint (`POST {text, subject_word, ...}`).
    pub relation_url: String,
    /// Base URL of the event-relation service; `/predict` and
    /// `/predict_batch` are appended.
    pub event_relation_url: String,
    /// Upper bound for a single remote model call, in seconds.
    pub model_timeout_secs: u64,
    /// Root folder holding `corpora/{id}.json` and `corpora/{id}.txt`.
    pub storage_root: PathBuf,
    /// Sentences shorter than this many characters are skipped.
    pub min_sentence_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ner_url: "http://localhost:5001/predict".to_string(),
            relation_url: "http://localhost:5000/predict".to_string(),
            event_relation_url: "http://localhost:5004".to_string(),
            model_timeout_secs: 30,
            storage_root: PathBuf::from("./data"),
            min_sentence_chars: 2,
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let ner_url = env::var("NER_URL").unwrap_or(defaults.ner_url);
        let relation_url = env::var("RELATION_URL").unwrap_or(defaults.relation_url);
        let event_relation_url = env::var("EVENT_RELATION_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.event_relation_url);
        let model_timeout_secs = env::var("MODEL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.model_timeout_secs);
        let storage_root = env::var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_root);
        let min_sentence_chars = env::var("MIN_SENTENCE_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.min_sentence_chars);

        std::fs::create_dir_all(&storage_root).context("creating storage root")?;

        Ok(Self {
            ner_url,
            relation_url,
            event_relation_url,
            model_timeout_secs,
            storage_root,
            min_sentence_chars,
        })
    }

    /// Per-call timeout applied by the model client.
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs.max(1))
    }

    /// Convenience helper for derived storage path segments.
    pub fn join_storage<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.storage_root.join(path)
    }
}
