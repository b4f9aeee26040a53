//! Corpus lookup: maps a corpus id to its ordered sentence list.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{config::Settings, error::CorpusError};

/// Opaque key identifying a stored corpus.
pub type CorpusId = i64;

/// Source of pre-split corpus sentences.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    async fn sentences(&self, id: CorpusId) -> Result<Vec<String>, CorpusError>;
}

/// Reads corpora from `{storage_root}/corpora`, preferring the structured
/// `{id}.json` export over the raw `{id}.txt` upload.
#[derive(Debug, Clone)]
pub struct FileCorpusSource {
    root: PathBuf,
}

impl FileCorpusSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.join_storage("corpora"))
    }

    fn candidates(&self, id: CorpusId) -> [PathBuf; 2] {
        [
            self.root.join(format!("{id}.json")),
            self.root.join(format!("{id}.txt")),
        ]
    }
}

#[async_trait]
impl CorpusSource for FileCorpusSource {
    async fn sentences(&self, id: CorpusId) -> Result<Vec<String>, CorpusError> {
        for path in self.candidates(id) {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(CorpusError::Io { id, source }),
            };
            let content = String::from_utf8(bytes).map_err(|err| CorpusError::Parse {
                id,
                message: err.to_string(),
            })?;
            let sentences = parse_sentences(&content);
            debug!(corpus_id = id, path = %path.display(), count = sentences.len(), "loaded corpus");
            return Ok(sentences);
        }
        Err(CorpusError::NotFound(id))
    }
}

/// Corpus source backed by a map, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpusSource {
    corpora: Arc<RwLock<HashMap<CorpusId, Vec<String>>>>,
}

impl InMemoryCorpusSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert<I, S>(&self, id: CorpusId, sentences: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sentences = sentences.into_iter().map(Into::into).collect();
        self.corpora.write().await.insert(id, sentences);
    }
}

#[async_trait]
impl CorpusSource for InMemoryCorpusSource {
    async fn sentences(&self, id: CorpusId) -> Result<Vec<String>, CorpusError> {
        self.corpora
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CorpusError::NotFound(id))
    }
}

#[derive(Debug, Deserialize)]
struct SentenceRecord {
    content: Option<String>,
    text: Option<String>,
}

/// Split stored corpus content into sentences.
///
/// Content beginning with `[` is read as a JSON array of records carrying a
/// `content` (or `text`) field; anything else, including arrays that fail to
/// parse, is split on newlines. Empty entries are dropped either way.
pub fn parse_sentences(content: &str) -> Vec<String> {
    let content = content.trim();
    if content.starts_with('[') {
        if let Ok(records) = serde_json::from_str::<Vec<SentenceRecord>>(content) {
            return records
                .into_iter()
                .filter_map(|record| record.content.or(record.text))
                .filter(|sentence| !sentence.is_empty())
                .collect();
        }
    }
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
