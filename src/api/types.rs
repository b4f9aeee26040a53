//! Shared DTOs for JSON requests and responses.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    data::CorpusId,
    nlp::{eri::TriggerPair, pairs::EntityRole, relclf::RelationCandidate},
};

#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub id: Option<CorpusId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunBatchRequest {
    pub corpus_id: Option<CorpusId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub corpus_id: CorpusId,
    pub generation: u64,
}

impl SubmitResponse {
    pub fn started(corpus_id: CorpusId, generation: u64) -> Self {
        Self {
            status: "success",
            message: "Task Started",
            corpus_id,
            generation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub status: &'static str,
    pub corpus_id: CorpusId,
    pub progress: u8,
}

fn default_page() -> usize {
    1
}

fn default_size() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_size")]
    pub size: usize,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

/// One page of an in-memory result list (`current` is 1-based).
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub status: &'static str,
    pub records: Vec<T>,
    pub total: usize,
    pub size: usize,
    pub current: usize,
}

/// Slice `items` into the requested page; out-of-range pages are empty.
pub fn paginate<T: Clone>(items: &[T], query: &PageQuery) -> Page<T> {
    let total = items.len();
    let records = match query.page.checked_sub(1) {
        Some(page_idx) => {
            let from = page_idx.saturating_mul(query.size);
            if from < total {
                let to = from.saturating_add(query.size).min(total);
                items[from..to].to_vec()
            } else {
                Vec::new()
            }
        }
        None => Vec::new(),
    };
    Page {
        status: "success",
        records,
        total,
        size: query.size,
        current: query.page,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
}

/// Single-candidate relation query, using the model's wire field names.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationPredictRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub subject_word: String,
    #[serde(default)]
    pub subject_pos: String,
    #[serde(default)]
    pub object_word: String,
    #[serde(default)]
    pub object_pos: String,
}

impl From<RelationPredictRequest> for RelationCandidate {
    fn from(value: RelationPredictRequest) -> Self {
        RelationCandidate {
            sentence: value.text,
            subject_word: value.subject_word,
            subject_role: EntityRole::from_pos_tag(&value.subject_pos),
            object_word: value.object_word,
            object_role: EntityRole::from_pos_tag(&value.object_pos),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationPredictResponse {
    pub status: &'static str,
    pub data: RelationPredictData,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationPredictData {
    pub predicted_relation: String,
    pub probabilities: IndexMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventPredictRequest {
    pub text: Option<String>,
    pub head_trigger: Option<String>,
    pub tail_trigger: Option<String>,
}

/// Batch sample; `original_text` is accepted as an alias of `text`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSample {
    #[serde(alias = "original_text")]
    pub text: String,
    pub head_trigger: String,
    pub tail_trigger: String,
}

impl From<EventSample> for TriggerPair {
    fn from(value: EventSample) -> Self {
        TriggerPair::new(value.text, value.head_trigger, value.tail_trigger)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventBatchRequest {
    #[serde(default)]
    pub samples: Vec<EventSample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventPredictResponse<T> {
    pub status: &'static str,
    #[serde(flatten)]
    pub body: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventBatchBody<T> {
    pub results: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: i64,
    pub active_jobs: usize,
}
