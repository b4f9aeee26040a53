//! Event-relation identification between trigger words of one sentence.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ner::EntityMention;
use crate::error::ModelError;

/// One (sentence, head trigger, tail trigger) query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPair {
    pub text: String,
    pub head_trigger: String,
    pub tail_trigger: String,
}

impl TriggerPair {
    pub fn new(
        text: impl Into<String>,
        head_trigger: impl Into<String>,
        tail_trigger: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            head_trigger: head_trigger.into(),
            tail_trigger: tail_trigger.into(),
        }
    }
}

/// Classifier answer for a trigger pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRelationPrediction {
    pub text: String,
    pub head_trigger: String,
    pub tail_trigger: String,
    pub predicted_relation: String,
    #[serde(default)]
    pub probabilities: IndexMap<String, f64>,
}

/// A trigger pair whose predicted relation passed the no-relation filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRelationFact {
    /// 1-based position of the originating sentence in its corpus.
    pub index: usize,
    pub sentence: String,
    pub head_trigger: String,
    pub tail_trigger: String,
    pub predicted_relation: String,
    pub probabilities: IndexMap<String, f64>,
}

/// Seam over the remote event-relation service.
#[async_trait]
pub trait EventRelationClassifier: Send + Sync {
    async fn classify(&self, pair: &TriggerPair) -> Result<EventRelationPrediction, ModelError>;

    async fn classify_batch(
        &self,
        pairs: &[TriggerPair],
    ) -> Result<Vec<EventRelationPrediction>, ModelError>;
}

/// Unordered trigger pairs (earlier mention as head) for `sentence`.
///
/// Every mention type acts as a trigger; repeated words count once.
pub fn trigger_pairs(sentence: &str, mentions: &[EntityMention]) -> Vec<TriggerPair> {
    let mut triggers: Vec<&str> = Vec::new();
    for mention in mentions {
        if !triggers.contains(&mention.word.as_str()) {
            triggers.push(&mention.word);
        }
    }

    let mut pairs = Vec::new();
    for (j, head) in triggers.iter().enumerate() {
        for tail in &triggers[j + 1..] {
            pairs.push(TriggerPair::new(sentence, *head, *tail));
        }
    }
    pairs
}
