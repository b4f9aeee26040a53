//! Natural language processing orchestration layer.
//!
//! [`Pipeline`] owns the per-sentence control flow: NER, candidate
//! generation, one classifier call per candidate, no-relation filtering.
//! Model failures are absorbed here and logged; a failed call contributes
//! nothing to the sentence's output.

pub mod client;
pub mod eri;
pub mod ner;
pub mod pairs;
pub mod relclf;

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Settings;

use self::{
    client::ModelClient,
    eri::{trigger_pairs, EventRelationClassifier, EventRelationFact},
    ner::{EntityMention, Ner},
    pairs::generate_candidates,
    relclf::{is_valid_relation, RelationClassifier, RelationFact},
};

/// NER output for one corpus sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceEntities {
    /// 1-based position of the sentence in its corpus.
    pub index: usize,
    pub content: String,
    pub entities: Vec<EntityMention>,
}

/// Sentence-level extraction pipeline over the remote models.
#[derive(Clone)]
pub struct Pipeline {
    ner: Arc<dyn Ner>,
    relations: Arc<dyn RelationClassifier>,
    events: Arc<dyn EventRelationClassifier>,
    min_sentence_chars: usize,
}

impl Pipeline {
    pub fn new(
        ner: Arc<dyn Ner>,
        relations: Arc<dyn RelationClassifier>,
        events: Arc<dyn EventRelationClassifier>,
    ) -> Self {
        Self {
            ner,
            relations,
            events,
            min_sentence_chars: 2,
        }
    }

    /// Pipeline wired to the HTTP model client described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Arc::new(ModelClient::new(settings)?);
        Ok(Self::new(client.clone(), client.clone(), client)
            .with_min_sentence_chars(settings.min_sentence_chars))
    }

    pub fn with_min_sentence_chars(mut self, min_sentence_chars: usize) -> Self {
        self.min_sentence_chars = min_sentence_chars;
        self
    }

    pub fn min_sentence_chars(&self) -> usize {
        self.min_sentence_chars
    }

    /// Whether `sentence` is long enough to be worth a model call.
    pub fn accepts(&self, sentence: &str) -> bool {
        sentence.chars().count() >= self.min_sentence_chars
    }

    /// Mentions for `sentence`; an NER failure yields none.
    pub async fn recognize(&self, sentence: &str) -> Vec<EntityMention> {
        match self.ner.extract(sentence).await {
            Ok(mentions) => mentions,
            Err(err) => {
                warn!(endpoint = err.endpoint(), error = %err, "ner call failed; treating sentence as entity-free");
                Vec::new()
            }
        }
    }

    /// NER record for sentence `index`.
    pub async fn annotate(&self, index: usize, sentence: &str) -> SentenceEntities {
        SentenceEntities {
            index,
            content: sentence.to_string(),
            entities: self.recognize(sentence).await,
        }
    }

    /// Relation facts for sentence `index`, in candidate order.
    pub async fn extract_relations(&self, index: usize, sentence: &str) -> Vec<RelationFact> {
        if sentence.trim().is_empty() {
            return Vec::new();
        }
        let mentions = self.recognize(sentence).await;
        let candidates = generate_candidates(sentence, &mentions);
        debug!(index, mentions = mentions.len(), candidates = candidates.len(), "classifying candidates");

        let mut facts = Vec::new();
        for candidate in candidates {
            let prediction = match self.relations.classify(&candidate).await {
                Ok(prediction) => prediction,
                Err(err) => {
                    warn!(
                        endpoint = err.endpoint(),
                        error = %err,
                        subject = %candidate.subject_word,
                        object = %candidate.object_word,
                        "relation call failed; dropping candidate"
                    );
                    continue;
                }
            };
            if is_valid_relation(&prediction.predicted_relation) {
                let predicate = prediction.predicted_relation.trim().to_string();
                facts.push(candidate.into_fact(index, predicate));
            }
        }
        facts
    }

    /// Single-sentence relation extraction, outside of any corpus job.
    pub async fn extract_sentence(&self, sentence: &str) -> Vec<RelationFact> {
        self.extract_relations(1, sentence).await
    }

    /// Event-relation facts for sentence `index`, in trigger-pair order.
    pub async fn extract_event_relations(
        &self,
        index: usize,
        sentence: &str,
    ) -> Vec<EventRelationFact> {
        let mentions = self.recognize(sentence).await;
        let mut facts = Vec::new();
        for pair in trigger_pairs(sentence, &mentions) {
            let prediction = match self.events.classify(&pair).await {
                Ok(prediction) => prediction,
                Err(err) => {
                    warn!(
                        endpoint = err.endpoint(),
                        error = %err,
                        head = %pair.head_trigger,
                        tail = %pair.tail_trigger,
                        "event relation call failed; dropping pair"
                    );
                    continue;
                }
            };
            if is_valid_relation(&prediction.predicted_relation) {
                facts.push(EventRelationFact {
                    index,
                    sentence: sentence.to_string(),
                    head_trigger: prediction.head_trigger,
                    tail_trigger: prediction.tail_trigger,
                    predicted_relation: prediction.predicted_relation.trim().to_string(),
                    probabilities: prediction.probabilities,
                });
            }
        }
        facts
    }

    pub fn relation_classifier(&self) -> &dyn RelationClassifier {
        self.relations.as_ref()
    }

    pub fn event_classifier(&self) -> &dyn EventRelationClassifier {
        self.events.as_ref()
    }
}
