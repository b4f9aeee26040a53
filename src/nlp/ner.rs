//! Named-entity recognition types and the recognizer seam.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Coarse entity class assigned by the NER model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Person,
    Location,
    Time,
    Other,
}

impl EntityType {
    /// Map a raw model label (`PER`, `LOC`, `TIME`, ...) onto an entity class.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "PER" | "PERSON" | "NH" => EntityType::Person,
            "LOC" | "LOCATION" | "NS" => EntityType::Location,
            "TIME" | "DATE" | "NT" => EntityType::Time,
            _ => EntityType::Other,
        }
    }
}

/// A span of one sentence tagged by the NER model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityMention {
    pub word: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
}

impl EntityMention {
    pub fn new(word: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            word: word.into(),
            entity_type,
        }
    }
}

/// Trait for NER implementations.
#[async_trait]
pub trait Ner: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<EntityMention>, ModelError>;
}

/// Flatten the model's `type -> [word]` payload into mentions.
///
/// Payload order is kept (types in document order, words in list order);
/// blank words and repeated `(word, type)` pairs are dropped.
pub fn mentions_from_payload(entities: IndexMap<String, Vec<String>>) -> Vec<EntityMention> {
    let mut mentions: Vec<EntityMention> = Vec::new();
    for (label, words) in entities {
        let entity_type = EntityType::from_label(&label);
        for word in words {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            let mention = EntityMention::new(word, entity_type);
            if !mentions.contains(&mention) {
                mentions.push(mention);
            }
        }
    }
    mentions
}
