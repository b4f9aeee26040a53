//! Relation classification types and the "no relation" filter.

use async_trait::async_trait;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::pairs::EntityRole;
use crate::error::ModelError;

/// Labels the classifier uses to say there is no relation.
pub const NO_RELATION_LABELS: &[&str] = &["无关系", "未知", "unknown", "no_relation", "O", "其他"];

static NO_RELATION: Lazy<HashSet<&'static str>> =
    Lazy::new(|| NO_RELATION_LABELS.iter().copied().collect());

/// A predicate is a real relation unless it is blank or a no-relation label.
pub fn is_valid_relation(predicate: &str) -> bool {
    let predicate = predicate.trim();
    !predicate.is_empty() && !NO_RELATION.contains(predicate)
}

/// An ordered (subject, object) pair proposed for classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationCandidate {
    pub sentence: String,
    pub subject_word: String,
    pub subject_role: EntityRole,
    pub object_word: String,
    pub object_role: EntityRole,
}

impl RelationCandidate {
    pub fn into_fact(self, index: usize, predicate: String) -> RelationFact {
        RelationFact {
            index,
            sentence: self.sentence,
            subject_word: self.subject_word,
            subject_role: self.subject_role,
            object_word: self.object_word,
            object_role: self.object_role,
            predicate,
        }
    }
}

/// A candidate the classifier labelled with a genuine relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationFact {
    /// 1-based position of the originating sentence in its corpus.
    pub index: usize,
    pub sentence: String,
    pub subject_word: String,
    pub subject_role: EntityRole,
    pub object_word: String,
    pub object_role: EntityRole,
    pub predicate: String,
}

/// Raw classifier answer for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationPrediction {
    #[serde(default)]
    pub predicted_relation: String,
    #[serde(default)]
    pub probabilities: IndexMap<String, f64>,
}

/// Seam over the remote relation classifier.
#[async_trait]
pub trait RelationClassifier: Send + Sync {
    async fn classify(&self, candidate: &RelationCandidate)
        -> Result<RelationPrediction, ModelError>;
}
