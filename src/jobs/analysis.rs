//! The three corpus job kinds, each a thin adapter over [`Pipeline`].

use std::sync::Arc;

use async_trait::async_trait;

use super::SentenceAnalysis;
use crate::nlp::{eri::EventRelationFact, relclf::RelationFact, Pipeline, SentenceEntities};

/// Full-corpus NER: one record per sentence, entity-free when skipped or failed.
#[derive(Clone)]
pub struct NerAnalysis(pub Arc<Pipeline>);

#[async_trait]
impl SentenceAnalysis for NerAnalysis {
    type Item = SentenceEntities;

    fn kind(&self) -> &'static str {
        "ner"
    }

    fn min_sentence_chars(&self) -> usize {
        self.0.min_sentence_chars()
    }

    async fn analyse(&self, index: usize, sentence: &str) -> Vec<SentenceEntities> {
        vec![self.0.annotate(index, sentence).await]
    }

    fn skipped(&self, index: usize, sentence: &str) -> Vec<SentenceEntities> {
        vec![SentenceEntities {
            index,
            content: sentence.to_string(),
            entities: Vec::new(),
        }]
    }
}

/// Entity-pair relation extraction.
#[derive(Clone)]
pub struct RelationAnalysis(pub Arc<Pipeline>);

#[async_trait]
impl SentenceAnalysis for RelationAnalysis {
    type Item = RelationFact;

    fn kind(&self) -> &'static str {
        "relation"
    }

    fn min_sentence_chars(&self) -> usize {
        self.0.min_sentence_chars()
    }

    async fn analyse(&self, index: usize, sentence: &str) -> Vec<RelationFact> {
        self.0.extract_relations(index, sentence).await
    }
}

/// Event-relation extraction between trigger words.
#[derive(Clone)]
pub struct EventRelationAnalysis(pub Arc<Pipeline>);

#[async_trait]
impl SentenceAnalysis for EventRelationAnalysis {
    type Item = EventRelationFact;

    fn kind(&self) -> &'static str {
        "event-relation"
    }

    fn min_sentence_chars(&self) -> usize {
        self.0.min_sentence_chars()
    }

    async fn analyse(&self, index: usize, sentence: &str) -> Vec<EventRelationFact> {
        self.0.extract_event_relations(index, sentence).await
    }
}
