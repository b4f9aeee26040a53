//! In-process model fakes shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use guji_relex::{
    error::ModelError,
    nlp::{
        eri::{EventRelationClassifier, EventRelationPrediction, TriggerPair},
        ner::{EntityMention, EntityType, Ner},
        relclf::{RelationCandidate, RelationClassifier, RelationPrediction},
        Pipeline,
    },
};
use indexmap::IndexMap;

fn rejected(endpoint: &str) -> ModelError {
    ModelError::Rejected {
        endpoint: endpoint.to_string(),
        message: "simulated failure".to_string(),
    }
}

pub fn person(word: &str) -> EntityMention {
    EntityMention::new(word, EntityType::Person)
}

pub fn location(word: &str) -> EntityMention {
    EntityMention::new(word, EntityType::Location)
}

pub fn time(word: &str) -> EntityMention {
    EntityMention::new(word, EntityType::Time)
}

pub fn other(word: &str) -> EntityMention {
    EntityMention::new(word, EntityType::Other)
}

/// NER fake answering from a sentence table; unknown sentences have no mentions.
#[derive(Default)]
pub struct FakeNer {
    answers: HashMap<String, Vec<EntityMention>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeNer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sentence: &str, mentions: Vec<EntityMention>) -> Self {
        self.answers.insert(sentence.to_string(), mentions);
        self
    }

    pub fn failing(mut self, sentence: &str) -> Self {
        self.failing.insert(sentence.to_string());
        self
    }

    pub fn delayed(mut self, sentence: &str, delay: Duration) -> Self {
        self.delays.insert(sentence.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Ner for FakeNer {
    async fn extract(&self, text: &str) -> Result<Vec<EntityMention>, ModelError> {
        self.calls.lock().unwrap().push(text.to_string());
        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(text) {
            return Err(rejected("fake-ner"));
        }
        Ok(self.answers.get(text).cloned().unwrap_or_default())
    }
}

/// Relation fake keyed by (subject, object); unknown pairs answer `default`.
pub struct FakeRelations {
    answers: HashMap<(String, String), String>,
    failing: HashSet<(String, String)>,
    default: String,
    calls: Mutex<Vec<RelationCandidate>>,
}

impl Default for FakeRelations {
    fn default() -> Self {
        Self {
            answers: HashMap::new(),
            failing: HashSet::new(),
            default: "无关系".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRelations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(mut self, default: &str) -> Self {
        self.default = default.to_string();
        self
    }

    pub fn with(mut self, subject: &str, object: &str, predicate: &str) -> Self {
        self.answers
            .insert((subject.to_string(), object.to_string()), predicate.to_string());
        self
    }

    pub fn failing(mut self, subject: &str, object: &str) -> Self {
        self.failing.insert((subject.to_string(), object.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RelationCandidate> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_pairs(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .map(|c| (c.subject_word, c.object_word))
            .collect()
    }
}

#[async_trait]
impl RelationClassifier for FakeRelations {
    async fn classify(
        &self,
        candidate: &RelationCandidate,
    ) -> Result<RelationPrediction, ModelError> {
        self.calls.lock().unwrap().push(candidate.clone());
        let key = (candidate.subject_word.clone(), candidate.object_word.clone());
        if self.failing.contains(&key) {
            return Err(rejected("fake-relation"));
        }
        let predicted_relation = self.answers.get(&key).unwrap_or(&self.default).clone();
        let mut probabilities = IndexMap::new();
        probabilities.insert(predicted_relation.clone(), 0.9);
        Ok(RelationPrediction {
            predicted_relation,
            probabilities,
        })
    }
}

/// Event-relation fake keyed by (head, tail).
#[derive(Default)]
pub struct FakeEvents {
    answers: HashMap<(String, String), String>,
    failing: HashSet<(String, String)>,
    calls: Mutex<Vec<TriggerPair>>,
}

impl FakeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, head: &str, tail: &str, relation: &str) -> Self {
        self.answers
            .insert((head.to_string(), tail.to_string()), relation.to_string());
        self
    }

    pub fn failing(mut self, head: &str, tail: &str) -> Self {
        self.failing.insert((head.to_string(), tail.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<TriggerPair> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, pair: &TriggerPair) -> Result<EventRelationPrediction, ModelError> {
        self.calls.lock().unwrap().push(pair.clone());
        let key = (pair.head_trigger.clone(), pair.tail_trigger.clone());
        if self.failing.contains(&key) {
            return Err(rejected("fake-event"));
        }
        let predicted_relation = self
            .answers
            .get(&key)
            .cloned()
            .unwrap_or_else(|| "无关系".to_string());
        let mut probabilities = IndexMap::new();
        probabilities.insert(predicted_relation.clone(), 0.75);
        Ok(EventRelationPrediction {
            text: pair.text.clone(),
            head_trigger: pair.head_trigger.clone(),
            tail_trigger: pair.tail_trigger.clone(),
            predicted_relation,
            probabilities,
        })
    }
}

#[async_trait]
impl EventRelationClassifier for FakeEvents {
    async fn classify(&self, pair: &TriggerPair) -> Result<EventRelationPrediction, ModelError> {
        self.answer(pair)
    }

    async fn classify_batch(
        &self,
        pairs: &[TriggerPair],
    ) -> Result<Vec<EventRelationPrediction>, ModelError> {
        pairs.iter().map(|pair| self.answer(pair)).collect()
    }
}

/// Fakes plus the pipeline wired to them.
pub struct Harness {
    pub ner: Arc<FakeNer>,
    pub relations: Arc<FakeRelations>,
    pub events: Arc<FakeEvents>,
    pub pipeline: Arc<Pipeline>,
}

pub fn harness(ner: FakeNer, relations: FakeRelations, events: FakeEvents) -> Harness {
    let ner = Arc::new(ner);
    let relations = Arc::new(relations);
    let events = Arc::new(events);
    let pipeline = Arc::new(Pipeline::new(
        ner.clone(),
        relations.clone(),
        events.clone(),
    ));
    Harness {
        ner,
        relations,
        events,
        pipeline,
    }
}
