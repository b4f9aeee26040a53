//! HTTP adapter for the remote NER, relation and event-relation models.
//!
//! Each call is one POST with no retry. Transport failures, non-success
//! statuses, service-level rejections and undecodable bodies all surface as
//! [`ModelError`]; deciding what to do with them is left to the caller.

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{
    eri::{EventRelationClassifier, EventRelationPrediction, TriggerPair},
    ner::{mentions_from_payload, EntityMention, Ner},
    relclf::{RelationCandidate, RelationClassifier, RelationPrediction},
};
use crate::{config::Settings, error::ModelError};

const NER_OK: i64 = 200;
const STATUS_SUCCESS: &str = "success";

/// Stateless client for every remote inference endpoint.
#[derive(Debug, Clone)]
pub struct ModelClient {
    http: Client,
    ner_url: String,
    relation_url: String,
    event_relation_url: String,
}

impl ModelClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("guji-relex/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.model_timeout())
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            http,
            ner_url: settings.ner_url.clone(),
            relation_url: settings.relation_url.clone(),
            event_relation_url: settings.event_relation_url.trim_end_matches('/').to_string(),
        })
    }

    fn event_endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.event_relation_url)
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, ModelError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| ModelError::from_reqwest(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| ModelError::from_reqwest(url, err))?;
        serde_json::from_slice(&bytes).map_err(|err| ModelError::Malformed {
            endpoint: url.to_string(),
            message: err.to_string(),
        })
    }
}

#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct NerResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<NerData>,
}

#[derive(Deserialize)]
struct NerData {
    #[serde(default)]
    entities: IndexMap<String, Vec<String>>,
}

#[async_trait]
impl Ner for ModelClient {
    #[instrument(skip(self), level = "debug")]
    async fn extract(&self, text: &str) -> Result<Vec<EntityMention>, ModelError> {
        let response: NerResponse = self.post_json(&self.ner_url, &NerRequest { text }).await?;
        if response.code != NER_OK {
            return Err(ModelError::Rejected {
                endpoint: self.ner_url.clone(),
                message: response
                    .msg
                    .unwrap_or_else(|| format!("code {}", response.code)),
            });
        }
        let data = response.data.ok_or_else(|| ModelError::Malformed {
            endpoint: self.ner_url.clone(),
            message: "missing `data`".to_string(),
        })?;
        let mentions = mentions_from_payload(data.entities);
        debug!(count = mentions.len(), "ner mentions");
        Ok(mentions)
    }
}

#[derive(Serialize)]
struct RelationRequest<'a> {
    text: &'a str,
    subject_word: &'a str,
    subject_pos: &'a str,
    object_word: &'a str,
    object_pos: &'a str,
}

/// `status` + payload envelope shared by the relation and event services.
#[derive(Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    body: T,
}

impl<T> Envelope<T> {
    fn accept(self, endpoint: &str) -> Result<T, ModelError> {
        if self.status == STATUS_SUCCESS {
            return Ok(self.body);
        }
        Err(ModelError::Rejected {
            endpoint: endpoint.to_string(),
            message: self
                .error
                .or(self.message)
                .unwrap_or_else(|| format!("status {}", self.status)),
        })
    }
}

#[derive(Deserialize)]
struct RelationBody {
    #[serde(default)]
    data: Option<RelationPrediction>,
}

#[async_trait]
impl RelationClassifier for ModelClient {
    #[instrument(skip(self, candidate), level = "debug", fields(subject = %candidate.subject_word, object = %candidate.object_word))]
    async fn classify(
        &self,
        candidate: &RelationCandidate,
    ) -> Result<RelationPrediction, ModelError> {
        let request = RelationRequest {
            text: &candidate.sentence,
            subject_word: &candidate.subject_word,
            subject_pos: candidate.subject_role.pos_tag(),
            object_word: &candidate.object_word,
            object_pos: candidate.object_role.pos_tag(),
        };
        let envelope: Envelope<RelationBody> = self.post_json(&self.relation_url, &request).await?;
        envelope
            .accept(&self.relation_url)?
            .data
            .ok_or_else(|| ModelError::Malformed {
                endpoint: self.relation_url.clone(),
                message: "missing `data`".to_string(),
            })
    }
}

#[derive(Deserialize)]
struct EventBody {
    #[serde(default)]
    predicted_relation: Option<String>,
    #[serde(default)]
    probabilities: Option<IndexMap<String, f64>>,
}

#[derive(Serialize)]
struct BatchSample<'a> {
    original_text: &'a str,
    head_trigger: &'a str,
    tail_trigger: &'a str,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    samples: Vec<BatchSample<'a>>,
}

#[derive(Deserialize)]
struct BatchBody {
    #[serde(default)]
    results: Vec<BatchItem>,
}

#[derive(Deserialize)]
struct BatchItem {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    head_trigger: Option<String>,
    #[serde(default)]
    tail_trigger: Option<String>,
    #[serde(default)]
    predicted_relation: Option<String>,
    #[serde(default)]
    probabilities: Option<IndexMap<String, f64>>,
}

#[async_trait]
impl EventRelationClassifier for ModelClient {
    #[instrument(skip(self, pair), level = "debug", fields(head = %pair.head_trigger, tail = %pair.tail_trigger))]
    async fn classify(&self, pair: &TriggerPair) -> Result<EventRelationPrediction, ModelError> {
        let endpoint = self.event_endpoint("/predict");
        let envelope: Envelope<EventBody> = self.post_json(&endpoint, pair).await?;
        let body = envelope.accept(&endpoint)?;
        Ok(EventRelationPrediction {
            text: pair.text.clone(),
            head_trigger: pair.head_trigger.clone(),
            tail_trigger: pair.tail_trigger.clone(),
            predicted_relation: body.predicted_relation.unwrap_or_default(),
            probabilities: body.probabilities.unwrap_or_default(),
        })
    }

    #[instrument(skip(self, pairs), level = "debug", fields(samples = pairs.len()))]
    async fn classify_batch(
        &self,
        pairs: &[TriggerPair],
    ) -> Result<Vec<EventRelationPrediction>, ModelError> {
        let endpoint = self.event_endpoint("/predict_batch");
        let request = BatchRequest {
            samples: pairs
                .iter()
                .map(|pair| BatchSample {
                    original_text: &pair.text,
                    head_trigger: &pair.head_trigger,
                    tail_trigger: &pair.tail_trigger,
                })
                .collect(),
        };
        let envelope: Envelope<BatchBody> = self.post_json(&endpoint, &request).await?;
        let body = envelope.accept(&endpoint)?;
        if body.results.len() != pairs.len() {
            return Err(ModelError::Malformed {
                endpoint,
                message: format!(
                    "expected {} results, got {}",
                    pairs.len(),
                    body.results.len()
                ),
            });
        }
        Ok(body
            .results
            .into_iter()
            .zip(pairs)
            .map(|(item, pair)| EventRelationPrediction {
                text: item.text.unwrap_or_else(|| pair.text.clone()),
                head_trigger: item.head_trigger.unwrap_or_else(|| pair.head_trigger.clone()),
                tail_trigger: item.tail_trigger.unwrap_or_else(|| pair.tail_trigger.clone()),
                predicted_relation: item.predicted_relation.unwrap_or_default(),
                probabilities: item.probabilities.unwrap_or_default(),
            })
            .collect())
    }
}
