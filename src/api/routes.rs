//! HTTP route handlers for Axum.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    api::types::{
        paginate, EventBatchBody, EventBatchRequest, EventPredictRequest, EventPredictResponse,
        HealthResponse, Page, PageQuery, ProgressResponse, RelationPredictData,
        RelationPredictRequest, RelationPredictResponse, RunBatchRequest, RunRequest,
        SubmitResponse, TextRequest,
    },
    data::CorpusId,
    error::ModelError,
    jobs::JobSnapshot,
    nlp::{
        eri::{EventRelationClassifier, EventRelationFact, EventRelationPrediction, TriggerPair},
        relclf::{RelationCandidate, RelationClassifier, RelationFact},
        SentenceEntities,
    },
};

use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

const NOT_READY: &str = "result not ready";

fn bad_request(message: &str) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message.to_string())
}

fn not_ready() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, NOT_READY.to_string())
}

fn upstream(err: ModelError) -> (StatusCode, String) {
    warn!(endpoint = err.endpoint(), error = %err, "model call failed");
    (StatusCode::BAD_GATEWAY, err.to_string())
}

fn require_id(id: Option<CorpusId>) -> Result<CorpusId, (StatusCode, String)> {
    match id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(bad_request("corpus id is required")),
    }
}

fn non_blank(value: Option<String>, field: &str) -> Result<String, (StatusCode, String)> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(bad_request(&format!("{field} must not be empty"))),
    }
}

// ---- NER ----

pub async fn ner_run(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> ApiResult<SubmitResponse> {
    let id = require_id(req.id)?;
    let generation = state.ner_jobs.submit(id);
    info!(corpus_id = id, "ner analysis submitted");
    Ok(Json(SubmitResponse::started(id, generation)))
}

pub async fn ner_progress(State(state): State<AppState>, Path(id): Path<CorpusId>) -> Json<u8> {
    Json(state.ner_jobs.progress(id))
}

pub async fn ner_result(
    State(state): State<AppState>,
    Path(id): Path<CorpusId>,
) -> ApiResult<Vec<SentenceEntities>> {
    let results = state.ner_jobs.result(id).ok_or_else(not_ready)?;
    Ok(Json(results.as_ref().clone()))
}

pub async fn ner_status(State(state): State<AppState>, Path(id): Path<CorpusId>) -> Json<JobSnapshot> {
    Json(state.ner_jobs.status(id))
}

// ---- relation ----

pub async fn relation_predict(
    State(state): State<AppState>,
    Json(req): Json<RelationPredictRequest>,
) -> ApiResult<RelationPredictResponse> {
    let candidate = RelationCandidate::from(req);
    let prediction = state
        .pipeline
        .relation_classifier()
        .classify(&candidate)
        .await
        .map_err(upstream)?;
    Ok(Json(RelationPredictResponse {
        status: "success",
        data: RelationPredictData {
            predicted_relation: prediction.predicted_relation,
            probabilities: prediction.probabilities,
        },
    }))
}

pub async fn relation_auto_predict(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Json<Vec<RelationFact>> {
    let text = req.text.unwrap_or_default();
    Json(state.pipeline.extract_sentence(&text).await)
}

pub async fn relation_run(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> ApiResult<SubmitResponse> {
    let id = require_id(req.id)?;
    let generation = state.relation_jobs.submit(id);
    info!(corpus_id = id, "relation analysis submitted");
    Ok(Json(SubmitResponse::started(id, generation)))
}

pub async fn relation_progress(
    State(state): State<AppState>,
    Path(id): Path<CorpusId>,
) -> Json<u8> {
    Json(state.relation_jobs.progress(id))
}

pub async fn relation_result(
    State(state): State<AppState>,
    Path(id): Path<CorpusId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<RelationFact>> {
    let results = state.relation_jobs.result(id).ok_or_else(not_ready)?;
    Ok(Json(paginate(&results, &page)))
}

pub async fn relation_status(
    State(state): State<AppState>,
    Path(id): Path<CorpusId>,
) -> Json<JobSnapshot> {
    Json(state.relation_jobs.status(id))
}

// ---- event relation ----

pub async fn event_predict(
    State(state): State<AppState>,
    Json(req): Json<EventPredictRequest>,
) -> ApiResult<EventPredictResponse<EventRelationPrediction>> {
    let pair = TriggerPair::new(
        non_blank(req.text, "text")?,
        non_blank(req.head_trigger, "head_trigger")?,
        non_blank(req.tail_trigger, "tail_trigger")?,
    );
    let prediction = state
        .pipeline
        .event_classifier()
        .classify(&pair)
        .await
        .map_err(upstream)?;
    Ok(Json(EventPredictResponse {
        status: "success",
        body: prediction,
    }))
}

pub async fn event_predict_batch(
    State(state): State<AppState>,
    Json(req): Json<EventBatchRequest>,
) -> ApiResult<EventPredictResponse<EventBatchBody<EventRelationPrediction>>> {
    if req.samples.is_empty() {
        return Err(bad_request("samples must not be empty"));
    }
    let pairs: Vec<TriggerPair> = req.samples.into_iter().map(TriggerPair::from).collect();
    let results = state
        .pipeline
        .event_classifier()
        .classify_batch(&pairs)
        .await
        .map_err(upstream)?;
    Ok(Json(EventPredictResponse {
        status: "success",
        body: EventBatchBody {
            total: pairs.len(),
            results,
        },
    }))
}

pub async fn event_run(
    State(state): State<AppState>,
    Json(req): Json<RunBatchRequest>,
) -> ApiResult<SubmitResponse> {
    let id = require_id(req.corpus_id)?;
    let generation = state.event_jobs.submit(id);
    info!(corpus_id = id, "event relation analysis submitted");
    Ok(Json(SubmitResponse::started(id, generation)))
}

pub async fn event_progress(
    State(state): State<AppState>,
    Path(id): Path<CorpusId>,
) -> Json<ProgressResponse> {
    Json(ProgressResponse {
        status: "success",
        corpus_id: id,
        progress: state.event_jobs.progress(id),
    })
}

pub async fn event_results(
    State(state): State<AppState>,
    Path(id): Path<CorpusId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<EventRelationFact>> {
    let results = state.event_jobs.result(id).ok_or_else(not_ready)?;
    Ok(Json(paginate(&results, &page)))
}

pub async fn event_status(
    State(state): State<AppState>,
    Path(id): Path<CorpusId>,
) -> Json<JobSnapshot> {
    Json(state.event_jobs.status(id))
}

pub async fn event_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "event-relation-identification",
        timestamp: Utc::now().timestamp_millis(),
        active_jobs: state.event_jobs.active_jobs(),
    })
}
