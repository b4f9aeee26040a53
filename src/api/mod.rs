//! HTTP layer exposing job control and single-sentence prediction.

pub mod routes;
pub mod types;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Settings,
    data::{CorpusSource, FileCorpusSource},
    jobs::{EventRelationAnalysis, JobManager, NerAnalysis, RelationAnalysis},
    nlp::Pipeline,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub pipeline: Arc<Pipeline>,
    pub ner_jobs: JobManager<NerAnalysis>,
    pub relation_jobs: JobManager<RelationAnalysis>,
    pub event_jobs: JobManager<EventRelationAnalysis>,
}

impl AppState {
    pub fn new(settings: Settings, pipeline: Arc<Pipeline>, corpus: Arc<dyn CorpusSource>) -> Self {
        Self {
            ner_jobs: JobManager::new(NerAnalysis(pipeline.clone()), corpus.clone()),
            relation_jobs: JobManager::new(RelationAnalysis(pipeline.clone()), corpus.clone()),
            event_jobs: JobManager::new(EventRelationAnalysis(pipeline.clone()), corpus),
            settings,
            pipeline,
        }
    }

    /// State backed by the HTTP model client and on-disk corpora.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let pipeline = Arc::new(Pipeline::from_settings(&settings)?);
        let corpus: Arc<dyn CorpusSource> = Arc::new(FileCorpusSource::from_settings(&settings));
        Ok(Self::new(settings, pipeline, corpus))
    }
}

pub fn router(state: AppState) -> Router {
    let ner = Router::new()
        .route("/run_async", post(routes::ner_run))
        .route("/progress/:id", get(routes::ner_progress))
        .route("/result/:id", get(routes::ner_result))
        .route("/status/:id", get(routes::ner_status));

    let relation = Router::new()
        .route("/predict", post(routes::relation_predict))
        .route("/auto_predict", post(routes::relation_auto_predict))
        .route("/run_async", post(routes::relation_run))
        .route("/progress/:id", get(routes::relation_progress))
        .route("/result/:id", get(routes::relation_result))
        .route("/status/:id", get(routes::relation_status));

    let event_relation = Router::new()
        .route("/predict", post(routes::event_predict))
        .route("/predict_batch", post(routes::event_predict_batch))
        .route("/run_batch", post(routes::event_run))
        .route("/progress/:id", get(routes::event_progress))
        .route("/results/:id", get(routes::event_results))
        .route("/status/:id", get(routes::event_status))
        .route("/health", get(routes::event_health));

    Router::new()
        .nest("/api/analysis/ner", ner)
        .nest("/api/analysis/relation", relation)
        .nest("/api/analysis/event-relation", event_relation)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(settings: Settings, host: String, port: u16) -> Result<()> {
    let state = AppState::from_settings(settings)?;
    let app = router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "serving guji-relex API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
