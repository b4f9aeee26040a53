//! CLI entry-point for running corpus analysis jobs to completion.

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    api::AppState,
    cli::ExtractKind,
    config::Settings,
    data::CorpusId,
    jobs::{JobManager, JobSnapshot, SentenceAnalysis},
    nlp::{
        eri::EventRelationFact, ner::EntityType, pairs::EntityRole, relclf::RelationFact,
        SentenceEntities,
    },
};

/// Args for the `extract` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Comma separated corpus ids.
    #[arg(long, value_delimiter = ',', required = true)]
    pub corpus: Vec<CorpusId>,
    /// Analysis to run.
    #[arg(long, default_value = "relation", value_enum)]
    pub kind: ExtractKind,
    /// Write results as CSV instead of printing JSON.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Corpora processed at the same time.
    #[arg(long, default_value_t = 2)]
    pub concurrency: usize,
}

/// Results of one corpus run.
#[derive(Debug, Serialize)]
pub struct CorpusOutput<T> {
    pub corpus_id: CorpusId,
    pub status: JobSnapshot,
    pub results: Vec<T>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let state = AppState::from_settings(settings)?;
    let concurrency = args.concurrency.max(1);
    let ids = distinct_ids(&args.corpus);
    if ids.len() < args.corpus.len() {
        warn!(requested = args.corpus.len(), distinct = ids.len(), "ignoring repeated corpus ids");
    }
    match args.kind {
        ExtractKind::Relation => {
            let outputs = run_jobs(&state.relation_jobs, &ids, concurrency).await;
            emit(&outputs, args.output.as_ref(), relation_rows)
        }
        ExtractKind::Event => {
            let outputs = run_jobs(&state.event_jobs, &ids, concurrency).await;
            emit(&outputs, args.output.as_ref(), event_rows)
        }
        ExtractKind::Ner => {
            let outputs = run_jobs(&state.ner_jobs, &ids, concurrency).await;
            emit(&outputs, args.output.as_ref(), ner_rows)
        }
    }
}

/// Corpus ids in ascending order with repeats removed.
pub fn distinct_ids(ids: &[CorpusId]) -> Vec<CorpusId> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Submit every corpus, at most `concurrency` at a time, and wait for each.
pub async fn run_jobs<A>(
    jobs: &JobManager<A>,
    ids: &[CorpusId],
    concurrency: usize,
) -> Vec<CorpusOutput<A::Item>>
where
    A: SentenceAnalysis,
    A::Item: Clone,
{
    let mut outputs: Vec<CorpusOutput<A::Item>> = stream::iter(ids.iter().copied())
        .map(|id| {
            let jobs = jobs.clone();
            async move {
                jobs.submit(id);
                jobs.wait(id).await;
                let status = jobs.status(id);
                if let Some(error) = &status.error {
                    warn!(corpus_id = id, %error, "corpus produced no results");
                }
                let results = jobs
                    .result(id)
                    .map(|results| results.as_ref().clone())
                    .unwrap_or_default();
                info!(corpus_id = id, results = results.len(), "corpus finished");
                CorpusOutput {
                    corpus_id: id,
                    status,
                    results,
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;
    outputs.sort_by_key(|output| output.corpus_id);
    outputs
}

fn emit<T, R, F>(outputs: &[CorpusOutput<T>], path: Option<&PathBuf>, rows: F) -> Result<()>
where
    T: Serialize,
    R: Serialize,
    F: Fn(CorpusId, &T) -> Vec<R>,
{
    let Some(path) = path else {
        println!("{}", serde_json::to_string_pretty(outputs)?);
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("create {path:?}"))?;
    let mut writer = csv::Writer::from_writer(file);
    let mut written = 0usize;
    for output in outputs {
        for item in &output.results {
            for row in rows(output.corpus_id, item) {
                writer.serialize(row)?;
                written += 1;
            }
        }
    }
    writer.flush()?;
    info!(path = %path.display(), rows = written, "wrote extraction csv");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RelationRow {
    pub corpus_id: CorpusId,
    pub index: usize,
    pub subject_word: String,
    pub subject_role: EntityRole,
    pub predicate: String,
    pub object_word: String,
    pub object_role: EntityRole,
    pub sentence: String,
}

pub fn relation_rows(corpus_id: CorpusId, fact: &RelationFact) -> Vec<RelationRow> {
    vec![RelationRow {
        corpus_id,
        index: fact.index,
        subject_word: fact.subject_word.clone(),
        subject_role: fact.subject_role,
        predicate: fact.predicate.clone(),
        object_word: fact.object_word.clone(),
        object_role: fact.object_role,
        sentence: fact.sentence.clone(),
    }]
}

#[derive(Debug, Serialize)]
pub struct EventRow {
    pub corpus_id: CorpusId,
    pub index: usize,
    pub head_trigger: String,
    pub predicted_relation: String,
    pub tail_trigger: String,
    pub confidence: Option<f64>,
    pub sentence: String,
}

pub fn event_rows(corpus_id: CorpusId, fact: &EventRelationFact) -> Vec<EventRow> {
    vec![EventRow {
        corpus_id,
        index: fact.index,
        head_trigger: fact.head_trigger.clone(),
        predicted_relation: fact.predicted_relation.clone(),
        tail_trigger: fact.tail_trigger.clone(),
        confidence: fact.probabilities.get(&fact.predicted_relation).copied(),
        sentence: fact.sentence.clone(),
    }]
}

#[derive(Debug, Serialize)]
pub struct MentionRow {
    pub corpus_id: CorpusId,
    pub index: usize,
    pub word: String,
    pub entity_type: EntityType,
    pub content: String,
}

pub fn ner_rows(corpus_id: CorpusId, sentence: &SentenceEntities) -> Vec<MentionRow> {
    sentence
        .entities
        .iter()
        .map(|mention| MentionRow {
            corpus_id,
            index: sentence.index,
            word: mention.word.clone(),
            entity_type: mention.entity_type,
            content: sentence.content.clone(),
        })
        .collect()
}
