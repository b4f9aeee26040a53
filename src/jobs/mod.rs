//! Background corpus analysis jobs.
//!
//! A [`JobManager`] walks a corpus sentence by sentence on a spawned task,
//! recording progress after every sentence and the collected items once the
//! loop ends. Pollers read progress and results from the shared
//! [`JobStore`] independently of the running task.
//!
//! Resubmitting a key starts a new run immediately. The previous run is not
//! cancelled, but its writes are fenced off by generation so pollers only
//! ever observe the latest run.

pub mod analysis;
pub mod store;

use std::{panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use dashmap::DashMap;
use futures::FutureExt;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, instrument, warn, Instrument};

use crate::{
    data::{CorpusId, CorpusSource},
    error::CorpusError,
};

pub use analysis::{EventRelationAnalysis, NerAnalysis, RelationAnalysis};
pub use store::{JobSnapshot, JobState, JobStore};

/// Per-sentence work performed by a job kind.
#[async_trait]
pub trait SentenceAnalysis: Send + Sync + 'static {
    type Item: Send + Sync + 'static;

    /// Label used in logs.
    fn kind(&self) -> &'static str;

    /// Sentences with fewer characters are not analysed.
    fn min_sentence_chars(&self) -> usize;

    /// Items for sentence `index` (1-based).
    async fn analyse(&self, index: usize, sentence: &str) -> Vec<Self::Item>;

    /// Items recorded for a sentence below the minimum length.
    fn skipped(&self, _index: usize, _sentence: &str) -> Vec<Self::Item> {
        Vec::new()
    }
}

/// `round(100 * done / total)`, clamped to 100.
pub fn percent_complete(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (done as f64 * 100.0 / total as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

struct Inner<A: SentenceAnalysis> {
    analysis: A,
    corpus: Arc<dyn CorpusSource>,
    store: JobStore<A::Item>,
    registry: DashMap<CorpusId, RunHandle>,
}

/// Latest task spawned for a key. Entries are replaced on resubmission and
/// never removed, so pollers and waiters always see the current run.
struct RunHandle {
    generation: u64,
    task: JoinHandle<()>,
    finished: watch::Receiver<bool>,
}

/// Flips the run's `finished` flag when the task ends, panics included.
struct FinishGuard(watch::Sender<bool>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.send_replace(true);
    }
}

/// At-most-one-visible-run-per-key job engine for one analysis kind.
pub struct JobManager<A: SentenceAnalysis> {
    inner: Arc<Inner<A>>,
}

impl<A: SentenceAnalysis> Clone for JobManager<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: SentenceAnalysis> JobManager<A> {
    pub fn new(analysis: A, corpus: Arc<dyn CorpusSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                analysis,
                corpus,
                store: JobStore::new(),
                registry: DashMap::new(),
            }),
        }
    }

    /// Start a new run for `key` and return without waiting for it.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(self), fields(kind = self.inner.analysis.kind()))]
    pub fn submit(&self, key: CorpusId) -> u64 {
        let generation = self.inner.store.supersede(key);
        let inner = Arc::clone(&self.inner);
        let span = tracing::info_span!("job", kind = inner.analysis.kind(), corpus_id = key, generation);
        let (finished_tx, finished) = watch::channel(false);
        let task = tokio::spawn(
            async move {
                let _guard = FinishGuard(finished_tx);
                run(inner, key, generation).await;
            }
            .instrument(span),
        );
        let handle = RunHandle {
            generation,
            task,
            finished,
        };
        if let Some(previous) = self.inner.registry.insert(key, handle) {
            if !previous.task.is_finished() {
                info!(corpus_id = key, "superseding an unfinished run");
            }
        }
        generation
    }

    /// Last recorded progress, 0 for unknown keys.
    pub fn progress(&self, key: CorpusId) -> u8 {
        self.inner.store.progress(key)
    }

    /// Results of the last completed run, or `None` when not ready.
    pub fn result(&self, key: CorpusId) -> Option<Arc<Vec<A::Item>>> {
        self.inner.store.results(key)
    }

    pub fn status(&self, key: CorpusId) -> JobSnapshot {
        self.inner.store.snapshot(key)
    }

    /// Whether the latest task spawned for `key` is still executing.
    pub fn is_running(&self, key: CorpusId) -> bool {
        self.inner
            .registry
            .get(&key)
            .map(|handle| !handle.task.is_finished())
            .unwrap_or(false)
    }

    /// Number of keys whose latest run is still executing.
    pub fn active_jobs(&self) -> usize {
        self.inner
            .registry
            .iter()
            .filter(|entry| !entry.value().task.is_finished())
            .count()
    }

    /// Wait until the latest run for `key` has finished.
    ///
    /// Returns immediately for keys that were never submitted. A resubmission
    /// made while waiting is waited for as well. Any number of callers may
    /// wait on the same key; the run stays visible to [`is_running`] until it
    /// actually ends.
    ///
    /// [`is_running`]: JobManager::is_running
    pub async fn wait(&self, key: CorpusId) {
        loop {
            let Some((generation, mut finished)) = self
                .inner
                .registry
                .get(&key)
                .map(|handle| (handle.generation, handle.finished.clone()))
            else {
                return;
            };
            if finished.wait_for(|done| *done).await.is_err() {
                warn!(corpus_id = key, generation, "job task dropped without finishing");
            }
            let latest = self.inner.registry.get(&key).map(|handle| handle.generation);
            if latest == Some(generation) {
                return;
            }
        }
    }

    pub fn analysis(&self) -> &A {
        &self.inner.analysis
    }
}

async fn run<A: SentenceAnalysis>(inner: Arc<Inner<A>>, key: CorpusId, generation: u64) {
    if !inner.store.begin(key, generation) {
        return;
    }
    info!("run started");

    let outcome = AssertUnwindSafe(scan(&inner, key, generation))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(items)) => {
            let count = items.len();
            if inner.store.complete(key, generation, items) {
                info!(results = count, "run completed");
            } else {
                info!(results = count, "run superseded; results discarded");
            }
        }
        Ok(Err(err)) => {
            warn!(error = %err, "corpus unavailable; completing with no results");
            inner.store.fail(key, generation, err.to_string());
        }
        Err(_) => {
            warn!("run panicked");
            inner.store.fail(key, generation, "analysis task panicked");
        }
    }
}

async fn scan<A: SentenceAnalysis>(
    inner: &Inner<A>,
    key: CorpusId,
    generation: u64,
) -> Result<Vec<A::Item>, CorpusError> {
    let sentences = inner.corpus.sentences(key).await?;

    let total = sentences.len();
    let min_chars = inner.analysis.min_sentence_chars();
    let mut items = Vec::new();
    for (i, sentence) in sentences.iter().enumerate() {
        let index = i + 1;
        if sentence.chars().count() < min_chars {
            items.extend(inner.analysis.skipped(index, sentence));
        } else {
            items.extend(inner.analysis.analyse(index, sentence).await);
        }
        inner
            .store
            .record_progress(key, generation, percent_complete(index, total));
    }
    Ok(items)
}
