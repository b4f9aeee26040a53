//! Keyed progress/result slots shared between run tasks and pollers.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::data::CorpusId;

/// Lifecycle of the latest run for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    NotStarted,
    Running,
    Completed,
}

/// Point-in-time view of a key's slot.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub corpus_id: CorpusId,
    pub state: JobState,
    pub progress: u8,
    /// Number of stored results; `None` until a run has completed.
    pub result_count: Option<usize>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct Slot<T> {
    /// Generation of the most recent submission; writes tagged with any
    /// other generation are ignored.
    generation: u64,
    state: JobState,
    progress: u8,
    results: Option<Arc<Vec<T>>>,
    error: Option<String>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            state: JobState::NotStarted,
            progress: 0,
            results: None,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }
}

/// Concurrent `corpus id -> job slot` map, generic over the result item.
///
/// All writes for one key go through the slot's shard lock, so a generation
/// check and the write it guards are atomic with respect to a resubmission.
#[derive(Debug)]
pub struct JobStore<T> {
    slots: DashMap<CorpusId, Slot<T>>,
    generations: AtomicU64,
}

impl<T> Default for JobStore<T> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
            generations: AtomicU64::new(0),
        }
    }
}

impl<T> JobStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a fresh generation for `key`, superseding any earlier run.
    ///
    /// Visible state is left untouched until the new run calls [`begin`].
    ///
    /// [`begin`]: JobStore::begin
    pub fn supersede(&self, key: CorpusId) -> u64 {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        self.slots.entry(key).or_default().generation = generation;
        generation
    }

    /// Reset the slot for the run holding `generation`.
    pub fn begin(&self, key: CorpusId, generation: u64) -> bool {
        self.write(key, generation, |slot| {
            slot.state = JobState::Running;
            slot.progress = 0;
            slot.results = None;
            slot.error = None;
            slot.started_at = Some(Utc::now());
            slot.finished_at = None;
        })
    }

    /// Record progress; values never move backwards within a run.
    pub fn record_progress(&self, key: CorpusId, generation: u64, progress: u8) -> bool {
        self.write(key, generation, |slot| {
            slot.progress = slot.progress.max(progress.min(100));
        })
    }

    /// Store the run's results and mark it completed.
    pub fn complete(&self, key: CorpusId, generation: u64, results: Vec<T>) -> bool {
        self.finish(key, generation, results, None)
    }

    /// Complete the run with no results, keeping the failure for operators.
    pub fn fail(&self, key: CorpusId, generation: u64, error: impl Into<String>) -> bool {
        self.finish(key, generation, Vec::new(), Some(error.into()))
    }

    fn finish(&self, key: CorpusId, generation: u64, results: Vec<T>, error: Option<String>) -> bool {
        self.write(key, generation, move |slot| {
            slot.state = JobState::Completed;
            slot.progress = 100;
            slot.results = Some(Arc::new(results));
            slot.error = error;
            slot.finished_at = Some(Utc::now());
        })
    }

    fn write(&self, key: CorpusId, generation: u64, apply: impl FnOnce(&mut Slot<T>)) -> bool {
        match self.slots.get_mut(&key) {
            Some(mut slot) if slot.generation == generation => {
                apply(&mut slot);
                true
            }
            _ => false,
        }
    }

    /// Last recorded progress, 0 for unknown keys.
    pub fn progress(&self, key: CorpusId) -> u8 {
        self.slots.get(&key).map(|slot| slot.progress).unwrap_or(0)
    }

    /// Results of the last completed run; `None` while not ready.
    pub fn results(&self, key: CorpusId) -> Option<Arc<Vec<T>>> {
        self.slots.get(&key).and_then(|slot| slot.results.clone())
    }

    pub fn snapshot(&self, key: CorpusId) -> JobSnapshot {
        match self.slots.get(&key) {
            Some(slot) => JobSnapshot {
                corpus_id: key,
                state: slot.state,
                progress: slot.progress,
                result_count: slot.results.as_ref().map(|results| results.len()),
                error: slot.error.clone(),
                started_at: slot.started_at,
                finished_at: slot.finished_at,
            },
            None => JobSnapshot {
                corpus_id: key,
                state: JobState::NotStarted,
                progress: 0,
                result_count: None,
                error: None,
                started_at: None,
                finished_at: None,
            },
        }
    }
}
