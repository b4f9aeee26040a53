//! Asynchronous, progress-tracked entity and relation extraction over
//! classical Chinese corpora.
//!
//! A corpus is walked sentence by sentence on a background task; each
//! sentence goes through remote NER, rule-based candidate pairing and a
//! remote relation classifier. Progress and results are polled by key.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod nlp;
