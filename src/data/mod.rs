//! Corpus storage collaborators.

pub mod corpus;

pub use corpus::{parse_sentences, CorpusId, CorpusSource, FileCorpusSource, InMemoryCorpusSource};
