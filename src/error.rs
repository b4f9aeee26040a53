//! Typed failures for the remote model boundary and the corpus source.

use thiserror::Error;

use crate::data::CorpusId;

/// Failure of a single remote model invocation.
///
/// Callers inside the extraction pipeline treat every variant as "no signal";
/// the variants exist so the decision is explicit and the cause can be logged.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The service answered but flagged the request as failed
    /// (`code != 200` or `status != "success"`).
    #[error("{endpoint} rejected the request: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("malformed response from {endpoint}: {message}")]
    Malformed { endpoint: String, message: String },
}

impl ModelError {
    pub(crate) fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if err.is_decode() {
            ModelError::Malformed {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        } else {
            ModelError::Transport {
                endpoint: endpoint.to_string(),
                source: err,
            }
        }
    }

    /// Endpoint the failing call was addressed to.
    pub fn endpoint(&self) -> &str {
        match self {
            ModelError::Transport { endpoint, .. }
            | ModelError::Timeout { endpoint }
            | ModelError::Status { endpoint, .. }
            | ModelError::Rejected { endpoint, .. }
            | ModelError::Malformed { endpoint, .. } => endpoint,
        }
    }
}

/// Failure to load the sentences of a corpus. Fatal to the run that hit it.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus {0} not found")]
    NotFound(CorpusId),

    #[error("reading corpus {id}: {source}")]
    Io {
        id: CorpusId,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing corpus {id}: {message}")]
    Parse { id: CorpusId, message: String },
}
