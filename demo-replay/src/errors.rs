use thiserror::Error;

use oauth2_observer::{ServiceError, TrafficError};

#[derive(Debug, Error)]
pub(crate) enum ReplayError {
    #[error("Failed to read recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Url(#[from] TrafficError),

    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
