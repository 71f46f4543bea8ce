use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrafficError {
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}
