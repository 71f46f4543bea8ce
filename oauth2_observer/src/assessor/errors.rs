use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Assessor service is closed")]
    Closed,

    #[error("Assessor task failed: {0}")]
    Join(String),
}
