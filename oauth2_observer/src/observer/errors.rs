use thiserror::Error;

use crate::traffic::TrafficError;

/// Failure inside a single observer handler.
///
/// The assessor retires the failing observer without a verdict; its siblings
/// and the flow registry are unaffected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObserverError {
    #[error(transparent)]
    InvalidUrl(#[from] TrafficError),

    #[error("Missing header: {0}")]
    MissingHeader(&'static str),
}
