use std::sync::LazyLock;

use crate::config::env_or;

pub(super) static STATE_REUSE_DETECTION: LazyLock<bool> =
    LazyLock::new(|| env_or("OAUTH2_OBSERVER_STATE_REUSE_DETECTION", false));

/// Dice coefficient at or above which two states count as the same value.
pub(super) static STATE_SIMILARITY: LazyLock<f64> =
    LazyLock::new(|| env_or("OAUTH2_OBSERVER_STATE_SIMILARITY", 0.95));

pub(super) static STATE_HISTORY_PER_CLIENT: LazyLock<usize> =
    LazyLock::new(|| env_or("OAUTH2_OBSERVER_STATE_HISTORY_PER_CLIENT", 32));

/// Settings of the CSRF-state check.
///
/// Exact comparison of the returned `state` is always performed. Reuse
/// detection across flows of the same client is opt-in.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrfSettings {
    pub reuse_detection: bool,
    pub similarity_threshold: f64,
    pub history_per_client: usize,
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            reuse_detection: *STATE_REUSE_DETECTION,
            similarity_threshold: *STATE_SIMILARITY,
            history_per_client: *STATE_HISTORY_PER_CLIENT,
        }
    }
}
