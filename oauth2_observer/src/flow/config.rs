use std::{sync::LazyLock, time::Duration};

use crate::config::env_or;

/// Lifetime of a flow that never reaches its redirect-uri, in milliseconds.
pub(super) static AUTHORIZATION_KEEP_ALIVE_MS: LazyLock<u64> =
    LazyLock::new(|| env_or("OAUTH2_OBSERVER_AUTHORIZATION_KEEP_ALIVE_MS", 180_000));

/// Grace period after the redirect-uri response before the flow is finished, in milliseconds.
pub(super) static REDIRECT_URI_KEEP_ALIVE_MS: LazyLock<u64> =
    LazyLock::new(|| env_or("OAUTH2_OBSERVER_REDIRECT_URI_KEEP_ALIVE_MS", 3_000));

/// Hard ceiling on simultaneously tracked flows.
pub(super) static MAX_TRACKED_FLOWS: LazyLock<usize> =
    LazyLock::new(|| env_or("OAUTH2_OBSERVER_MAX_TRACKED_FLOWS", 256));

/// Whether two authorization requests with neither `state` nor `nonce` are
/// treated as the same flow when their `client_id` matches.
pub(super) static MERGE_ANONYMOUS_FLOWS: LazyLock<bool> =
    LazyLock::new(|| env_or("OAUTH2_OBSERVER_MERGE_ANONYMOUS_FLOWS", true));

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub authorization_keep_alive: Duration,
    pub redirect_uri_keep_alive: Duration,
    pub max_tracked_flows: usize,
    pub merge_anonymous_flows: bool,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            authorization_keep_alive: Duration::from_millis(*AUTHORIZATION_KEEP_ALIVE_MS),
            redirect_uri_keep_alive: Duration::from_millis(*REDIRECT_URI_KEEP_ALIVE_MS),
            max_tracked_flows: *MAX_TRACKED_FLOWS,
            merge_anonymous_flows: *MERGE_ANONYMOUS_FLOWS,
        }
    }
}
