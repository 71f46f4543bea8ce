//! Central configuration for the oauth2_observer crate

use std::{env, str::FromStr, sync::LazyLock};

/// Title of every vulnerability notification handed to the user notifier.
///
/// Default: "OAuth vulnerability detected"
pub static NOTIFICATION_TITLE: LazyLock<String> = LazyLock::new(|| {
    env::var("OAUTH2_OBSERVER_NOTIFICATION_TITLE")
        .unwrap_or_else(|_| "OAuth vulnerability detected".to_string())
});

/// Read `name` from the environment, falling back to `default` when it is
/// unset or does not parse.
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
