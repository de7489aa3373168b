//! Bounded wait defaults.

/// Upper bound for every bootstrap wait loop, in seconds.
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 120;

/// Interval between two polls of a wait loop, in seconds.
pub const DEFAULT_WAIT_INTERVAL_SECS: u64 = 5;

/// How long an install or upgrade may take to become stable, in seconds.
pub const DEFAULT_DEPLOY_TIMEOUT_SECS: u64 = 600;

/// Redraw interval of the progress spinner, in milliseconds.
pub const SPINNER_INTERVAL_MS: u64 = 150;
