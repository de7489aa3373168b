//! Bounded wait loops.
//!
//! Every loop computes a wall-clock deadline once at entry and never sleeps
//! past it. Bound and interval are always passed in so tests can shrink them.

use std::future::Future;

use pkg_types::config::WaitConfig;
use pkg_types::{Error, Result};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Poll `check` until it reports `true` or the bound elapses.
///
/// Errors from `check` count as "not yet"; they are logged at trace level
/// since a resource that is still coming up routinely fails lookups.
pub async fn poll_until<F, Fut>(wait: WaitConfig, what: &str, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let deadline = start + wait.timeout;

    loop {
        match check().await {
            Ok(true) => return Ok(()),
            Ok(false) => trace!(waiting_for = %what, "condition not yet met"),
            Err(e) => trace!(waiting_for = %what, error = %e, "poll failed, retrying"),
        }

        let now = Instant::now();
        if now >= deadline {
            warn!(waiting_for = %what, elapsed_ms = (now - start).as_millis(), "wait timed out");
            return Err(Error::timeout(what, now - start));
        }
        tokio::time::sleep(wait.interval.min(deadline - now)).await;
    }
}

/// Retry `op` until it succeeds; at the deadline return its last error.
pub async fn retry_until<F, Fut, T>(wait: WaitConfig, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let deadline = start + wait.timeout;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let now = Instant::now();
                if now >= deadline {
                    warn!(
                        operation = %what,
                        attempt = attempt,
                        elapsed_ms = (now - start).as_millis(),
                        error = %e,
                        "Operation still failing at deadline"
                    );
                    return Err(e);
                }
                debug!(operation = %what, attempt = attempt, error = %e, "Operation failed, retrying");
                tokio::time::sleep(wait.interval.min(deadline - now)).await;
            }
        }
    }
}
