//! Waiting for an accepted command to show up in the spa state.
//!
//! The backend applies changes asynchronously with a roughly uniform delay,
//! so polling uses a fixed interval rather than backoff.

use crate::config::ConvergencePolicy;
use crate::error::{Result, SmartTubError};
use std::future::Future;

/// Number of fetches that fit in the policy: `ceil(timeout / poll_interval)`,
/// never fewer than one
pub fn attempts_for(policy: &ConvergencePolicy) -> u32 {
    if policy.poll_interval_ms == 0 {
        return 1;
    }
    let attempts = policy.timeout_ms.div_ceil(policy.poll_interval_ms);
    attempts.clamp(1, u32::MAX as u64) as u32
}

/// Re-fetch state until `predicate` holds, returning the satisfying state.
///
/// Fetch errors abort the wait. If the predicate never holds within the
/// policy, fails with `ConvergenceTimeout`.
pub async fn wait_until<T, F, Fut, P>(
    what: &str,
    policy: &ConvergencePolicy,
    mut fetch: F,
    mut predicate: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&T) -> bool,
{
    let attempts = attempts_for(policy);

    for attempt in 1..=attempts {
        let state = fetch().await?;
        if predicate(&state) {
            tracing::debug!("{} observed after {} attempt(s)", what, attempt);
            return Ok(state);
        }
        if attempt < attempts {
            tracing::trace!("{} not yet observed ({}/{})", what, attempt, attempts);
            tokio::time::sleep(policy.poll_interval()).await;
        }
    }

    tracing::warn!("Gave up waiting for {} after {} attempt(s)", what, attempts);
    Err(SmartTubError::ConvergenceTimeout {
        what: what.to_string(),
        attempts,
    })
}
