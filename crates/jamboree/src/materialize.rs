//! Bounded-retry materialization of fire-and-forget creations.
//!
//! The host's creation calls return nothing. A new object can only be
//! identified by snapshotting the collection before the call, re-listing
//! it afterwards, and diffing ids - and the object does not necessarily
//! appear on the first poll. This module wraps that dance in a bounded
//! retry with linear backoff and a cancellation token, so a deleted set or
//! shutting-down engine never leaves a poller spinning.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use jamconf::MaterializeTuning;
use jamproto::{diff, Handle, Snapshot};

/// Retry bounds for one materialization.
#[derive(Debug, Clone)]
pub struct MaterializeConfig {
    /// Poll attempts before giving up.
    pub max_attempts: u32,
    /// Linear backoff step: attempt n waits `n * backoff_step`.
    pub backoff_step: Duration,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_step: Duration::from_millis(300),
        }
    }
}

impl MaterializeConfig {
    pub fn from_tuning(tuning: &MaterializeTuning) -> Self {
        Self {
            max_attempts: tuning.max_attempts,
            backoff_step: Duration::from_millis(tuning.backoff_step_ms),
        }
    }

    /// Delay before poll `attempt` (1-based).
    ///
    /// Linear, not exponential: the host settles within a few hundred
    /// milliseconds or not at all, so growing the wait geometrically only
    /// delays the failure report.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Every poll came back without an identifiable new object.
    ///
    /// `collection_grew` distinguishes "nothing happened" from "the host
    /// created *something* but it never became identifiable" (it grew the
    /// listing by a phantom slot). Callers may treat the latter as a
    /// partial success.
    #[error("no new object identified after {attempts} attempts (collection grew: {collection_grew})")]
    AttemptsExhausted { attempts: u32, collection_grew: bool },

    #[error("materialization cancelled")]
    Cancelled,

    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// Issue a creation call and poll until its product is identifiable.
///
/// Takes its own before-snapshot, so concurrent materializations of other
/// collections (or even this one, serialized by the caller's lock) never
/// share state. If a poll reveals more than one new object - someone else
/// mutated the collection in the gap - the first in collection order wins
/// and the anomaly is logged rather than escalated.
pub async fn materialize<C, CFut, S, SFut>(
    create: C,
    snapshot: S,
    config: &MaterializeConfig,
    cancel: &CancellationToken,
) -> Result<Handle, MaterializeError>
where
    C: FnOnce() -> CFut,
    CFut: Future<Output = anyhow::Result<()>>,
    S: Fn() -> SFut,
    SFut: Future<Output = anyhow::Result<Snapshot>>,
{
    let before = snapshot().await?;
    create().await?;

    let mut last_raw_len = before.raw_len();
    for attempt in 1..=config.max_attempts {
        let delay = config.backoff_for_attempt(attempt);
        tokio::select! {
            _ = cancel.cancelled() => return Err(MaterializeError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        let after = snapshot().await?;
        last_raw_len = after.raw_len();

        let mut fresh = diff(&before, &after);
        match fresh.len() {
            0 => {
                tracing::debug!(attempt, "no identifiable new object yet");
            }
            1 => {
                let handle = fresh.remove(0);
                tracing::info!(object.id = %handle.id, object.index = handle.index, attempt, "materialized");
                return Ok(handle);
            }
            n => {
                // Ambiguous creation: the collection gained several objects
                // in one gap. Collection order is the only tiebreak we have.
                let handle = fresh.remove(0);
                tracing::warn!(
                    object.id = %handle.id,
                    new_objects = n,
                    attempt,
                    "ambiguous creation, taking first in collection order"
                );
                return Ok(handle);
            }
        }
    }

    Err(MaterializeError::AttemptsExhausted {
        attempts: config.max_attempts,
        collection_grew: last_raw_len > before.raw_len(),
    })
}
