//! Serialized command pacing against a single host object.
//!
//! The host rejects a call to an object while another is still settling
//! ("operation already in progress"), and offers no completion callback to
//! wait on. The only correctness guarantee available is strict
//! serialization with a fixed gap between commands - so that is what this
//! module enforces, recording per-command failures without aborting the
//! rest of the sequence.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use jamconf::PacingTuning;
use jamproto::Command;

use crate::host::{HostApi, ObjectPath};

/// Pacing delays for one sequence.
#[derive(Debug, Clone)]
pub struct PacerConfig {
    /// Gap after each command completes, before the next is issued.
    pub command_gap: Duration,
    /// Settle time before the first command.
    pub lead_in: Duration,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            command_gap: Duration::from_millis(50),
            lead_in: Duration::from_millis(100),
        }
    }
}

impl PacerConfig {
    pub fn from_tuning(tuning: &PacingTuning) -> Self {
        Self {
            command_gap: Duration::from_millis(tuning.command_gap_ms),
            lead_in: Duration::from_millis(tuning.lead_in_ms),
        }
    }
}

/// One command that errored mid-sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandFailure {
    pub index: usize,
    pub verb: String,
    pub error: String,
}

/// Outcome of a paced sequence. Failures are data, not exceptions: a
/// rejected note insert should not cost the rest of the pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SequenceReport {
    pub succeeded: usize,
    pub failures: Vec<CommandFailure>,
}

impl SequenceReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum PacerError {
    /// The token fired between commands; `issued` commands had already run.
    #[error("sequence cancelled after {issued} of {total} commands")]
    Cancelled { issued: usize, total: usize },
}

/// Stream `commands` to `target` one at a time.
///
/// Waits `lead_in` before the first command and `command_gap` after each
/// command completes - success or failure - before issuing the next.
/// Cancellation is only observed at those gaps; there is no per-command
/// timeout, so a host call that never returns stalls the sequence (a known
/// limitation of the host interface).
pub async fn run_sequence(
    host: &dyn HostApi,
    target: &ObjectPath,
    commands: &[Command],
    config: &PacerConfig,
    cancel: &CancellationToken,
) -> Result<SequenceReport, PacerError> {
    let mut report = SequenceReport::default();

    for (index, command) in commands.iter().enumerate() {
        let delay = if index == 0 {
            config.lead_in
        } else {
            config.command_gap
        };
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(PacerError::Cancelled {
                    issued: index,
                    total: commands.len(),
                })
            }
            _ = tokio::time::sleep(delay) => {}
        }

        match execute(host, target, command).await {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                tracing::warn!(
                    target.path = %target,
                    command.index = index,
                    command.verb = command.verb(),
                    error = %e,
                    "paced command failed, continuing sequence"
                );
                report.failures.push(CommandFailure {
                    index,
                    verb: command.verb().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        target.path = %target,
        succeeded = report.succeeded,
        failed = report.failures.len(),
        "sequence complete"
    );
    Ok(report)
}

async fn execute(
    host: &dyn HostApi,
    target: &ObjectPath,
    command: &Command,
) -> anyhow::Result<()> {
    match command {
        Command::Call { method, args } | Command::CreateChild { method, args } => {
            host.call(target, method, args).await.map(|_| ())
        }
        Command::Set { property, value } => host.set(target, property, value.clone()).await,
    }
}
