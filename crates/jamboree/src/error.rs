//! Engine error taxonomy.
//!
//! Per-command and per-attempt failures never surface here - those are
//! aggregated into reports by the pacer and materializer. This enum covers
//! the "could not even begin" cases (bad parameters, nothing matched) and
//! the terminal outcomes of the retry loops.

use thiserror::Error;

use crate::materialize::MaterializeError;
use crate::pacer::PacerError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No track's display name contained the query substring.
    #[error("no track matches '{query}'")]
    TrackNotFound { query: String },

    /// Rejected before any host call was attempted.
    #[error("tempo {bpm} outside supported range [{min}, {max}]")]
    TempoOutOfRange { bpm: f64, min: f64, max: f64 },

    #[error("unknown action '{action}'")]
    UnknownAction { action: String },

    #[error("action '{action}' requires parameter '{parameter}'")]
    MissingParameter {
        action: String,
        parameter: &'static str,
    },

    /// The host object model offers no reliable way to load devices; the
    /// engine surfaces this as an explicit capability gap instead of
    /// probing. See [`crate::recommend`] for the manual fallback.
    #[error("instrument loading is not supported by the host bridge; load an instrument on '{query}' manually")]
    InstrumentLoadingUnsupported { query: String },

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error(transparent)]
    Pacer(#[from] PacerError),

    #[error("host call failed: {0}")]
    Host(#[from] anyhow::Error),
}
