//! Jamboree: drive a live DAW set through a one-call-at-a-time bridge.
//!
//! The host object model this engine talks to has two awkward properties.
//! Creation calls return nothing - a new track or clip can only be found
//! by listing the collection before and after and diffing ids. And objects
//! reject overlapping calls - a burst of note inserts against one clip
//! raises "operation already in progress" partway through. Everything here
//! exists to make reliable automation out of that interface:
//!
//! - [`materialize`] - bounded-retry snapshot diffing for fire-and-forget
//!   creations, with linear backoff and cancellation
//! - [`selector`] - a deterministic priority ladder for picking one track
//!   out of several fuzzy name matches, with audited reasons
//! - [`memory`] - the last materialized track per semantic kind, consulted
//!   before any heuristics
//! - [`pacer`] - strictly serialized command streaming with an enforced
//!   inter-command gap and per-command failure reports
//! - [`patterns`] - deterministic note generators for the stock archetypes
//! - [`composer`] / [`dispatch`] - the facade tying it together and the
//!   planner-action mapping onto it
//!
//! The transport (relay WebSocket, Max bridge) lives outside this crate;
//! implement [`host::HostApi`] to connect a real set, or script a fake for
//! tests.

pub mod analyze;
pub mod clips;
pub mod composer;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod materialize;
pub mod memory;
pub mod pacer;
pub mod patterns;
pub mod recommend;
pub mod selector;
pub mod tempo;

pub use analyze::{ProjectAnalysis, TrackReport};
pub use composer::{Composer, PatternOutcome};
pub use dispatch::dispatch;
pub use error::EngineError;
pub use host::{HostApi, ObjectPath, TargetLocks};
pub use materialize::{materialize, MaterializeConfig, MaterializeError};
pub use memory::{MemoryEntry, SessionMemory, TrackKind};
pub use pacer::{run_sequence, CommandFailure, PacerConfig, PacerError, SequenceReport};
pub use patterns::{generate, PatternKind};
pub use selector::{select, Candidate, ResourceQuery, Selection, SelectionReason};
