//! Protocol and domain types for the Jamboree message bus.
//!
//! This crate defines the vocabulary shared between the engine and its two
//! external collaborators: the host bridge (a DAW object model reached
//! through a synchronous, one-call-at-a-time interface) and the planner
//! relay. It deliberately contains no transport and no IO — types only,
//! plus the pure snapshot diff that everything downstream is built on.
//!
//! Key types:
//! - [`ObjectId`] / [`Handle`] — identity of a host-side object: a stable
//!   id plus a volatile collection index
//! - [`Snapshot`] — a collection listing frozen at one instant, and
//!   [`diff`] over two of them
//! - [`Command`] — one unit of a paced command sequence
//! - [`NoteEvent`] — one note of a generated pattern
//! - [`relay`] — planner-facing message envelopes

pub mod command;
pub mod handle;
pub mod notes;
pub mod relay;
pub mod snapshot;

pub use command::Command;
pub use handle::{Handle, ObjectId};
pub use notes::NoteEvent;
pub use relay::{ActionParams, ActionRequest, PhaseInfo, RelayInbound, RelayOutbound};
pub use snapshot::{diff, Snapshot};
