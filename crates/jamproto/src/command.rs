//! Paced command units.
//!
//! A [`Command`] is one message of a serialized sequence against a single
//! host object. The host rejects overlapping calls to one object, so
//! commands are never executed directly — they are handed to the pacer,
//! which streams them one at a time with an enforced gap.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unit of a paced sequence.
///
/// `Call` and `Set` mutate the target's state; `CreateChild` asks the
/// target to grow its collection (e.g. `create_clip` on a clip slot,
/// `create_midi_track` on the set). The distinction matters for reporting:
/// a failed structural verb usually means the whole operation is off the
/// rails, while a failed mutation is routinely skipped over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum Command {
    /// Invoke a method on the target.
    Call { method: String, args: Vec<Value> },
    /// Write a property on the target.
    Set { property: String, value: Value },
    /// Ask the target to create a child in its collection.
    CreateChild { method: String, args: Vec<Value> },
}

impl Command {
    pub fn call(method: impl Into<String>) -> Self {
        Command::Call {
            method: method.into(),
            args: Vec::new(),
        }
    }

    pub fn call_with(method: impl Into<String>, args: Vec<Value>) -> Self {
        Command::Call {
            method: method.into(),
            args,
        }
    }

    pub fn set(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Command::Set {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn create_child(method: impl Into<String>, args: Vec<Value>) -> Self {
        Command::CreateChild {
            method: method.into(),
            args,
        }
    }

    /// The method or property name, for failure reports.
    pub fn verb(&self) -> &str {
        match self {
            Command::Call { method, .. } => method,
            Command::Set { property, .. } => property,
            Command::CreateChild { method, .. } => method,
        }
    }
}
