//! Planner relay messages.
//!
//! The planning service talks to the engine over a message relay (the
//! transport itself lives outside this workspace). Inbound messages report
//! project state and ask for work; the outbound `execute_action` envelope
//! carries a JSON-encoded [`ActionRequest`] in its `instruction` field,
//! which is all the engine ever consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Messages arriving from the engine side of the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayInbound {
    /// Current project state, merged into the planner's view.
    ProjectStatus {
        #[serde(default)]
        state: Value,
    },
    /// The device is idle and wants the next instruction.
    RequestNextAction,
    /// A previously issued action finished.
    ActionCompleted {
        action: String,
        #[serde(default)]
        result: Value,
    },
    /// The current production phase is done.
    PhaseComplete,
}

/// Messages the planner sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayOutbound {
    /// Do this next. `instruction` is a JSON-encoded [`ActionRequest`].
    ExecuteAction {
        instruction: String,
        phase: u32,
        timestamp: DateTime<Utc>,
    },
    /// The production phase advanced.
    PhaseChanged { phase: u32, info: PhaseInfo },
}

/// Human-readable description of a production phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseInfo {
    pub phase: u32,
    pub description: String,
}

/// Decoded instruction payload: the action name plus loose parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub parameters: ActionParams,
}

/// Parameters an instruction may carry. All optional; each action reads
/// the ones it understands and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_beats: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("instruction is not a valid action request: {0}")]
    Instruction(#[from] serde_json::Error),
}

impl ActionRequest {
    /// Decode the `instruction` field of an `execute_action` envelope.
    pub fn decode(instruction: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(instruction)?)
    }
}
