//! Runtime tuning seeds.
//!
//! These defaults encode the timings the host is known to tolerate:
//! track materialization settles within a handful of 300ms-stepped polls,
//! and paced commands need roughly 50ms of air between them before the
//! object stops raising "operation already in progress".

use serde::{Deserialize, Serialize};

/// All runtime tuning, grouped by concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    #[serde(default)]
    pub materialize: MaterializeTuning,
    #[serde(default)]
    pub pacing: PacingTuning,
    #[serde(default)]
    pub clips: ClipTuning,
    #[serde(default)]
    pub tempo: TempoTuning,
}

/// Bounded-retry settings for creation polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializeTuning {
    /// Poll attempts before giving up on identifying a new object.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Linear backoff step: attempt n waits n * this.
    #[serde(default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,
}

impl Default for MaterializeTuning {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_step_ms: default_backoff_step_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_step_ms() -> u64 {
    300
}

/// Serial command pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingTuning {
    /// Gap after each command completes, before the next is issued.
    #[serde(default = "default_command_gap_ms")]
    pub command_gap_ms: u64,
    /// Settle time before the first command of a sequence.
    #[serde(default = "default_lead_in_ms")]
    pub lead_in_ms: u64,
}

impl Default for PacingTuning {
    fn default() -> Self {
        Self {
            command_gap_ms: default_command_gap_ms(),
            lead_in_ms: default_lead_in_ms(),
        }
    }
}

fn default_command_gap_ms() -> u64 {
    50
}

fn default_lead_in_ms() -> u64 {
    100
}

/// Clip slot scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipTuning {
    /// How many session slots to inspect per track.
    #[serde(default = "default_slots_scanned")]
    pub slots_scanned: usize,
    /// Only the first few slots are used for new clips; beyond that the
    /// slot-0 clip is reused and rewritten.
    #[serde(default = "default_preferred_slots")]
    pub preferred_slots: usize,
}

impl Default for ClipTuning {
    fn default() -> Self {
        Self {
            slots_scanned: default_slots_scanned(),
            preferred_slots: default_preferred_slots(),
        }
    }
}

fn default_slots_scanned() -> usize {
    8
}

fn default_preferred_slots() -> usize {
    4
}

/// Tempo bounds and ramp defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoTuning {
    #[serde(default = "default_min_bpm")]
    pub min_bpm: f64,
    #[serde(default = "default_max_bpm")]
    pub max_bpm: f64,
    /// Default step count for smooth tempo ramps.
    #[serde(default = "default_ramp_steps")]
    pub ramp_steps: u32,
    /// Delay between ramp steps.
    #[serde(default = "default_ramp_interval_ms")]
    pub ramp_interval_ms: u64,
}

impl Default for TempoTuning {
    fn default() -> Self {
        Self {
            min_bpm: default_min_bpm(),
            max_bpm: default_max_bpm(),
            ramp_steps: default_ramp_steps(),
            ramp_interval_ms: default_ramp_interval_ms(),
        }
    }
}

fn default_min_bpm() -> f64 {
    60.0
}

fn default_max_bpm() -> f64 {
    200.0
}

fn default_ramp_steps() -> u32 {
    10
}

fn default_ramp_interval_ms() -> u64 {
    200
}
