//! Note events produced by pattern generators.

use serde::{Deserialize, Serialize};

/// One note of a pattern, in beats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI pitch, 0..=127.
    pub pitch: u8,
    /// Onset in beats from clip start, >= 0.
    pub start: f64,
    /// Length in beats, > 0.
    pub duration: f64,
    /// MIDI velocity, 1..=127.
    pub velocity: u8,
}

impl NoteEvent {
    pub fn new(pitch: u8, start: f64, duration: f64, velocity: u8) -> Self {
        Self {
            pitch,
            start,
            duration,
            velocity,
        }
    }

    /// Whether the event satisfies the wire invariants the host enforces.
    pub fn is_well_formed(&self) -> bool {
        self.pitch <= 127
            && self.start >= 0.0
            && self.duration > 0.0
            && (1..=127).contains(&self.velocity)
    }
}
