//! Pattern generators.
//!
//! Pure functions from a pattern kind to an ordered list of note events.
//! No hidden randomness: the same arguments always produce the same notes,
//! which is what makes the paced write sequences reproducible and
//! testable. Variation is the planner's job, not ours.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use jamproto::NoteEvent;

/// General MIDI drum map positions used by the fixed motifs.
const KICK: u8 = 36;
const CLOSED_HAT: u8 = 42;
const OPEN_HAT: u8 = 46;

/// A named pattern archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Kick,
    Bassline,
    Melody,
    Pad,
    Hihat,
    /// Fallback when the requested kind is unrecognized.
    Basic,
}

impl PatternKind {
    pub const ALL: [PatternKind; 6] = [
        PatternKind::Kick,
        PatternKind::Bassline,
        PatternKind::Melody,
        PatternKind::Pad,
        PatternKind::Hihat,
        PatternKind::Basic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Kick => "kick",
            PatternKind::Bassline => "bassline",
            PatternKind::Melody => "melody",
            PatternKind::Pad => "pad",
            PatternKind::Hihat => "hihat",
            PatternKind::Basic => "basic",
        }
    }

    /// Display name given to clips carrying this pattern.
    pub fn clip_name(&self) -> String {
        format!("AI {} Pattern", self.as_str())
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.to_lowercase())
            .ok_or(())
    }
}

/// Generate the notes for `kind` over a clip of `length_beats`.
///
/// The fixed motifs (kick, bassline, melody, pad) span four beats; hihat
/// and the basic fallback scale with the clip length.
pub fn generate(kind: PatternKind, length_beats: f64) -> Vec<NoteEvent> {
    match kind {
        PatternKind::Kick => kick_pattern(),
        PatternKind::Bassline => bassline_pattern(),
        PatternKind::Melody => melody_pattern(),
        PatternKind::Pad => pad_pattern(),
        PatternKind::Hihat => hihat_pattern(length_beats),
        PatternKind::Basic => basic_pattern(length_beats),
    }
}

/// Resolve a loose kind string, falling back to [`PatternKind::Basic`] for
/// anything unrecognized.
pub fn resolve_kind(kind: &str) -> PatternKind {
    kind.parse().unwrap_or_else(|_| {
        tracing::warn!(pattern.kind = kind, "unknown pattern kind, using basic fallback");
        PatternKind::Basic
    })
}

/// Four-on-the-floor skeleton: beats 1 and 3, a softer syncope before
/// beat 2, and a lead-in into the next bar.
fn kick_pattern() -> Vec<NoteEvent> {
    vec![
        NoteEvent::new(KICK, 0.0, 0.25, 100),
        NoteEvent::new(KICK, 2.0, 0.25, 100),
        NoteEvent::new(KICK, 1.75, 0.25, 80),
        NoteEvent::new(KICK, 3.5, 0.25, 90),
    ]
}

/// C minor pentatonic groove (C1-Eb1-F1-G1-Bb1).
fn bassline_pattern() -> Vec<NoteEvent> {
    vec![
        NoteEvent::new(36, 0.0, 0.5, 85),  // C
        NoteEvent::new(41, 0.75, 0.25, 75), // F, short
        NoteEvent::new(43, 1.5, 0.5, 80),  // G
        NoteEvent::new(39, 2.5, 0.5, 85),  // Eb
        NoteEvent::new(43, 3.25, 0.25, 70), // G, short
    ]
}

/// Lead line around G4-A4-C5, the C5 carrying the emphasis.
fn melody_pattern() -> Vec<NoteEvent> {
    vec![
        NoteEvent::new(67, 0.0, 0.5, 90),
        NoteEvent::new(69, 0.5, 0.25, 80),
        NoteEvent::new(72, 1.0, 0.75, 100),
        NoteEvent::new(69, 2.0, 0.5, 90),
        NoteEvent::new(67, 2.75, 0.25, 85),
        NoteEvent::new(65, 3.25, 0.75, 90),
    ]
}

/// Block chords, one per beat: Cm - Ab - Bb - Gm.
fn pad_pattern() -> Vec<NoteEvent> {
    const CHORDS: [[u8; 3]; 4] = [
        [48, 51, 55], // Cm
        [44, 48, 51], // Ab
        [46, 50, 53], // Bb
        [43, 46, 50], // Gm
    ];

    let mut notes = Vec::with_capacity(12);
    for (beat, chord) in CHORDS.iter().enumerate() {
        for &pitch in chord {
            notes.push(NoteEvent::new(pitch, beat as f64, 1.0, 70));
        }
    }
    notes
}

/// Straight 16ths with downbeat accents and an open hat on the fixed
/// off-beat (`step % 8 == 6`).
fn hihat_pattern(length_beats: f64) -> Vec<NoteEvent> {
    let steps = (length_beats * 4.0) as usize;
    let mut notes = Vec::with_capacity(steps);

    for step in 0..steps {
        let start = step as f64 * 0.25;
        let mut pitch = CLOSED_HAT;
        let mut velocity: u8 = 60;

        if step % 4 == 0 {
            velocity += 20;
        }
        if step % 8 == 6 {
            pitch = OPEN_HAT;
            velocity += 10;
        }

        notes.push(NoteEvent::new(pitch, start, 0.125, velocity));
    }
    notes
}

/// One note per beat, stepping through a four-note cell around middle C.
fn basic_pattern(length_beats: f64) -> Vec<NoteEvent> {
    let beats = length_beats as usize;
    (0..beats)
        .map(|beat| NoteEvent::new(60 + (beat % 4) as u8, beat as f64, 0.5, 80))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn generators_are_deterministic() {
        for kind in PatternKind::ALL {
            assert_eq!(generate(kind, 4.0), generate(kind, 4.0));
        }
    }

    #[test]
    fn every_generated_note_is_well_formed() {
        for kind in PatternKind::ALL {
            for note in generate(kind, 4.0) {
                assert!(note.is_well_formed(), "{kind}: {note:?}");
            }
        }
    }

    #[test]
    fn kick_keeps_the_beat_1_beat_3_syncopation_layout() {
        let notes = generate(PatternKind::Kick, 4.0);
        assert_eq!(notes.len(), 4);
        assert!(notes.iter().all(|n| n.pitch == 36));
        let starts: Vec<f64> = notes.iter().map(|n| n.start).collect();
        assert_eq!(starts, vec![0.0, 2.0, 1.75, 3.5]);
        // The syncope is softer than the downbeats.
        assert_eq!(notes[0].velocity, 100);
        assert_eq!(notes[2].velocity, 80);
    }

    #[test]
    fn bassline_stays_in_c_minor_pentatonic() {
        let pentatonic = [36, 39, 41, 43, 46];
        for note in generate(PatternKind::Bassline, 4.0) {
            assert!(pentatonic.contains(&note.pitch), "pitch {}", note.pitch);
        }
    }

    #[test]
    fn pad_lays_down_four_triads() {
        let notes = generate(PatternKind::Pad, 4.0);
        assert_eq!(notes.len(), 12);
        for beat in 0..4 {
            let chord: Vec<&NoteEvent> =
                notes.iter().filter(|n| n.start == beat as f64).collect();
            assert_eq!(chord.len(), 3, "beat {beat}");
            assert!(chord.iter().all(|n| n.duration == 1.0 && n.velocity == 70));
        }
    }

    #[test]
    fn hihat_covers_every_16th_with_accents_and_open_variant() {
        let notes = generate(PatternKind::Hihat, 4.0);
        assert_eq!(notes.len(), 16);

        for (step, note) in notes.iter().enumerate() {
            assert_eq!(note.start, step as f64 * 0.25);
            assert_eq!(note.duration, 0.125);
            if step % 8 == 6 {
                assert_eq!(note.pitch, 46, "open hat at step {step}");
                assert_eq!(note.velocity, 70);
            } else {
                assert_eq!(note.pitch, 42);
                let expected = if step % 4 == 0 { 80 } else { 60 };
                assert_eq!(note.velocity, expected, "step {step}");
            }
        }
    }

    #[test]
    fn hihat_scales_with_clip_length() {
        assert_eq!(generate(PatternKind::Hihat, 1.0).len(), 4);
        assert_eq!(generate(PatternKind::Hihat, 8.0).len(), 32);
    }

    #[test]
    fn unknown_kinds_resolve_to_basic() {
        assert_eq!(resolve_kind("kick"), PatternKind::Kick);
        assert_eq!(resolve_kind("HiHat"), PatternKind::Hihat);
        assert_eq!(resolve_kind("glitch"), PatternKind::Basic);
    }

    #[test]
    fn clip_names_follow_the_ai_prefix_convention() {
        assert_eq!(PatternKind::Kick.clip_name(), "AI kick Pattern");
    }
}
