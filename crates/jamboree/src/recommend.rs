//! Manual instrument guidance.
//!
//! The host object model has no working path for loading a device onto a
//! track from out here - every known call either errors or silently does
//! nothing. Rather than pretend, the engine names the gap
//! ([`crate::error::EngineError::InstrumentLoadingUnsupported`]) and hands
//! the user the same guidance a producer would give: which stock devices
//! suit the track's role.

use serde::Serialize;

use crate::memory::TrackKind;

/// Suggested devices for a track role, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstrumentAdvice {
    pub devices: &'static [&'static str],
    pub note: &'static str,
}

/// Advice for a known track kind.
pub fn instrument_advice(kind: TrackKind) -> InstrumentAdvice {
    match kind {
        TrackKind::Drums => InstrumentAdvice {
            devices: &["Drum Kit", "Impulse", "Analog"],
            note: "Load a Drum Kit manually for best results",
        },
        TrackKind::Bass => InstrumentAdvice {
            devices: &["Bass", "Wavetable", "Analog"],
            note: "Bass or Wavetable work well for low end",
        },
        TrackKind::Lead => InstrumentAdvice {
            devices: &["Lead", "Wavetable", "Analog"],
            note: "Lead or Wavetable for the top line",
        },
        TrackKind::Pad => InstrumentAdvice {
            devices: &["Pad", "Wavetable", "Analog"],
            note: "Wavetable with a long release, plus reverb, for ambient pads",
        },
    }
}

/// Advice when the track's role is unknown.
pub fn generic_advice() -> InstrumentAdvice {
    InstrumentAdvice {
        devices: &["Wavetable"],
        note: "Wavetable is a good all-purpose synth",
    }
}

/// Advice for a loose track query, via kind inference.
pub fn advice_for_query(query: &str) -> InstrumentAdvice {
    match TrackKind::from_name(query) {
        Some(kind) => instrument_advice(kind),
        None => generic_advice(),
    }
}
