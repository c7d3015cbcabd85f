//! Tempo control: validated writes, free-form parsing, genre tables, and
//! smooth ramps.

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use jamconf::TempoTuning;

use crate::error::EngineError;
use crate::host::{value_f64, HostApi, ObjectPath};

/// Fallback when no better suggestion exists.
pub const DEFAULT_BPM: f64 = 120.0;

/// Reject out-of-range tempos before any host call is attempted.
pub fn validate_bpm(bpm: f64, tuning: &TempoTuning) -> Result<(), EngineError> {
    if !bpm.is_finite() || bpm < tuning.min_bpm || bpm > tuning.max_bpm {
        return Err(EngineError::TempoOutOfRange {
            bpm,
            min: tuning.min_bpm,
            max: tuning.max_bpm,
        });
    }
    Ok(())
}

/// Set the set tempo, returning the value the host reports afterwards.
///
/// Reads back after writing: the host clamps and rounds on its own terms,
/// and the caller should learn what actually took effect.
pub async fn set_tempo(
    host: &dyn HostApi,
    bpm: f64,
    tuning: &TempoTuning,
) -> Result<f64, EngineError> {
    validate_bpm(bpm, tuning)?;

    let set = ObjectPath::live_set();
    let previous = value_f64(&host.get(&set, "tempo").await?);
    host.set(&set, "tempo", json!(bpm)).await?;
    let current = value_f64(&host.get(&set, "tempo").await?).unwrap_or(bpm);

    tracing::info!(tempo.previous = ?previous, tempo.current = current, "tempo set");
    Ok(current)
}

/// Pull the first integer out of free-form planner text ("set it to 128
/// bpm please" -> 128).
pub fn parse_bpm(input: &str) -> Option<f64> {
    let digits: String = input
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<f64>().ok()
}

/// Typical tempos per genre. The engine picks deterministically; sampling
/// from these is planner territory.
pub fn genre_tempos(genre: &str) -> Option<&'static [f64]> {
    let tempos: &'static [f64] = match genre.to_lowercase().as_str() {
        "house" => &[120.0, 122.0, 124.0, 126.0, 128.0],
        "techno" => &[130.0, 132.0, 135.0, 138.0, 140.0],
        "dnb" => &[170.0, 172.0, 174.0, 175.0, 176.0],
        "dubstep" => &[140.0, 145.0, 150.0],
        "trap" => &[140.0, 145.0, 150.0],
        "ambient" => &[60.0, 70.0, 80.0, 90.0],
        "jazz" => &[100.0, 110.0, 120.0],
        "pop" => &[110.0, 115.0, 120.0, 125.0],
        _ => return None,
    };
    Some(tempos)
}

/// A tempo for `genre`: the middle of its typical range, or
/// [`DEFAULT_BPM`] for genres we have no table for.
pub fn suggest_tempo(genre: &str) -> f64 {
    match genre_tempos(genre) {
        Some(tempos) => tempos[tempos.len() / 2],
        None => {
            tracing::warn!(genre, "unknown genre, suggesting default tempo");
            DEFAULT_BPM
        }
    }
}

/// Ramp the tempo to `target_bpm` in `tuning.ramp_steps` equal steps,
/// `tuning.ramp_interval_ms` apart. Intermediate values are rounded the
/// way a human nudging the tempo dial would; the final step lands exactly
/// on the target. Cancellation is observed before every step.
pub async fn ramp_tempo(
    host: &dyn HostApi,
    target_bpm: f64,
    tuning: &TempoTuning,
    cancel: &CancellationToken,
) -> Result<f64, EngineError> {
    validate_bpm(target_bpm, tuning)?;

    let set = ObjectPath::live_set();
    let start = value_f64(&host.get(&set, "tempo").await?).unwrap_or(DEFAULT_BPM);
    let steps = tuning.ramp_steps.max(1);
    let step_size = (target_bpm - start) / steps as f64;
    let interval = Duration::from_millis(tuning.ramp_interval_ms);

    tracing::info!(
        tempo.from = start,
        tempo.to = target_bpm,
        steps,
        "ramping tempo"
    );

    for step in 1..=steps {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(step, "tempo ramp cancelled");
                return Err(EngineError::Pacer(crate::pacer::PacerError::Cancelled {
                    issued: (step - 1) as usize,
                    total: steps as usize,
                }))
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let next = if step == steps {
            target_bpm
        } else {
            (start + step_size * step as f64).round()
        };
        host.set(&set, "tempo", json!(next)).await?;
    }

    Ok(target_bpm)
}
