//! Decoded planner action -> engine call.
//!
//! The relay hands the engine an [`ActionRequest`] (already stripped of
//! transport framing). This is the one canonical mapping from action names
//! to engine operations; results go back as loose JSON for the relay to
//! forward.
//!
//! | action                                   | engine call                          |
//! |------------------------------------------|--------------------------------------|
//! | `create_drum_track` / `create_bass_track`|                                      |
//! | `create_lead_track` / `create_pad_track` | [`Composer::create_track`]           |
//! | `create_track` (`name`)                  | [`Composer::create_named_track`]     |
//! | `set_tempo` (`bpm`)                      | [`Composer::set_tempo`]              |
//! | `set_tempo_120` / `_128` / `_140`        | [`Composer::set_tempo`] fixed        |
//! | `set_tempo_genre` (`genre`)              | suggestion + [`Composer::set_tempo`] |
//! | `ramp_tempo` (`bpm`)                     | [`Composer::ramp_tempo`]             |
//! | `create_kick_pattern`                    | kick on "drums"                      |
//! | `create_hihat_pattern`                   | hihat on "drums"                     |
//! | `create_bassline`                        | bassline on "bass"                   |
//! | `create_melody`                          | melody on "lead"                     |
//! | `create_pad_chords`                      | pad on "pad"                         |
//! | `create_pattern` / `create_basic_pattern`| [`Composer::create_pattern`]         |
//! | `analyze_project`                        | [`Composer::analyze`]                |
//! | `load_instrument` (`track`)              | capability gap error                 |

use serde_json::{json, Value};

use jamproto::ActionRequest;

use crate::composer::{Composer, PatternOutcome};
use crate::error::EngineError;
use crate::host::HostApi;
use crate::memory::TrackKind;
use crate::patterns::{resolve_kind, PatternKind};
use crate::tempo;

/// Default clip length when an instruction does not say.
const DEFAULT_LENGTH_BEATS: f64 = 4.0;

/// Execute one decoded action against the engine.
pub async fn dispatch<H: HostApi>(
    composer: &Composer<H>,
    request: &ActionRequest,
) -> Result<Value, EngineError> {
    let action = request.action.as_str();
    let params = &request.parameters;

    tracing::info!(action, "dispatching action");

    match action {
        "create_drum_track" => create_kind_track(composer, TrackKind::Drums, params.name.as_deref()).await,
        "create_bass_track" => create_kind_track(composer, TrackKind::Bass, params.name.as_deref()).await,
        "create_lead_track" => create_kind_track(composer, TrackKind::Lead, params.name.as_deref()).await,
        "create_pad_track" => create_kind_track(composer, TrackKind::Pad, params.name.as_deref()).await,

        "create_track" => {
            let name = params.name.as_deref().ok_or(EngineError::MissingParameter {
                action: action.to_string(),
                parameter: "name",
            })?;
            let handle = composer.create_named_track(name).await?;
            Ok(track_result(&handle))
        }

        "set_tempo" => {
            // Planners send a number when they have one and free-form text
            // ("set it to 128 bpm") when they don't.
            let bpm = params
                .bpm
                .or_else(|| params.name.as_deref().and_then(tempo::parse_bpm))
                .ok_or(EngineError::MissingParameter {
                    action: action.to_string(),
                    parameter: "bpm",
                })?;
            let tempo = composer.set_tempo(bpm).await?;
            Ok(json!({ "tempo": tempo }))
        }
        "set_tempo_120" => Ok(json!({ "tempo": composer.set_tempo(120.0).await? })),
        "set_tempo_128" => Ok(json!({ "tempo": composer.set_tempo(128.0).await? })),
        "set_tempo_140" => Ok(json!({ "tempo": composer.set_tempo(140.0).await? })),

        "set_tempo_genre" => {
            let genre = params.genre.as_deref().ok_or(EngineError::MissingParameter {
                action: action.to_string(),
                parameter: "genre",
            })?;
            let suggested = tempo::suggest_tempo(genre);
            let tempo = composer.set_tempo(suggested).await?;
            Ok(json!({ "tempo": tempo, "genre": genre }))
        }

        "ramp_tempo" => {
            let bpm = params.bpm.ok_or(EngineError::MissingParameter {
                action: action.to_string(),
                parameter: "bpm",
            })?;
            let tempo = composer.ramp_tempo(bpm).await?;
            Ok(json!({ "tempo": tempo }))
        }

        "create_kick_pattern" => pattern(composer, "drums", PatternKind::Kick, params.length_beats).await,
        "create_hihat_pattern" => pattern(composer, "drums", PatternKind::Hihat, params.length_beats).await,
        "create_bassline" => pattern(composer, "bass", PatternKind::Bassline, params.length_beats).await,
        "create_melody" => pattern(composer, "lead", PatternKind::Melody, params.length_beats).await,
        "create_pad_chords" => pattern(composer, "pad", PatternKind::Pad, params.length_beats).await,

        "create_pattern" | "create_basic_pattern" => {
            let track = params.track.as_deref().ok_or(EngineError::MissingParameter {
                action: action.to_string(),
                parameter: "track",
            })?;
            let kind = params
                .pattern
                .as_deref()
                .map(resolve_kind)
                .unwrap_or(PatternKind::Basic);
            pattern(composer, track, kind, params.length_beats).await
        }

        "analyze_project" => {
            let analysis = composer.analyze().await?;
            Ok(json!({
                "tempo": analysis.tempo,
                "tracks": analysis.tracks,
                "ready": analysis.ready_count(),
                "needs_instrument": analysis.needs_instrument_count(),
                "phantoms": analysis.phantom_count,
            }))
        }

        "load_instrument" => {
            let track = params.track.as_deref().or(params.name.as_deref()).ok_or(
                EngineError::MissingParameter {
                    action: action.to_string(),
                    parameter: "track",
                },
            )?;
            // Always a capability gap; the advice travels in the error path.
            composer.load_instrument(track).map(|_| Value::Null)
        }

        other => Err(EngineError::UnknownAction {
            action: other.to_string(),
        }),
    }
}

async fn create_kind_track<H: HostApi>(
    composer: &Composer<H>,
    kind: TrackKind,
    name_override: Option<&str>,
) -> Result<Value, EngineError> {
    let handle = match name_override {
        Some(name) => composer.create_named_track(name).await?,
        None => composer.create_track(kind).await?,
    };
    Ok(track_result(&handle))
}

async fn pattern<H: HostApi>(
    composer: &Composer<H>,
    track_query: &str,
    kind: PatternKind,
    length_beats: Option<f64>,
) -> Result<Value, EngineError> {
    let outcome = composer
        .create_pattern(track_query, kind, length_beats.unwrap_or(DEFAULT_LENGTH_BEATS))
        .await?;
    Ok(pattern_result(kind, &outcome))
}

fn track_result(handle: &jamproto::Handle) -> Value {
    json!({
        "track": handle.name,
        "id": handle.id,
        "index": handle.index,
    })
}

fn pattern_result(kind: PatternKind, outcome: &PatternOutcome) -> Value {
    json!({
        "pattern": kind.as_str(),
        "track": outcome.selection.handle.name,
        "reason": outcome.selection.reason.to_string(),
        "slot": outcome.slot,
        "clip_created": outcome.clip_created,
        "notes": outcome.note_count,
        "cleared": outcome.clear.all_succeeded(),
        "failed_commands": outcome.write.failures,
    })
}

#[cfg(test)]
mod tests {
    use jamproto::{Handle, ObjectId};

    use crate::pacer::SequenceReport;
    use crate::selector::{Selection, SelectionReason};

    use super::*;

    #[test]
    fn pattern_result_carries_the_audit_reason() {
        let outcome = PatternOutcome {
            selection: Selection {
                handle: Handle::new(ObjectId(11), 1, "AI Drums"),
                reason: SelectionReason::NewestEmpty,
            },
            slot: 0,
            clip_created: true,
            note_count: 4,
            clear: SequenceReport::default(),
            write: SequenceReport::default(),
        };

        let result = pattern_result(PatternKind::Kick, &outcome);
        assert_eq!(result["pattern"], "kick");
        assert_eq!(result["track"], "AI Drums");
        assert_eq!(result["reason"], "newest empty");
        assert_eq!(result["notes"], 4);
    }

    #[test]
    fn track_result_exposes_id_and_index() {
        let result = track_result(&Handle::new(ObjectId(7), 2, "AI Bass"));
        assert_eq!(result["track"], "AI Bass");
        assert_eq!(result["id"], 7);
        assert_eq!(result["index"], 2);
    }
}
