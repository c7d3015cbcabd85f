//! Project analysis: what the set looks like right now.
//!
//! The planner asks for this before deciding what to do next. "Ready"
//! means the track carries more than its mixer device, i.e. someone loaded
//! an instrument on it - the one prerequisite the engine cannot satisfy
//! itself (see [`crate::recommend`]).

use anyhow::Result;
use serde::Serialize;

use jamproto::Handle;

use crate::host::{track_snapshot, value_count, value_truthy, HostApi, ObjectPath};
use crate::memory::TrackKind;

/// One track's state.
#[derive(Debug, Clone, Serialize)]
pub struct TrackReport {
    pub handle: Handle,
    pub kind: Option<TrackKind>,
    /// Display name carries the "AI" marker, i.e. the engine made it.
    pub is_ai: bool,
    pub has_midi_input: bool,
    pub device_count: usize,
    /// More devices than just the mixer: an instrument is loaded.
    pub ready: bool,
}

/// The whole set's state.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAnalysis {
    pub tempo: f64,
    pub tracks: Vec<TrackReport>,
    /// Listed slots that never resolved to a valid object.
    pub phantom_count: usize,
}

impl ProjectAnalysis {
    /// Engine-made tracks with an instrument loaded.
    pub fn ready_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_ai && t.ready).count()
    }

    /// Engine-made tracks still waiting for a manual instrument load.
    pub fn needs_instrument_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_ai && !t.ready).count()
    }
}

/// Walk the set and build the report.
pub async fn analyze_project(host: &dyn HostApi) -> Result<ProjectAnalysis> {
    let snapshot = track_snapshot(host).await?;
    let tempo = crate::host::value_f64(&host.get(&ObjectPath::live_set(), "tempo").await?)
        .unwrap_or_default();

    let mut tracks = Vec::with_capacity(snapshot.len());
    for handle in snapshot.iter() {
        let path = ObjectPath::track(handle.index);

        let has_midi_input = match host.get(&path, "has_midi_input").await {
            Ok(v) => value_truthy(&v),
            Err(_) => false,
        };
        let device_count = match host.get(&path, "devices").await {
            Ok(v) => value_count(&v),
            Err(e) => {
                tracing::debug!(track.index = handle.index, error = %e, "devices unreadable");
                0
            }
        };

        tracks.push(TrackReport {
            kind: TrackKind::from_name(&handle.name),
            is_ai: handle.name.contains("AI"),
            has_midi_input,
            device_count,
            ready: device_count > 1,
            handle: handle.clone(),
        });
    }

    let analysis = ProjectAnalysis {
        tempo,
        tracks,
        phantom_count: snapshot.phantom_count(),
    };

    tracing::info!(
        tracks = analysis.tracks.len(),
        ready = analysis.ready_count(),
        needs_instrument = analysis.needs_instrument_count(),
        phantoms = analysis.phantom_count,
        tempo = analysis.tempo,
        "project analyzed"
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use jamproto::ObjectId;

    use super::*;

    fn report(name: &str, devices: usize) -> TrackReport {
        TrackReport {
            handle: Handle::new(ObjectId(1), 0, name),
            kind: TrackKind::from_name(name),
            is_ai: name.contains("AI"),
            has_midi_input: true,
            device_count: devices,
            ready: devices > 1,
        }
    }

    #[test]
    fn readiness_counts_only_ai_tracks() {
        let analysis = ProjectAnalysis {
            tempo: 120.0,
            tracks: vec![
                report("AI Drums", 2),
                report("AI Bass", 1),
                report("Vocals", 3),
            ],
            phantom_count: 0,
        };
        assert_eq!(analysis.ready_count(), 1);
        assert_eq!(analysis.needs_instrument_count(), 1);
    }
}
