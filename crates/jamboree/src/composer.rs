//! The engine facade.
//!
//! A [`Composer`] owns one host connection, one session memory, one lock
//! table and one cancellation root. Each public operation is a complete
//! story: validate, lock the target, drive the host, update memory, return
//! a report. Callers (the action dispatcher, or the bridge directly) never
//! touch the host themselves.

use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio_util::sync::CancellationToken;

use jamconf::TuningConfig;
use jamproto::Handle;

use crate::analyze::{analyze_project, ProjectAnalysis};
use crate::clips;
use crate::error::EngineError;
use crate::host::{track_snapshot, HostApi, ObjectPath, TargetLocks};
use crate::materialize::{materialize, MaterializeConfig};
use crate::memory::{MemoryEntry, SessionMemory, TrackKind};
use crate::pacer::{run_sequence, PacerConfig, SequenceReport};
use crate::patterns::{self, PatternKind};
use crate::recommend::{advice_for_query, InstrumentAdvice};
use crate::selector::{select, Candidate, ResourceQuery, Selection};
use crate::tempo;

/// What a pattern write did, end to end.
#[derive(Debug, Clone)]
pub struct PatternOutcome {
    pub selection: Selection,
    pub slot: usize,
    pub clip_created: bool,
    pub note_count: usize,
    pub clear: SequenceReport,
    pub write: SequenceReport,
}

/// The engine. Generic over the host so tests can script one.
pub struct Composer<H: HostApi> {
    host: Arc<H>,
    tuning: TuningConfig,
    memory: Mutex<SessionMemory>,
    locks: TargetLocks,
    cancel: CancellationToken,
}

impl<H: HostApi> Composer<H> {
    pub fn new(host: Arc<H>, tuning: TuningConfig) -> Self {
        Self {
            host,
            tuning,
            memory: Mutex::new(SessionMemory::new()),
            locks: TargetLocks::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Token governing every retry and pacing loop in this engine.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abort all in-flight loops at their next suspension point.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// What session memory holds for `kind`, if anything.
    pub fn remembered(&self, kind: TrackKind) -> Option<MemoryEntry> {
        self.memory.lock().unwrap().last_of(kind)
    }

    /// Create a MIDI track with the canonical name for `kind`.
    pub async fn create_track(&self, kind: TrackKind) -> Result<Handle, EngineError> {
        self.create_named_track(kind.default_track_name()).await
    }

    /// Create a MIDI track and name it.
    ///
    /// The creation call returns nothing, so the new track is identified
    /// by snapshot diffing under the bounded retry loop, then renamed.
    /// Session memory is updated when the name implies a kind.
    pub async fn create_named_track(&self, name: &str) -> Result<Handle, EngineError> {
        let set_id = self.host.object_id(&ObjectPath::live_set()).await?;
        let _guard = self.locks.for_object(set_id).lock_owned().await;

        tracing::info!(track.name = name, "creating track");

        let config = MaterializeConfig::from_tuning(&self.tuning.materialize);
        let create_host = Arc::clone(&self.host);
        let snap_host = Arc::clone(&self.host);

        let created = materialize(
            move || async move {
                create_host
                    .call(&ObjectPath::live_set(), "create_midi_track", &[json!(-1)])
                    .await
                    .map(|_| ())
            },
            move || {
                let host = Arc::clone(&snap_host);
                async move { track_snapshot(host.as_ref()).await }
            },
            &config,
            &self.cancel,
        )
        .await?;

        self.host
            .set(&ObjectPath::track(created.index), "name", json!(name))
            .await?;
        let named = Handle::new(created.id, created.index, name);

        match TrackKind::from_name(name) {
            Some(kind) => self.memory.lock().unwrap().remember(kind, &named),
            None => tracing::debug!(track.name = name, "no kind inferable, memory unchanged"),
        }

        tracing::info!(track.id = %named.id, track.index = named.index, track.name = name, "track created");
        Ok(named)
    }

    /// Set the tempo, validated against the configured range before any
    /// host call.
    pub async fn set_tempo(&self, bpm: f64) -> Result<f64, EngineError> {
        tempo::set_tempo(self.host.as_ref(), bpm, &self.tuning.tempo).await
    }

    /// Ramp the tempo smoothly to `target_bpm`.
    pub async fn ramp_tempo(&self, target_bpm: f64) -> Result<f64, EngineError> {
        tempo::ramp_tempo(
            self.host.as_ref(),
            target_bpm,
            &self.tuning.tempo,
            &self.cancel,
        )
        .await
    }

    /// Write a pattern onto the track best matching `track_query`.
    ///
    /// Selection goes through the priority ladder (session memory first).
    /// The chosen track is locked for the full write: find-or-create a
    /// clip, run the clear pass, run the note insert pass, name the clip.
    /// The two passes are independent sequences - a failed clear is logged
    /// and the insert still runs.
    pub async fn create_pattern(
        &self,
        track_query: &str,
        kind: PatternKind,
        length_beats: f64,
    ) -> Result<PatternOutcome, EngineError> {
        let snapshot = track_snapshot(self.host.as_ref()).await?;

        let needle = track_query.to_lowercase();
        let mut candidates = Vec::new();
        for handle in snapshot.iter() {
            if !handle.name.to_lowercase().contains(&needle) {
                continue;
            }
            let attachment_count =
                clips::clip_count(self.host.as_ref(), handle.index, &self.tuning.clips).await;
            candidates.push(Candidate {
                handle: handle.clone(),
                attachment_count,
            });
        }

        let query = ResourceQuery::infer(track_query);
        let selection = {
            let memory = self.memory.lock().unwrap();
            select(&query, &candidates, &memory)
        }
        .ok_or_else(|| EngineError::TrackNotFound {
            query: track_query.to_string(),
        })?;

        tracing::info!(
            track = %selection.handle,
            reason = %selection.reason,
            pattern = %kind,
            "pattern target selected"
        );

        let _guard = self.locks.for_object(selection.handle.id).lock_owned().await;

        let site = clips::ensure_clip(
            self.host.as_ref(),
            selection.handle.index,
            length_beats,
            &self.tuning.clips,
        )
        .await?;
        let clip_path = site.clip_path();
        let pacer_config = PacerConfig::from_tuning(&self.tuning.pacing);

        let clear = run_sequence(
            self.host.as_ref(),
            &clip_path,
            &clips::clear_commands(),
            &pacer_config,
            &self.cancel,
        )
        .await?;
        if !clear.all_succeeded() {
            tracing::warn!(
                failures = clear.failures.len(),
                "clear pass had failures, writing notes anyway"
            );
        }

        let notes = patterns::generate(kind, length_beats);
        let write = run_sequence(
            self.host.as_ref(),
            &clip_path,
            &clips::note_commands(&notes),
            &pacer_config,
            &self.cancel,
        )
        .await?;

        if let Err(e) = self.host.set(&clip_path, "name", json!(kind.clip_name())).await {
            tracing::warn!(error = %e, "could not name clip");
        }

        tracing::info!(
            track = %selection.handle,
            slot = site.slot,
            notes = notes.len(),
            write.succeeded = write.succeeded,
            write.failed = write.failures.len(),
            "pattern written"
        );

        Ok(PatternOutcome {
            selection,
            slot: site.slot,
            clip_created: site.created,
            note_count: notes.len(),
            clear,
            write,
        })
    }

    /// Report the set's current state.
    pub async fn analyze(&self) -> Result<ProjectAnalysis, EngineError> {
        Ok(analyze_project(self.host.as_ref()).await?)
    }

    /// Instrument loading is a capability gap: the host offers no working
    /// path for it, so this always fails, carrying the manual advice.
    pub fn load_instrument(&self, track_query: &str) -> Result<(), EngineError> {
        let advice = advice_for_query(track_query);
        tracing::warn!(
            track.query = track_query,
            suggested = ?advice.devices,
            "instrument loading requested but unsupported"
        );
        Err(EngineError::InstrumentLoadingUnsupported {
            query: track_query.to_string(),
        })
    }

    /// The manual guidance that accompanies the capability gap.
    pub fn instrument_advice(&self, track_query: &str) -> InstrumentAdvice {
        advice_for_query(track_query)
    }
}
