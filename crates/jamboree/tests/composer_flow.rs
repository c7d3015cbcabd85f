//! End-to-end engine tests against a scripted fake host.
//!
//! The fake models the bridge's behavior faithfully where it matters:
//! creation calls return nothing and the new track only shows up in the
//! listing a couple of polls later; property reads come back as
//! one-element arrays; every interaction is logged so tests can assert
//! ordering.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use jamboree::{
    dispatch, Composer, EngineError, HostApi, MaterializeError, ObjectPath, PatternKind,
    SelectionReason, TrackKind,
};
use jamconf::TuningConfig;
use jamproto::{ActionRequest, ObjectId};

#[derive(Debug, Clone)]
struct FakeClip {
    name: String,
}

#[derive(Debug, Clone)]
struct FakeTrack {
    id: u64,
    name: String,
    clips: Vec<Option<FakeClip>>,
}

impl FakeTrack {
    fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            clips: vec![None; 8],
        }
    }
}

struct SetState {
    tracks: Vec<FakeTrack>,
    tempo: f64,
    next_id: u64,
    /// Creations accepted but not yet visible in the listing.
    pending_creates: usize,
    /// Listings needed after a create before the track shows up.
    settle_after: usize,
    polls_since_create: usize,
    /// When false, creations are swallowed entirely.
    creation_works: bool,
}

struct FakeLiveSet {
    state: Mutex<SetState>,
    log: Mutex<Vec<String>>,
}

impl FakeLiveSet {
    fn new() -> Self {
        Self {
            state: Mutex::new(SetState {
                tracks: vec![FakeTrack::new(10, "Audio")],
                tempo: 120.0,
                next_id: 11,
                pending_creates: 0,
                settle_after: 2,
                polls_since_create: 0,
                creation_works: true,
            }),
            log: Mutex::new(Vec::new()),
        }
    }

    fn broken() -> Self {
        let fake = Self::new();
        fake.state.lock().unwrap().creation_works = false;
        fake
    }

    fn log_entry(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn log_snapshot(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn log_position(&self, needle: &str) -> Option<usize> {
        self.log_snapshot().iter().position(|e| e.contains(needle))
    }
}

/// Parsed host path.
enum Parsed {
    Set,
    Track(usize),
    Slot(usize, usize),
    Clip(usize, usize),
}

fn parse(path: &ObjectPath) -> Result<Parsed> {
    let parts: Vec<&str> = path.as_str().split_whitespace().collect();
    match parts.as_slice() {
        ["live_set"] => Ok(Parsed::Set),
        ["live_set", "tracks", i] => Ok(Parsed::Track(i.parse()?)),
        ["live_set", "tracks", i, "clip_slots", s] => Ok(Parsed::Slot(i.parse()?, s.parse()?)),
        ["live_set", "tracks", i, "clip_slots", s, "clip"] => {
            Ok(Parsed::Clip(i.parse()?, s.parse()?))
        }
        _ => bail!("unknown path: {path}"),
    }
}

#[async_trait]
impl HostApi for FakeLiveSet {
    async fn get(&self, path: &ObjectPath, property: &str) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        match (parse(path)?, property) {
            (Parsed::Set, "tracks") => {
                // A pending creation becomes visible once the listing has
                // been polled enough times.
                if state.pending_creates > 0 {
                    state.polls_since_create += 1;
                    if state.creation_works && state.polls_since_create >= state.settle_after {
                        let id = state.next_id;
                        state.next_id += 1;
                        state.tracks.push(FakeTrack::new(id, "MIDI Track"));
                        state.pending_creates -= 1;
                        state.polls_since_create = 0;
                    }
                }
                let ids: Vec<Value> = state.tracks.iter().map(|t| json!(t.id)).collect();
                Ok(Value::Array(ids))
            }
            (Parsed::Set, "tempo") => Ok(json!([state.tempo])),
            (Parsed::Track(i), "name") => {
                let track = state.tracks.get(i).ok_or_else(|| anyhow::anyhow!("no track {i}"))?;
                Ok(json!([track.name]))
            }
            (Parsed::Track(_), "has_midi_input") => Ok(json!([1])),
            (Parsed::Track(_), "devices") => Ok(json!([1, 2])),
            (Parsed::Slot(i, s), "has_clip") => {
                let track = state.tracks.get(i).ok_or_else(|| anyhow::anyhow!("no track {i}"))?;
                let occupied = track.clips.get(s).map(|c| c.is_some()).unwrap_or(false);
                Ok(json!([if occupied { 1 } else { 0 }]))
            }
            (_, property) => bail!("unsupported get {property} on {path}"),
        }
    }

    async fn set(&self, path: &ObjectPath, property: &str, value: Value) -> Result<()> {
        self.log_entry(format!("set {path} {property} {value}"));
        let mut state = self.state.lock().unwrap();
        match (parse(path)?, property) {
            (Parsed::Set, "tempo") => {
                state.tempo = value.as_f64().ok_or_else(|| anyhow::anyhow!("bad tempo"))?;
                Ok(())
            }
            (Parsed::Track(i), "name") => {
                let track = state
                    .tracks
                    .get_mut(i)
                    .ok_or_else(|| anyhow::anyhow!("no track {i}"))?;
                track.name = value.as_str().unwrap_or_default().to_string();
                Ok(())
            }
            (Parsed::Clip(i, s), "name") => {
                let track = state
                    .tracks
                    .get_mut(i)
                    .ok_or_else(|| anyhow::anyhow!("no track {i}"))?;
                match track.clips.get_mut(s).and_then(|c| c.as_mut()) {
                    Some(clip) => {
                        clip.name = value.as_str().unwrap_or_default().to_string();
                        Ok(())
                    }
                    None => bail!("no clip in slot {s}"),
                }
            }
            (_, property) => bail!("unsupported set {property} on {path}"),
        }
    }

    async fn call(&self, path: &ObjectPath, method: &str, args: &[Value]) -> Result<Value> {
        self.log_entry(format!("call {path} {method} {args:?}"));
        let mut state = self.state.lock().unwrap();
        match (parse(path)?, method) {
            (Parsed::Set, "create_midi_track") => {
                state.pending_creates += 1;
                state.polls_since_create = 0;
                Ok(Value::Null)
            }
            (Parsed::Slot(i, s), "create_clip") => {
                let track = state
                    .tracks
                    .get_mut(i)
                    .ok_or_else(|| anyhow::anyhow!("no track {i}"))?;
                track.clips[s] = Some(FakeClip {
                    name: String::new(),
                });
                Ok(Value::Null)
            }
            (
                Parsed::Clip(_, _),
                "select_all_notes" | "remove_notes" | "set_notes" | "notes" | "note" | "done",
            ) => Ok(Value::Null),
            (_, method) => bail!("unsupported call {method} on {path}"),
        }
    }

    async fn object_id(&self, path: &ObjectPath) -> Result<ObjectId> {
        let state = self.state.lock().unwrap();
        match parse(path)? {
            Parsed::Set => Ok(ObjectId(1)),
            Parsed::Track(i) => Ok(state
                .tracks
                .get(i)
                .map(|t| ObjectId(t.id))
                .unwrap_or(ObjectId::INVALID)),
            _ => bail!("object_id unsupported for {path}"),
        }
    }
}

fn composer(host: Arc<FakeLiveSet>) -> Composer<FakeLiveSet> {
    Composer::new(host, TuningConfig::default())
}

#[tokio::test(start_paused = true)]
async fn create_track_then_kick_pattern_end_to_end() {
    let host = Arc::new(FakeLiveSet::new());
    let engine = composer(host.clone());

    // Creation settles after two listing polls, so the retry loop has to
    // actually retry before it can name the track.
    let handle = engine.create_track(TrackKind::Drums).await.unwrap();
    assert_eq!(handle.index, 1);
    assert_eq!(handle.name, "AI Drums");
    assert_eq!(handle.id, ObjectId(11));

    let remembered = engine.remembered(TrackKind::Drums).unwrap();
    assert_eq!(remembered.id, ObjectId(11));
    assert_eq!(remembered.index, 1);

    // The kick request finds the remembered track via rung 1 without any
    // heuristic scanning.
    let outcome = engine
        .create_pattern("drums", PatternKind::Kick, 4.0)
        .await
        .unwrap();
    assert_eq!(outcome.selection.reason, SelectionReason::LastOfKind);
    assert_eq!(outcome.selection.handle.id, ObjectId(11));
    assert_eq!(outcome.slot, 0);
    assert!(outcome.clip_created);
    assert_eq!(outcome.note_count, 4);
    assert!(outcome.clear.all_succeeded());
    assert_eq!(outcome.clear.succeeded, 2);
    assert!(outcome.write.all_succeeded());
    // set_notes + notes + 4x note + done
    assert_eq!(outcome.write.succeeded, 7);

    // The clear pass reached the host strictly before the insert pass.
    let clear_at = host.log_position("select_all_notes").unwrap();
    let insert_at = host.log_position("set_notes").unwrap();
    assert!(clear_at < insert_at);

    // The four note messages carry the kick layout, in generator order.
    let notes: Vec<String> = host
        .log_snapshot()
        .into_iter()
        .filter(|e| e.contains(" note "))
        .collect();
    assert_eq!(notes.len(), 4);
    for (entry, start) in notes.iter().zip(["0.0", "2.0", "1.75", "3.5"]) {
        assert!(entry.contains("36"), "kick pitch missing in {entry}");
        assert!(entry.contains(start), "expected start {start} in {entry}");
    }

    // The clip got the conventional name.
    assert!(host
        .log_position("set live_set tracks 1 clip_slots 0 clip name \"AI kick Pattern\"")
        .is_some());
    let state = host.state.lock().unwrap();
    let clip = state.tracks[1].clips[0].as_ref().unwrap();
    assert_eq!(clip.name, "AI kick Pattern");
}

#[tokio::test(start_paused = true)]
async fn materialization_exhausts_when_the_host_swallows_the_create() {
    let host = Arc::new(FakeLiveSet::broken());
    let engine = composer(host);

    let err = engine.create_track(TrackKind::Bass).await.unwrap_err();
    match err {
        EngineError::Materialize(MaterializeError::AttemptsExhausted {
            attempts,
            collection_grew,
        }) => {
            assert_eq!(attempts, 5);
            assert!(!collection_grew);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn tempo_boundaries_reject_before_any_host_call() {
    let host = Arc::new(FakeLiveSet::new());
    let engine = composer(host.clone());

    assert!(matches!(
        engine.set_tempo(59.0).await.unwrap_err(),
        EngineError::TempoOutOfRange { .. }
    ));
    assert!(matches!(
        engine.set_tempo(201.0).await.unwrap_err(),
        EngineError::TempoOutOfRange { .. }
    ));
    // Nothing reached the host for the rejected values.
    assert!(host.log_snapshot().is_empty());

    assert_eq!(engine.set_tempo(60.0).await.unwrap(), 60.0);
    assert_eq!(engine.set_tempo(200.0).await.unwrap(), 200.0);
}

#[tokio::test(start_paused = true)]
async fn pattern_on_unmatched_query_is_not_found() {
    let host = Arc::new(FakeLiveSet::new());
    let engine = composer(host);

    let err = engine
        .create_pattern("vocals", PatternKind::Melody, 4.0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TrackNotFound { .. }));
}

#[tokio::test(start_paused = true)]
async fn second_pattern_lands_in_the_next_free_slot() {
    let host = Arc::new(FakeLiveSet::new());
    let engine = composer(host);

    engine.create_track(TrackKind::Drums).await.unwrap();
    let first = engine
        .create_pattern("drums", PatternKind::Kick, 4.0)
        .await
        .unwrap();
    let second = engine
        .create_pattern("drums", PatternKind::Hihat, 4.0)
        .await
        .unwrap();

    assert_eq!(first.slot, 0);
    assert_eq!(second.slot, 1);
    assert!(second.clip_created);
}

#[tokio::test(start_paused = true)]
async fn ramp_walks_the_tempo_to_the_target_in_steps() {
    let host = Arc::new(FakeLiveSet::new());
    let engine = composer(host.clone());

    let reached = engine.ramp_tempo(140.0).await.unwrap();
    assert_eq!(reached, 140.0);
    assert_eq!(host.state.lock().unwrap().tempo, 140.0);

    // Ten intermediate writes, 120 -> 140 in equal rounded steps.
    let sets: Vec<String> = host
        .log_snapshot()
        .into_iter()
        .filter(|e| e.starts_with("set live_set tempo"))
        .collect();
    assert_eq!(sets.len(), 10);
    assert!(sets[0].contains("122"));
    assert!(sets[9].contains("140"));
}

#[tokio::test(start_paused = true)]
async fn dispatch_runs_the_documented_action_mapping() {
    let host = Arc::new(FakeLiveSet::new());
    let engine = composer(host);

    let created = dispatch(
        &engine,
        &ActionRequest::decode(r#"{"action":"create_drum_track"}"#).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(created["track"], "AI Drums");
    assert_eq!(created["index"], 1);

    let pattern = dispatch(
        &engine,
        &ActionRequest::decode(r#"{"action":"create_kick_pattern"}"#).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(pattern["pattern"], "kick");
    assert_eq!(pattern["reason"], "last materialized of kind");
    assert_eq!(pattern["notes"], 4);

    let tempo = dispatch(
        &engine,
        &ActionRequest::decode(r#"{"action":"set_tempo","parameters":{"bpm":128.0}}"#).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(tempo["tempo"], 128.0);

    // Free-form tempo text parses when no number parameter is given.
    let tempo = dispatch(
        &engine,
        &ActionRequest::decode(
            r#"{"action":"set_tempo","parameters":{"name":"please go to 96 bpm"}}"#,
        )
        .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(tempo["tempo"], 96.0);

    let analysis = dispatch(
        &engine,
        &ActionRequest::decode(r#"{"action":"analyze_project"}"#).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(analysis["ready"], 1);

    let err = dispatch(
        &engine,
        &ActionRequest::decode(r#"{"action":"load_instrument","parameters":{"track":"drums"}}"#)
            .unwrap(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InstrumentLoadingUnsupported { .. }
    ));

    let err = dispatch(
        &engine,
        &ActionRequest::decode(r#"{"action":"summon_gnomes"}"#).unwrap(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::UnknownAction { .. }));
}
