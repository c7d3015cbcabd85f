//! Clip slot handling and the note wire sequences.
//!
//! Tracks expose a row of session clip slots. A pattern write needs a clip
//! to land in: reuse or create one (`ensure_clip`), then stream two paced
//! sequences at it - a clear pass and the note insert pass. The insert
//! uses the host's streaming note protocol: open with `set_notes`,
//! announce the count, one `note` message per event, close with `done`.

use anyhow::Result;
use serde_json::json;

use jamconf::ClipTuning;
use jamproto::{Command, NoteEvent};

use crate::host::{value_truthy, HostApi, ObjectPath};

/// Where a pattern will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSite {
    pub track_index: usize,
    pub slot: usize,
    /// Whether the clip was created by this call (false = reusing).
    pub created: bool,
}

impl ClipSite {
    pub fn clip_path(&self) -> ObjectPath {
        ObjectPath::clip(self.track_index, self.slot)
    }

    pub fn slot_path(&self) -> ObjectPath {
        ObjectPath::clip_slot(self.track_index, self.slot)
    }
}

/// Whether the slot currently holds a clip.
pub async fn has_clip(host: &dyn HostApi, track_index: usize, slot: usize) -> Result<bool> {
    let value = host
        .get(&ObjectPath::clip_slot(track_index, slot), "has_clip")
        .await?;
    Ok(value_truthy(&value))
}

/// Count occupied slots on a track. Slot read errors count as empty - a
/// slot we cannot inspect is not one we will write to either.
pub async fn clip_count(host: &dyn HostApi, track_index: usize, tuning: &ClipTuning) -> u32 {
    let mut count = 0;
    for slot in 0..tuning.slots_scanned {
        match has_clip(host, track_index, slot).await {
            Ok(true) => count += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(track.index = track_index, slot, error = %e, "slot unreadable");
            }
        }
    }
    count
}

/// First unoccupied slot within the scanned range.
pub async fn find_empty_slot(
    host: &dyn HostApi,
    track_index: usize,
    tuning: &ClipTuning,
) -> Result<Option<usize>> {
    for slot in 0..tuning.slots_scanned {
        if !has_clip(host, track_index, slot).await? {
            return Ok(Some(slot));
        }
    }
    Ok(None)
}

/// Find or create the clip a new pattern should land in.
///
/// Slot 0 is the home slot. If it is free, create there. If it is taken,
/// prefer the first empty slot within the first `preferred_slots`; past
/// that the track is considered full and slot 0's clip is reused - the
/// caller's clear pass disposes of its old notes.
pub async fn ensure_clip(
    host: &dyn HostApi,
    track_index: usize,
    length_beats: f64,
    tuning: &ClipTuning,
) -> Result<ClipSite> {
    if !has_clip(host, track_index, 0).await? {
        create_clip(host, track_index, 0, length_beats).await?;
        return Ok(ClipSite {
            track_index,
            slot: 0,
            created: true,
        });
    }

    if let Some(slot) = find_empty_slot(host, track_index, tuning).await? {
        if slot < tuning.preferred_slots {
            create_clip(host, track_index, slot, length_beats).await?;
            return Ok(ClipSite {
                track_index,
                slot,
                created: true,
            });
        }
    }

    tracing::info!(
        track.index = track_index,
        "no preferred slot free, reusing clip in slot 0"
    );
    Ok(ClipSite {
        track_index,
        slot: 0,
        created: false,
    })
}

async fn create_clip(
    host: &dyn HostApi,
    track_index: usize,
    slot: usize,
    length_beats: f64,
) -> Result<()> {
    host.call(
        &ObjectPath::clip_slot(track_index, slot),
        "create_clip",
        &[json!(length_beats)],
    )
    .await?;
    tracing::info!(track.index = track_index, slot, length_beats, "clip created");
    Ok(())
}

/// The clear pass: drop whatever notes the clip holds.
pub fn clear_commands() -> Vec<Command> {
    vec![
        Command::call("select_all_notes"),
        Command::call("remove_notes"),
    ]
}

/// The insert pass for `notes`, in the host's streaming note protocol.
pub fn note_commands(notes: &[NoteEvent]) -> Vec<Command> {
    let mut commands = Vec::with_capacity(notes.len() + 3);
    commands.push(Command::call("set_notes"));
    commands.push(Command::call_with("notes", vec![json!(notes.len())]));
    for note in notes {
        commands.push(Command::call_with(
            "note",
            vec![
                json!(note.pitch),
                json!(note.start),
                json!(note.duration),
                json!(note.velocity),
                json!(0),
            ],
        ));
    }
    commands.push(Command::call("done"));
    commands
}
