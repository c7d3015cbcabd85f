//! Session memory: the last materialized track per semantic kind.
//!
//! Display names are what users see; kinds are what the planner talks
//! about ("put a bassline on the bass track"). The memory maps each kind
//! to the most recently materialized track of that kind so that repeated
//! pattern requests land on the track the user just watched appear, not on
//! whichever older track happens to match a name search.
//!
//! Entries are overwritten on every successful materialization and never
//! pruned. Staleness is handled where the memory is read: the selector
//! only honors an entry whose id is still present among live candidates.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use jamproto::{Handle, ObjectId};

/// Semantic role of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Drums,
    Bass,
    Lead,
    Pad,
}

impl TrackKind {
    pub const ALL: [TrackKind; 4] = [
        TrackKind::Drums,
        TrackKind::Bass,
        TrackKind::Lead,
        TrackKind::Pad,
    ];

    /// Infer a kind from a display name by substring, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| name.contains(kind.as_str()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Drums => "drums",
            TrackKind::Bass => "bass",
            TrackKind::Lead => "lead",
            TrackKind::Pad => "pad",
        }
    }

    /// The canonical name given to freshly created tracks of this kind.
    pub fn default_track_name(&self) -> &'static str {
        match self {
            TrackKind::Drums => "AI Drums",
            TrackKind::Bass => "AI Bass",
            TrackKind::Lead => "AI Lead",
            TrackKind::Pad => "AI Pad",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.to_lowercase())
            .ok_or(())
    }
}

/// What the memory keeps per kind. The index is a hint only and must be
/// re-resolved against a fresh snapshot before use; the id is the truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: ObjectId,
    pub index: usize,
}

/// Kind-to-last-materialized-track table. One per engine instance, passed
/// in explicitly so tests can run isolated copies.
#[derive(Debug, Default)]
pub struct SessionMemory {
    last_created: HashMap<TrackKind, MemoryEntry>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `handle` as the latest track of `kind`, replacing any
    /// previous entry.
    pub fn remember(&mut self, kind: TrackKind, handle: &Handle) {
        tracing::info!(
            memory.kind = %kind,
            track.id = %handle.id,
            track.index = handle.index,
            "session memory updated"
        );
        self.last_created.insert(
            kind,
            MemoryEntry {
                id: handle.id,
                index: handle.index,
            },
        );
    }

    pub fn last_of(&self, kind: TrackKind) -> Option<MemoryEntry> {
        self.last_created.get(&kind).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.last_created.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_inference_from_display_names() {
        assert_eq!(TrackKind::from_name("AI Drums"), Some(TrackKind::Drums));
        assert_eq!(TrackKind::from_name("my BASS track"), Some(TrackKind::Bass));
        assert_eq!(TrackKind::from_name("Lead 2"), Some(TrackKind::Lead));
        assert_eq!(TrackKind::from_name("warm pad"), Some(TrackKind::Pad));
        assert_eq!(TrackKind::from_name("Vocals"), None);
    }

    #[test]
    fn remember_overwrites_previous_entry() {
        let mut memory = SessionMemory::new();
        memory.remember(TrackKind::Drums, &Handle::new(ObjectId(10), 1, "AI Drums"));
        memory.remember(TrackKind::Drums, &Handle::new(ObjectId(14), 3, "AI Drums"));

        let entry = memory.last_of(TrackKind::Drums).unwrap();
        assert_eq!(entry.id, ObjectId(14));
        assert_eq!(entry.index, 3);
        assert_eq!(memory.last_of(TrackKind::Bass), None);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in TrackKind::ALL {
            assert_eq!(kind.as_str().parse::<TrackKind>().unwrap(), kind);
        }
        assert!("vocals".parse::<TrackKind>().is_err());
    }
}
