//! Target selection among fuzzily matching tracks.
//!
//! A pattern request names a track loosely ("drums") and several tracks
//! may match. There is no ground truth for which one the user means, so
//! selection is a deterministic priority ladder, and every pick carries
//! the rung that made it - the reason string is the only way to audit a
//! heuristic after the fact.

use std::fmt;

use serde::Serialize;

use jamproto::Handle;

use crate::memory::{SessionMemory, TrackKind};

/// A fuzzy track query: name substring plus optional semantic kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    /// Matched case-insensitively against display names.
    pub name: String,
    /// Consulted against session memory before any heuristics.
    pub kind: Option<TrackKind>,
}

impl ResourceQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
        }
    }

    /// Build a query whose kind is inferred from the name itself.
    pub fn infer(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = TrackKind::from_name(&name);
        Self { name, kind }
    }

    pub fn with_kind(mut self, kind: TrackKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// A matching track plus the metadata the ladder needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub handle: Handle,
    /// Sub-items already placed on it (clips, for tracks).
    pub attachment_count: u32,
}

impl Candidate {
    pub fn is_empty(&self) -> bool {
        self.attachment_count == 0
    }
}

/// Above this many attachments a track is considered in active use and
/// rung 3 stops reusing it.
pub const MAX_REUSED_ATTACHMENTS: u32 = 3;

/// Which rung of the ladder made the pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Session memory still points at a live candidate of the query kind.
    LastOfKind,
    /// Highest-index candidate with no attachments.
    NewestEmpty,
    /// Least-attached candidate, below the reuse cutoff.
    FewestAttachments { count: u32 },
    /// Nothing better: highest index wins.
    NewestOverall,
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionReason::LastOfKind => f.write_str("last materialized of kind"),
            SelectionReason::NewestEmpty => f.write_str("newest empty"),
            SelectionReason::FewestAttachments { count } => {
                write!(f, "fewest attachments ({count})")
            }
            SelectionReason::NewestOverall => f.write_str("newest overall"),
        }
    }
}

/// The chosen track and the rung that chose it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub handle: Handle,
    pub reason: SelectionReason,
}

/// Apply the priority ladder to a pre-filtered candidate set.
///
/// Rungs, top-down, first match wins:
/// 1. the remembered last-materialized track of the query's kind, if its
///    id is still among the candidates (validate-on-read; stale memory
///    falls through);
/// 2. the newest (highest-index) empty candidate;
/// 3. the least-attached candidate, provided it carries fewer than
///    [`MAX_REUSED_ATTACHMENTS`] attachments (first wins ties);
/// 4. the newest candidate overall.
///
/// Returns `None` only for an empty candidate set; callers surface that as
/// a not-found outcome rather than guessing.
pub fn select(
    query: &ResourceQuery,
    candidates: &[Candidate],
    memory: &SessionMemory,
) -> Option<Selection> {
    if candidates.is_empty() {
        return None;
    }

    if let Some(kind) = query.kind {
        if let Some(entry) = memory.last_of(kind) {
            if let Some(candidate) = candidates.iter().find(|c| c.handle.id == entry.id) {
                return Some(Selection {
                    handle: candidate.handle.clone(),
                    reason: SelectionReason::LastOfKind,
                });
            }
            tracing::debug!(
                memory.kind = %kind,
                track.id = %entry.id,
                "remembered track no longer among candidates, falling through"
            );
        }
    }

    if let Some(candidate) = candidates
        .iter()
        .filter(|c| c.is_empty())
        .max_by_key(|c| c.handle.index)
    {
        return Some(Selection {
            handle: candidate.handle.clone(),
            reason: SelectionReason::NewestEmpty,
        });
    }

    let least_attached = candidates
        .iter()
        .min_by_key(|c| c.attachment_count)
        .expect("candidates is non-empty");
    if least_attached.attachment_count < MAX_REUSED_ATTACHMENTS {
        return Some(Selection {
            handle: least_attached.handle.clone(),
            reason: SelectionReason::FewestAttachments {
                count: least_attached.attachment_count,
            },
        });
    }

    let newest = candidates
        .iter()
        .max_by_key(|c| c.handle.index)
        .expect("candidates is non-empty");
    Some(Selection {
        handle: newest.handle.clone(),
        reason: SelectionReason::NewestOverall,
    })
}
