//! The host object model boundary.
//!
//! The engine drives a DAW set through a narrow, synchronous-per-call
//! interface: list a collection, read or write a property, invoke a method.
//! Two properties of that interface shape everything built on top:
//!
//! - creation calls return nothing, so new objects must be found by
//!   snapshot diffing (see [`crate::materialize`]);
//! - a second call against an object with one already in flight raises
//!   "operation already in progress", so sequences are paced and each
//!   object is guarded by a lock (see [`crate::pacer`] and [`TargetLocks`]).
//!
//! Host values arrive in the bridge's loose shape: most property reads
//! come back as one-element arrays, booleans as 0/1. The `value_*` helpers
//! normalize that.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;

use jamproto::{Handle, ObjectId, Snapshot};

/// Path to an object in the host's tree, e.g. `live_set tracks 3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath(String);

impl ObjectPath {
    pub fn live_set() -> Self {
        ObjectPath("live_set".to_string())
    }

    pub fn track(index: usize) -> Self {
        ObjectPath(format!("live_set tracks {index}"))
    }

    pub fn clip_slot(track_index: usize, slot: usize) -> Self {
        ObjectPath(format!("live_set tracks {track_index} clip_slots {slot}"))
    }

    pub fn clip(track_index: usize, slot: usize) -> Self {
        ObjectPath(format!(
            "live_set tracks {track_index} clip_slots {slot} clip"
        ))
    }

    pub fn device(track_index: usize, device: usize) -> Self {
        ObjectPath(format!("live_set tracks {track_index} devices {device}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The host interface the engine consumes. Implemented by the bridge in
/// production and by scripted fakes in tests.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Read a property of the object at `path`.
    async fn get(&self, path: &ObjectPath, property: &str) -> Result<Value>;

    /// Write a property of the object at `path`.
    async fn set(&self, path: &ObjectPath, property: &str, value: Value) -> Result<()>;

    /// Invoke a method on the object at `path`.
    async fn call(&self, path: &ObjectPath, method: &str, args: &[Value]) -> Result<Value>;

    /// Resolve the stable id of the object at `path`. Phantom slots report
    /// the invalid sentinel rather than an error.
    async fn object_id(&self, path: &ObjectPath) -> Result<ObjectId>;
}

/// Unwrap the bridge's one-element-array convention.
fn unwrapped(value: &Value) -> &Value {
    match value {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    }
}

/// Host truthiness: 0/false/null/empty are false, everything else true.
pub fn value_truthy(value: &Value) -> bool {
    match unwrapped(value) {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Element count of a listed child collection.
pub fn value_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Null => 0,
        _ => 1,
    }
}

pub fn value_f64(value: &Value) -> Option<f64> {
    unwrapped(value).as_f64()
}

pub fn value_string(value: &Value) -> Option<String> {
    unwrapped(value).as_str().map(str::to_string)
}

/// Capture the track collection as a [`Snapshot`].
///
/// Walks every listed slot, resolving id and name per index. Phantom slots
/// and slots that error on id resolution are kept out of the valid entries
/// but still counted in the snapshot's raw length.
pub async fn track_snapshot(host: &dyn HostApi) -> Result<Snapshot> {
    let listing = host.get(&ObjectPath::live_set(), "tracks").await?;
    let count = value_count(&listing);

    let mut entries = Vec::with_capacity(count);
    for index in 0..count {
        let path = ObjectPath::track(index);
        let id = match host.object_id(&path).await {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(track.index = index, error = %e, "skipping unresolvable track slot");
                ObjectId::INVALID
            }
        };

        let name = if id.is_valid() {
            match host.get(&path, "name").await {
                Ok(v) => value_string(&v).unwrap_or_else(|| "Unknown".to_string()),
                Err(_) => "Unknown".to_string(),
            }
        } else {
            String::new()
        };

        entries.push(Handle::new(id, index, name));
    }

    Ok(Snapshot::new(entries))
}

/// Per-object async locks.
///
/// The host rejects overlapping calls against one object but nothing in
/// its interface prevents a caller from issuing them. Every
/// materialization or paced sequence takes the target's lock for its full
/// duration, turning the caller discipline into an enforced invariant.
#[derive(Default)]
pub struct TargetLocks {
    locks: DashMap<ObjectId, Arc<Mutex<()>>>,
}

impl TargetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `id`, created on first use.
    pub fn for_object(&self, id: ObjectId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
