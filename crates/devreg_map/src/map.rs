//! Replicated map trait definition.

use crate::error::MapResult;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Version counter attached to every map entry.
///
/// Versions are assigned by the map on each successful write. Zero is never
/// a valid entry version.
pub type Version = u64;

/// A key with its current value and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// The entry key.
    pub key: String,
    /// The opaque entry value.
    pub value: Vec<u8>,
    /// The version assigned by the map on the last write.
    pub version: Version,
}

impl KeyValue {
    /// Creates a new key-value entry.
    pub fn new(key: impl Into<String>, value: Vec<u8>, version: Version) -> Self {
        Self {
            key: key.into(),
            value,
            version,
        }
    }
}

/// Kind of change reported by the map's event feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MapEventKind {
    /// Event carries no state change.
    None,
    /// A new key was written.
    Inserted,
    /// An existing key was overwritten.
    Updated,
    /// A key was removed.
    Removed,
}

/// A single change notification from the map.
///
/// Removed events carry the last value and version of the removed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEvent {
    /// Kind of change.
    pub kind: MapEventKind,
    /// The affected key.
    pub key: String,
    /// The entry value after the change (before it, for removals).
    pub value: Vec<u8>,
    /// The entry version after the change (before it, for removals).
    pub version: Version,
}

impl MapEvent {
    /// Creates an event of the given kind from an entry.
    pub fn from_entry(kind: MapEventKind, entry: KeyValue) -> Self {
        Self {
            kind,
            key: entry.key,
            value: entry.value,
            version: entry.version,
        }
    }
}

/// Precondition attached to a write or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precondition {
    /// Apply unconditionally.
    #[default]
    None,
    /// Apply only if the entry currently holds this version.
    Version(Version),
}

impl Precondition {
    /// Builds a precondition from a caller-held version, where zero means
    /// "no expectation".
    pub fn from_version(version: Version) -> Self {
        if version == 0 {
            Self::None
        } else {
            Self::Version(version)
        }
    }
}

/// Options for [`ReplicatedMap::watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchOptions {
    /// Emit one `Inserted` event per existing entry before live events.
    pub replay: bool,
}

impl WatchOptions {
    /// Watch live events only.
    pub const fn live() -> Self {
        Self { replay: false }
    }

    /// Replay existing entries, then watch live events.
    pub const fn with_replay() -> Self {
        Self { replay: true }
    }
}

/// A consistent key-value map with conditional writes and a change feed.
///
/// The map is the only source of truth for entries and versions. Callers
/// never cache entries; all consistency comes from the conditional-write
/// primitives, which must be linearizable per key.
///
/// # Invariants
///
/// - Every successful write assigns a version strictly greater than any
///   version previously held by that key
/// - A conditional put or remove applies only if the current version equals
///   the expected one
/// - Within one watch channel, events for a key arrive in the order the
///   map applied them
/// - With replay, the subscription point is fixed before the snapshot is
///   taken, so no write falls between the replayed entries and the first
///   live event
///
/// # Implementors
///
/// - [`super::InMemoryMap`] - For local mode and testing
#[async_trait]
pub trait ReplicatedMap: Send + Sync {
    /// Returns the current entry for `key`, or `None` if absent.
    async fn get(&self, key: &str) -> MapResult<Option<KeyValue>>;

    /// Writes `value` under `key`.
    ///
    /// Returns the entry as stored, carrying its new version.
    ///
    /// # Errors
    ///
    /// Returns `VersionMismatch` if the precondition does not hold,
    /// including when the key is absent and a version was expected.
    async fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        precondition: Precondition,
    ) -> MapResult<KeyValue>;

    /// Removes `key`.
    ///
    /// Returns the removed entry, or `None` if the key was already absent.
    /// Removing an absent key is never an error.
    ///
    /// # Errors
    ///
    /// Returns `VersionMismatch` if the key is present with a version other
    /// than the expected one.
    async fn remove(&self, key: &str, precondition: Precondition) -> MapResult<Option<KeyValue>>;

    /// Enumerates all current entries once.
    ///
    /// Returns as soon as the enumeration is established; the receiver is
    /// closed after the last entry.
    async fn entries(&self) -> MapResult<mpsc::Receiver<KeyValue>>;

    /// Subscribes to the change feed.
    ///
    /// The receiver stays open until the map is closed or the receiver is
    /// dropped.
    async fn watch(&self, options: WatchOptions) -> MapResult<mpsc::UnboundedReceiver<MapEvent>>;

    /// Releases the map session. Calling it more than once is allowed.
    async fn close(&self) -> MapResult<()>;
}
