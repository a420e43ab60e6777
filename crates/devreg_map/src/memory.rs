//! In-memory replicated map for local mode and testing.

use crate::error::{MapError, MapResult};
use crate::feed::ChangeFeed;
use crate::map::{
    KeyValue, MapEvent, MapEventKind, Precondition, ReplicatedMap, Version, WatchOptions,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::debug;

/// An in-memory replicated map.
///
/// This map keeps every entry in process memory behind a single lock and is
/// suitable for:
/// - Unit and integration tests
/// - Running the registry locally without a cluster
///
/// Every operation is applied under one lock, so the map is trivially
/// linearizable. Versions are counted per key: a new key is written at
/// version 1 and each later write adds one. The last version of a removed
/// key is kept, so re-creating it continues the sequence instead of
/// starting over.
///
/// # Example
///
/// ```rust
/// use devreg_map::{InMemoryMap, Precondition, ReplicatedMap};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let map = InMemoryMap::new();
/// let kv = map.put("d1", b"payload".to_vec(), Precondition::None).await.unwrap();
/// assert_eq!(kv.version, 1);
///
/// let kv = map.put("d1", b"v2".to_vec(), Precondition::Version(1)).await.unwrap();
/// assert_eq!(kv.version, 2);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMap {
    state: Mutex<MapState>,
}

#[derive(Debug, Default)]
struct MapState {
    slots: BTreeMap<String, Slot>,
    feed: ChangeFeed,
    closed: bool,
}

/// A key's current value, or the version it held when it was removed.
#[derive(Debug, Clone)]
struct Slot {
    value: Option<Vec<u8>>,
    version: Version,
}

impl Slot {
    fn live(&self, key: &str) -> Option<KeyValue> {
        self.value
            .as_ref()
            .map(|value| KeyValue::new(key, value.clone(), self.version))
    }
}

impl MapState {
    fn ensure_open(&self) -> MapResult<()> {
        if self.closed {
            return Err(MapError::Closed);
        }
        Ok(())
    }

    fn live(&self, key: &str) -> Option<KeyValue> {
        self.slots.get(key).and_then(|slot| slot.live(key))
    }

    fn snapshot(&self) -> Vec<KeyValue> {
        self.slots
            .iter()
            .filter_map(|(key, slot)| slot.live(key))
            .collect()
    }
}

fn check(key: &str, precondition: Precondition, current: Option<&KeyValue>) -> MapResult<()> {
    match precondition {
        Precondition::None => Ok(()),
        Precondition::Version(expected) => match current {
            Some(kv) if kv.version == expected => Ok(()),
            _ => Err(MapError::VersionMismatch {
                key: key.to_string(),
                expected,
                actual: current.map(|kv| kv.version),
            }),
        },
    }
}

impl InMemoryMap {
    /// Creates a new empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .slots
            .values()
            .filter(|slot| slot.value.is_some())
            .count()
    }

    /// Returns true if the map holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of open watch subscriptions.
    ///
    /// Dropped subscriptions are only pruned on the next write.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().feed.subscriber_count()
    }

    /// Returns true once [`ReplicatedMap::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[async_trait]
impl ReplicatedMap for InMemoryMap {
    async fn get(&self, key: &str) -> MapResult<Option<KeyValue>> {
        let state = self.state.lock();
        state.ensure_open()?;
        Ok(state.live(key))
    }

    async fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        precondition: Precondition,
    ) -> MapResult<KeyValue> {
        let mut state = self.state.lock();
        state.ensure_open()?;

        let current = state.live(key);
        check(key, precondition, current.as_ref())?;

        let previous = state.slots.get(key).map(|slot| slot.version).unwrap_or(0);
        let version = previous + 1;
        state.slots.insert(
            key.to_string(),
            Slot {
                value: Some(value.clone()),
                version,
            },
        );

        let kind = if current.is_some() {
            MapEventKind::Updated
        } else {
            MapEventKind::Inserted
        };
        let stored = KeyValue::new(key, value, version);
        state.feed.emit(MapEvent::from_entry(kind, stored.clone()));
        Ok(stored)
    }

    async fn remove(&self, key: &str, precondition: Precondition) -> MapResult<Option<KeyValue>> {
        let mut state = self.state.lock();
        state.ensure_open()?;

        let Some(current) = state.live(key) else {
            return Ok(None);
        };
        check(key, precondition, Some(&current))?;

        if let Some(slot) = state.slots.get_mut(key) {
            slot.value = None;
        }
        state
            .feed
            .emit(MapEvent::from_entry(MapEventKind::Removed, current.clone()));
        Ok(Some(current))
    }

    async fn entries(&self) -> MapResult<mpsc::Receiver<KeyValue>> {
        let snapshot = {
            let state = self.state.lock();
            state.ensure_open()?;
            state.snapshot()
        };

        let (tx, rx) = mpsc::channel(snapshot.len().max(1));
        for kv in snapshot {
            // Capacity covers the whole snapshot.
            let _ = tx.try_send(kv);
        }
        Ok(rx)
    }

    async fn watch(&self, options: WatchOptions) -> MapResult<mpsc::UnboundedReceiver<MapEvent>> {
        let mut state = self.state.lock();
        state.ensure_open()?;

        let backlog = if options.replay {
            state
                .snapshot()
                .into_iter()
                .map(|kv| MapEvent::from_entry(MapEventKind::Inserted, kv))
                .collect()
        } else {
            Vec::new()
        };
        Ok(state.feed.subscribe(backlog))
    }

    async fn close(&self) -> MapResult<()> {
        let mut state = self.state.lock();
        if !state.closed {
            debug!(entries = state.slots.len(), "closing in-memory map");
            state.closed = true;
            state.feed.close();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(mut rx: mpsc::UnboundedReceiver<MapEvent>) -> Vec<MapEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn memory_new_is_empty() {
        let map = InMemoryMap::new();
        assert!(map.is_empty());
        assert_eq!(map.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_assigns_increasing_versions() {
        let map = InMemoryMap::new();

        let first = map.put("d1", b"a".to_vec(), Precondition::None).await.unwrap();
        assert_eq!(first.version, 1);

        let second = map.put("d1", b"b".to_vec(), Precondition::None).await.unwrap();
        assert_eq!(second.version, 2);

        let other = map.put("d2", b"c".to_vec(), Precondition::None).await.unwrap();
        assert_eq!(other.version, 1);

        let stored = map.get("d1").await.unwrap().unwrap();
        assert_eq!(stored.value, b"b");
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn conditional_put_checks_version() {
        let map = InMemoryMap::new();
        map.put("d1", b"a".to_vec(), Precondition::None).await.unwrap();

        let kv = map
            .put("d1", b"b".to_vec(), Precondition::Version(1))
            .await
            .unwrap();
        assert_eq!(kv.version, 2);

        let err = map
            .put("d1", b"c".to_vec(), Precondition::Version(1))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MapError::VersionMismatch {
                key: "d1".into(),
                expected: 1,
                actual: Some(2),
            }
        );
    }

    #[tokio::test]
    async fn conditional_put_on_absent_key_fails() {
        let map = InMemoryMap::new();
        let err = map
            .put("d1", b"a".to_vec(), Precondition::Version(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MapError::VersionMismatch { actual: None, .. }
        ));
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn remove_absent_key_is_ok() {
        let map = InMemoryMap::new();
        assert_eq!(map.remove("d1", Precondition::None).await.unwrap(), None);
        assert_eq!(
            map.remove("d1", Precondition::Version(4)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn conditional_remove_checks_version() {
        let map = InMemoryMap::new();
        map.put("d1", b"a".to_vec(), Precondition::None).await.unwrap();
        map.put("d1", b"b".to_vec(), Precondition::None).await.unwrap();

        let err = map.remove("d1", Precondition::Version(1)).await.unwrap_err();
        assert!(err.is_version_mismatch());
        assert!(map.get("d1").await.unwrap().is_some());

        let removed = map.remove("d1", Precondition::Version(2)).await.unwrap();
        assert_eq!(removed.unwrap().value, b"b");
        assert_eq!(map.get("d1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn recreated_key_continues_versions() {
        let map = InMemoryMap::new();
        map.put("d1", b"a".to_vec(), Precondition::None).await.unwrap();
        map.put("d1", b"b".to_vec(), Precondition::None).await.unwrap();
        map.remove("d1", Precondition::None).await.unwrap();

        let kv = map.put("d1", b"c".to_vec(), Precondition::None).await.unwrap();
        assert_eq!(kv.version, 3);
    }

    #[tokio::test]
    async fn entries_enumerates_live_keys() {
        let map = InMemoryMap::new();
        map.put("a", vec![1], Precondition::None).await.unwrap();
        map.put("b", vec![2], Precondition::None).await.unwrap();
        map.put("c", vec![3], Precondition::None).await.unwrap();
        map.remove("b", Precondition::None).await.unwrap();

        let mut rx = map.entries().await.unwrap();
        let mut keys = Vec::new();
        while let Some(kv) = rx.recv().await {
            keys.push(kv.key);
        }
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn entries_on_empty_map_closes_immediately() {
        let map = InMemoryMap::new();
        let mut rx = map.entries().await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn watch_reports_event_kinds() {
        let map = InMemoryMap::new();
        let rx = map.watch(WatchOptions::live()).await.unwrap();

        map.put("d1", b"a".to_vec(), Precondition::None).await.unwrap();
        map.put("d1", b"b".to_vec(), Precondition::None).await.unwrap();
        map.remove("d1", Precondition::None).await.unwrap();

        let events = drain(rx);
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MapEventKind::Inserted,
                MapEventKind::Updated,
                MapEventKind::Removed
            ]
        );
        // Removal carries the last stored value and version
        assert_eq!(events[2].value, b"b");
        assert_eq!(events[2].version, 2);
    }

    #[tokio::test]
    async fn watch_with_replay_emits_snapshot_first() {
        let map = InMemoryMap::new();
        map.put("a", vec![1], Precondition::None).await.unwrap();
        map.put("b", vec![2], Precondition::None).await.unwrap();

        let rx = map.watch(WatchOptions::with_replay()).await.unwrap();
        map.put("c", vec![3], Precondition::None).await.unwrap();

        let events = drain(rx);
        let seen: Vec<_> = events.iter().map(|e| (e.key.as_str(), e.kind)).collect();
        assert_eq!(
            seen,
            vec![
                ("a", MapEventKind::Inserted),
                ("b", MapEventKind::Inserted),
                ("c", MapEventKind::Inserted),
            ]
        );
    }

    #[tokio::test]
    async fn watch_without_replay_skips_existing() {
        let map = InMemoryMap::new();
        map.put("a", vec![1], Precondition::None).await.unwrap();

        let rx = map.watch(WatchOptions::live()).await.unwrap();
        assert!(drain(rx).is_empty());
    }

    #[tokio::test]
    async fn failed_precondition_emits_nothing() {
        let map = InMemoryMap::new();
        map.put("d1", vec![1], Precondition::None).await.unwrap();
        let rx = map.watch(WatchOptions::live()).await.unwrap();

        let _ = map.put("d1", vec![2], Precondition::Version(9)).await;
        let _ = map.remove("d1", Precondition::Version(9)).await;

        assert!(drain(rx).is_empty());
    }

    #[tokio::test]
    async fn close_rejects_operations_and_ends_watches() {
        let map = InMemoryMap::new();
        map.put("d1", vec![1], Precondition::None).await.unwrap();
        let mut rx = map.watch(WatchOptions::live()).await.unwrap();

        map.close().await.unwrap();
        // Closing twice is tolerated
        map.close().await.unwrap();

        assert!(map.is_closed());
        assert!(rx.recv().await.is_none());
        assert_eq!(map.get("d1").await.unwrap_err(), MapError::Closed);
        assert_eq!(
            map.put("d1", vec![2], Precondition::None).await.unwrap_err(),
            MapError::Closed
        );
        assert!(matches!(map.entries().await, Err(MapError::Closed)));
        assert!(matches!(
            map.watch(WatchOptions::live()).await,
            Err(MapError::Closed)
        ));
    }
}
