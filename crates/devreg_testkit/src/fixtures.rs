//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use devreg_core::{Device, DeviceStore, StoreConfig};
use devreg_map::{InMemoryMap, Precondition, ReplicatedMap};
use std::sync::Arc;

/// A device store over an in-memory map, with the map kept in reach.
///
/// Holding the map lets tests write records the store would never
/// produce, such as corrupt payloads.
pub struct TestStore {
    /// The store under test.
    pub store: DeviceStore,
    /// The map behind the store.
    pub map: Arc<InMemoryMap>,
}

impl TestStore {
    /// Creates a test store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a test store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let map = Arc::new(InMemoryMap::new());
        let store = DeviceStore::new(map.clone(), config);
        Self { store, map }
    }

    /// Writes raw bytes under `key`, bypassing the device codec.
    pub async fn put_raw(&self, key: &str, bytes: Vec<u8>) {
        self.map
            .put(key, bytes, Precondition::None)
            .await
            .expect("Failed to write raw record");
    }

    /// Writes a record under `key` that no device decoder accepts.
    pub async fn put_corrupt(&self, key: &str) {
        // A lone CBOR break code
        self.put_raw(key, vec![0xff]).await;
    }

    /// Saves a device and returns it with its new revision.
    pub async fn save(&self, mut device: Device) -> Device {
        self.store
            .store(&mut device)
            .await
            .expect("Failed to store device");
        device
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = DeviceStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store holding `count` devices named `dev-0`, `dev-1`, ...
    pub async fn populated_store(count: usize) -> TestStore {
        let test_store = TestStore::new();
        for i in 0..count {
            let device = Device::new(format!("dev-{i}"))
                .with_address(format!("10.0.{}.{}:830", i / 256, i % 256));
            test_store.save(device).await;
        }
        test_store
    }

    /// Creates a store holding `good` valid devices and `corrupt` corrupt
    /// records named `bad-0`, `bad-1`, ...
    pub async fn store_with_corruption(good: usize, corrupt: usize) -> TestStore {
        let test_store = populated_store(good).await;
        for i in 0..corrupt {
            test_store.put_corrupt(&format!("bad-{i}")).await;
        }
        test_store
    }
}
