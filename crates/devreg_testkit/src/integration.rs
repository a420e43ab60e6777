//! Cross-crate integration test helpers.
//!
//! Provides a model-checking harness for the device store and helpers
//! for draining subscriptions in tests.

use crate::fixtures::TestStore;
use crate::generators::DeviceOperation;
use devreg_core::{Device, DeviceId, Subscription};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default time a helper waits for a subscription item.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Receives the next item, panicking if none arrives within `wait`.
///
/// Returns `None` if the subscription ended.
pub async fn next_within<T>(sub: &mut Subscription<T>, wait: Duration) -> Option<T> {
    tokio::time::timeout(wait, sub.recv())
        .await
        .expect("Timed out waiting for subscription item")
}

/// Receives items until the subscription ends.
pub async fn collect_all<T>(sub: &mut Subscription<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Some(item) = next_within(sub, DEFAULT_WAIT).await {
        items.push(item);
    }
    items
}

/// Receives exactly `count` items.
pub async fn collect_n<T>(sub: &mut Subscription<T>, count: usize) -> Vec<T> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let item = next_within(sub, DEFAULT_WAIT)
            .await
            .expect("Subscription ended early");
        items.push(item);
    }
    items
}

/// A test harness that mirrors every store operation in a model.
///
/// The model tracks what each device should look like and which revision
/// it should be at, so any divergence in the store shows up in
/// [`IntegrationHarness::verify_all`].
pub struct IntegrationHarness {
    /// The store under test.
    pub store: TestStore,
    /// Expected devices by ID.
    model: BTreeMap<DeviceId, Device>,
    /// Last revision each ID reached, including removed ones.
    revisions: BTreeMap<DeviceId, u64>,
}

impl IntegrationHarness {
    /// Creates a new harness over an empty store.
    pub fn new() -> Self {
        Self {
            store: TestStore::new(),
            model: BTreeMap::new(),
            revisions: BTreeMap::new(),
        }
    }

    /// Saves a device unconditionally and tracks it.
    pub async fn store(&mut self, device: Device) -> Device {
        let saved = self.store.save(device).await;

        let last = self.revisions.entry(saved.id.clone()).or_insert(0);
        *last += 1;
        assert_eq!(
            saved.revision.as_u64(),
            *last,
            "Revision for {} did not advance by one",
            saved.id
        );

        self.model.insert(saved.id.clone(), saved.clone());
        saved
    }

    /// Deletes a device unconditionally and updates tracking.
    pub async fn delete(&mut self, id: &DeviceId) {
        self.store
            .delete(&Device::new(id.clone()))
            .await
            .expect("Failed to delete device");
        self.model.remove(id);
    }

    /// Loads a device and verifies it matches the model.
    pub async fn load_and_verify(&self, id: &DeviceId) -> Option<Device> {
        let actual = self.store.load(id).await.expect("Failed to load device");
        assert_eq!(
            actual.as_ref(),
            self.model.get(id),
            "Device mismatch for {id}"
        );
        actual
    }

    /// Applies a generated operation to both the store and the model.
    pub async fn apply(&mut self, op: DeviceOperation) {
        match op {
            DeviceOperation::Store { device } => {
                self.store(device).await;
            }
            DeviceOperation::Delete { id } => self.delete(&id).await,
            DeviceOperation::Load { id } => {
                self.load_and_verify(&id).await;
            }
        }
    }

    /// Verifies the store holds exactly the modelled devices.
    pub async fn verify_all(&self) {
        for id in self.model.keys() {
            self.load_and_verify(id).await;
        }

        let mut sub = self.store.list().await.expect("Failed to list devices");
        let listed: BTreeMap<DeviceId, Device> = collect_all(&mut sub)
            .await
            .into_iter()
            .map(|device| (device.id.clone(), device))
            .collect();
        assert_eq!(listed, self.model, "Listed devices differ from model");
    }

    /// Returns the count of tracked devices.
    pub fn tracked_count(&self) -> usize {
        self.model.len()
    }
}

impl Default for IntegrationHarness {
    fn default() -> Self {
        Self::new()
    }
}
