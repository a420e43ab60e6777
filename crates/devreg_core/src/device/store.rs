//! Versioned device store.

use super::codec::{decode_device, encode_device};
use super::event::{translate, Event};
use super::id::{DeviceId, Revision};
use super::model::Device;
use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::subscription::Subscription;
use devreg_map::{InMemoryMap, KeyValue, MapResult, Precondition, ReplicatedMap, WatchOptions};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::{ReceiverStream, UnboundedReceiverStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Provides versioned CRUD and change streams over device records.
///
/// The store holds no device state of its own. Every call round-trips to
/// the replicated map, and all concurrency control is the map's conditional
/// put and remove. The store can therefore be shared freely between tasks.
///
/// # Revisions
///
/// A device's `revision` is the map version of its record. Saving a device
/// with `Revision::NONE` writes unconditionally; any other revision must
/// match the stored one or the save fails with [`CoreError::Conflict`].
/// After a successful save the device carries its new revision.
///
/// # Example
///
/// ```rust
/// use devreg_core::{Device, DeviceStore};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = DeviceStore::in_memory();
///
/// let mut device = Device::new("leaf-1").with_address("10.0.0.1:830");
/// store.store(&mut device).await.unwrap();
/// assert_eq!(device.revision.as_u64(), 1);
///
/// let loaded = store.load(&device.id).await.unwrap().unwrap();
/// assert_eq!(loaded, device);
/// # });
/// ```
pub struct DeviceStore {
    map: Arc<dyn ReplicatedMap>,
    config: StoreConfig,
    closed: AtomicBool,
    shutdown: CancellationToken,
}

impl fmt::Debug for DeviceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceStore")
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl DeviceStore {
    /// Creates a store over the given map.
    pub fn new(map: Arc<dyn ReplicatedMap>, config: StoreConfig) -> Self {
        Self {
            map,
            config,
            closed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    /// Creates a store over a fresh in-process map.
    ///
    /// Used for local mode and tests; nothing is shared with other processes.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryMap::new()), StoreConfig::default())
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns true once [`DeviceStore::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.is_closed() {
            return Err(CoreError::Closed);
        }
        Ok(())
    }

    async fn deadline<T>(
        &self,
        operation: &'static str,
        timeout: Duration,
        call: impl Future<Output = MapResult<T>>,
    ) -> CoreResult<T> {
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result.map_err(CoreError::from),
            Err(_) => Err(CoreError::timeout(operation, timeout)),
        }
    }

    /// Loads a device by ID.
    ///
    /// Returns `Ok(None)` if no device is stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if the stored record is corrupt,
    /// [`CoreError::Timeout`] if the map does not answer in time, and
    /// [`CoreError::Closed`] after the store is closed.
    pub async fn load(&self, id: &DeviceId) -> CoreResult<Option<Device>> {
        self.ensure_open()?;

        let entry = self
            .deadline("load", self.config.operation_timeout, self.map.get(id.as_str()))
            .await?;
        let Some(kv) = entry else {
            debug!(%id, "device not found");
            return Ok(None);
        };

        let device = decode_device(&kv.key, &kv.value, kv.version).map_err(|source| {
            CoreError::Decode {
                id: id.clone(),
                source,
            }
        })?;
        debug!(%id, revision = %device.revision, "loaded device");
        Ok(Some(device))
    }

    /// Saves a device.
    ///
    /// With `Revision::NONE` the record is created or blindly overwritten.
    /// Otherwise the stored revision must equal `device.revision`. On success
    /// `device.revision` is set to the new revision.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Conflict`] if the stored record has moved on or
    /// was deleted, plus the timeout and closed errors of [`Self::load`].
    pub async fn store(&self, device: &mut Device) -> CoreResult<()> {
        self.ensure_open()?;

        let bytes = encode_device(device).map_err(CoreError::Encode)?;
        let precondition = Precondition::from_version(device.revision.as_u64());

        let kv = self
            .deadline(
                "store",
                self.config.operation_timeout,
                self.map.put(device.id.as_str(), bytes, precondition),
            )
            .await?;

        debug!(
            id = %device.id,
            expected = %device.revision,
            revision = kv.version,
            "stored device"
        );
        device.revision = Revision::new(kv.version);
        Ok(())
    }

    /// Deletes a device.
    ///
    /// With a non-zero revision the stored record must still be at that
    /// revision; with `Revision::NONE` the record is removed whatever its
    /// revision. Deleting a device that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Conflict`] if the stored revision differs, plus
    /// the timeout and closed errors of [`Self::load`].
    pub async fn delete(&self, device: &Device) -> CoreResult<()> {
        self.ensure_open()?;

        let precondition = Precondition::from_version(device.revision.as_u64());
        let removed = self
            .deadline(
                "delete",
                self.config.operation_timeout,
                self.map.remove(device.id.as_str(), precondition),
            )
            .await?;

        debug!(
            id = %device.id,
            revision = %device.revision,
            existed = removed.is_some(),
            "deleted device"
        );
        Ok(())
    }

    /// Streams every stored device once.
    ///
    /// Returns as soon as the enumeration is established. Devices then
    /// arrive in the map's enumeration order, which is unspecified, and the
    /// subscription ends after the last one. Records that fail to decode are
    /// logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Timeout`] if the enumeration cannot be set up in
    /// time and [`CoreError::Closed`] after the store is closed.
    pub async fn list(&self) -> CoreResult<Subscription<Device>> {
        self.ensure_open()?;

        let rx = self
            .deadline("list", self.config.subscribe_timeout, self.map.entries())
            .await?;
        debug!("list subscription started");

        Ok(Subscription::spawn(
            "list",
            ReceiverStream::new(rx),
            self.config.stream_buffer,
            self.shutdown.child_token(),
            |kv: KeyValue| match decode_device(&kv.key, &kv.value, kv.version) {
                Ok(device) => Some(device),
                Err(error) => {
                    warn!(
                        key = %kv.key,
                        version = kv.version,
                        %error,
                        "skipping undecodable device"
                    );
                    None
                }
            },
        ))
    }

    /// Streams device changes until the subscription is dropped or the store
    /// is closed.
    ///
    /// With `replay`, every stored device is first delivered as an
    /// [`EventType::Inserted`](super::EventType::Inserted) event, followed by
    /// live events with no gap in between. Events for one device arrive in
    /// the order the map applied them. Undecodable events are logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Timeout`] if the subscription cannot be set up in
    /// time and [`CoreError::Closed`] after the store is closed.
    pub async fn watch(&self, replay: bool) -> CoreResult<Subscription<Event>> {
        self.ensure_open()?;

        let options = if replay {
            WatchOptions::with_replay()
        } else {
            WatchOptions::live()
        };
        let rx = self
            .deadline("watch", self.config.subscribe_timeout, self.map.watch(options))
            .await?;
        debug!(replay, "watch subscription started");

        Ok(Subscription::spawn(
            "watch",
            UnboundedReceiverStream::new(rx),
            self.config.stream_buffer,
            self.shutdown.child_token(),
            translate,
        ))
    }

    /// Closes the store.
    ///
    /// Stops all list and watch subscriptions and releases the map session.
    /// Every later operation fails with [`CoreError::Closed`]. Repeated calls
    /// are forwarded to the map, which tolerates them.
    ///
    /// # Errors
    ///
    /// Returns an error if the map fails to close in time.
    pub async fn close(&self) -> CoreResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("closing device store");
        }
        self.shutdown.cancel();
        self.deadline("close", self.config.operation_timeout, self.map.close())
            .await
    }
}
