//! # devreg core
//!
//! Versioned device store for the network device registry.
//!
//! This crate provides:
//! - The [`Device`] record and its stable payload encoding
//! - [`DeviceStore`], which loads, saves, deletes, lists and watches devices
//!   over a [`devreg_map::ReplicatedMap`]
//! - Translation of raw map events into typed device [`Event`]s
//!
//! ## Design Principles
//!
//! - The store keeps **no cache**: every call round-trips to the map
//! - Revisions are the map's entry versions; a stale revision is a
//!   [`CoreError::Conflict`], never a silent overwrite
//! - Every map call runs under a deadline from [`StoreConfig`]
//! - Streams are owned [`Subscription`]s; dropping one stops its task
//! - Corrupt records are logged and skipped by streams, and reported by
//!   [`DeviceStore::load`]
//!
//! ## Example
//!
//! ```rust
//! use devreg_core::{Device, DeviceStore, EventType};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = DeviceStore::in_memory();
//! let mut events = store.watch(false).await.unwrap();
//!
//! let mut device = Device::new("spine-1").with_target("spine-1");
//! store.store(&mut device).await.unwrap();
//!
//! let event = events.recv().await.unwrap();
//! assert_eq!(event.kind, EventType::Inserted);
//! assert_eq!(event.device, device);
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod device;
mod error;
mod subscription;

pub use config::StoreConfig;
pub use device::{
    decode_device, encode_device, translate, Credentials, Device, DeviceId, DeviceStore, Event,
    EventType, Revision, TlsConfig,
};
pub use error::{CoreError, CoreResult};
pub use subscription::Subscription;
