//! # devreg map
//!
//! Replicated key-value map boundary for the device registry.
//!
//! The registry persists nothing itself. Every record lives in a consistent
//! key-value map that assigns versions and orders writes. This crate is the
//! narrow boundary to that map: the trait the store talks to, the types that
//! cross it, and an in-memory implementation.
//!
//! ## Design Principles
//!
//! - Values are **opaque bytes**; the map never interprets them
//! - Versions are assigned by the map, never by callers
//! - Conditional put/remove are the only concurrency control
//! - Implementations must be `Send + Sync` and shareable behind an `Arc`
//!
//! ## Available Maps
//!
//! - [`InMemoryMap`] - For local mode and testing
//!
//! ## Example
//!
//! ```rust
//! use devreg_map::{InMemoryMap, Precondition, ReplicatedMap, WatchOptions};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let map = InMemoryMap::new();
//! let mut events = map.watch(WatchOptions::live()).await.unwrap();
//!
//! map.put("sw-1", b"payload".to_vec(), Precondition::None).await.unwrap();
//! let event = events.recv().await.unwrap();
//! assert_eq!(event.key, "sw-1");
//! assert_eq!(event.version, 1);
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod feed;
mod map;
mod memory;

pub use error::{MapError, MapResult};
pub use map::{
    KeyValue, MapEvent, MapEventKind, Precondition, ReplicatedMap, Version, WatchOptions,
};
pub use memory::InMemoryMap;
