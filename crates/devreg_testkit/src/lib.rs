//! # devreg testkit
//!
//! Test utilities for devreg.
//!
//! This crate provides:
//! - Test fixtures and store helpers
//! - Property-based test generators using proptest
//! - A model-checking integration harness and subscription helpers
//! - Concurrent stress helpers
//!
//! ## Usage
//!
//! ```rust
//! use devreg_core::Device;
//! use devreg_testkit::prelude::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = TestStore::new();
//! store.put_corrupt("broken").await;
//! store.save(Device::new("healthy")).await;
//!
//! let mut sub = store.list().await.unwrap();
//! let devices = collect_all(&mut sub).await;
//! assert_eq!(devices.len(), 1);
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
