//! # devreg server
//!
//! Device service for the network device registry.
//!
//! This crate provides:
//! - Request and response messages for Add, Update, Get, List and Remove
//! - Request validation and error classification
//! - [`DeviceServer`], which owns a device store and serves the calls
//!
//! # Architecture
//!
//! The server is a thin layer over [`devreg_core::DeviceStore`]. It keeps
//! no state of its own: every request is validated, handed to the store,
//! and its result translated into a response or a [`ServerError`]. Wire
//! transport is left to the embedding application.
//!
//! # Revisions
//!
//! Every response carries an [`ObjectMetadata`] with the device's current
//! revision. Update and Remove requests that carry a revision apply only if
//! it is still current; otherwise they fail with [`ServerError::Conflict`]
//! and the client should fetch the device again.
//!
//! # Listing
//!
//! `List` with `subscribe = false` streams the current devices once. With
//! `subscribe = true` the current devices arrive as `Added` entries and the
//! stream then follows live changes:
//!
//! ```rust
//! use devreg_server::{DeviceServer, ListRequest, ServerConfig};
//! use tokio_stream::StreamExt;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let server = DeviceServer::in_memory(ServerConfig::default());
//! let snapshot: Vec<_> = server
//!     .handle_list(ListRequest::snapshot())
//!     .await
//!     .unwrap()
//!     .collect()
//!     .await;
//! assert!(snapshot.is_empty());
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod messages;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{DeviceService, ListStream};
pub use messages::{
    AddDeviceRequest, AddDeviceResponse, GetDeviceRequest, GetDeviceResponse, ListEventType,
    ListRequest, ListResponse, ObjectMetadata, RemoveDeviceRequest, RemoveDeviceResponse,
    UpdateDeviceRequest, UpdateDeviceResponse,
};
pub use server::DeviceServer;
