//! Device server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{DeviceService, ListStream};
use crate::messages::{
    AddDeviceRequest, AddDeviceResponse, GetDeviceRequest, GetDeviceResponse, ListRequest,
    RemoveDeviceRequest, RemoveDeviceResponse, UpdateDeviceRequest, UpdateDeviceResponse,
};
use devreg_core::DeviceStore;
use devreg_map::ReplicatedMap;
use std::sync::Arc;
use tracing::info;

/// The device server.
///
/// Owns the device store for its lifetime and exposes the device service
/// calls. A transport layer maps its requests onto the `handle_*` methods;
/// `list` is the only streaming call.
///
/// # Example
///
/// ```
/// use devreg_core::Device;
/// use devreg_server::{AddDeviceRequest, DeviceServer, GetDeviceRequest, ServerConfig};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let server = DeviceServer::in_memory(ServerConfig::default());
///
/// let added = server
///     .handle_add(AddDeviceRequest::new(Device::new("leaf-1")))
///     .await
///     .unwrap();
/// assert_eq!(added.metadata.version.as_u64(), 1);
///
/// let got = server.handle_get(GetDeviceRequest::new("leaf-1")).await.unwrap();
/// assert!(got.device.is_some());
/// # });
/// ```
#[derive(Debug)]
pub struct DeviceServer {
    service: DeviceService,
}

impl DeviceServer {
    /// Creates a server over a replicated map.
    pub fn new(map: Arc<dyn ReplicatedMap>, config: ServerConfig) -> Self {
        let store = Arc::new(DeviceStore::new(map, config.store.clone()));
        Self::with_store(store, config)
    }

    /// Creates a server over a fresh in-memory map.
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::new(Arc::new(devreg_map::InMemoryMap::new()), config)
    }

    /// Creates a server over an existing store.
    pub fn with_store(store: Arc<DeviceStore>, config: ServerConfig) -> Self {
        Self {
            service: DeviceService::new(store, config),
        }
    }

    /// Returns the request handlers.
    pub fn service(&self) -> &DeviceService {
        &self.service
    }

    /// Handles an add request.
    pub async fn handle_add(&self, request: AddDeviceRequest) -> ServerResult<AddDeviceResponse> {
        self.service.add(request).await
    }

    /// Handles an update request.
    pub async fn handle_update(
        &self,
        request: UpdateDeviceRequest,
    ) -> ServerResult<UpdateDeviceResponse> {
        self.service.update(request).await
    }

    /// Handles a get request.
    pub async fn handle_get(&self, request: GetDeviceRequest) -> ServerResult<GetDeviceResponse> {
        self.service.get(request).await
    }

    /// Handles a list request.
    pub async fn handle_list(&self, request: ListRequest) -> ServerResult<ListStream> {
        self.service.list(request).await
    }

    /// Handles a remove request.
    pub async fn handle_remove(
        &self,
        request: RemoveDeviceRequest,
    ) -> ServerResult<RemoveDeviceResponse> {
        self.service.remove(request).await
    }

    /// Shuts the server down.
    ///
    /// Closes the store, which ends every open list stream. Later requests
    /// fail with [`crate::ServerError::Closed`].
    pub async fn close(&self) -> ServerResult<()> {
        info!("shutting down device server");
        self.service.store().close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;
    use crate::messages::ListEventType;
    use devreg_core::{Device, Revision};
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn full_device_flow() {
        let server = DeviceServer::in_memory(ServerConfig::default());

        // 1. Add
        let added = server
            .handle_add(AddDeviceRequest::new(
                Device::new("d1").with_address("10.0.0.1:830"),
            ))
            .await
            .unwrap();
        assert_eq!(added.metadata.version, Revision::new(1));

        // 2. Get
        let device = server
            .handle_get(GetDeviceRequest::new("d1"))
            .await
            .unwrap()
            .device
            .unwrap();
        assert_eq!(device.revision, Revision::new(1));

        // 3. Update at the current revision
        let updated = server
            .handle_update(UpdateDeviceRequest::new(
                device.clone().with_address("10.0.0.2:830"),
            ))
            .await
            .unwrap();
        assert_eq!(updated.metadata.version, Revision::new(2));

        // 4. Update again with the stale revision
        let err = server
            .handle_update(UpdateDeviceRequest::new(device))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Conflict { .. }));

        // 5. Remove at the current revision
        server
            .handle_remove(RemoveDeviceRequest::new(
                Device::new("d1").with_revision(2),
            ))
            .await
            .unwrap();

        // 6. Gone
        let got = server.handle_get(GetDeviceRequest::new("d1")).await.unwrap();
        assert!(got.device.is_none());
    }

    #[tokio::test]
    async fn subscribed_list_follows_changes() {
        let server = DeviceServer::in_memory(ServerConfig::default());
        server
            .handle_add(AddDeviceRequest::new(Device::new("old")))
            .await
            .unwrap();

        let mut stream = server.handle_list(ListRequest::subscribe()).await.unwrap();
        server
            .handle_add(AddDeviceRequest::new(Device::new("new")))
            .await
            .unwrap();
        server
            .handle_remove(RemoveDeviceRequest::new(Device::new("old")))
            .await
            .unwrap();

        let first = stream.next().await.unwrap();
        assert_eq!(
            (first.kind, first.device.id.as_str()),
            (ListEventType::Added, "old")
        );
        let second = stream.next().await.unwrap();
        assert_eq!(
            (second.kind, second.device.id.as_str()),
            (ListEventType::Added, "new")
        );
        let third = stream.next().await.unwrap();
        assert_eq!(
            (third.kind, third.device.id.as_str()),
            (ListEventType::Removed, "old")
        );
    }

    #[tokio::test]
    async fn close_ends_streams_and_rejects_requests() {
        let server = DeviceServer::in_memory(ServerConfig::default());
        let mut stream = server.handle_list(ListRequest::subscribe()).await.unwrap();

        server.close().await.unwrap();

        assert!(stream.next().await.is_none());
        let err = server
            .handle_get(GetDeviceRequest::new("d1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Closed));
    }
}
