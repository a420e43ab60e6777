//! Request handlers for the device service.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::messages::{
    AddDeviceRequest, AddDeviceResponse, GetDeviceRequest, GetDeviceResponse, ListEventType,
    ListRequest, ListResponse, ObjectMetadata, RemoveDeviceRequest, RemoveDeviceResponse,
    UpdateDeviceRequest, UpdateDeviceResponse,
};
use devreg_core::{DeviceId, DeviceStore};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

/// Stream of list entries returned by [`DeviceService::list`].
pub type ListStream = Pin<Box<dyn Stream<Item = ListResponse> + Send>>;

/// Handles device service requests against a device store.
///
/// Handlers validate requests, call the store and translate its errors.
/// They hold no state of their own, so one service can serve any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct DeviceService {
    store: Arc<DeviceStore>,
    config: ServerConfig,
}

impl DeviceService {
    /// Creates a service over a store.
    pub fn new(store: Arc<DeviceStore>, config: ServerConfig) -> Self {
        Self { store, config }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<DeviceStore> {
        &self.store
    }

    fn validate_id(&self, id: &DeviceId) -> ServerResult<()> {
        if id.is_empty() {
            return Err(ServerError::invalid_request("device id is empty"));
        }
        if id.as_str().len() > self.config.max_id_len {
            return Err(ServerError::InvalidRequest(format!(
                "device id too long: {} > {}",
                id.as_str().len(),
                self.config.max_id_len
            )));
        }
        Ok(())
    }

    /// Handles an add request.
    ///
    /// The device is written unconditionally, replacing any device already
    /// stored under the same ID.
    pub async fn add(&self, request: AddDeviceRequest) -> ServerResult<AddDeviceResponse> {
        let mut device = request.device;
        self.validate_id(&device.id)?;
        if !device.revision.is_none() {
            return Err(ServerError::InvalidRequest(format!(
                "new device {} must not carry a revision ({})",
                device.id, device.revision
            )));
        }

        self.store.store(&mut device).await.map_err(|e| {
            let err = ServerError::from(e);
            log_failure("add", &err);
            err
        })?;
        Ok(AddDeviceResponse {
            metadata: ObjectMetadata::of(&device),
        })
    }

    /// Handles an update request.
    ///
    /// The write only applies if the stored revision matches the request's.
    /// An unset revision overwrites blindly.
    pub async fn update(&self, request: UpdateDeviceRequest) -> ServerResult<UpdateDeviceResponse> {
        let mut device = request.device;
        self.validate_id(&device.id)?;

        self.store.store(&mut device).await.map_err(|e| {
            let err = ServerError::from(e);
            log_failure("update", &err);
            err
        })?;
        Ok(UpdateDeviceResponse {
            metadata: ObjectMetadata::of(&device),
        })
    }

    /// Handles a get request.
    pub async fn get(&self, request: GetDeviceRequest) -> ServerResult<GetDeviceResponse> {
        self.validate_id(&request.device_id)?;

        let device = self.store.load(&request.device_id).await.map_err(|e| {
            let err = ServerError::from(e);
            log_failure("get", &err);
            err
        })?;
        Ok(GetDeviceResponse { device })
    }

    /// Handles a list request.
    ///
    /// Without `subscribe` the stream yields every stored device once, typed
    /// [`ListEventType::None`], and ends. With `subscribe` existing devices
    /// arrive as [`ListEventType::Added`], followed by live changes until
    /// the stream is dropped or the store closes.
    pub async fn list(&self, request: ListRequest) -> ServerResult<ListStream> {
        debug!(subscribe = request.subscribe, "list requested");

        let stream: ListStream = if request.subscribe {
            let events = self.store.watch(true).await.map_err(ServerError::from)?;
            Box::pin(events.map(|event| ListResponse {
                kind: ListEventType::from(event.kind),
                device: event.device,
            }))
        } else {
            let devices = self.store.list().await.map_err(ServerError::from)?;
            Box::pin(devices.map(|device| ListResponse {
                kind: ListEventType::None,
                device,
            }))
        };
        Ok(stream)
    }

    /// Handles a remove request.
    ///
    /// Removing a device that does not exist succeeds.
    pub async fn remove(&self, request: RemoveDeviceRequest) -> ServerResult<RemoveDeviceResponse> {
        self.validate_id(&request.device.id)?;

        self.store.delete(&request.device).await.map_err(|e| {
            let err = ServerError::from(e);
            log_failure("remove", &err);
            err
        })?;
        Ok(RemoveDeviceResponse)
    }
}

fn log_failure(operation: &'static str, err: &ServerError) {
    if err.is_server_error() {
        warn!(operation, error = %err, "device request failed");
    } else {
        debug!(operation, error = %err, "device request rejected");
    }
}
