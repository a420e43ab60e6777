//! Request and response messages for the device service.

use devreg_core::{Device, DeviceId, EventType, Revision};

/// Identity and version of a stored device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectMetadata {
    /// Device ID.
    pub id: DeviceId,
    /// Revision assigned by the store.
    pub version: Revision,
}

impl ObjectMetadata {
    /// Creates metadata for a device.
    pub fn of(device: &Device) -> Self {
        Self {
            id: device.id.clone(),
            version: device.revision,
        }
    }
}

/// Request to add a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDeviceRequest {
    /// The device to add. Its revision must be unset.
    pub device: Device,
}

impl AddDeviceRequest {
    /// Creates an add request.
    pub fn new(device: Device) -> Self {
        Self { device }
    }
}

/// Response to [`AddDeviceRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDeviceResponse {
    /// Identity and first revision of the stored device.
    pub metadata: ObjectMetadata,
}

/// Request to update a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDeviceRequest {
    /// The device to write, carrying the revision it was read at.
    pub device: Device,
}

impl UpdateDeviceRequest {
    /// Creates an update request.
    pub fn new(device: Device) -> Self {
        Self { device }
    }
}

/// Response to [`UpdateDeviceRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDeviceResponse {
    /// Identity and new revision of the stored device.
    pub metadata: ObjectMetadata,
}

/// Request to fetch a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDeviceRequest {
    /// ID of the device to fetch.
    pub device_id: DeviceId,
}

impl GetDeviceRequest {
    /// Creates a get request.
    pub fn new(device_id: impl Into<DeviceId>) -> Self {
        Self {
            device_id: device_id.into(),
        }
    }
}

/// Response to [`GetDeviceRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDeviceResponse {
    /// The device, or `None` if it does not exist.
    pub device: Option<Device>,
}

/// Request to stream devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListRequest {
    /// Keep the stream open for live changes after the snapshot.
    pub subscribe: bool,
}

impl ListRequest {
    /// Lists the current devices once.
    pub const fn snapshot() -> Self {
        Self { subscribe: false }
    }

    /// Lists the current devices, then follows changes.
    pub const fn subscribe() -> Self {
        Self { subscribe: true }
    }
}

/// Kind of entry in a list stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListEventType {
    /// Snapshot entry from a non-subscribing list.
    #[default]
    None,
    /// The device was added, or existed when the subscription started.
    Added,
    /// The device was updated.
    Updated,
    /// The device was removed.
    Removed,
}

impl From<EventType> for ListEventType {
    fn from(kind: EventType) -> Self {
        match kind {
            EventType::None => Self::None,
            EventType::Inserted => Self::Added,
            EventType::Updated => Self::Updated,
            EventType::Removed => Self::Removed,
        }
    }
}

/// One entry of a list stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    /// Kind of entry.
    pub kind: ListEventType,
    /// The device. For removals, its last stored state.
    pub device: Device,
}

/// Request to remove a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveDeviceRequest {
    /// The device to remove. A set revision makes the removal conditional.
    pub device: Device,
}

impl RemoveDeviceRequest {
    /// Creates a remove request.
    pub fn new(device: Device) -> Self {
        Self { device }
    }
}

/// Response to [`RemoveDeviceRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveDeviceResponse;
