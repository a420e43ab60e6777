//! Device store configuration.

use std::time::Duration;

/// Configuration for a [`crate::DeviceStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Deadline for a single load, store, delete or close against the map.
    pub operation_timeout: Duration,

    /// Deadline for establishing a list or watch subscription.
    ///
    /// Once established, streaming has no deadline.
    pub subscribe_timeout: Duration,

    /// Capacity of the channel between a subscription task and its consumer.
    pub stream_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(15),
            subscribe_timeout: Duration::from_secs(15),
            stream_buffer: 64,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-operation deadline.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Sets the subscription setup deadline.
    #[must_use]
    pub const fn with_subscribe_timeout(mut self, timeout: Duration) -> Self {
        self.subscribe_timeout = timeout;
        self
    }

    /// Sets the subscription channel capacity. Zero is raised to one.
    #[must_use]
    pub fn with_stream_buffer(mut self, capacity: usize) -> Self {
        self.stream_buffer = capacity.max(1);
        self
    }
}
