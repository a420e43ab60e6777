//! Server configuration.

use devreg_core::StoreConfig;

/// Configuration for the device server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum accepted device ID length in bytes.
    pub max_id_len: usize,
    /// Configuration for the device store the server creates.
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Default maximum device ID length.
    pub const DEFAULT_MAX_ID_LEN: usize = 1024;

    /// Creates a new server configuration with default limits.
    pub fn new() -> Self {
        Self {
            max_id_len: Self::DEFAULT_MAX_ID_LEN,
            store: StoreConfig::default(),
        }
    }

    /// Sets the maximum device ID length.
    pub fn with_max_id_len(mut self, len: usize) -> Self {
        self.max_id_len = len;
        self
    }

    /// Sets the store configuration.
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
