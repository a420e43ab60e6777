//! Device record.

use super::id::{DeviceId, Revision};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A managed network device.
///
/// `id` and `revision` are store-managed: the store writes `revision` after
/// every successful save and overwrites both fields from the map entry on
/// every read. All other fields are opaque to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Device {
    /// Globally unique identifier, immutable once created.
    pub id: DeviceId,
    /// Version of the stored record, see [`Revision`].
    pub revision: Revision,
    /// `host:port` of the device.
    pub address: String,
    /// Device target name.
    pub target: String,
    /// Software version reported for the device.
    pub software_version: String,
    /// Request timeout for talking to the device.
    pub timeout: Duration,
    /// Credentials for connecting to the device.
    pub credentials: Option<Credentials>,
    /// TLS settings for connecting to the device.
    pub tls: Option<TlsConfig>,
}

impl Device {
    /// Creates an unpersisted device with the given ID.
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets the device address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Sets the device target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Sets the software version.
    #[must_use]
    pub fn with_software_version(mut self, version: impl Into<String>) -> Self {
        self.software_version = version.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the TLS configuration.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Sets the revision used as compare-and-swap token on the next save.
    #[must_use]
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = Revision::new(revision);
        self
    }
}

/// Username/password pair for a device.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// TLS settings for a device connection.
///
/// Paths are carried verbatim; the registry never opens them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to the CA certificate.
    pub ca_cert: String,
    /// Path to the client certificate.
    pub cert: String,
    /// Path to the client key.
    pub key: String,
    /// Connect without TLS.
    pub plain: bool,
    /// Skip server certificate verification.
    pub insecure: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_device_is_unpersisted() {
        let device = Device::new("leaf-1");
        assert_eq!(device.id.as_str(), "leaf-1");
        assert!(device.revision.is_none());
        assert!(device.credentials.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let device = Device::new("leaf-1")
            .with_address("10.0.0.1:830")
            .with_target("leaf-1")
            .with_software_version("1.0.0")
            .with_timeout(Duration::from_secs(5))
            .with_revision(3);

        assert_eq!(device.address, "10.0.0.1:830");
        assert_eq!(device.target, "leaf-1");
        assert_eq!(device.software_version, "1.0.0");
        assert_eq!(device.timeout, Duration::from_secs(5));
        assert_eq!(device.revision, Revision::new(3));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("admin", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
