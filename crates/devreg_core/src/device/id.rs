//! Device identifier and revision types.

use std::fmt;

/// Globally unique identifier of a device.
///
/// The identifier is the map key of the device record. It is chosen by the
/// client when the device is first stored and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the ID, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Version stamp of a stored device.
///
/// Revisions are assigned by the replicated map on every successful write
/// and act as the compare-and-swap token for the next update. Zero means
/// the device has not been persisted, or that the caller holds no
/// expectation about the stored version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    /// The "not persisted / no expectation" revision.
    pub const NONE: Self = Self(0);

    /// Creates a revision.
    #[must_use]
    pub const fn new(revision: u64) -> Self {
        Self(revision)
    }

    /// Returns the raw revision value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns true if this is [`Revision::NONE`].
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rev:{}", self.0)
    }
}

impl From<u64> for Revision {
    fn from(revision: u64) -> Self {
        Self(revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_display_is_raw() {
        let id = DeviceId::from("leaf-1");
        assert_eq!(format!("{id}"), "leaf-1");
        assert_eq!(id.as_str(), "leaf-1");
        assert!(!id.is_empty());
        assert!(DeviceId::default().is_empty());
    }

    #[test]
    fn revision_ordering() {
        let r1 = Revision::new(1);
        let r2 = Revision::new(2);
        assert!(r1 < r2);
        assert!(Revision::NONE < r1);
    }

    #[test]
    fn revision_none() {
        assert!(Revision::NONE.is_none());
        assert!(Revision::default().is_none());
        assert!(!Revision::new(3).is_none());
        assert_eq!(format!("{}", Revision::new(3)), "rev:3");
    }
}
