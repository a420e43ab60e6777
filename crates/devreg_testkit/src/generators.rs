//! Property-based test generators using proptest.
//!
//! Provides strategies for generating devices and store operations.
//! Generated devices are always unsaved (`Revision::NONE`).

use devreg_core::{Credentials, Device, DeviceId, TlsConfig};
use proptest::prelude::*;
use std::time::Duration;

/// Strategy for generating valid device IDs.
pub fn device_id_strategy() -> impl Strategy<Value = DeviceId> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,15}")
        .expect("Invalid regex")
        .prop_map(DeviceId::from)
}

/// Strategy for generating `host:port` addresses.
pub fn address_strategy() -> impl Strategy<Value = String> {
    (any::<[u8; 4]>(), 1u16..)
        .prop_map(|(ip, port)| format!("{}.{}.{}.{}:{port}", ip[0], ip[1], ip[2], ip[3]))
}

/// Strategy for generating free-form text fields, including non-ASCII.
pub fn text_strategy() -> impl Strategy<Value = String> {
    "\\PC{0,24}"
}

/// Strategy for generating credentials.
pub fn credentials_strategy() -> impl Strategy<Value = Credentials> {
    (text_strategy(), text_strategy()).prop_map(|(user, password)| Credentials::new(user, password))
}

/// Strategy for generating TLS settings.
pub fn tls_strategy() -> impl Strategy<Value = TlsConfig> {
    (
        text_strategy(),
        text_strategy(),
        text_strategy(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(ca_cert, cert, key, plain, insecure)| TlsConfig {
            ca_cert,
            cert,
            key,
            plain,
            insecure,
        })
}

/// Strategy for generating unsaved devices with every field populated at
/// random.
pub fn device_strategy() -> impl Strategy<Value = Device> {
    (
        device_id_strategy(),
        address_strategy(),
        text_strategy(),
        text_strategy(),
        any::<u64>(),
        prop::option::of(credentials_strategy()),
        prop::option::of(tls_strategy()),
    )
        .prop_map(
            |(id, address, target, software_version, nanos, credentials, tls)| Device {
                id,
                address,
                target,
                software_version,
                timeout: Duration::from_nanos(nanos),
                credentials,
                tls,
                ..Device::default()
            },
        )
}

/// A single store operation.
#[derive(Debug, Clone)]
pub enum DeviceOperation {
    /// Save a device unconditionally
    Store {
        /// Device to save
        device: Device,
    },
    /// Delete a device unconditionally
    Delete {
        /// Device ID
        id: DeviceId,
    },
    /// Load a device
    Load {
        /// Device ID
        id: DeviceId,
    },
}

/// Strategy for device IDs drawn from a small pool, so operations collide.
pub fn pooled_id_strategy(pool: usize) -> impl Strategy<Value = DeviceId> {
    (0..pool.max(1)).prop_map(|i| DeviceId::from(format!("dev-{i}")))
}

/// Strategy for generating store operations over a pool of IDs.
pub fn device_operation_strategy(pool: usize) -> impl Strategy<Value = DeviceOperation> {
    prop_oneof![
        3 => (pooled_id_strategy(pool), device_strategy())
            .prop_map(|(id, device)| DeviceOperation::Store { device: Device { id, ..device } }),
        1 => pooled_id_strategy(pool).prop_map(|id| DeviceOperation::Delete { id }),
        2 => pooled_id_strategy(pool).prop_map(|id| DeviceOperation::Load { id }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    pool: usize,
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<DeviceOperation>> {
    prop::collection::vec(device_operation_strategy(pool), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
