//! Device payload codec.
//!
//! A stored record is the CBOR encoding of every device field except `id`
//! and `revision`. Those two travel as the map key and the map entry
//! version, and are stamped back onto the device on decode.

use super::id::{DeviceId, Revision};
use super::model::{Credentials, Device, TlsConfig};
use devreg_codec::{from_cbor, to_cbor, CodecResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct PayloadRef<'a> {
    address: &'a str,
    target: &'a str,
    software_version: &'a str,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    credentials: Option<&'a Credentials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tls: Option<&'a TlsConfig>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct Payload {
    address: String,
    target: String,
    software_version: String,
    timeout: u64,
    credentials: Option<Credentials>,
    tls: Option<TlsConfig>,
}

/// Encodes a device payload for storage.
///
/// The timeout is written in nanoseconds, saturating at `u64::MAX`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_device(device: &Device) -> CodecResult<Vec<u8>> {
    let payload = PayloadRef {
        address: &device.address,
        target: &device.target,
        software_version: &device.software_version,
        timeout: u64::try_from(device.timeout.as_nanos()).unwrap_or(u64::MAX),
        credentials: device.credentials.as_ref(),
        tls: device.tls.as_ref(),
    };
    to_cbor(&payload)
}

/// Decodes a stored payload into a device.
///
/// `key` and `version` come from the map entry and override anything the
/// payload might say about identity or version. Fields missing from the
/// payload take their default values.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid device payload.
pub fn decode_device(key: &str, bytes: &[u8], version: u64) -> CodecResult<Device> {
    let payload: Payload = from_cbor(bytes)?;
    Ok(Device {
        id: DeviceId::from(key),
        revision: Revision::new(version),
        address: payload.address,
        target: payload.target,
        software_version: payload.software_version,
        timeout: Duration::from_nanos(payload.timeout),
        credentials: payload.credentials,
        tls: payload.tls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use devreg_codec::CodecError;

    fn full_device() -> Device {
        Device::new("spine-1")
            .with_address("10.0.0.1:830")
            .with_target("spine-1")
            .with_software_version("2.1.0")
            .with_timeout(Duration::from_millis(1500))
            .with_credentials(Credentials::new("admin", "secret"))
            .with_tls(TlsConfig {
                ca_cert: "/etc/ca.pem".into(),
                cert: "/etc/cert.pem".into(),
                key: "/etc/key.pem".into(),
                plain: false,
                insecure: true,
            })
            .with_revision(9)
    }

    #[test]
    fn roundtrip_keeps_payload_fields() {
        let device = full_device();
        let bytes = encode_device(&device).unwrap();
        let decoded = decode_device("spine-1", &bytes, 9).unwrap();
        assert_eq!(decoded, device);
    }

    #[test]
    fn key_and_version_override_identity() {
        let device = full_device();
        let bytes = encode_device(&device).unwrap();

        let decoded = decode_device("other", &bytes, 42).unwrap();
        assert_eq!(decoded.id.as_str(), "other");
        assert_eq!(decoded.revision, Revision::new(42));
        assert_eq!(decoded.address, device.address);
    }

    #[test]
    fn payload_excludes_id_and_revision() {
        let a = full_device();
        let mut b = a.clone();
        b.id = DeviceId::from("renamed");
        b.revision = Revision::new(1);

        assert_eq!(encode_device(&a).unwrap(), encode_device(&b).unwrap());
    }

    #[test]
    fn empty_nested_structures_stay_absent() {
        let device = Device::new("bare");
        let bytes = encode_device(&device).unwrap();
        let decoded = decode_device("bare", &bytes, 1).unwrap();
        assert!(decoded.credentials.is_none());
        assert!(decoded.tls.is_none());
    }

    #[test]
    fn missing_fields_take_defaults() {
        #[derive(Serialize)]
        struct Partial {
            address: String,
        }
        let bytes = to_cbor(&Partial {
            address: "10.0.0.9:830".into(),
        })
        .unwrap();

        let decoded = decode_device("old", &bytes, 4).unwrap();
        assert_eq!(decoded.address, "10.0.0.9:830");
        assert!(decoded.target.is_empty());
        assert_eq!(decoded.timeout, Duration::ZERO);
    }

    #[test]
    fn corrupt_bytes_fail_to_decode() {
        let result = decode_device("d1", b"not cbor at all", 1);
        assert!(matches!(
            result,
            Err(CodecError::DecodingFailed { .. }) | Err(CodecError::TrailingBytes { .. })
        ));
    }

    #[test]
    fn oversized_timeout_saturates() {
        let device = Device::new("slow").with_timeout(Duration::MAX);
        let bytes = encode_device(&device).unwrap();
        let decoded = decode_device("slow", &bytes, 1).unwrap();
        assert_eq!(decoded.timeout, Duration::from_nanos(u64::MAX));
    }
}
