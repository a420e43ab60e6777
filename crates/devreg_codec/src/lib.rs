//! # devreg codec
//!
//! CBOR encoding/decoding for devreg payloads.
//!
//! Records are stored in the replicated map as opaque bytes. This crate
//! fixes the byte format: a single CBOR item produced from a serde type,
//! with fields written as a name-keyed map so that payloads stay readable
//! when fields are added.
//!
//! ## Rules
//!
//! - Encoding is deterministic for a given value
//! - Decoding accepts exactly one item; trailing bytes are an error
//! - Inputs larger than [`MAX_PAYLOAD_LEN`] are rejected before parsing
//!
//! ## Usage
//!
//! ```
//! use devreg_codec::{from_cbor, to_cbor};
//!
//! let bytes = to_cbor(&("spine-1", 830u16)).unwrap();
//! let decoded: (String, u16) = from_cbor(&bytes).unwrap();
//! assert_eq!(decoded, ("spine-1".to_string(), 830));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cbor;
mod error;

pub use cbor::{from_cbor, to_cbor, MAX_PAYLOAD_LEN};
pub use error::{CodecError, CodecResult};
