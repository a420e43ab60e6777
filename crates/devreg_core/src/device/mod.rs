//! Device records and their storage.

mod codec;
mod event;
mod id;
mod model;
mod store;

pub use codec::{decode_device, encode_device};
pub use event::{translate, Event, EventType};
pub use id::{DeviceId, Revision};
pub use model::{Credentials, Device, TlsConfig};
pub use store::DeviceStore;
