//! Device change events.

use super::codec::decode_device;
use super::model::Device;
use devreg_map::{MapEvent, MapEventKind};
use tracing::warn;

/// Kind of change a device event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventType {
    /// No state change.
    #[default]
    None,
    /// The device was added (or replayed as part of a snapshot).
    Inserted,
    /// The device was overwritten.
    Updated,
    /// The device was removed.
    Removed,
}

impl From<MapEventKind> for EventType {
    fn from(kind: MapEventKind) -> Self {
        match kind {
            MapEventKind::Inserted => Self::Inserted,
            MapEventKind::Updated => Self::Updated,
            MapEventKind::Removed => Self::Removed,
            _ => Self::None,
        }
    }
}

/// A change to a device observed through a watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Type of change.
    pub kind: EventType,
    /// The device after the change. For removals, the last stored state.
    pub device: Device,
}

/// Translates a raw map event into a device event.
///
/// Returns `None` if the event's value cannot be decoded. The drop is
/// logged so corrupt records stay visible.
pub fn translate(event: MapEvent) -> Option<Event> {
    match decode_device(&event.key, &event.value, event.version) {
        Ok(device) => Some(Event {
            kind: event.kind.into(),
            device,
        }),
        Err(error) => {
            warn!(
                key = %event.key,
                version = event.version,
                kind = ?event.kind,
                %error,
                "dropping undecodable device event"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::codec::encode_device;
    use crate::device::Revision;
    use devreg_map::KeyValue;

    fn raw(kind: MapEventKind, device: &Device, version: u64) -> MapEvent {
        let bytes = encode_device(device).unwrap();
        MapEvent::from_entry(kind, KeyValue::new(device.id.as_str(), bytes, version))
    }

    #[test]
    fn kinds_map_one_to_one() {
        assert_eq!(EventType::from(MapEventKind::None), EventType::None);
        assert_eq!(EventType::from(MapEventKind::Inserted), EventType::Inserted);
        assert_eq!(EventType::from(MapEventKind::Updated), EventType::Updated);
        assert_eq!(EventType::from(MapEventKind::Removed), EventType::Removed);
    }

    #[test]
    fn translate_stamps_key_and_version() {
        let device = Device::new("leaf-1").with_address("10.0.0.1:830");
        let event = translate(raw(MapEventKind::Updated, &device, 7)).unwrap();

        assert_eq!(event.kind, EventType::Updated);
        assert_eq!(event.device.id.as_str(), "leaf-1");
        assert_eq!(event.device.revision, Revision::new(7));
        assert_eq!(event.device.address, "10.0.0.1:830");
    }

    #[test]
    fn translate_keeps_removed_payload() {
        let device = Device::new("leaf-1").with_target("leaf");
        let event = translate(raw(MapEventKind::Removed, &device, 3)).unwrap();

        assert_eq!(event.kind, EventType::Removed);
        assert_eq!(event.device.target, "leaf");
    }

    #[test]
    fn translate_drops_corrupt_value() {
        let event = MapEvent::from_entry(
            MapEventKind::Inserted,
            KeyValue::new("broken", vec![0xff, 0xff], 1),
        );
        assert!(translate(event).is_none());
    }
}
