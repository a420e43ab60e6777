//! Change feed fan-out for map subscribers.

use crate::map::MapEvent;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Distributes applied map changes to subscribers.
///
/// The feed is not synchronized on its own. It lives inside the map's
/// state lock so that emitting an event is atomic with the mutation that
/// produced it, which gives every subscriber the map's apply order.
///
/// Senders are unbounded so emitting never waits on a slow consumer while
/// the state lock is held.
#[derive(Debug, Default)]
pub(crate) struct ChangeFeed {
    subscribers: Vec<UnboundedSender<MapEvent>>,
}

impl ChangeFeed {
    /// Creates an empty feed.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Subscribes to all future events.
    ///
    /// `backlog` is queued on the new channel before it is registered, so a
    /// caller holding the state lock gets a gap-free snapshot followed by the
    /// live tail.
    pub(crate) fn subscribe(
        &mut self,
        backlog: impl IntoIterator<Item = MapEvent>,
    ) -> UnboundedReceiver<MapEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in backlog {
            // The receiver is still in hand, this cannot fail.
            let _ = tx.send(event);
        }
        self.subscribers.push(tx);
        rx
    }

    /// Sends an event to every live subscriber, dropping disconnected ones.
    pub(crate) fn emit(&mut self, event: MapEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Returns the number of registered subscribers.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drops every subscriber, closing their channels.
    pub(crate) fn close(&mut self) {
        self.subscribers.clear();
    }
}
