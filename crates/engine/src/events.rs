//! Engine change notifications.
//!
//! The presentation layer (header badge, route guards) reacts to auth and
//! cart changes rather than polling. A broadcast channel keeps emitters
//! decoupled from however many subscribers exist, including zero.

use tokio::sync::broadcast;

/// Events emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Session identity was created or cleared.
    AuthChanged,
    /// A cart mutation completed (success or failure).
    CartChanged,
}

/// Broadcast bus for [`EngineEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    /// Create a bus with a small lag buffer; slow subscribers may miss
    /// intermediate events but always observe the latest.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(32);
        Self { tx }
    }

    /// Subscribe to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Sending with no subscribers is fine.
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EngineEvent::AuthChanged);
        bus.emit(EngineEvent::CartChanged);

        assert_eq!(rx.recv().await.expect("event"), EngineEvent::AuthChanged);
        assert_eq!(rx.recv().await.expect("event"), EngineEvent::CartChanged);
    }

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.emit(EngineEvent::CartChanged);
    }
}
