use tokio::sync::broadcast;

use crate::error::GatewayError;
use crate::models::Message;

/// A decoded application event.
#[derive(Debug, Clone)]
pub enum Event {
    MessageCreate(Message),
}

impl Event {
    /// Decode a dispatch payload into a typed event.
    ///
    /// Returns `Ok(None)` for event names this client does not handle;
    /// the caller drops those silently.
    pub fn from_dispatch(
        event_type: &str,
        data: serde_json::Value,
    ) -> Result<Option<Event>, GatewayError> {
        match event_type {
            "MESSAGE_CREATE" => Ok(Some(Event::MessageCreate(serde_json::from_value(data)?))),
            _ => Ok(None),
        }
    }
}

/// Fans decoded events out to application subscribers.
#[derive(Clone)]
pub struct EventDispatcher {
    tx: broadcast::Sender<Event>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Fire-and-forget: events are dropped when nobody is subscribed.
    pub fn dispatch(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
