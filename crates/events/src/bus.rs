//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`DomainEvent`]s.
//! It is shared via `Arc<EventBus>` in the API state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use warehub_core::roles::{PrincipalKind, Role};
use warehub_core::types::DbId;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub const ORDER_CREATED: &str = "order.created";
pub const ORDER_STATUS_CHANGED: &str = "order.status_changed";
pub const DELIVERY_REQUEST_SENT: &str = "delivery_request.sent";
pub const DELIVERY_REQUEST_STATUS_CHANGED: &str = "delivery_request.status_changed";
pub const DELIVERY_TASK_ASSIGNED: &str = "delivery_task.assigned";
pub const WRITE_OFF_CREATED: &str = "write_off.created";
pub const WRITE_OFF_DECIDED: &str = "write_off.decided";

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// The principal whose request caused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventActor {
    pub kind: PrincipalKind,
    pub id: DbId,
    pub role: Role,
}

/// A business event that occurred in the application.
///
/// Constructed via [`DomainEvent::new`] and enriched with
/// [`with_entity`](DomainEvent::with_entity),
/// [`with_actor`](DomainEvent::with_actor), and
/// [`with_payload`](DomainEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"order.created"`.
    pub event_type: String,

    /// Kind of the affected record (e.g. `"client_order"`).
    pub entity_type: Option<String>,

    pub entity_id: Option<DbId>,

    pub actor: Option<EventActor>,

    /// Event-specific data; the router reads recipient ids from here.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            entity_type: None,
            entity_id: None,
            actor: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, actor: EventActor) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Read an id field from the payload.
    pub fn payload_id(&self, key: &str) -> Option<DbId> {
        self.payload.get(key).and_then(serde_json::Value::as_i64)
    }

    /// Read a string field from the payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(serde_json::Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DomainEvent`].
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(id: DbId) -> EventActor {
        EventActor {
            kind: PrincipalKind::Employee,
            id,
            role: Role::Manager,
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            DomainEvent::new(ORDER_STATUS_CHANGED)
                .with_entity("client_order", 42)
                .with_actor(manager(7))
                .with_payload(serde_json::json!({"client_id": 3, "to": "confirmed"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, ORDER_STATUS_CHANGED);
        assert_eq!(received.entity_type.as_deref(), Some("client_order"));
        assert_eq!(received.entity_id, Some(42));
        assert_eq!(received.actor, Some(manager(7)));
        assert_eq!(received.payload_id("client_id"), Some(3));
        assert_eq!(received.payload_str("to"), Some("confirmed"));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DomainEvent::new(WRITE_OFF_CREATED));

        assert_eq!(rx1.recv().await.unwrap().event_type, WRITE_OFF_CREATED);
        assert_eq!(rx2.recv().await.unwrap().event_type, WRITE_OFF_CREATED);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DomainEvent::new("orphan.event"));
    }

    #[test]
    fn missing_payload_fields_read_as_none() {
        let event = DomainEvent::new(ORDER_CREATED);
        assert!(event.payload.is_object());
        assert_eq!(event.payload_id("client_id"), None);
        assert_eq!(event.payload_str("to"), None);
    }
}
