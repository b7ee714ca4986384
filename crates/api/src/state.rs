use std::sync::Arc;

use warehub_events::{DomainEvent, EventBus, Mailer};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: warehub_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// In-process bus feeding the notification router.
    pub event_bus: Arc<EventBus>,
    /// Outgoing mail for verification codes. Falls back to a log-only
    /// mailer when SMTP is not configured.
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn publish(&self, event: DomainEvent) {
        self.event_bus.publish(event);
    }
}
