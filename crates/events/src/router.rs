//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the event bus and, for each event it
//! knows about, resolves the recipients and writes one notification row per
//! recipient. Order status changes are also e-mailed to the client when a
//! real mailer is configured.

use std::sync::Arc;

use tokio::sync::broadcast;
use warehub_core::roles::{PrincipalKind, Role};
use warehub_core::types::DbId;
use warehub_db::models::notification::CreateNotification;
use warehub_db::repositories::{
    ClientRepo, EmployeeRepo, NotificationRepo, SupplierRepo, VisitorRepo,
};
use warehub_db::DbPool;

use crate::bus::{
    DomainEvent, DELIVERY_REQUEST_SENT, DELIVERY_REQUEST_STATUS_CHANGED, DELIVERY_TASK_ASSIGNED,
    ORDER_CREATED, ORDER_STATUS_CHANGED, WRITE_OFF_CREATED, WRITE_OFF_DECIDED,
};
use crate::delivery::Mailer;

/// Who an event is addressed to, before ids are resolved against the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    /// Every active employee holding the role.
    EmployeesWithRole(Role),
    Employee(DbId),
    /// The visitor account linked to a client record.
    ClientVisitor(DbId),
    /// The visitor account linked to a supplier record.
    SupplierVisitor(DbId),
}

/// Decide who should hear about `event`. Unknown events go nowhere.
pub fn recipients(event: &DomainEvent) -> Option<Recipients> {
    match event.event_type.as_str() {
        ORDER_CREATED => Some(Recipients::EmployeesWithRole(Role::Manager)),
        ORDER_STATUS_CHANGED => event.payload_id("client_id").map(Recipients::ClientVisitor),
        DELIVERY_REQUEST_SENT => event
            .payload_id("supplier_id")
            .map(Recipients::SupplierVisitor),
        DELIVERY_REQUEST_STATUS_CHANGED => event
            .actor
            .filter(|a| a.role == Role::Supplier)
            .map(|_| Recipients::EmployeesWithRole(Role::Manager)),
        DELIVERY_TASK_ASSIGNED => event.payload_id("driver_id").map(Recipients::Employee),
        WRITE_OFF_CREATED => Some(Recipients::EmployeesWithRole(Role::Director)),
        WRITE_OFF_DECIDED => event.payload_id("created_by").map(Recipients::Employee),
        _ => None,
    }
}

/// Title and body of the notification for `event`.
pub fn render(event: &DomainEvent) -> (String, String) {
    let id = event
        .entity_id
        .map(|id| format!("#{id}"))
        .unwrap_or_default();
    let status = event.payload_str("status").unwrap_or("unknown");

    match event.event_type.as_str() {
        ORDER_CREATED => (
            format!("New order {id}"),
            format!("Order {id} was placed and awaits confirmation."),
        ),
        ORDER_STATUS_CHANGED => (
            format!("Order {id}: {status}"),
            format!("Your order {id} is now '{status}'."),
        ),
        DELIVERY_REQUEST_SENT => (
            format!("Request for delivery {id}"),
            format!("A new request for delivery {id} is waiting for your answer."),
        ),
        DELIVERY_REQUEST_STATUS_CHANGED => (
            format!("Request {id}: {status}"),
            format!("The supplier moved request {id} to '{status}'."),
        ),
        DELIVERY_TASK_ASSIGNED => (
            format!("Delivery task {id}"),
            format!("You have been assigned delivery task {id}."),
        ),
        WRITE_OFF_CREATED => (
            format!("Write-off act {id}"),
            format!("Write-off act {id} awaits your decision."),
        ),
        WRITE_OFF_DECIDED => (
            format!("Write-off act {id}: {status}"),
            format!("Your write-off act {id} was {status}."),
        ),
        other => (other.to_string(), String::new()),
    }
}

/// Routes domain events to notification rows.
pub struct NotificationRouter {
    pool: DbPool,
    mailer: Option<Arc<dyn Mailer>>,
}

impl NotificationRouter {
    /// Create a router. Pass a mailer to also e-mail order status changes.
    pub fn new(pool: DbPool, mailer: Option<Arc<dyn Mailer>>) -> Self {
        Self { pool, mailer }
    }

    /// Run the routing loop until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Write the notifications for one event. Returns how many were written.
    pub async fn route_event(&self, event: &DomainEvent) -> Result<usize, sqlx::Error> {
        let Some(target) = recipients(event) else {
            return Ok(0);
        };

        let resolved = self.resolve(target).await?;
        if resolved.is_empty() {
            tracing::debug!(event_type = %event.event_type, ?target, "No recipients for event");
            return Ok(0);
        }

        let (title, body) = render(event);
        for (kind, recipient_id) in &resolved {
            NotificationRepo::create(
                &self.pool,
                &CreateNotification {
                    recipient_kind: kind.as_str().to_string(),
                    recipient_id: *recipient_id,
                    title: title.clone(),
                    body: body.clone(),
                    entity_type: event.entity_type.clone(),
                    entity_id: event.entity_id,
                },
            )
            .await?;
        }

        if event.event_type == ORDER_STATUS_CHANGED {
            self.email_visitors(&resolved, &title, &body).await?;
        }

        tracing::debug!(
            event_type = %event.event_type,
            count = resolved.len(),
            "Notifications written"
        );
        Ok(resolved.len())
    }

    async fn resolve(&self, target: Recipients) -> Result<Vec<(PrincipalKind, DbId)>, sqlx::Error> {
        let ids = match target {
            Recipients::EmployeesWithRole(role) => {
                let ids = EmployeeRepo::list_active_ids_by_role(&self.pool, role.as_str()).await?;
                return Ok(ids.into_iter().map(|id| (PrincipalKind::Employee, id)).collect());
            }
            Recipients::Employee(id) => return Ok(vec![(PrincipalKind::Employee, id)]),
            Recipients::ClientVisitor(client_id) => ClientRepo::find_by_id(&self.pool, client_id)
                .await?
                .and_then(|c| c.visitor_id),
            Recipients::SupplierVisitor(supplier_id) => {
                SupplierRepo::find_by_id(&self.pool, supplier_id)
                    .await?
                    .and_then(|s| s.visitor_id)
            }
        };
        Ok(ids.into_iter().map(|id| (PrincipalKind::Visitor, id)).collect())
    }

    /// E-mail visitor recipients. Failures are logged, never propagated.
    async fn email_visitors(
        &self,
        recipients: &[(PrincipalKind, DbId)],
        subject: &str,
        body: &str,
    ) -> Result<(), sqlx::Error> {
        let Some(mailer) = &self.mailer else {
            return Ok(());
        };

        for (kind, id) in recipients {
            if *kind != PrincipalKind::Visitor {
                continue;
            }
            let Some(visitor) = VisitorRepo::find_by_id(&self.pool, *id).await? else {
                continue;
            };
            if let Err(e) = mailer.send(&visitor.email, subject, body).await {
                tracing::warn!(error = %e, visitor_id = *id, "Failed to e-mail notification");
            }
        }
        Ok(())
    }
}
