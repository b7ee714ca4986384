//! Notification routing against a real database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use warehub_core::roles::{PrincipalKind, Role};
use warehub_db::models::directory::CreateClient;
use warehub_db::models::employee::CreateEmployee;
use warehub_db::models::visitor::CreateVerification;
use warehub_db::repositories::{
    ClientRepo, EmployeeRepo, NotificationRepo, VerificationRepo, VisitorRepo,
};
use warehub_events::bus::{EventActor, ORDER_CREATED, ORDER_STATUS_CHANGED};
use warehub_events::{DomainEvent, EmailError, Mailer, NotificationRouter};

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

async fn employee(pool: &PgPool, login: &str, role_id: i64, active: bool) -> i64 {
    let e = EmployeeRepo::create(
        pool,
        &CreateEmployee {
            login: login.to_string(),
            email: format!("{login}@warehub.test"),
            password_hash: "x".to_string(),
            full_name: login.to_string(),
            phone: None,
            role_id,
        },
    )
    .await
    .unwrap();
    if !active {
        EmployeeRepo::deactivate(pool, e.id).await.unwrap();
    }
    e.id
}

#[sqlx::test(migrations = "../db/migrations")]
async fn new_order_reaches_every_active_manager(pool: PgPool) {
    let m1 = employee(&pool, "m1", 3, true).await;
    let m2 = employee(&pool, "m2", 3, true).await;
    let gone = employee(&pool, "m3", 3, false).await;
    employee(&pool, "keeper", 5, true).await;

    let router = NotificationRouter::new(pool.clone(), None);
    let event = DomainEvent::new(ORDER_CREATED).with_entity("client_order", 1);
    assert_eq!(router.route_event(&event).await.unwrap(), 2);

    for id in [m1, m2] {
        assert_eq!(NotificationRepo::unread_count(&pool, "employee", id).await.unwrap(), 1);
    }
    assert_eq!(NotificationRepo::unread_count(&pool, "employee", gone).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn status_change_notifies_and_mails_the_client_visitor(pool: PgPool) {
    let pending = VerificationRepo::upsert(
        &pool,
        &CreateVerification {
            email: "buyer@x.io".to_string(),
            code_hash: "h".to_string(),
            password_hash: "p".to_string(),
            full_name: "Buyer".to_string(),
            phone: None,
            role_id: 7,
            expires_at: chrono::Utc::now() + chrono::Duration::minutes(5),
        },
    )
    .await
    .unwrap();
    let visitor = VisitorRepo::create_from_verification(&pool, pending.id)
        .await
        .unwrap();
    let client = ClientRepo::create(
        &pool,
        &CreateClient {
            name: "Alpha".to_string(),
            inn: "7707083893".to_string(),
            address: None,
            phone: None,
            email: None,
            visitor_id: Some(visitor.id),
        },
    )
    .await
    .unwrap();

    let mailer = Arc::new(RecordingMailer::default());
    let router = NotificationRouter::new(pool.clone(), Some(mailer.clone() as Arc<dyn Mailer>));
    let event = DomainEvent::new(ORDER_STATUS_CHANGED)
        .with_entity("client_order", 77)
        .with_actor(EventActor {
            kind: PrincipalKind::Employee,
            id: 1,
            role: Role::Manager,
        })
        .with_payload(json!({"client_id": client.id, "status": "confirmed"}));

    assert_eq!(router.route_event(&event).await.unwrap(), 1);

    let rows = NotificationRepo::list_for(&pool, "visitor", visitor.id, false, None, None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entity_id, Some(77));

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "buyer@x.io");
    assert_eq!(sent[0].1, "Order #77: confirmed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn client_without_visitor_gets_nothing(pool: PgPool) {
    let client = ClientRepo::create(
        &pool,
        &CreateClient {
            name: "Offline".to_string(),
            inn: "7707083893".to_string(),
            address: None,
            phone: None,
            email: None,
            visitor_id: None,
        },
    )
    .await
    .unwrap();

    let router = NotificationRouter::new(pool.clone(), None);
    let event = DomainEvent::new(ORDER_STATUS_CHANGED)
        .with_payload(json!({"client_id": client.id, "status": "ready"}));
    assert_eq!(router.route_event(&event).await.unwrap(), 0);
}
