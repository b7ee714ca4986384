//! Client orders, delivery tasks and route points.

use chrono::NaiveDate;
use sqlx::PgPool;
use warehub_core::statuses::DeliveryTaskStatus;
use warehub_core::types::DbId;
use warehub_core::validation::order_total;
use warehub_db::models::directory::CreateClient;
use warehub_db::models::employee::CreateEmployee;
use warehub_db::models::logistics::{CreateDeliveryTask, CreateVehicle, TaskFilter};
use warehub_db::models::order::{CreateClientOrder, CreateComment, NewOrderLine, OrderFilter};
use warehub_db::models::product::CreateProduct;
use warehub_db::repositories::{
    ClientOrderRepo, ClientRepo, CommentRepo, DeliveryTaskRepo, EmployeeRepo, ProductRepo,
    RoutePointRepo, TtnRepo, VehicleRepo,
};

async fn product(pool: &PgPool, article: &str, weight_kg: f64, price_cents: i64) -> DbId {
    ProductRepo::create(
        pool,
        &CreateProduct {
            article: article.to_string(),
            name: article.to_lowercase(),
            description: None,
            category_id: None,
            unit: None,
            weight_kg,
            volume_m3: 0.01,
            price_cents,
        },
    )
    .await
    .unwrap()
    .id
}

async fn client(pool: &PgPool) -> DbId {
    ClientRepo::create(
        pool,
        &CreateClient {
            name: "Alpha".to_string(),
            inn: "7707083893".to_string(),
            address: Some("Main st. 1".to_string()),
            phone: None,
            email: None,
            visitor_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn logistician(pool: &PgPool) -> DbId {
    EmployeeRepo::create(
        pool,
        &CreateEmployee {
            login: "logist".to_string(),
            email: "logist@warehub.test".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            full_name: "Logist".to_string(),
            phone: None,
            role_id: 4,
        },
    )
    .await
    .unwrap()
    .id
}

async fn order(pool: &PgPool, client_id: DbId, lines: Vec<NewOrderLine>) -> DbId {
    ClientOrderRepo::create(
        pool,
        &CreateClientOrder {
            client_id,
            delivery_address: "Main st. 1".to_string(),
            note: None,
            total_cents: order_total(lines.iter().map(|l| (l.quantity, l.unit_price_cents)))
                .unwrap(),
            lines,
        },
    )
    .await
    .unwrap()
    .id
}

fn line(product_id: DbId, quantity: i32, unit_price_cents: i64) -> NewOrderLine {
    NewOrderLine {
        product_id,
        quantity,
        unit_price_cents,
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn order_total_is_sum_of_lines(pool: PgPool) {
    let client_id = client(&pool).await;
    let a = product(&pool, "A-100", 2.0, 1_000).await;
    let b = product(&pool, "B-200", 0.5, 250).await;

    let id = order(&pool, client_id, vec![line(a, 3, 1_000), line(b, 4, 250)]).await;
    let saved = ClientOrderRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(saved.total_cents, 4_000);
    assert_eq!(saved.status, "new");

    let lines = ClientOrderRepo::lines(&pool, id).await.unwrap();
    let sum: i64 = lines
        .iter()
        .map(|l| i64::from(l.quantity) * l.unit_price_cents)
        .sum();
    assert_eq!(sum, saved.total_cents);
    assert_eq!(ClientOrderRepo::weight_kg(&pool, id).await.unwrap(), 8.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn order_with_duplicate_product_lines_is_rolled_back(pool: PgPool) {
    let client_id = client(&pool).await;
    let a = product(&pool, "A-100", 1.0, 100).await;

    let err = ClientOrderRepo::create(
        &pool,
        &CreateClientOrder {
            client_id,
            delivery_address: "x".to_string(),
            note: None,
            total_cents: 300,
            lines: vec![line(a, 1, 100), line(a, 2, 100)],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, sqlx::Error::Database(_)));

    let all = ClientOrderRepo::list(&pool, &OrderFilter::default()).await.unwrap();
    assert!(all.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn orders_filter_by_status_and_client(pool: PgPool) {
    let client_id = client(&pool).await;
    let a = product(&pool, "A-100", 1.0, 100).await;
    let first = order(&pool, client_id, vec![line(a, 1, 100)]).await;
    order(&pool, client_id, vec![line(a, 2, 100)]).await;

    let mut conn = pool.acquire().await.unwrap();
    ClientOrderRepo::set_status_in(&mut conn, first, "confirmed")
        .await
        .unwrap();
    drop(conn);

    let confirmed = ClientOrderRepo::list(
        &pool,
        &OrderFilter {
            status: Some("confirmed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, first);

    let mine = ClientOrderRepo::list(
        &pool,
        &OrderFilter {
            client_id: Some(client_id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(mine.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn comments_are_listed_oldest_first(pool: PgPool) {
    let client_id = client(&pool).await;
    let a = product(&pool, "A-100", 1.0, 100).await;
    let id = order(&pool, client_id, vec![line(a, 1, 100)]).await;

    for body in ["first", "second"] {
        CommentRepo::create(
            &pool,
            &CreateComment {
                order_id: id,
                author_kind: "employee".to_string(),
                author_id: 1,
                author_name: "Manager".to_string(),
                body: body.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let comments = CommentRepo::list_by_order(&pool, id).await.unwrap();
    let bodies: Vec<&str> = comments.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, ["first", "second"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn route_points_append_reorder_and_close_gaps(pool: PgPool) {
    let creator = logistician(&pool).await;
    let task = DeliveryTaskRepo::create(
        &pool,
        &CreateDeliveryTask {
            planned_date: date(),
            vehicle_id: None,
            driver_id: None,
            note: None,
            created_by: creator,
        },
    )
    .await
    .unwrap();

    let mut ids = Vec::new();
    for address in ["first", "second", "third"] {
        let point = RoutePointRepo::append(&pool, task.id, address, None, None)
            .await
            .unwrap();
        ids.push(point.id);
    }
    let points = RoutePointRepo::list_by_task(&pool, task.id).await.unwrap();
    let sequences: Vec<i32> = points.iter().map(|p| p.sequence).collect();
    assert_eq!(sequences, [1, 2, 3]);

    let reordered = RoutePointRepo::reorder(&pool, task.id, &[ids[2], ids[0], ids[1]])
        .await
        .unwrap();
    let addresses: Vec<&str> = reordered.iter().map(|p| p.address.as_str()).collect();
    assert_eq!(addresses, ["third", "first", "second"]);

    assert!(RoutePointRepo::delete(&pool, ids[0]).await.unwrap());
    let points = RoutePointRepo::list_by_task(&pool, task.id).await.unwrap();
    let summary: Vec<(i32, &str)> = points
        .iter()
        .map(|p| (p.sequence, p.address.as_str()))
        .collect();
    assert_eq!(summary, [(1, "third"), (2, "second")]);
    assert!(!RoutePointRepo::delete(&pool, ids[0]).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn vehicle_booking_and_route_load(pool: PgPool) {
    let creator = logistician(&pool).await;
    let vehicle = VehicleRepo::create(
        &pool,
        &CreateVehicle {
            registration_number: "A123BC77".to_string(),
            model: "GAZelle".to_string(),
            payload_kg: 1500.0,
            volume_m3: 9.0,
        },
    )
    .await
    .unwrap();

    let task = DeliveryTaskRepo::create(
        &pool,
        &CreateDeliveryTask {
            planned_date: date(),
            vehicle_id: Some(vehicle.id),
            driver_id: None,
            note: None,
            created_by: creator,
        },
    )
    .await
    .unwrap();

    assert!(DeliveryTaskRepo::vehicle_booked(&pool, vehicle.id, date(), None)
        .await
        .unwrap());
    assert!(!DeliveryTaskRepo::vehicle_booked(&pool, vehicle.id, date(), Some(task.id))
        .await
        .unwrap());
    let next_day = date().succ_opt().unwrap();
    assert!(!DeliveryTaskRepo::vehicle_booked(&pool, vehicle.id, next_day, None)
        .await
        .unwrap());

    let client_id = client(&pool).await;
    let heavy = product(&pool, "HEAVY-1", 25.0, 100).await;
    let order_id = order(&pool, client_id, vec![line(heavy, 4, 100)]).await;
    RoutePointRepo::append(&pool, task.id, "Main st. 1", Some(order_id), None)
        .await
        .unwrap();

    assert_eq!(DeliveryTaskRepo::load_kg(&pool, task.id).await.unwrap(), 100.0);
    assert!(RoutePointRepo::order_in_open_task(&pool, order_id).await.unwrap());

    // Cancelling the task frees both the vehicle and the order.
    let mut conn = pool.acquire().await.unwrap();
    DeliveryTaskRepo::set_status_in(&mut conn, task.id, DeliveryTaskStatus::Cancelled)
        .await
        .unwrap();
    drop(conn);
    assert!(!DeliveryTaskRepo::vehicle_booked(&pool, vehicle.id, date(), None)
        .await
        .unwrap());
    assert!(!RoutePointRepo::order_in_open_task(&pool, order_id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn status_changes_stamp_timestamps_and_ttn_is_unique(pool: PgPool) {
    let creator = logistician(&pool).await;
    let task = DeliveryTaskRepo::create(
        &pool,
        &CreateDeliveryTask {
            planned_date: date(),
            vehicle_id: None,
            driver_id: None,
            note: None,
            created_by: creator,
        },
    )
    .await
    .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let started = DeliveryTaskRepo::set_status_in(&mut conn, task.id, DeliveryTaskStatus::InProgress)
        .await
        .unwrap()
        .unwrap();
    assert!(started.started_at.is_some());
    assert!(started.completed_at.is_none());

    let done = DeliveryTaskRepo::set_status_in(&mut conn, task.id, DeliveryTaskStatus::Completed)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.started_at, started.started_at);
    assert!(done.completed_at.is_some());
    drop(conn);

    let filtered = DeliveryTaskRepo::list(
        &pool,
        &TaskFilter {
            status: Some("completed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 1);

    TtnRepo::create(&pool, task.id, "TTN-20261020-000001", creator)
        .await
        .unwrap();
    assert!(TtnRepo::create(&pool, task.id, "TTN-20261020-000002", creator)
        .await
        .is_err());
    let ttn = TtnRepo::find_by_task(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(ttn.number, "TTN-20261020-000001");
}
