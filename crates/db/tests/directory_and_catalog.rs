//! Repository tests for counterparties, the catalog and the uniqueness
//! rules the database enforces.

use sqlx::PgPool;
use warehub_db::models::directory::{CreateClient, CreateSupplier, UpdateClient};
use warehub_db::models::logistics::CreateVehicle;
use warehub_db::models::product::{
    AttributeInput, CreateProduct, CreateProductCategory, ProductFilter, UpdateProduct,
};
use warehub_db::repositories::{
    ClientRepo, ProductCategoryRepo, ProductRepo, SupplierRepo, VehicleRepo,
};

fn new_client(name: &str, inn: &str) -> CreateClient {
    CreateClient {
        name: name.to_string(),
        inn: inn.to_string(),
        address: None,
        phone: None,
        email: None,
        visitor_id: None,
    }
}

fn new_product(article: &str, name: &str) -> CreateProduct {
    CreateProduct {
        article: article.to_string(),
        name: name.to_string(),
        description: None,
        category_id: None,
        unit: None,
        weight_kg: 1.5,
        volume_m3: 0.02,
        price_cents: 12_50,
    }
}

fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            db.constraint().map(str::to_string)
        }
        _ => None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_client_inn_is_rejected(pool: PgPool) {
    ClientRepo::create(&pool, &new_client("Alpha", "7707083893"))
        .await
        .unwrap();
    let err = ClientRepo::create(&pool, &new_client("Beta", "7707083893"))
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("uq_clients_inn"));
}

#[sqlx::test(migrations = "./migrations")]
async fn same_inn_may_be_client_and_supplier(pool: PgPool) {
    ClientRepo::create(&pool, &new_client("Alpha", "7707083893"))
        .await
        .unwrap();
    let supplier = SupplierRepo::create(
        &pool,
        &CreateSupplier {
            name: "Alpha Supply".to_string(),
            inn: "7707083893".to_string(),
            address: None,
            phone: None,
            email: None,
            contact_person: Some("Ivan".to_string()),
            visitor_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(supplier.contact_person.as_deref(), Some("Ivan"));
}

#[sqlx::test(migrations = "./migrations")]
async fn client_search_matches_name_or_inn_prefix(pool: PgPool) {
    ClientRepo::create(&pool, &new_client("Northwind", "7707083893"))
        .await
        .unwrap();
    ClientRepo::create(&pool, &new_client("Contoso", "500100732259"))
        .await
        .unwrap();

    let by_name = ClientRepo::list(&pool, Some("north")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Northwind");

    let by_inn = ClientRepo::list(&pool, Some("5001")).await.unwrap();
    assert_eq!(by_inn.len(), 1);
    assert_eq!(by_inn[0].name, "Contoso");

    assert_eq!(ClientRepo::list(&pool, None).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn client_update_keeps_unset_fields(pool: PgPool) {
    let client = ClientRepo::create(
        &pool,
        &CreateClient {
            address: Some("Main st. 1".to_string()),
            ..new_client("Alpha", "7707083893")
        },
    )
    .await
    .unwrap();

    let updated = ClientRepo::update(
        &pool,
        client.id,
        &UpdateClient {
            phone: Some("+7 900 000 00 00".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.address.as_deref(), Some("Main st. 1"));
    assert_eq!(updated.phone.as_deref(), Some("+7 900 000 00 00"));
    assert!(ClientRepo::update(&pool, 999_999, &UpdateClient::default())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_article_is_rejected(pool: PgPool) {
    ProductRepo::create(&pool, &new_product("ART-1", "Box"))
        .await
        .unwrap();
    let err = ProductRepo::create(&pool, &new_product("ART-1", "Other box"))
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("uq_products_article"));
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_registration_number_is_rejected(pool: PgPool) {
    let vehicle = CreateVehicle {
        registration_number: "A123BC77".to_string(),
        model: "GAZelle".to_string(),
        payload_kg: 1500.0,
        volume_m3: 9.0,
    };
    VehicleRepo::create(&pool, &vehicle).await.unwrap();
    let err = VehicleRepo::create(&pool, &vehicle).await.unwrap_err();
    assert_eq!(
        unique_violation(&err).as_deref(),
        Some("uq_vehicles_registration_number")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn product_defaults_filters_and_update(pool: PgPool) {
    let category = ProductCategoryRepo::create(
        &pool,
        &CreateProductCategory {
            name: "Packaging".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let boxed = ProductRepo::create(
        &pool,
        &CreateProduct {
            category_id: Some(category.id),
            ..new_product("BOX-1", "Carton box")
        },
    )
    .await
    .unwrap();
    assert_eq!(boxed.unit, "pcs");
    assert!(boxed.is_active);

    let tape = ProductRepo::create(&pool, &new_product("TAPE-1", "Tape"))
        .await
        .unwrap();
    ProductRepo::update(
        &pool,
        tape.id,
        &UpdateProduct {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let in_category = ProductRepo::list(
        &pool,
        &ProductFilter {
            category_id: Some(category.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(in_category.len(), 1);
    assert_eq!(in_category[0].id, boxed.id);

    let active = ProductRepo::list(
        &pool,
        &ProductFilter {
            active_only: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(active.len(), 1);

    let searched = ProductRepo::list(
        &pool,
        &ProductFilter {
            q: Some("tape".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].article, "TAPE-1");
}

#[sqlx::test(migrations = "./migrations")]
async fn attributes_are_replaced_as_a_set(pool: PgPool) {
    let product = ProductRepo::create(&pool, &new_product("BOX-1", "Box"))
        .await
        .unwrap();

    let attr = |name: &str, value: &str| AttributeInput {
        name: name.to_string(),
        value: value.to_string(),
    };

    ProductRepo::replace_attributes(&pool, product.id, &[attr("color", "brown"), attr("ply", "3")])
        .await
        .unwrap();
    let saved = ProductRepo::replace_attributes(&pool, product.id, &[attr("material", "kraft")])
        .await
        .unwrap();

    assert_eq!(saved.len(), 1);
    let listed = ProductRepo::list_attributes(&pool, product.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "material");

    // A duplicate name in one request rolls the whole replacement back.
    let err = ProductRepo::replace_attributes(&pool, product.id, &[attr("a", "1"), attr("a", "2")])
        .await
        .unwrap_err();
    assert!(unique_violation(&err).is_some());
    let listed = ProductRepo::list_attributes(&pool, product.id).await.unwrap();
    assert_eq!(listed[0].name, "material");
}

#[sqlx::test(migrations = "./migrations")]
async fn image_path_swap_returns_previous(pool: PgPool) {
    let product = ProductRepo::create(&pool, &new_product("BOX-1", "Box"))
        .await
        .unwrap();

    let first = ProductRepo::set_image_path(&pool, product.id, "products/a.png")
        .await
        .unwrap();
    assert_eq!(first, Some(None));

    let second = ProductRepo::set_image_path(&pool, product.id, "products/b.png")
        .await
        .unwrap();
    assert_eq!(second, Some(Some("products/a.png".to_string())));

    assert_eq!(
        ProductRepo::set_image_path(&pool, 999_999, "x.png").await.unwrap(),
        None
    );
}
