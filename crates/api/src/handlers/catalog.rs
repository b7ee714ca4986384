//! Handlers for the catalog: `/product-categories`, `/products` (with
//! attributes and image upload) and the visitor-facing `/visitor/catalog`.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use warehub_core::error::CoreError;
use warehub_core::types::DbId;
use warehub_core::validation::{normalize_article, validate_name, validate_non_negative};
use warehub_db::models::product::{
    AttributeInput, CreateProduct, CreateProductCategory, Product, ProductAttribute,
    ProductCategory, ProductFilter, UpdateProduct, UpdateProductCategory,
};
use warehub_db::repositories::{ProductCategoryRepo, ProductRepo};

use crate::error::{AppError, AppResult};
use crate::media::{detect_image, remove_media_file, store_product_image};
use crate::middleware::auth::{AuthEmployee, AuthVisitor};
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/product-categories
pub async fn list_categories(
    State(state): State<AppState>,
    _employee: AuthEmployee,
) -> AppResult<Json<DataResponse<Vec<ProductCategory>>>> {
    let categories = ProductCategoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/product-categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Json(input): Json<CreateProductCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<ProductCategory>>)> {
    validate_name("Category name", &input.name)?;
    let category = ProductCategoryRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/v1/product-categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProductCategory>>> {
    let category = ProductCategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("ProductCategory", id))?;
    Ok(Json(DataResponse { data: category }))
}

/// PUT /api/v1/product-categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProductCategory>,
) -> AppResult<Json<DataResponse<ProductCategory>>> {
    if let Some(name) = &input.name {
        validate_name("Category name", name)?;
    }
    let category = ProductCategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("ProductCategory", id))?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/product-categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProductCategoryRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("ProductCategory", id))
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

fn validate_measurements(
    weight_kg: Option<f64>,
    volume_m3: Option<f64>,
    price_cents: Option<i64>,
) -> Result<(), CoreError> {
    if let Some(w) = weight_kg {
        validate_non_negative("Weight", w)?;
    }
    if let Some(v) = volume_m3 {
        validate_non_negative("Volume", v)?;
    }
    if price_cents.is_some_and(|p| p < 0) {
        return Err(CoreError::Validation(
            "Price must be a non-negative number".into(),
        ));
    }
    Ok(())
}

/// GET /api/v1/products?category_id=&q=&active_only=
pub async fn list_products(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    let products = ProductRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: products }))
}

/// POST /api/v1/products
pub async fn create_product(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Json(mut input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    input.article = normalize_article(&input.article)?;
    validate_name("Product name", &input.name)?;
    validate_measurements(
        Some(input.weight_kg),
        Some(input.volume_m3),
        Some(input.price_cents),
    )?;

    let product = ProductRepo::create(&state.pool, &input).await?;
    tracing::info!(product_id = product.id, article = %product.article, "Product created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// GET /api/v1/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;
    Ok(Json(DataResponse { data: product }))
}

/// PUT /api/v1/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateProduct>,
) -> AppResult<Json<DataResponse<Product>>> {
    input.article = input.article.as_deref().map(normalize_article).transpose()?;
    if let Some(name) = &input.name {
        validate_name("Product name", name)?;
    }
    validate_measurements(input.weight_kg, input.volume_m3, input.price_cents)?;

    let product = ProductRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/v1/products/{id}
///
/// Products referenced by stock, orders or requests are protected by foreign
/// keys (409); deactivate them instead.
pub async fn delete_product(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;
    ProductRepo::delete(&state.pool, id).await?;
    if let Some(path) = product.image_path {
        remove_media_file(&state.config.media_dir, &path).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/products/{id}/attributes
pub async fn list_attributes(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProductAttribute>>>> {
    ensure_product_exists(&state, id).await?;
    let attributes = ProductRepo::list_attributes(&state.pool, id).await?;
    Ok(Json(DataResponse { data: attributes }))
}

/// PUT /api/v1/products/{id}/attributes
///
/// Replaces the whole attribute set.
pub async fn replace_attributes(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<Vec<AttributeInput>>,
) -> AppResult<Json<DataResponse<Vec<ProductAttribute>>>> {
    ensure_product_exists(&state, id).await?;
    for attr in &input {
        validate_name("Attribute name", &attr.name)?;
    }
    let attributes = ProductRepo::replace_attributes(&state.pool, id, &input).await?;
    Ok(Json(DataResponse { data: attributes }))
}

/// POST /api/v1/products/{id}/image
///
/// Multipart upload with an `image` field. The body is read chunk by chunk
/// and refused as soon as it exceeds `MAX_IMAGE_BYTES`.
pub async fn upload_image(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Product>>> {
    ensure_product_exists(&state, id).await?;

    let limit = state.config.max_image_bytes;
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let mut buf = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
        {
            if buf.len() + chunk.len() > limit {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Image exceeds the maximum size of {limit} bytes"
                ))));
            }
            buf.extend_from_slice(&chunk);
        }
        bytes = Some(buf);
        break;
    }

    let bytes = bytes.ok_or_else(|| {
        AppError::BadRequest(format!("Multipart field '{IMAGE_FIELD}' is required"))
    })?;
    let kind = detect_image(&bytes)?;

    let relative = store_product_image(&state.config.media_dir, id, kind, &bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store image: {e}")))?;

    let Some(previous) = ProductRepo::set_image_path(&state.pool, id, &relative).await? else {
        remove_media_file(&state.config.media_dir, &relative).await;
        return Err(AppError::not_found("Product", id));
    };
    if let Some(previous) = previous {
        remove_media_file(&state.config.media_dir, &previous).await;
    }

    tracing::info!(product_id = id, path = %relative, size = bytes.len(), "Product image stored");

    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;
    Ok(Json(DataResponse { data: product }))
}

async fn ensure_product_exists(state: &AppState, id: DbId) -> AppResult<()> {
    ProductRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Product", id))
}

// ---------------------------------------------------------------------------
// Visitor catalog
// ---------------------------------------------------------------------------

/// Product card shown to visitors: the product and its attributes.
#[derive(Debug, Serialize)]
pub struct CatalogItem {
    #[serde(flatten)]
    pub product: Product,
    pub attributes: Vec<ProductAttribute>,
}

/// GET /api/v1/visitor/catalog?category_id=&q=
///
/// Active products only, whatever the query says.
pub async fn visitor_catalog(
    State(state): State<AppState>,
    _visitor: AuthVisitor,
    Query(mut filter): Query<ProductFilter>,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    filter.active_only = true;
    let products = ProductRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/visitor/catalog/{id}
pub async fn visitor_catalog_item(
    State(state): State<AppState>,
    _visitor: AuthVisitor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CatalogItem>>> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::not_found("Product", id))?;
    let attributes = ProductRepo::list_attributes(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: CatalogItem {
            product,
            attributes,
        },
    }))
}
