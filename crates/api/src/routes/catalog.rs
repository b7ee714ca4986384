//! Route definitions for `/product-categories` and `/products`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Routes mounted at `/product-categories`.
pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/{id}",
            get(catalog::get_category)
                .put(catalog::update_category)
                .delete(catalog::delete_category),
        )
}

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /                          -> list_products (?category_id=&q=&active_only=)
/// POST   /                          -> create_product
/// GET    /{id}                      -> get_product
/// PUT    /{id}                      -> update_product
/// DELETE /{id}                      -> delete_product
/// GET    /{id}/attributes           -> list_attributes
/// PUT    /{id}/attributes           -> replace_attributes
/// POST   /{id}/image                -> upload_image (multipart)
/// ```
///
/// The image route lifts axum's default body limit; the handler enforces
/// `MAX_IMAGE_BYTES` while streaming.
pub fn products_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/{id}",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/{id}/attributes",
            get(catalog::list_attributes).put(catalog::replace_attributes),
        )
        .route(
            "/{id}/image",
            post(catalog::upload_image).layer(DefaultBodyLimit::disable()),
        )
}
