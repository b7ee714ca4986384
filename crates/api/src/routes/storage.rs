//! Route definitions for the storage hierarchy, stock and occupancy.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{equipment, storage};
use crate::state::AppState;

/// Storage routes, merged at the API root because they span several
/// resource prefixes.
///
/// ```text
/// GET    /warehouses                          -> list_warehouses
/// POST   /warehouses                          -> create_warehouse
/// GET    /warehouses/{id}                     -> get_warehouse
/// PUT    /warehouses/{id}                     -> update_warehouse
/// DELETE /warehouses/{id}                     -> delete_warehouse
/// GET    /warehouses/{id}/shelves             -> list_shelves
/// POST   /warehouses/{id}/shelves             -> create_shelf
/// GET    /warehouses/{id}/occupancy           -> warehouse_occupancy
/// GET    /warehouses/{id}/equipment           -> list_equipment
/// POST   /warehouses/{id}/equipment           -> create_equipment
///
/// GET    /shelves/{id}                        -> get_shelf
/// PUT    /shelves/{id}                        -> update_shelf
/// DELETE /shelves/{id}                        -> delete_shelf
/// GET    /shelves/{id}/zones                  -> list_zones
/// POST   /shelves/{id}/zones                  -> create_zone
///
/// GET    /storage-zones/{id}                  -> get_zone
/// PUT    /storage-zones/{id}                  -> update_zone
/// DELETE /storage-zones/{id}                  -> delete_zone
/// GET    /storage-zones/{id}/products         -> list_zone_products
/// POST   /storage-zones/{id}/products         -> place_product
/// GET    /storage-zones/{id}/occupancy        -> zone_occupancy_report
///
/// PUT    /zone-products/{id}                  -> update_zone_product
/// DELETE /zone-products/{id}                  -> delete_zone_product
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Warehouses
        .route(
            "/warehouses",
            get(storage::list_warehouses).post(storage::create_warehouse),
        )
        .route(
            "/warehouses/{id}",
            get(storage::get_warehouse)
                .put(storage::update_warehouse)
                .delete(storage::delete_warehouse),
        )
        .route(
            "/warehouses/{id}/shelves",
            get(storage::list_shelves).post(storage::create_shelf),
        )
        .route(
            "/warehouses/{id}/occupancy",
            get(storage::warehouse_occupancy),
        )
        .route(
            "/warehouses/{id}/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        // Shelves
        .route(
            "/shelves/{id}",
            get(storage::get_shelf)
                .put(storage::update_shelf)
                .delete(storage::delete_shelf),
        )
        .route(
            "/shelves/{id}/zones",
            get(storage::list_zones).post(storage::create_zone),
        )
        // Zones
        .route(
            "/storage-zones/{id}",
            get(storage::get_zone)
                .put(storage::update_zone)
                .delete(storage::delete_zone),
        )
        .route(
            "/storage-zones/{id}/products",
            get(storage::list_zone_products).post(storage::place_product),
        )
        .route(
            "/storage-zones/{id}/occupancy",
            get(storage::zone_occupancy_report),
        )
        // Stock lines
        .route(
            "/zone-products/{id}",
            put(storage::update_zone_product).delete(storage::delete_zone_product),
        )
}
