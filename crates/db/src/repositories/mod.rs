//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods that
//! accept `&PgPool` as the first argument. Methods suffixed `_in` take an
//! open connection or transaction instead so callers can compose them.

pub mod client_repo;
pub mod employee_repo;
pub mod equipment_repo;
pub mod logistics_repo;
pub mod notification_repo;
pub mod order_repo;
pub mod product_repo;
pub mod role_repo;
pub mod session_repo;
pub mod storage_repo;
pub mod supplier_repo;
pub mod supply_repo;
pub mod visitor_repo;
pub mod write_off_repo;

pub use client_repo::ClientRepo;
pub use employee_repo::EmployeeRepo;
pub use equipment_repo::{EquipmentRepo, EquipmentTypeRepo};
pub use logistics_repo::{DeliveryTaskRepo, RoutePointRepo, TtnRepo, VehicleRepo};
pub use notification_repo::NotificationRepo;
pub use order_repo::{ClientOrderRepo, CommentRepo};
pub use product_repo::{ProductCategoryRepo, ProductRepo};
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use storage_repo::{ShelfRepo, StorageZoneRepo, WarehouseRepo, ZoneProductRepo};
pub use supplier_repo::SupplierRepo;
pub use supply_repo::{AcceptanceActRepo, DeliveryRequestRepo, SupplyRepo};
pub use visitor_repo::{VerificationRepo, VisitorRepo};
pub use write_off_repo::{ApprovalOutcome, WriteOffActRepo};
