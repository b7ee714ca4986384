//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod directory;
pub mod employee;
pub mod equipment;
pub mod logistics;
pub mod notification;
pub mod order;
pub mod product;
pub mod role;
pub mod session;
pub mod storage;
pub mod supply;
pub mod visitor;
pub mod write_off;
