pub mod admin;
pub mod catalog;
pub mod delivery;
pub mod directory;
pub mod employee_auth;
pub mod equipment;
pub mod notification;
pub mod orders;
pub mod session;
pub mod storage;
pub mod supply;
pub mod visitor_auth;
pub mod write_off;

use serde::Deserialize;

/// Request body shared by every `POST .../status` endpoint.
///
/// The status is kept as a string and parsed by the handler so an unknown
/// value yields the usual `VALIDATION_ERROR` body.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}
