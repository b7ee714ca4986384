//! Warehub domain rules.
//!
//! Everything in this crate is pure: no database, no HTTP, no clock reads
//! outside of explicit `now` parameters (except [`otp::generate_code`], which
//! draws from the thread RNG). Both the repository and API layers depend on it.

pub mod error;
pub mod hashing;
pub mod occupancy;
pub mod otp;
pub mod roles;
pub mod routing;
pub mod statuses;
pub mod types;
pub mod validation;
pub mod workflow;
