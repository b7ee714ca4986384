//! Authentication and authorization extractors.
//!
//! - [`auth::AuthEmployee`] / [`auth::AuthVisitor`] -- the two token chains.
//! - [`rbac`] -- role-set guards built on top of them.

pub mod auth;
pub mod rbac;
