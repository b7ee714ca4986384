//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthEmployee`] or [`AuthVisitor`] and rejects with
//! 403 when the role is not in its static set. Use these in handler
//! signatures to enforce authorization at the type level; finer checks
//! (status transitions, ownership) happen in the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use warehub_core::error::CoreError;
use warehub_core::roles::Role;

use super::auth::{AuthEmployee, AuthVisitor};
use crate::error::AppError;
use crate::state::AppState;

macro_rules! employee_guard {
    ($(#[$meta:meta])* $name:ident, [$($role:ident),+], $message:literal) => {
        $(#[$meta])*
        pub struct $name(pub AuthEmployee);

        impl $name {
            pub const ROLES: &'static [Role] = &[$(Role::$role),+];
        }

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let employee = AuthEmployee::from_request_parts(parts, state).await?;
                if !Self::ROLES.contains(&employee.role) {
                    return Err(AppError::Core(CoreError::Forbidden($message.into())));
                }
                Ok($name(employee))
            }
        }
    };
}

macro_rules! visitor_guard {
    ($(#[$meta:meta])* $name:ident, $role:ident, $message:literal) => {
        $(#[$meta])*
        pub struct $name(pub AuthVisitor);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let visitor = AuthVisitor::from_request_parts(parts, state).await?;
                if visitor.role != Role::$role {
                    return Err(AppError::Core(CoreError::Forbidden($message.into())));
                }
                Ok($name(visitor))
            }
        }
    };
}

employee_guard!(
    /// Requires the `admin` role.
    ///
    /// ```ignore
    /// async fn admin_only(RequireAdmin(employee): RequireAdmin) -> AppResult<Json<()>> {
    ///     Ok(Json(()))
    /// }
    /// ```
    RequireAdmin,
    [Admin],
    "Admin role required"
);

employee_guard!(
    /// Write-off decisions.
    RequireDirector,
    [Director, Admin],
    "Director or Admin role required"
);

employee_guard!(
    /// Counterparties, catalog and supplier requests.
    RequireManager,
    [Manager, Admin],
    "Manager or Admin role required"
);

employee_guard!(
    /// Vehicles, delivery tasks and route points.
    RequireLogistician,
    [Logistician, Admin],
    "Logistician or Admin role required"
);

employee_guard!(
    /// Storage structure, stock placement, acceptance and write-off drafts.
    RequireStorekeeper,
    [Storekeeper, Admin],
    "Storekeeper or Admin role required"
);

employee_guard!(
    /// The driver's own task list.
    RequireDriver,
    [Driver],
    "Driver role required"
);

visitor_guard!(
    /// A visitor acting for a client.
    RequireClient,
    Client,
    "Client account required"
);

visitor_guard!(
    /// A visitor acting for a supplier.
    RequireSupplier,
    Supplier,
    "Supplier account required"
);
