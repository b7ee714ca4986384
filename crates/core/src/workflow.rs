//! Role-gated status transition tables.
//!
//! Each business document has a static table of `(from, to, roles)` rules.
//! [`check_transition`] is the single place where a requested status change
//! is accepted or refused; handlers never compare statuses by hand.

use crate::error::CoreError;
use crate::roles::Role;
use crate::statuses::{ClientOrderStatus, DeliveryTaskStatus, RequestStatus, WriteOffActStatus};

/// A status enum that can appear in a transition table.
pub trait Status: Copy + Eq + std::fmt::Debug + 'static {
    fn as_str(&self) -> &'static str;
}

/// One permitted edge of a workflow.
#[derive(Debug, Clone, Copy)]
pub struct Rule<S: 'static> {
    pub from: S,
    pub to: S,
    pub roles: &'static [Role],
}

const fn rule<S>(from: S, to: S, roles: &'static [Role]) -> Rule<S> {
    Rule { from, to, roles }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

use ClientOrderStatus as O;
use DeliveryTaskStatus as T;
use RequestStatus as R;
use Role::{Admin, Client, Director, Driver, Logistician, Manager, Storekeeper, Supplier};
use WriteOffActStatus as W;

pub const ORDER_TRANSITIONS: &[Rule<ClientOrderStatus>] = &[
    rule(O::New, O::Confirmed, &[Manager, Admin]),
    rule(O::New, O::Cancelled, &[Manager, Admin, Client]),
    rule(O::Confirmed, O::Assembling, &[Storekeeper, Manager, Admin]),
    rule(O::Confirmed, O::Cancelled, &[Manager, Admin]),
    rule(O::Assembling, O::Ready, &[Storekeeper, Admin]),
    rule(O::Ready, O::Shipping, &[Logistician, Admin]),
    rule(O::Shipping, O::Delivered, &[Driver, Logistician, Admin]),
];

pub const REQUEST_TRANSITIONS: &[Rule<RequestStatus>] = &[
    rule(R::New, R::Sent, &[Manager, Admin]),
    rule(R::New, R::Cancelled, &[Manager, Admin]),
    rule(R::Sent, R::Accepted, &[Supplier]),
    rule(R::Sent, R::Rejected, &[Supplier]),
    rule(R::Sent, R::Cancelled, &[Manager, Admin]),
    rule(R::Accepted, R::Shipped, &[Supplier]),
    rule(R::Accepted, R::Cancelled, &[Manager, Admin]),
    rule(R::Shipped, R::Received, &[Storekeeper, Admin]),
    rule(R::Received, R::Completed, &[Storekeeper, Manager, Admin]),
];

pub const TASK_TRANSITIONS: &[Rule<DeliveryTaskStatus>] = &[
    rule(T::Planned, T::InProgress, &[Driver, Logistician, Admin]),
    rule(T::Planned, T::Cancelled, &[Logistician, Admin]),
    rule(T::InProgress, T::Completed, &[Driver, Logistician, Admin]),
];

pub const WRITE_OFF_TRANSITIONS: &[Rule<WriteOffActStatus>] = &[
    rule(W::Pending, W::Approved, &[Director, Admin]),
    rule(W::Pending, W::Rejected, &[Director, Admin]),
];

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Validate that `role` may move a document of kind `entity` from `from` to `to`.
///
/// - same status: `Validation`
/// - no edge between the two statuses: `Validation`, listing reachable targets
/// - edge exists but the role is not on it: `Forbidden`
pub fn check_transition<S: Status>(
    table: &[Rule<S>],
    entity: &str,
    from: S,
    to: S,
    role: Role,
) -> Result<(), CoreError> {
    if from == to {
        return Err(CoreError::Validation(format!(
            "{entity} is already in status '{}'",
            from.as_str()
        )));
    }

    let Some(edge) = table.iter().find(|r| r.from == from && r.to == to) else {
        let reachable: Vec<&str> = table
            .iter()
            .filter(|r| r.from == from)
            .map(|r| r.to.as_str())
            .collect();
        return Err(CoreError::Validation(format!(
            "Cannot move {entity} from '{}' to '{}'. Allowed targets: [{}]",
            from.as_str(),
            to.as_str(),
            reachable.join(", ")
        )));
    };

    if !edge.roles.contains(&role) {
        return Err(CoreError::Forbidden(format!(
            "Role '{role}' may not move {entity} from '{}' to '{}'",
            from.as_str(),
            to.as_str()
        )));
    }
    Ok(())
}

/// Targets reachable from `from` for the given role, in table order.
pub fn allowed_targets<S: Status>(table: &[Rule<S>], from: S, role: Role) -> Vec<S> {
    table
        .iter()
        .filter(|r| r.from == from && r.roles.contains(&role))
        .map(|r| r.to)
        .collect()
}
