//! Role and principal-kind definitions.
//!
//! Role names must match the seed data in
//! `20261001000001_create_roles_and_principals.sql`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_DIRECTOR: &str = "director";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_LOGISTICIAN: &str = "logistician";
pub const ROLE_STOREKEEPER: &str = "storekeeper";
pub const ROLE_DRIVER: &str = "driver";
pub const ROLE_CLIENT: &str = "client";
pub const ROLE_SUPPLIER: &str = "supplier";

/// The two kinds of authenticated principal. Each has its own login chain
/// and tokens issued for one are never accepted by the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Employee,
    Visitor,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Visitor => "visitor",
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "employee" => Ok(Self::Employee),
            "visitor" => Ok(Self::Visitor),
            other => Err(CoreError::Validation(format!(
                "Unknown principal kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Director,
    Manager,
    Logistician,
    Storekeeper,
    Driver,
    Client,
    Supplier,
}

/// Every role, employee roles first.
pub const ALL_ROLES: &[Role] = &[
    Role::Admin,
    Role::Director,
    Role::Manager,
    Role::Logistician,
    Role::Storekeeper,
    Role::Driver,
    Role::Client,
    Role::Supplier,
];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Director => ROLE_DIRECTOR,
            Self::Manager => ROLE_MANAGER,
            Self::Logistician => ROLE_LOGISTICIAN,
            Self::Storekeeper => ROLE_STOREKEEPER,
            Self::Driver => ROLE_DRIVER,
            Self::Client => ROLE_CLIENT,
            Self::Supplier => ROLE_SUPPLIER,
        }
    }

    /// Parse a role name as stored in the `roles` table or a token claim.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        ALL_ROLES
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown role '{s}'")))
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Self::Client | Self::Supplier => PrincipalKind::Visitor,
            _ => PrincipalKind::Employee,
        }
    }

    pub fn is_employee(&self) -> bool {
        self.kind() == PrincipalKind::Employee
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a role name and require it to be an employee role.
pub fn validate_employee_role(name: &str) -> Result<Role, CoreError> {
    let role = Role::from_str_db(name)?;
    if !role.is_employee() {
        return Err(CoreError::Validation(format!(
            "Role '{name}' cannot be assigned to an employee"
        )));
    }
    Ok(role)
}

/// Parse a role name and require it to be a visitor role.
pub fn validate_visitor_role(name: &str) -> Result<Role, CoreError> {
    let role = Role::from_str_db(name)?;
    if role.is_employee() {
        return Err(CoreError::Validation(format!(
            "Role '{name}' is not available for self-registration"
        )));
    }
    Ok(role)
}
