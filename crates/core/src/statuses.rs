//! Status enums for every stateful business document.
//!
//! Each status is stored as its snake_case name in a `TEXT` column guarded by
//! a CHECK constraint; [`as_str`](ClientOrderStatus::as_str) and
//! `from_str_db` convert between the two representations.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::workflow::Status;

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every value in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            /// Convert to a database-compatible string.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parse a status string from the database or a request body.
            pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} status '{other}'. Must be one of: {}",
                        $label,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }

        impl Status for $name {
            fn as_str(&self) -> &'static str {
                $name::as_str(self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

status_enum! {
    /// Lifecycle of an order placed by a client visitor.
    ClientOrderStatus, "order" {
        New => "new",
        Confirmed => "confirmed",
        Assembling => "assembling",
        Ready => "ready",
        Shipping => "shipping",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

status_enum! {
    /// Lifecycle of a request for delivery sent to a supplier.
    RequestStatus, "delivery request" {
        New => "new",
        Sent => "sent",
        Accepted => "accepted",
        Rejected => "rejected",
        Shipped => "shipped",
        Received => "received",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

status_enum! {
    /// Lifecycle of a delivery task executed by a driver.
    DeliveryTaskStatus, "delivery task" {
        Planned => "planned",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

status_enum! {
    /// Approval state of a write-off act.
    WriteOffActStatus, "write-off act" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

status_enum! {
    /// Condition of a piece of warehouse equipment.
    EquipmentStatus, "equipment" {
        Operational => "operational",
        Maintenance => "maintenance",
        Decommissioned => "decommissioned",
    }
}

impl ClientOrderStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl DeliveryTaskStatus {
    /// A task that still occupies its vehicle and driver.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Planned | Self::InProgress)
    }
}

impl RequestStatus {
    /// Statuses a supplier is allowed to see. Drafts stay internal.
    pub fn visible_to_supplier(&self) -> bool {
        !matches!(self, Self::New)
    }
}
