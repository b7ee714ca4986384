//! Warehub event bus and notification infrastructure.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] -- the event envelope published by request handlers.
//! - [`NotificationRouter`] -- background service turning events into
//!   notification rows (and e-mails where configured).
//! - [`delivery`] -- the [`Mailer`] seam with SMTP and log-only
//!   implementations.

pub mod bus;
pub mod delivery;
pub mod router;

pub use bus::{EventActor, DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailError, SmtpMailer};
pub use delivery::{LogMailer, Mailer};
pub use router::NotificationRouter;
