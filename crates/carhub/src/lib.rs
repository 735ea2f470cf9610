//! Interaction layer of the CarHub marketplace: form guards, transient notifications,
//! and the two client-computed workflows (news classification and car valuation).

pub mod config;
pub mod error;
pub mod forms;
pub mod notifications;
pub mod telemetry;
pub mod workflows;

pub use notifications::{Notification, NotificationSurface, Severity};
