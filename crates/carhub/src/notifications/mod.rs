//! Transient feedback shared by every workflow: stacked toasts and a single busy indicator.

mod busy;
mod surface;

pub use busy::BusyGuard;
pub use surface::{NotificationSurface, SurfaceObserver, HISTORY_LIMIT};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Danger,
    Warning,
    Info,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Danger => "danger",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NotificationId(pub u64);

/// A message as it was shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub issued_at: DateTime<Utc>,
}
