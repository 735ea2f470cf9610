use super::surface::NotificationSurface;

/// Scoped handle on the page's busy indicator. Dropping an owning guard hides it.
#[must_use = "the busy indicator is hidden as soon as the guard is dropped"]
pub struct BusyGuard {
    surface: Option<NotificationSurface>,
}

impl BusyGuard {
    pub(super) fn owning(surface: NotificationSurface) -> Self {
        Self {
            surface: Some(surface),
        }
    }

    pub(super) fn inert() -> Self {
        Self { surface: None }
    }

    /// `false` when another guard already held the indicator at acquisition time.
    pub fn is_owner(&self) -> bool {
        self.surface.is_some()
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.release_busy();
        }
    }
}

impl std::fmt::Debug for BusyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyGuard")
            .field("owner", &self.is_owner())
            .finish()
    }
}
