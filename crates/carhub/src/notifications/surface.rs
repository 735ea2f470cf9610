use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info};

use super::busy::BusyGuard;
use super::{Notification, NotificationId, Severity};

/// Oldest entries are dropped from the history beyond this many notifications.
pub const HISTORY_LIMIT: usize = 256;

/// Hook for the presentation layer; the surface itself only tracks what is shown.
pub trait SurfaceObserver: Send + Sync {
    fn notification_shown(&self, notification: &Notification);

    fn busy_changed(&self, _busy: bool) {}
}

struct ActiveNotification {
    notification: Notification,
    expires_at: Instant,
}

#[derive(Default)]
struct SurfaceState {
    next_id: u64,
    active: Vec<ActiveNotification>,
    history: VecDeque<Notification>,
    busy: bool,
}

impl SurfaceState {
    fn prune_expired(&mut self, now: Instant) {
        self.active.retain(|entry| entry.expires_at > now);
    }
}

/// Page-wide notification and busy-indicator service.
///
/// Clones share the same underlying surface, so one instance is created per page
/// and handed to each workflow at construction time.
#[derive(Clone)]
pub struct NotificationSurface {
    state: Arc<Mutex<SurfaceState>>,
    ttl: Duration,
    observer: Option<Arc<dyn SurfaceObserver>>,
}

impl std::fmt::Debug for NotificationSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSurface")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl NotificationSurface {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState::default())),
            ttl,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SurfaceObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stack a new message on top of whatever is already visible.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let notification = {
            let mut state = self.lock();
            let now = Instant::now();
            state.prune_expired(now);
            state.next_id += 1;
            let notification = Notification {
                id: NotificationId(state.next_id),
                message: message.into(),
                severity,
                issued_at: Utc::now(),
            };
            state.active.push(ActiveNotification {
                notification: notification.clone(),
                expires_at: now + self.ttl,
            });
            if state.history.len() == HISTORY_LIMIT {
                state.history.pop_front();
            }
            state.history.push_back(notification.clone());
            notification
        };

        info!(
            id = notification.id.0,
            severity = notification.severity.label(),
            message = %notification.message,
            "notification shown"
        );
        if let Some(observer) = &self.observer {
            observer.notification_shown(&notification);
        }
        notification.id
    }

    /// Remove a notification before its timeout. Returns `false` when it already expired
    /// or was dismissed.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut state = self.lock();
        state.prune_expired(Instant::now());
        let before = state.active.len();
        state.active.retain(|entry| entry.notification.id != id);
        let removed = state.active.len() != before;
        if removed {
            debug!(id = id.0, "notification dismissed");
        }
        removed
    }

    /// Notifications still on screen, oldest first.
    pub fn visible(&self) -> Vec<Notification> {
        let mut state = self.lock();
        state.prune_expired(Instant::now());
        state
            .active
            .iter()
            .map(|entry| entry.notification.clone())
            .collect()
    }

    /// The most recent notifications shown, expired ones included, oldest first.
    pub fn history(&self) -> Vec<Notification> {
        self.lock().history.iter().cloned().collect()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Show the busy indicator until the returned guard is dropped.
    ///
    /// While an indicator is already active the guard is inert, so nested
    /// acquisitions neither show a second indicator nor hide the first one early.
    pub fn acquire_busy(&self) -> BusyGuard {
        let acquired = {
            let mut state = self.lock();
            if state.busy {
                false
            } else {
                state.busy = true;
                true
            }
        };

        if acquired {
            debug!("busy indicator shown");
            if let Some(observer) = &self.observer {
                observer.busy_changed(true);
            }
            BusyGuard::owning(self.clone())
        } else {
            BusyGuard::inert()
        }
    }

    pub(super) fn release_busy(&self) {
        self.lock().busy = false;
        debug!("busy indicator hidden");
        if let Some(observer) = &self.observer {
            observer.busy_changed(false);
        }
    }

    /// Run `operation` with the busy indicator shown; it is hidden on every exit path,
    /// including when the returned future is dropped before completion.
    pub async fn with_busy_indicator<F, T>(&self, operation: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        let _busy = self.acquire_busy();
        operation.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn surface() -> NotificationSurface {
        NotificationSurface::new(Duration::from_secs(3))
    }

    #[tokio::test(start_paused = true)]
    async fn notifications_stack_and_expire_independently() {
        let surface = surface();
        surface.notify("first", Severity::Info);
        tokio::time::advance(Duration::from_secs(2)).await;
        surface.notify("second", Severity::Success);

        let visible = surface.visible();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].message, "first");
        assert_eq!(visible[1].message, "second");

        tokio::time::advance(Duration::from_millis(1_500)).await;
        let visible = surface.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "second");

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(surface.visible().is_empty());
        assert_eq!(surface.history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn notify_drops_expired_entries_without_polling() {
        let surface = surface();
        for round in 0..5 {
            surface.notify(format!("round {round}"), Severity::Info);
            tokio::time::advance(Duration::from_secs(4)).await;
        }
        surface.notify("latest", Severity::Success);
        assert_eq!(surface.lock().active.len(), 1);
    }

    #[test]
    fn history_keeps_only_the_most_recent_notifications() {
        let surface = surface();
        for index in 0..HISTORY_LIMIT + 10 {
            surface.notify(format!("message {index}"), Severity::Info);
        }
        let history = surface.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].message, "message 10");
        assert_eq!(
            history[HISTORY_LIMIT - 1].message,
            format!("message {}", HISTORY_LIMIT + 9)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dismissal_wins_over_timeout() {
        let surface = surface();
        let first = surface.notify("first", Severity::Warning);
        let second = surface.notify("second", Severity::Danger);

        assert!(surface.dismiss(first));
        assert!(!surface.dismiss(first));
        let visible = surface.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, second);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(!surface.dismiss(second), "already expired");
    }

    #[test]
    fn nested_busy_acquisition_is_a_no_op() {
        let surface = surface();
        let outer = surface.acquire_busy();
        assert!(outer.is_owner());
        {
            let inner = surface.acquire_busy();
            assert!(!inner.is_owner());
            assert!(surface.is_busy());
        }
        assert!(surface.is_busy(), "inner guard must not hide the indicator");
        drop(outer);
        assert!(!surface.is_busy());
    }

    #[tokio::test]
    async fn busy_indicator_clears_on_error_paths() {
        let surface = surface();
        let result: Result<(), &str> = surface
            .with_busy_indicator(async {
                assert!(surface.is_busy());
                Err("boom")
            })
            .await;
        assert!(result.is_err());
        assert!(!surface.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn busy_indicator_clears_when_operation_is_dropped() {
        let surface = surface();
        let pending = surface.with_busy_indicator(tokio::time::sleep(Duration::from_secs(60)));
        let outcome = tokio::time::timeout(Duration::from_secs(1), pending).await;
        assert!(outcome.is_err());
        assert!(!surface.is_busy());
    }

    #[derive(Default)]
    struct CountingObserver {
        shown: AtomicUsize,
        busy_toggles: AtomicUsize,
    }

    impl SurfaceObserver for CountingObserver {
        fn notification_shown(&self, _notification: &Notification) {
            self.shown.fetch_add(1, Ordering::SeqCst);
        }

        fn busy_changed(&self, _busy: bool) {
            self.busy_toggles.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn observer_sees_every_notification_and_busy_change() {
        let observer = Arc::new(CountingObserver::default());
        let surface = surface().with_observer(observer.clone());
        surface.notify("hello", Severity::Info);
        drop(surface.acquire_busy());
        assert_eq!(observer.shown.load(Ordering::SeqCst), 1);
        assert_eq!(observer.busy_toggles.load(Ordering::SeqCst), 2);
    }
}
