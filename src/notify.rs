//! Transient user notifications (toasts).
//!
//! The controller and the dispatcher describe what happened as a [`Notice`];
//! the host decides how to show it.

use std::sync::Mutex;
use std::time::Duration;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// How long the host should keep it on screen; `None` is the host default.
    pub duration: Option<Duration>,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
            duration: None,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Destructive,
            ..Self::info(title, description)
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn is_destructive(&self) -> bool {
        self.severity == Severity::Destructive
    }

    /// The display duration in whole milliseconds, saturating at `u64::MAX`.
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Records notices in order. Hosts drain it after each interaction.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears everything recorded so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(|p| p.into_inner()))
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .last()
            .cloned()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(notice);
    }
}

/// Writes notices to the log instead of a screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => info!(title = %notice.title, "{}", notice.description),
            Severity::Destructive => warn!(title = %notice.title, "{}", notice.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_take_drains() {
        let log = NoticeLog::new();
        log.notify(Notice::info("a", "b"));
        log.notify(Notice::destructive("c", "d").with_duration(Duration::from_secs(5)));

        assert!(log.last().unwrap().is_destructive());
        let notices = log.take();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].duration, Some(Duration::from_secs(5)));
        assert!(log.take().is_empty());
    }

    #[test]
    fn duration_ms_saturates() {
        assert_eq!(Notice::info("a", "b").duration_ms(), None);
        let toast = Notice::info("a", "b").with_duration(Duration::from_secs(5));
        assert_eq!(toast.duration_ms(), Some(5000));
        let forever = Notice::info("a", "b").with_duration(Duration::MAX);
        assert_eq!(forever.duration_ms(), Some(u64::MAX));
    }
}
