//! Notifier adapters.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::domain::ports::{NotificationLevel, Notifier};

/// Emits notifications as log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(
        &self,
        title: &str,
        message: &str,
        level: NotificationLevel,
        duration: Option<Duration>,
    ) {
        let duration_ms = duration.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        match level {
            NotificationLevel::Error => {
                tracing::error!(title, duration_ms, "{message}");
            }
            NotificationLevel::Warning => {
                tracing::warn!(title, duration_ms, "{message}");
            }
            NotificationLevel::Info | NotificationLevel::Success => {
                tracing::info!(title, level = %level, duration_ms, "{message}");
            }
        }
    }
}

/// A notification captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
    pub duration: Option<Duration>,
}

/// Records notifications for later inspection.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.shown.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn count_level(&self, level: NotificationLevel) -> usize {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.level == level)
            .count()
    }
}

impl Notifier for MemoryNotifier {
    fn show(
        &self,
        title: &str,
        message: &str,
        level: NotificationLevel,
        duration: Option<Duration>,
    ) {
        TracingNotifier.show(title, message, level, duration);
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                title: title.to_string(),
                message: message.to_string(),
                level,
                duration,
            });
    }
}
