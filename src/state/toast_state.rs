//! Transient toast notifications.

use std::time::{Duration, Instant};
use uuid::Uuid;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
    Offline,
}

/// A message shown for a limited time.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub level: ToastLevel,
    /// How long the toast stays up; zero keeps it until dismissed.
    pub duration: Duration,
    pub created_at: Instant,
}

impl Toast {
    /// Create a toast with an explicit duration.
    pub fn new(message: impl Into<String>, level: ToastLevel, duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            level,
            duration,
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Info, Duration::from_secs(3))
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Success, Duration::from_secs(3))
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Warning, Duration::from_secs(5))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Error, Duration::from_secs(10))
    }

    pub fn offline(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Offline, Duration::from_secs(5))
    }

    /// Override the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the toast should be gone at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        !self.duration.is_zero() && now.saturating_duration_since(self.created_at) >= self.duration
    }
}

/// Stack of active toasts, oldest first.
#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    /// Add a toast and return its id.
    pub fn push(&mut self, toast: Toast) -> Uuid {
        let id = toast.id;
        self.items.push(toast);
        id
    }

    /// Remove a toast by id.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    /// Remove the most recent toast.
    pub fn dismiss_latest(&mut self) -> Option<Toast> {
        self.items.pop()
    }

    /// Remove all toasts.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop expired toasts. Returns true if any were removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|t| !t.is_expired(now));
        self.items.len() != before
    }

    /// Active toasts, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
