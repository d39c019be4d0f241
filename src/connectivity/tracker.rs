//! Connectivity state machine.

use std::time::Duration;
use tokio::time::Instant;

/// How long the "back online" indicator stays up after recovery.
pub const DEFAULT_RECOVERY_WINDOW: Duration = Duration::from_secs(5);

/// Published connectivity status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectivityStatus {
    /// Whether the last observation was offline.
    pub offline: bool,
    /// Whether connectivity was recently restored.
    pub was_offline: bool,
}

/// A connectivity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    WentOffline,
    CameOnline,
}

/// Tracks online/offline transitions and the recovery window.
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    status: ConnectivityStatus,
    recovered_at: Option<Instant>,
    recovery_window: Duration,
}

impl ConnectivityTracker {
    /// Create a tracker seeded with an initial observation.
    pub fn new(initially_online: bool, recovery_window: Duration) -> Self {
        Self {
            status: ConnectivityStatus {
                offline: !initially_online,
                was_offline: false,
            },
            recovered_at: None,
            recovery_window,
        }
    }

    /// Current status.
    pub fn status(&self) -> ConnectivityStatus {
        self.status
    }

    /// Record an observation, returning the transition it caused.
    pub fn observe(&mut self, online: bool, now: Instant) -> Option<ConnectivityEvent> {
        match (self.status.offline, online) {
            (false, false) => {
                self.status.offline = true;
                self.recovered_at = None;
                Some(ConnectivityEvent::WentOffline)
            }
            (true, true) => {
                self.status.offline = false;
                self.status.was_offline = true;
                self.recovered_at = Some(now);
                Some(ConnectivityEvent::CameOnline)
            }
            _ => None,
        }
    }

    /// Clear `was_offline` once the recovery window has elapsed.
    ///
    /// Returns true when the status changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if !self.status.was_offline || self.status.offline {
            return false;
        }
        match self.recovered_at {
            Some(at) if now.duration_since(at) >= self.recovery_window => {
                self.reset_was_offline();
                true
            }
            _ => false,
        }
    }

    /// Time at which the recovery indicator should be cleared, if pending.
    pub fn recovery_deadline(&self) -> Option<Instant> {
        if self.status.was_offline && !self.status.offline {
            self.recovered_at.map(|at| at + self.recovery_window)
        } else {
            None
        }
    }

    /// Drop the recovery indicator immediately.
    pub fn reset_was_offline(&mut self) {
        self.status.was_offline = false;
        self.recovered_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transitions_emit_events_once() {
        let now = Instant::now();
        let mut tracker = ConnectivityTracker::new(true, DEFAULT_RECOVERY_WINDOW);

        assert_eq!(tracker.observe(true, now), None);
        assert_eq!(
            tracker.observe(false, now),
            Some(ConnectivityEvent::WentOffline)
        );
        assert_eq!(tracker.observe(false, now), None);
        assert!(tracker.status().offline);

        assert_eq!(
            tracker.observe(true, now),
            Some(ConnectivityEvent::CameOnline)
        );
        assert_eq!(
            tracker.status(),
            ConnectivityStatus {
                offline: false,
                was_offline: true
            }
        );
    }

    #[test]
    fn test_recovery_indicator_expires_after_window() {
        let start = Instant::now();
        let mut tracker = ConnectivityTracker::new(false, Duration::from_secs(5));
        tracker.observe(true, start);

        assert!(!tracker.expire(start + Duration::from_secs(4)));
        assert!(tracker.status().was_offline);
        assert_eq!(
            tracker.recovery_deadline(),
            Some(start + Duration::from_secs(5))
        );

        assert!(tracker.expire(start + Duration::from_secs(5)));
        assert!(!tracker.status().was_offline);
        assert_eq!(tracker.recovery_deadline(), None);
    }

    #[test]
    fn test_going_offline_again_cancels_recovery() {
        let start = Instant::now();
        let mut tracker = ConnectivityTracker::new(false, Duration::from_secs(5));
        tracker.observe(true, start);
        tracker.observe(false, start + Duration::from_secs(1));

        assert!(!tracker.expire(start + Duration::from_secs(10)));
        assert!(tracker.status().offline);
        assert_eq!(tracker.recovery_deadline(), None);
    }

    #[test]
    fn test_initially_offline() {
        let tracker = ConnectivityTracker::new(false, DEFAULT_RECOVERY_WINDOW);
        assert!(tracker.status().offline);
        assert!(!tracker.status().was_offline);
    }
}
