//! [`PhaseTimer`] – the one wall-clock-delayed transition in the controller.
//!
//! When the heart has been revealed the controller waits a fixed delay before
//! turning back toward the viewer.  Rather than spawning a task and cancelling
//! it on state change, the controller arms a [`PhaseTimer`] with a
//! [`PhaseToken`] describing the situation it was armed in.  On each tick the
//! timer is polled; a due token is handed back to the controller, which
//! applies the advance only if the token still describes the current
//! situation.  A token that no longer matches is dropped silently.
//!
//! The timer is driven entirely by the elapsed time passed to it, so it never
//! blocks and never runs on another thread.

use std::time::Duration;

use lorikeet_types::LovePhase;

// ────────────────────────────────────────────────────────────────────────────
// Token
// ────────────────────────────────────────────────────────────────────────────

/// Identifies the situation a deferred advance was armed for.
///
/// `epoch` counts behavior-state changes, so leaving and re-entering the love
/// sequence produces a different token even if the phase is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseToken {
    pub phase: LovePhase,
    pub epoch: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// PhaseTimer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: PhaseToken,
    due: Duration,
}

/// Single-slot deferred advance.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use lorikeet_runtime::scheduler::{PhaseTimer, PhaseToken};
/// use lorikeet_types::LovePhase;
///
/// let mut timer = PhaseTimer::new(Duration::from_millis(1000));
/// let token = PhaseToken { phase: LovePhase::RevealProp, epoch: 3 };
///
/// assert!(timer.arm(token, Duration::from_millis(500)));
/// // Re-arming with the same token keeps the original deadline.
/// assert!(!timer.arm(token, Duration::from_millis(900)));
///
/// assert_eq!(timer.poll(Duration::from_millis(1499)), None);
/// assert_eq!(timer.poll(Duration::from_millis(1500)), Some(token));
/// assert!(!timer.is_armed());
/// ```
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    delay: Duration,
    pending: Option<Pending>,
}

impl PhaseTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer for `token`, due `delay` after `now`.
    ///
    /// Returns `false` and leaves the deadline untouched when the timer is
    /// already armed for the same token.  A pending token that differs is
    /// replaced.
    pub fn arm(&mut self, token: PhaseToken, now: Duration) -> bool {
        if self.pending.is_some_and(|p| p.token == token) {
            return false;
        }
        self.pending = Some(Pending {
            token,
            due: now.saturating_add(self.delay),
        });
        true
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Token of the pending advance, if any.
    pub fn pending(&self) -> Option<PhaseToken> {
        self.pending.map(|p| p.token)
    }

    /// Deadline of the pending advance, if any.
    pub fn due(&self) -> Option<Duration> {
        self.pending.map(|p| p.due)
    }

    /// Take the pending token if its deadline has been reached.
    pub fn poll(&mut self, now: Duration) -> Option<PhaseToken> {
        match self.pending {
            Some(p) if now >= p.due => {
                self.pending = None;
                Some(p.token)
            }
            _ => None,
        }
    }
}
