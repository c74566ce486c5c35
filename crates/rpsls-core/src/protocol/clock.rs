//! Timeout tracking for a single game.

use super::GameError;
use chrono::{DateTime, Duration, Utc};

/// Last accepted action time plus the fixed timeout window.
///
/// The clock never reads wall time itself: every query takes the caller's
/// `now` sample, so timeouts are evaluated only when an action is attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameClock {
    last_action_at: DateTime<Utc>,
    timeout: Duration,
}

impl GameClock {
    pub fn start(now: DateTime<Utc>, timeout: Duration) -> Self {
        Self {
            last_action_at: now,
            timeout,
        }
    }

    /// Record an accepted state-changing action
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_action_at = now;
    }

    pub fn last_action_at(&self) -> DateTime<Utc> {
        self.last_action_at
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// First instant at which the timeout counts as elapsed
    pub fn deadline(&self) -> DateTime<Utc> {
        self.last_action_at
            .checked_add_signed(self.timeout)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn has_elapsed(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    /// Remaining time, zero once elapsed
    pub fn time_left(&self, now: DateTime<Utc>) -> Duration {
        if self.has_elapsed(now) {
            Duration::zero()
        } else {
            self.deadline() - now
        }
    }

    pub fn ensure_elapsed(&self, now: DateTime<Utc>) -> Result<(), GameError> {
        if self.has_elapsed(now) {
            Ok(())
        } else {
            // Round up so a sub-second remainder never reports zero.
            let left = self.time_left(now);
            let mut remaining_secs = left.num_seconds();
            if left > Duration::seconds(remaining_secs) {
                remaining_secs += 1;
            }
            Err(GameError::TimeoutNotElapsed { remaining_secs })
        }
    }
}
