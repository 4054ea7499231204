//! Bounded polling shared by every component that waits on the browser.
//!
//! A [`Poll`] is a deadline plus an interval. Callers check their condition,
//! then call [`Poll::next`]; the last sleep is trimmed so the final check
//! lands exactly on the deadline. A wait therefore gives up no earlier than
//! its timeout and no later than timeout + one interval.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct Poll {
    started: Instant,
    timeout: Duration,
    interval: Duration,
}

impl Poll {
    pub fn start(timeout: Duration, interval: Duration) -> Self {
        Self {
            started: Instant::now(),
            timeout,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    /// Sleep until the next poll point. Returns `false` once the budget is spent.
    pub async fn next(&self) -> bool {
        let elapsed = self.elapsed();
        if elapsed >= self.timeout {
            return false;
        }
        let remaining = self.timeout - elapsed;
        tokio::time::sleep(self.interval.min(remaining)).await;
        true
    }
}

/// Progress of an action whose effect is observed asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ActionTriggered,
    AwaitingObservableChange,
    Verified,
    TimedOut,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::ActionTriggered => "action-triggered",
            Phase::AwaitingObservableChange => "awaiting-observable-change",
            Phase::Verified => "verified",
            Phase::TimedOut => "timed-out",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn final_check_lands_on_the_deadline() {
        let poll = Poll::start(Duration::from_millis(1000), Duration::from_millis(300));
        let mut checks = 1;
        while poll.next().await {
            checks += 1;
        }
        // 0, 300, 600, 900, 1000
        assert_eq!(checks, 5);
        assert_eq!(poll.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_checks_once() {
        let poll = Poll::start(Duration::ZERO, Duration::from_millis(250));
        assert!(poll.is_expired());
        assert!(!poll.next().await);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_clamped() {
        let poll = Poll::start(Duration::from_millis(3), Duration::ZERO);
        let mut checks = 1;
        while poll.next().await {
            checks += 1;
        }
        assert_eq!(checks, 4);
    }
}
