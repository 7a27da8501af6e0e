//! Real-time clock backed by the operating system and Tokio timers.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use super::{Clock, Ticker};

/// Production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn ticker(&self, period: Duration) -> Ticker {
        Ticker::interval(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_wall_clock_is_recent() {
        let clock = SystemClock::new();
        let drift = (Utc::now() - clock.wall_clock()).num_seconds().abs();
        assert!(drift < 60);
    }

    #[tokio::test]
    async fn test_ticker_fires_after_period() {
        let clock = SystemClock::new();
        let mut ticker = clock.ticker(Duration::from_millis(20));

        let elapsed = tokio::time::timeout(Duration::from_secs(2), ticker.tick())
            .await
            .expect("ticker should fire")
            .expect("ticker should not be stopped");

        assert!(elapsed >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_ticker_stop() {
        let clock = SystemClock::new();
        let mut ticker = clock.ticker(Duration::from_millis(20));

        ticker.stop();

        assert_eq!(ticker.tick().await, None);
    }
}
