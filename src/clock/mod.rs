//! Time sources for the countdown.
//!
//! The timer never reads the system clock directly. It asks a [`Clock`] for
//! the current instant and for a [`Ticker`], which lets tests swap in
//! [`MockClock`] and jump time forward deterministically.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │      Clock       │ ← now / wall_clock / ticker
//! └────────┬─────────┘
//!          │
//!          ├──────────────▶ SystemClock (tokio interval)
//!          │
//!          └──────────────▶ MockClock   (advance() fires due ticks)
//! ```

mod mock;
mod system;

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Interval, MissedTickBehavior};

pub use mock::MockClock;
pub use system::SystemClock;

/// Shortest period a ticker will run with.
pub(crate) const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// Abstract time source.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;

    /// Returns the current wall-clock time, used for log timestamps.
    fn wall_clock(&self) -> DateTime<Utc>;

    /// Creates a ticker that fires every `period` of clock time.
    ///
    /// Must be callable outside of a Tokio runtime; the ticker is only
    /// polled from inside one.
    fn ticker(&self, period: Duration) -> Ticker;
}

// ============================================================================
// Ticker
// ============================================================================

/// Repeating tick source handed out by a [`Clock`].
///
/// Each tick yields the clock time elapsed since the previous tick. Dropping
/// the ticker stops it.
pub struct Ticker {
    source: TickSource,
}

enum TickSource {
    /// Driven by a Tokio interval created lazily on the first poll.
    Interval {
        period: Duration,
        last: tokio::time::Instant,
        interval: Option<Interval>,
    },
    /// Driven externally through a channel (virtual time).
    Channel(mpsc::UnboundedReceiver<Duration>),
    Stopped,
}

impl Ticker {
    pub(crate) fn interval(period: Duration) -> Self {
        Self {
            source: TickSource::Interval {
                period: period.max(MIN_TICK_PERIOD),
                last: tokio::time::Instant::now(),
                interval: None,
            },
        }
    }

    pub(crate) fn channel(rx: mpsc::UnboundedReceiver<Duration>) -> Self {
        Self {
            source: TickSource::Channel(rx),
        }
    }

    /// Waits for the next tick.
    ///
    /// Returns the elapsed clock time, or `None` once the ticker is stopped.
    pub async fn tick(&mut self) -> Option<Duration> {
        match &mut self.source {
            TickSource::Interval {
                period,
                last,
                interval,
            } => {
                let period = *period;
                let start = *last + period;
                let interval = interval.get_or_insert_with(|| {
                    let mut interval = interval_at(start, period);
                    // Missed deadlines are skipped; the next tick reports
                    // the whole gap since the last one.
                    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    interval
                });
                let at = interval.tick().await;
                let elapsed = at.saturating_duration_since(*last);
                *last = at;
                Some(elapsed)
            }
            TickSource::Channel(rx) => rx.recv().await,
            TickSource::Stopped => None,
        }
    }

    /// Stops the ticker; later calls to [`Ticker::tick`] return `None`.
    pub fn stop(&mut self) {
        self.source = TickSource::Stopped;
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.source {
            TickSource::Interval { .. } => "interval",
            TickSource::Channel(_) => "channel",
            TickSource::Stopped => "stopped",
        };
        f.debug_struct("Ticker").field("source", &kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stopped_ticker_returns_none() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::channel(rx);

        ticker.stop();

        assert_eq!(format!("{:?}", ticker), r#"Ticker { source: "stopped" }"#);
        assert_eq!(ticker.tick().await, None);
    }

    #[tokio::test]
    async fn test_channel_ticker_yields_elapsed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::channel(rx);

        tx.send(Duration::from_secs(10)).unwrap();
        drop(tx);

        assert_eq!(ticker.tick().await, Some(Duration::from_secs(10)));
        assert_eq!(ticker.tick().await, None);
    }

    #[tokio::test]
    async fn test_late_interval_tick_reports_gap_on_next_tick() {
        let period = Duration::from_millis(50);
        let mut ticker = Ticker::interval(period);

        tokio::time::sleep(Duration::from_millis(180)).await;

        // The missed first deadline is reported as one period...
        assert_eq!(ticker.tick().await, Some(period));
        // ...and the skipped deadlines are charged on the following tick.
        let gap = ticker.tick().await.unwrap();
        assert!(gap >= 3 * period, "gap = {:?}", gap);
        assert_eq!(gap.as_millis() % period.as_millis(), 0);
    }

    #[test]
    fn test_debug_names_source() {
        let ticker = Ticker::interval(Duration::from_secs(1));
        assert!(format!("{:?}", ticker).contains("interval"));
    }
}
