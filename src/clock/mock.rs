//! Virtual clock for deterministic tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::{Clock, Ticker, MIN_TICK_PERIOD};

/// Clock whose time only moves when [`MockClock::advance`] is called.
///
/// Advancing delivers every tick that would have fired during the jump, in
/// due-time order, before returning. Ticks are queued on the tickers'
/// channels; the tasks polling them observe the ticks as soon as they are
/// scheduled.
///
/// Clones share the same timeline.
#[derive(Debug, Clone)]
pub struct MockClock {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug)]
struct MockInner {
    origin: Instant,
    wall_origin: DateTime<Utc>,
    offset: Duration,
    tickers: Vec<MockTicker>,
}

#[derive(Debug)]
struct MockTicker {
    period: Duration,
    next_due: Duration,
    tx: mpsc::UnboundedSender<Duration>,
}

impl MockClock {
    /// Creates a mock clock whose wall clock starts at the Unix epoch.
    pub fn new() -> Self {
        Self::starting_at(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Creates a mock clock whose wall clock starts at `wall`.
    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner {
                origin: Instant::now(),
                wall_origin: wall,
                offset: Duration::ZERO,
                tickers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves the clock forward, firing every ticker that falls due.
    pub fn advance(&self, by: Duration) {
        let mut inner = self.lock();
        let target = inner.offset + by;
        let mut fired = 0usize;

        loop {
            inner.tickers.retain(|ticker| !ticker.tx.is_closed());

            let next = inner
                .tickers
                .iter_mut()
                .filter(|ticker| ticker.next_due <= target)
                .min_by_key(|ticker| ticker.next_due);
            let Some(ticker) = next else {
                break;
            };

            let due = ticker.next_due;
            ticker.next_due += ticker.period;
            // A receiver dropped mid-advance is pruned on the next pass.
            let _ = ticker.tx.send(ticker.period);
            inner.offset = due;
            fired += 1;
        }

        inner.offset = target;
        tracing::trace!(
            advanced_ms = by.as_millis() as u64,
            fired,
            "mock clock advanced"
        );
    }

    /// Moves the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Returns the number of live tickers.
    pub fn active_tickers(&self) -> usize {
        let mut inner = self.lock();
        inner.tickers.retain(|ticker| !ticker.tx.is_closed());
        inner.tickers.len()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let inner = self.lock();
        inner.origin + inner.offset
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        let inner = self.lock();
        chrono::Duration::from_std(inner.offset)
            .ok()
            .and_then(|offset| inner.wall_origin.checked_add_signed(offset))
            .unwrap_or(inner.wall_origin)
    }

    fn ticker(&self, period: Duration) -> Ticker {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let period = period.max(MIN_TICK_PERIOD);
        let next_due = inner.offset + period;
        inner.tickers.push(MockTicker {
            period,
            next_due,
            tx,
        });
        Ticker::channel(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn drain(ticker: &mut Ticker) -> Vec<Duration> {
        let mut ticks = Vec::new();
        while let Ok(Some(elapsed)) =
            tokio::time::timeout(Duration::from_millis(20), ticker.tick()).await
        {
            ticks.push(elapsed);
        }
        ticks
    }

    #[test]
    fn test_now_advances() {
        let clock = MockClock::new();
        let before = clock.now();

        clock.advance_secs(90);

        assert_eq!(clock.now() - before, Duration::from_secs(90));
    }

    #[test]
    fn test_wall_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 1, 7, 10, 30, 0).single().unwrap();
        let clock = MockClock::starting_at(start);

        clock.advance_secs(1500);

        let expected = Utc.with_ymd_and_hms(2025, 1, 7, 10, 55, 0).single().unwrap();
        assert_eq!(clock.wall_clock(), expected);
    }

    #[tokio::test]
    async fn test_jump_delivers_every_tick() {
        let clock = MockClock::new();
        let mut ticker = clock.ticker(Duration::from_secs(10));

        clock.advance_secs(35);

        let ticks = drain(&mut ticker).await;
        assert_eq!(ticks, vec![Duration::from_secs(10); 3]);
    }

    #[tokio::test]
    async fn test_partial_periods_accumulate() {
        let clock = MockClock::new();
        let mut ticker = clock.ticker(Duration::from_secs(10));

        clock.advance_secs(6);
        assert!(drain(&mut ticker).await.is_empty());

        clock.advance_secs(6);
        assert_eq!(drain(&mut ticker).await, vec![Duration::from_secs(10)]);
    }

    #[tokio::test]
    async fn test_ticker_starts_from_current_time() {
        let clock = MockClock::new();
        clock.advance_secs(100);

        let mut ticker = clock.ticker(Duration::from_secs(10));
        clock.advance_secs(9);
        assert!(drain(&mut ticker).await.is_empty());

        clock.advance_secs(1);
        assert_eq!(drain(&mut ticker).await.len(), 1);
    }

    #[test]
    fn test_dropped_tickers_are_pruned() {
        let clock = MockClock::new();
        let ticker = clock.ticker(Duration::from_secs(1));
        assert_eq!(clock.active_tickers(), 1);

        drop(ticker);
        clock.advance_secs(5);

        assert_eq!(clock.active_tickers(), 0);
    }

    #[test]
    fn test_clones_share_timeline() {
        let clock = MockClock::new();
        let other = clock.clone();
        let before = clock.now();

        other.advance_secs(42);

        assert_eq!(clock.now() - before, Duration::from_secs(42));
        assert_eq!(clock.wall_clock(), other.wall_clock());
    }
}
