//! Countdown timer for a single session.
//!
//! This module provides the core countdown functionality:
//! - State transitions (Idle → Running ⇄ Paused → Idle)
//! - A background tick process per running countdown, driven by a [`Clock`]
//! - Event delivery over an mpsc channel supplied at construction
//!
//! Timer operations never fail; a call that does not fit the current state
//! is ignored. Callers that need to report such calls as errors validate
//! before delegating here.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::clock::{Clock, Ticker};
use crate::types::{SessionType, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// Events emitted by the timer.
///
/// `generation` identifies the countdown that produced the event; it changes
/// on every start and reset, so consumers can drop events from a countdown
/// that has since been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started
    Started {
        generation: u64,
        session_type: SessionType,
        duration_secs: u32,
    },
    /// Tick processed while time remains
    Tick {
        generation: u64,
        remaining_secs: u32,
    },
    /// Countdown reached zero
    Completed {
        generation: u64,
        session_type: SessionType,
    },
}

impl TimerEvent {
    /// Returns the generation of the countdown that emitted this event.
    pub fn generation(&self) -> u64 {
        match self {
            TimerEvent::Started { generation, .. }
            | TimerEvent::Tick { generation, .. }
            | TimerEvent::Completed { generation, .. } => *generation,
        }
    }
}

// ============================================================================
// Timer
// ============================================================================

/// Mutable countdown state, guarded by the timer lock.
#[derive(Debug)]
struct Countdown {
    state: TimerState,
    session_type: Option<SessionType>,
    remaining: Duration,
    generation: u64,
    /// Cancellation handle of the live tick process, if any
    tick_process: Option<CancellationToken>,
}

/// Session countdown with a background tick process.
///
/// At most one tick process is alive at a time: starting one always goes
/// through the timer lock and replaces the previous cancellation token.
#[derive(Debug)]
pub struct Timer {
    countdown: Arc<Mutex<Countdown>>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    events: mpsc::UnboundedSender<TimerEvent>,
    runtime: Handle,
}

impl Timer {
    /// Creates an idle timer.
    ///
    /// Tick processes are spawned on `runtime`, so the timer can be driven
    /// from threads outside of it.
    pub fn new(
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
        events: mpsc::UnboundedSender<TimerEvent>,
        runtime: Handle,
    ) -> Self {
        let countdown = Countdown {
            state: TimerState::Idle,
            session_type: None,
            remaining: Duration::ZERO,
            generation: 0,
            tick_process: None,
        };
        Self {
            countdown: Arc::new(Mutex::new(countdown)),
            clock,
            tick_interval,
            events,
            runtime,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Countdown> {
        lock_countdown(&self.countdown)
    }

    /// Starts a countdown. Ignored unless the timer is idle.
    pub fn start(&self, session_type: SessionType, duration_secs: u32) {
        let mut countdown = self.lock();
        if countdown.state != TimerState::Idle {
            debug!(state = ?countdown.state, "start ignored: timer is not idle");
            return;
        }

        countdown.generation += 1;
        countdown.session_type = Some(session_type);
        countdown.remaining = Duration::from_secs(u64::from(duration_secs));
        countdown.state = TimerState::Running;

        let _ = self.events.send(TimerEvent::Started {
            generation: countdown.generation,
            session_type,
            duration_secs,
        });
        debug!(%session_type, duration_secs, "countdown started");

        self.spawn_tick_process(&mut countdown);
    }

    /// Pauses a running countdown, keeping its remaining time.
    ///
    /// The remaining value is frozen as last charged by a tick; a partly
    /// elapsed tick period is discarded and resume starts a fresh one.
    pub fn pause(&self) {
        let mut countdown = self.lock();
        if countdown.state != TimerState::Running {
            debug!(state = ?countdown.state, "pause ignored: timer is not running");
            return;
        }

        cancel_tick_process(&mut countdown);
        countdown.state = TimerState::Paused;

        debug!(remaining_secs = whole_secs(countdown.remaining), "countdown paused");
    }

    /// Resumes a paused countdown from its remaining time.
    pub fn resume(&self) {
        let mut countdown = self.lock();
        if countdown.state != TimerState::Paused {
            debug!(state = ?countdown.state, "resume ignored: timer is not paused");
            return;
        }

        countdown.state = TimerState::Running;
        debug!(remaining_secs = whole_secs(countdown.remaining), "countdown resumed");

        self.spawn_tick_process(&mut countdown);
    }

    /// Stops any countdown and returns to idle with zero remaining time.
    pub fn reset(&self) {
        let mut countdown = self.lock();
        cancel_tick_process(&mut countdown);
        countdown.generation += 1;
        countdown.state = TimerState::Idle;
        countdown.session_type = None;
        countdown.remaining = Duration::ZERO;
        debug!("timer reset");
    }

    /// Returns the current timer state.
    pub fn state(&self) -> TimerState {
        self.lock().state
    }

    /// Returns the remaining time in whole seconds, rounded up.
    pub fn remaining_secs(&self) -> u32 {
        whole_secs(self.lock().remaining)
    }

    /// Returns the type of the current countdown, if any.
    pub fn session_type(&self) -> Option<SessionType> {
        self.lock().session_type
    }

    /// Returns the generation of the current countdown.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Begins counting down from the current remaining time.
    ///
    /// Must be called with the lock held and the state set to `Running`.
    fn spawn_tick_process(&self, countdown: &mut Countdown) {
        cancel_tick_process(countdown);

        if countdown.remaining.is_zero() {
            complete(countdown, &self.events);
            return;
        }

        let token = CancellationToken::new();
        countdown.tick_process = Some(token.clone());

        let ticker = self.clock.ticker(self.tick_interval);
        self.runtime.spawn(run_tick_process(
            Arc::clone(&self.countdown),
            ticker,
            token,
            self.events.clone(),
        ));
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        cancel_tick_process(&mut self.lock());
    }
}

fn lock_countdown(countdown: &Mutex<Countdown>) -> MutexGuard<'_, Countdown> {
    countdown.lock().unwrap_or_else(PoisonError::into_inner)
}

fn cancel_tick_process(countdown: &mut Countdown) {
    if let Some(token) = countdown.tick_process.take() {
        token.cancel();
    }
}

/// Marks the countdown finished and queues the completion event.
///
/// The event is only queued here; whoever consumes the channel runs its
/// reaction on its own task, outside the timer lock.
fn complete(countdown: &mut Countdown, events: &mpsc::UnboundedSender<TimerEvent>) {
    cancel_tick_process(countdown);
    countdown.remaining = Duration::ZERO;
    countdown.state = TimerState::Idle;

    if let Some(session_type) = countdown.session_type {
        let _ = events.send(TimerEvent::Completed {
            generation: countdown.generation,
            session_type,
        });
        debug!(%session_type, "countdown completed");
    }
}

fn whole_secs(duration: Duration) -> u32 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Tick loop of one countdown.
///
/// Every mutation happens under the timer lock after re-checking the
/// cancellation token, so a cancelled process cannot touch the countdown
/// even if a tick was already queued.
async fn run_tick_process(
    countdown: Arc<Mutex<Countdown>>,
    mut ticker: Ticker,
    token: CancellationToken,
    events: mpsc::UnboundedSender<TimerEvent>,
) {
    loop {
        let elapsed = tokio::select! {
            biased;

            _ = token.cancelled() => break,

            tick = ticker.tick() => match tick {
                Some(elapsed) => elapsed,
                None => break,
            },
        };

        let mut guard = lock_countdown(&countdown);
        if token.is_cancelled() || guard.state != TimerState::Running {
            break;
        }

        guard.remaining = guard.remaining.saturating_sub(elapsed);

        if guard.remaining.is_zero() {
            complete(&mut guard, &events);
            break;
        }

        let remaining_secs = whole_secs(guard.remaining);
        let _ = events.send(TimerEvent::Tick {
            generation: guard.generation,
            remaining_secs,
        });
        trace!(remaining_secs, "tick");
    }

    ticker.stop();
}

// ============================================================================
// Tests
// ============================================================================
