//! Pomodoro service.
//!
//! [`PomodoroService`] validates user commands, drives the [`Timer`] and the
//! [`Session`] cycle, and reports what happened to an optional [`Notifier`]
//! and [`Storage`].
//!
//! # Architecture
//!
//! ```text
//!  commands ──▶ gate ──▶ core (state + session) ──▶ Timer
//!                              │                      │ TimerEvent
//!                              │        reactor ◀─────┘
//!                              ▼           │
//!                          outbound ◀──────┘
//!                              │
//!                         dispatcher ──▶ Notifier / Storage
//! ```
//!
//! The core lock only guards check-and-transition. Notifier and storage calls
//! happen on the dispatcher task, so a notifier may call back into the
//! service.
//!
//! Commands never call into the timer while holding the core lock. The one
//! nesting is the reactor reading [`Timer::generation`] under the core lock:
//! commands change the generation only between their core transitions, so
//! the check and the reaction see the same countdown. The order is always
//! core then timer; the timer never takes the core lock.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use super::error::PomodoroError;
use super::notifier::{Notification, Notifier};
use super::session::Session;
use super::timer::{Timer, TimerEvent};
use crate::clock::{Clock, SystemClock};
use crate::storage::{CsvStorage, SessionRecord, Storage};
use crate::types::{
    CycleProgress, PomodoroConfig, ServiceState, SessionStatus, SessionType, StatusSnapshot,
    DEFAULT_TICK_INTERVAL,
};

// ============================================================================
// Outbound queue
// ============================================================================

/// Work handed to the dispatcher task.
enum Outbound {
    Notify(Notification),
    Record(SessionRecord),
    BindNotifier(Arc<dyn Notifier>),
    Flush(oneshot::Sender<()>),
}

async fn run_dispatcher(
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut notifier: Option<Arc<dyn Notifier>>,
    storage: Option<Arc<dyn Storage>>,
) {
    while let Some(item) = rx.recv().await {
        match item {
            Outbound::Notify(notification) => {
                if let Some(notifier) = &notifier {
                    notification.deliver(notifier.as_ref());
                }
            }
            Outbound::Record(record) => {
                let Some(storage) = &storage else { continue };
                if let Err(e) = record.write_to(storage.as_ref()) {
                    warn!(
                        error = %e,
                        status = %record.status,
                        session_type = %record.session_type,
                        "セッションログの書き込みに失敗しました"
                    );
                }
            }
            Outbound::BindNotifier(new_notifier) => notifier = Some(new_notifier),
            Outbound::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("dispatcher stopped");
}

// ============================================================================
// PomodoroService
// ============================================================================

/// State guarded by the core lock.
#[derive(Debug, Default)]
struct Core {
    state: ServiceState,
    session: Session,
}

struct ServiceInner {
    /// Serializes commands
    commands: Mutex<()>,
    core: Mutex<Core>,
    timer: Timer,
    clock: Arc<dyn Clock>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

/// Pomodoro state machine driving the timer and the session cycle.
///
/// Cloning is cheap; all clones control the same service. Background tasks
/// stop once the last clone is dropped.
#[derive(Clone)]
pub struct PomodoroService {
    inner: Arc<ServiceInner>,
}

impl PomodoroService {
    /// Returns a builder using the system clock.
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Starts the current session.
    ///
    /// # Errors
    ///
    /// Returns [`PomodoroError::AlreadyRunning`] unless the service is idle.
    pub fn start(&self) -> Result<(), PomodoroError> {
        let inner = &self.inner;
        let _gate = inner.gate();

        let (session_type, duration_secs) = {
            let mut core = inner.lock_core();
            PomodoroError::check_start(core.state)?;
            core.state = ServiceState::Running;

            let session_type = core.session.current_type;
            let duration_secs = core.session.duration_secs();
            inner.notify(Notification::SessionStarted {
                session_type,
                duration_secs,
            });
            inner.record(session_type, SessionStatus::Started, 0);
            (session_type, duration_secs)
        };

        info!(%session_type, duration_secs, "session started");
        inner.timer.start(session_type, duration_secs);
        Ok(())
    }

    /// Pauses the running session.
    ///
    /// # Errors
    ///
    /// Returns [`PomodoroError::NotRunning`] unless a session is running.
    pub fn pause(&self) -> Result<(), PomodoroError> {
        let inner = &self.inner;
        let _gate = inner.gate();

        {
            let mut core = inner.lock_core();
            PomodoroError::check_pause(core.state)?;
            core.state = ServiceState::Paused;
            inner.notify(Notification::StateChanged {
                state: ServiceState::Paused,
            });
        }

        inner.timer.pause();
        info!(remaining_secs = inner.timer.remaining_secs(), "session paused");
        Ok(())
    }

    /// Resumes the paused session from its remaining time.
    ///
    /// # Errors
    ///
    /// Returns [`PomodoroError::NotPaused`] unless a session is paused.
    pub fn resume(&self) -> Result<(), PomodoroError> {
        let inner = &self.inner;
        let _gate = inner.gate();

        {
            let mut core = inner.lock_core();
            PomodoroError::check_resume(core.state)?;
            core.state = ServiceState::Running;
            inner.notify(Notification::StateChanged {
                state: ServiceState::Running,
            });
        }

        inner.timer.resume();
        info!(remaining_secs = inner.timer.remaining_secs(), "session resumed");
        Ok(())
    }

    /// Ends the current session early and moves to the next one.
    ///
    /// The skipped session counts toward the cycle like a completed one.
    ///
    /// # Errors
    ///
    /// Returns [`PomodoroError::Idle`] if no session is in progress.
    pub fn skip(&self) -> Result<(), PomodoroError> {
        let inner = &self.inner;
        let _gate = inner.gate();

        let (skipped, duration_secs) = {
            let mut core = inner.lock_core();
            PomodoroError::check_skip(core.state)?;

            let skipped = core.session.current_type;
            let duration_secs = core.session.duration_secs();
            core.session.advance();
            core.state = ServiceState::Idle;
            inner.notify(Notification::SessionCompleted {
                session_type: skipped,
            });
            (skipped, duration_secs)
        };

        let remaining_secs = inner.timer.remaining_secs();
        inner.timer.reset();

        let elapsed_minutes = duration_secs.saturating_sub(remaining_secs) / 60;
        inner.record(skipped, SessionStatus::Skipped, elapsed_minutes);
        info!(session_type = %skipped, elapsed_minutes, "session skipped");
        Ok(())
    }

    /// Abandons the current cycle and returns to the first work session.
    ///
    /// Allowed in every state. Emits `StateChanged(Idle)` only when a
    /// session was interrupted.
    pub fn reset_cycle(&self) {
        let inner = &self.inner;
        let _gate = inner.gate();

        inner.timer.reset();

        let mut core = inner.lock_core();
        let previous = core.state;
        core.session.reset();
        core.state = ServiceState::Idle;
        if previous != ServiceState::Idle {
            inner.notify(Notification::StateChanged {
                state: ServiceState::Idle,
            });
        }
        drop(core);

        info!(previous = %previous, "cycle reset");
    }

    /// Replaces the notifier.
    ///
    /// Notifications queued after this call go to `notifier`.
    pub fn set_notifier(&self, notifier: Arc<dyn Notifier>) {
        let _ = self.inner.outbound.send(Outbound::BindNotifier(notifier));
    }

    /// Waits until every notification and log record queued so far has
    /// been handled.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.inner.outbound.send(Outbound::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns the current service state.
    pub fn state(&self) -> ServiceState {
        self.inner.lock_core().state
    }

    /// Returns the remaining time of the current session in whole seconds.
    pub fn remaining_secs(&self) -> u32 {
        self.inner.timer.remaining_secs()
    }

    /// Returns the type of the current (or next to start) session.
    pub fn current_session_type(&self) -> SessionType {
        self.inner.lock_core().session.current_type
    }

    /// Returns the number of work sessions completed in this cycle.
    pub fn completed_sessions(&self) -> u32 {
        self.inner.lock_core().session.completed_work_sessions
    }

    /// Returns the full length of the current session in seconds.
    pub fn current_duration(&self) -> u32 {
        self.inner.lock_core().session.duration_secs()
    }

    /// Returns the position within the cycle.
    pub fn cycle_progress(&self) -> CycleProgress {
        self.inner.lock_core().session.cycle_progress()
    }

    /// Returns a consistent view of the service for display.
    ///
    /// An idle service reports the full duration of the next session as
    /// remaining time.
    pub fn snapshot(&self) -> StatusSnapshot {
        let (state, session) = {
            let core = self.inner.lock_core();
            (core.state, core.session)
        };
        let duration_seconds = session.duration_secs();
        let remaining_seconds = match state {
            ServiceState::Idle => duration_seconds,
            _ => self.inner.timer.remaining_secs(),
        };

        StatusSnapshot {
            state,
            session_type: session.current_type,
            remaining_seconds,
            duration_seconds,
            completed_sessions: session.completed_work_sessions,
            progress: session.cycle_progress(),
        }
    }
}

impl fmt::Debug for PomodoroService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock_core();
        f.debug_struct("PomodoroService")
            .field("state", &core.state)
            .field("session", &core.session)
            .finish_non_exhaustive()
    }
}

impl ServiceInner {
    fn gate(&self) -> MutexGuard<'_, ()> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, notification: Notification) {
        let _ = self.outbound.send(Outbound::Notify(notification));
    }

    fn record(&self, session_type: SessionType, status: SessionStatus, duration_minutes: u32) {
        let record = SessionRecord {
            timestamp: self.clock.wall_clock(),
            session_type,
            status,
            duration_minutes,
        };
        let _ = self.outbound.send(Outbound::Record(record));
    }

    /// Reacts to one timer event.
    ///
    /// Events from a countdown that has been skipped, reset or replaced
    /// carry an old generation and are dropped.
    fn on_timer_event(&self, event: TimerEvent) {
        let mut core = self.lock_core();
        // Core then timer: the only place both locks are held.
        if event.generation() != self.timer.generation() {
            trace!(?event, "stale timer event dropped");
            return;
        }

        match event {
            TimerEvent::Started { .. } => {}
            TimerEvent::Tick { remaining_secs, .. } => {
                if core.state == ServiceState::Running {
                    self.notify(Notification::SessionTick { remaining_secs });
                }
            }
            TimerEvent::Completed { .. } => {
                if core.state == ServiceState::Idle {
                    return;
                }
                let finished = core.session.current_type;
                let next = core.session.advance();
                core.state = ServiceState::Idle;

                self.notify(Notification::SessionCompleted {
                    session_type: finished,
                });
                self.record(finished, SessionStatus::Completed, finished.duration_secs() / 60);
                info!(session_type = %finished, next = %next, "session completed");
            }
        }
    }
}

async fn run_reactor(service: Weak<ServiceInner>, mut events: mpsc::UnboundedReceiver<TimerEvent>) {
    while let Some(event) = events.recv().await {
        let Some(inner) = service.upgrade() else {
            break;
        };
        inner.on_timer_event(event);
    }
    debug!("reactor stopped");
}

// ============================================================================
// ServiceBuilder
// ============================================================================

/// Builder for [`PomodoroService`].
pub struct ServiceBuilder {
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    notifier: Option<Arc<dyn Notifier>>,
    storage: Option<Arc<dyn Storage>>,
    runtime: Option<Handle>,
}

impl ServiceBuilder {
    /// Creates a builder with the system clock, the default tick interval
    /// and neither notifier nor storage.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock::new()),
            tick_interval: DEFAULT_TICK_INTERVAL,
            notifier: None,
            storage: None,
            runtime: None,
        }
    }

    /// Creates a builder from configuration.
    ///
    /// An enabled session log without an explicit path goes to the default
    /// location. If that location cannot be determined, logging is disabled
    /// with a warning.
    pub fn from_config(config: &PomodoroConfig) -> Self {
        let mut builder = Self::new().tick_interval(config.tick_interval());
        if !config.session_log {
            return builder;
        }

        let storage = match &config.session_log_path {
            Some(path) => Some(CsvStorage::new(path)),
            None => match CsvStorage::default_location() {
                Ok(storage) => Some(storage),
                Err(e) => {
                    warn!(error = %e, "セッションログを無効にします");
                    None
                }
            },
        };
        if let Some(storage) = storage {
            builder = builder.storage(Arc::new(storage));
        }
        builder
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Runtime for the background tasks. Defaults to the current one.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the service and spawns its background tasks.
    ///
    /// # Panics
    ///
    /// Panics if no runtime was given and this is called outside of a Tokio
    /// runtime.
    pub fn build(self) -> PomodoroService {
        let runtime = self.runtime.unwrap_or_else(Handle::current);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let timer = Timer::new(
            Arc::clone(&self.clock),
            self.tick_interval,
            event_tx,
            runtime.clone(),
        );
        let inner = Arc::new(ServiceInner {
            commands: Mutex::new(()),
            core: Mutex::new(Core::default()),
            timer,
            clock: self.clock,
            outbound: outbound_tx,
        });

        runtime.spawn(run_reactor(Arc::downgrade(&inner), event_rx));
        runtime.spawn(run_dispatcher(outbound_rx, self.notifier, self.storage));
        debug!(tick_interval = ?self.tick_interval, "service built");

        PomodoroService { inner }
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
