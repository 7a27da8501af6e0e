//! Outbound events for user interfaces.
//!
//! The service never calls a [`Notifier`] directly. It queues a
//! [`Notification`] and a dispatcher task delivers it, so notifier code runs
//! without any service or timer lock held and may call back into the
//! service.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::types::{ServiceState, SessionType};

/// Receiver of service events (tray icon, terminal, tests, ...).
pub trait Notifier: Send + Sync {
    /// A session began counting down.
    fn session_started(&self, session_type: SessionType, duration_secs: u32);

    /// Time remaining in the running session.
    fn session_tick(&self, remaining_secs: u32);

    /// A session ended, naturally or by skipping.
    fn session_completed(&self, session_type: SessionType);

    /// The service moved to a new top-level state.
    fn state_changed(&self, state: ServiceState);
}

/// A queued notifier call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    SessionStarted {
        #[serde(rename = "sessionType")]
        session_type: SessionType,
        #[serde(rename = "durationSeconds")]
        duration_secs: u32,
    },
    SessionTick {
        #[serde(rename = "remainingSeconds")]
        remaining_secs: u32,
    },
    SessionCompleted {
        #[serde(rename = "sessionType")]
        session_type: SessionType,
    },
    StateChanged { state: ServiceState },
}

impl Notification {
    /// Invokes the matching notifier method.
    pub fn deliver(self, notifier: &dyn Notifier) {
        match self {
            Notification::SessionStarted {
                session_type,
                duration_secs,
            } => notifier.session_started(session_type, duration_secs),
            Notification::SessionTick { remaining_secs } => notifier.session_tick(remaining_secs),
            Notification::SessionCompleted { session_type } => {
                notifier.session_completed(session_type)
            }
            Notification::StateChanged { state } => notifier.state_changed(state),
        }
    }
}

/// Notifier that forwards every event into an mpsc channel.
///
/// Events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Creates a notifier together with the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

impl Notifier for ChannelNotifier {
    fn session_started(&self, session_type: SessionType, duration_secs: u32) {
        self.forward(Notification::SessionStarted {
            session_type,
            duration_secs,
        });
    }

    fn session_tick(&self, remaining_secs: u32) {
        self.forward(Notification::SessionTick { remaining_secs });
    }

    fn session_completed(&self, session_type: SessionType) {
        self.forward(Notification::SessionCompleted { session_type });
    }

    fn state_changed(&self, state: ServiceState) {
        self.forward(Notification::StateChanged { state });
    }
}
