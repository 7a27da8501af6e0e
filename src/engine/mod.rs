//! Pomodoro engine.
//!
//! - [`session`]: which interval comes next in the cycle
//! - [`timer`]: countdown of a single interval
//! - [`service`]: command validation and orchestration
//! - [`notifier`]: outbound events for user interfaces

pub mod error;
pub mod notifier;
pub mod service;
pub mod session;
pub mod timer;

pub use error::PomodoroError;
pub use notifier::{ChannelNotifier, Notification, Notifier};
pub use service::{PomodoroService, ServiceBuilder};
pub use session::Session;
pub use timer::{Timer, TimerEvent};
