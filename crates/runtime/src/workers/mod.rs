//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker executes gameplay commands, while the notification
//! worker delivers per-team messages off the critical path.

mod notification;
mod simulation;

pub use notification::NotificationWorker;
pub use simulation::{Command, SimulationWorker};
