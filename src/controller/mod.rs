//! Timed popup controller
//!
//! One job at a time moves through
//! `Idle -> CountingDownToOpen -> Navigating -> CountingDownToClose -> Closed`,
//! or ends early in `Cancelled` or `Failed`.
//!
//! ## Key Components
//!
//! - [`TimedWindowController`] - the state machine; owns the job, the window
//!   handle and every timer
//! - [`TimerSet`] - cancellable timers keyed by [`TimerRole`]
//! - [`ControllerService`] - spawns the event loop driving the controller
//! - [`ControllerHandle`] - async front door: start, cancel, reset, status
//!
//! ## Example
//!
//! ```rust,ignore
//! let (handle, _task) = ControllerService::spawn(&config, parts);
//! handle.start_job("https://example.com", 5, 10).await?;
//! let done = handle.wait_for(|s| s.is_terminal()).await?;
//! ```

mod coordinator;
mod job;
mod phase;
mod service;
mod timers;

pub use coordinator::{ControllerParts, TimedWindowController};
pub use job::StatusSnapshot;
pub use phase::Phase;
pub use service::{ControllerHandle, ControllerService};
pub use timers::{TimerFired, TimerRole, TimerSet};
