//! Host environment collaborators
//!
//! The controller never touches a browser directly. It talks to:
//!
//! - [`WindowHost`] - opens popup windows
//! - [`PopupWindow`] - one externally owned window, liveness polled
//! - [`StatusSurface`] - the status panel with title, body and clock
//! - [`NoticeSurface`] - transient success/warning/error notices
//!
//! [`memory`] backs tests and dry runs, [`process`] launches a real browser
//! command and [`terminal`] prints status for the CLI.

pub mod memory;
pub mod process;
pub mod terminal;
mod traits;

pub use traits::{
    HostError, Notice, NoticeLevel, NoticeSurface, PopupWindow, StatusSurface, WindowHost,
};
