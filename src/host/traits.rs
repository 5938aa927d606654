use std::time::Duration;
use thiserror::Error;

/// Errors raised by host collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host refused to create a new window (popup blocker)
    #[error("popup blocked by host")]
    Blocked,
    /// The window is gone or no longer scriptable
    #[error("window unavailable: {0}")]
    Unavailable(String),
    #[error("host I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for HostError {
    fn from(value: std::io::Error) -> Self {
        HostError::Io(value.to_string())
    }
}

/// Opens new top-level browsing contexts
pub trait WindowHost: Send + Sync {
    fn open(&self, name: &str, features: &str) -> Result<Box<dyn PopupWindow>, HostError>;
}

/// Handle to an externally owned popup window.
///
/// The window can disappear at any moment without notification, so callers
/// must check [`PopupWindow::is_closed`] before every other call.
pub trait PopupWindow: Send {
    fn is_closed(&mut self) -> bool;

    /// Replace the window's document with generated markup
    fn write_document(&mut self, html: &str) -> Result<(), HostError>;

    /// Refresh the countdown shown inside the window
    fn update_countdown(&mut self, remaining: u32, low_time: bool) -> Result<(), HostError>;

    /// Point the window at `url`. After this the document is no longer
    /// scriptable; only liveness stays observable.
    fn navigate(&mut self, url: &str) -> Result<(), HostError>;

    /// Ask the host to close the window. The host may silently refuse.
    fn close(&mut self) -> Result<(), HostError>;
}

/// Status panel of the controlling page
pub trait StatusSurface: Send + Sync {
    fn show(&self, title: &str, body: &str);
    fn set_countdown(&self, clock: &str, low_time: bool);
    fn hide(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A transient message; it replaces any notice already on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub dismiss_after: Duration,
}

pub trait NoticeSurface: Send + Sync {
    fn notify(&self, notice: Notice);
}
