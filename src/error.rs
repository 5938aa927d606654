//! Error taxonomy for the job lifecycle
//!
//! Only [`StartError`] crosses the public contract as an `Err`. Every other
//! failure ends the current job and is reported through its [`JobOutcome`]
//! and a notice.

use serde::Serialize;
use thiserror::Error;

use crate::host::HostError;

/// Which submitted field failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Url,
    Delay,
    Duration,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Field::Url => "url",
            Field::Delay => "delay",
            Field::Duration => "duration",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid URL (must include http:// or https://): {0}")]
    InvalidUrl(String),
    #[error("Unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("URL has no host: {0}")]
    MissingHost(String),
    #[error("{field} must be a whole number of seconds, got '{value}'")]
    NotANumber { field: Field, value: String },
    #[error("Delay must be between {min} and {max} seconds, got {value}")]
    DelayOutOfRange { value: i64, min: u32, max: u32 },
    #[error("Auto-close timer must be between {min} and {max} seconds, got {value}")]
    DurationOutOfRange { value: i64, min: u32, max: u32 },
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::InvalidUrl(_)
            | ValidationError::UnsupportedScheme(_)
            | ValidationError::MissingHost(_) => Field::Url,
            ValidationError::NotANumber { field, .. } => *field,
            ValidationError::DelayOutOfRange { .. } => Field::Delay,
            ValidationError::DurationOutOfRange { .. } => Field::Duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowOpenError {
    #[error("Failed to open window. Please allow popups for this site.")]
    Blocked,
    #[error("Failed to open window: it was closed immediately")]
    ClosedImmediately,
    #[error("Error opening window: {0}")]
    Host(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum NavigationError {
    #[error("Window was closed before navigation")]
    ClosedBeforeNavigation,
    #[error("Window was closed before auto-close timer could start")]
    ClosedBeforeAutoClose,
    #[error("Error navigating to website: {0}")]
    Host(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum CloseError {
    #[error("Timer completed, but browser prevented auto-close. Please close the tab manually.")]
    Refused,
    #[error("Timer completed, but unable to close window: {0}")]
    Host(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Window was closed manually during viewing time")]
pub struct UserCancelledExternally;

/// The controller service is no longer running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("controller service has stopped")]
pub struct ServiceStopped;

/// Failure of `start_job`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    WindowOpen(#[from] WindowOpenError),
    #[error(transparent)]
    Service(#[from] ServiceStopped),
}

impl From<HostError> for WindowOpenError {
    fn from(value: HostError) -> Self {
        match value {
            HostError::Blocked => WindowOpenError::Blocked,
            other => WindowOpenError::Host(other.to_string()),
        }
    }
}

/// How a job reached its terminal phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum JobOutcome {
    /// The window closed on schedule
    Completed { already_closed: bool },
    /// The countdown finished but the window could not be closed
    CloseFailed(CloseError),
    NavigationFailed(NavigationError),
    ClosedExternally,
    Cancelled,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }

    /// Message shown to the user for this outcome
    pub fn message(&self) -> String {
        match self {
            JobOutcome::Completed { already_closed: false } => {
                "Timer completed! Window closed successfully.".to_string()
            }
            JobOutcome::Completed { already_closed: true } => {
                "Timer completed! (Window was already closed)".to_string()
            }
            JobOutcome::CloseFailed(err) => err.to_string(),
            JobOutcome::NavigationFailed(err) => err.to_string(),
            JobOutcome::ClosedExternally => UserCancelledExternally.to_string(),
            JobOutcome::Cancelled => "Timer cancelled".to_string(),
        }
    }
}
