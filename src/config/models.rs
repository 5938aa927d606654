use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Timer intervals driving the job lifecycle
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Length of one countdown tick. Both countdowns and the backstop are
    /// measured in ticks.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: HumanDuration,
    /// Pause between navigating the popup and starting the auto-close phase
    #[serde(default = "default_settle_delay")]
    pub settle_delay: HumanDuration,
    #[serde(default = "default_liveness_poll")]
    pub liveness_poll: HumanDuration,
    /// Wait after a close request before re-checking the window
    #[serde(default = "default_close_grace")]
    pub close_grace: HumanDuration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            settle_delay: default_settle_delay(),
            liveness_poll: default_liveness_poll(),
            close_grace: default_close_grace(),
        }
    }
}

impl TimingConfig {
    /// Backstop deadline for a viewing duration of `seconds`
    pub fn backstop_after(&self, seconds: u32) -> Duration {
        Duration::from_secs(u64::from(seconds))
    }
}

fn default_tick_interval() -> HumanDuration {
    HumanDuration::from_secs(1)
}

fn default_settle_delay() -> HumanDuration {
    HumanDuration::from_secs(1)
}

fn default_liveness_poll() -> HumanDuration {
    HumanDuration::from_secs(2)
}

fn default_close_grace() -> HumanDuration {
    HumanDuration::from_millis(200)
}

/// Status display and notice settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Low-time warning threshold while waiting to open
    #[serde(default = "default_open_warning_secs")]
    pub open_warning_secs: u32,
    /// Low-time warning threshold while waiting to close
    #[serde(default = "default_close_warning_secs")]
    pub close_warning_secs: u32,
    /// How long a notice stays visible
    #[serde(default = "default_notice_ttl")]
    pub notice_ttl: HumanDuration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            open_warning_secs: default_open_warning_secs(),
            close_warning_secs: default_close_warning_secs(),
            notice_ttl: default_notice_ttl(),
        }
    }
}

fn default_open_warning_secs() -> u32 {
    3
}

fn default_close_warning_secs() -> u32 {
    10
}

fn default_notice_ttl() -> HumanDuration {
    HumanDuration::from_secs(4)
}

/// Popup window request settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_name")]
    pub name: String,
    #[serde(default = "default_window_features")]
    pub features: String,
    /// Program and leading arguments used by the browser-command host.
    /// The target URL is appended as the final argument.
    #[serde(default = "default_browser_command")]
    pub browser_command: Vec<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            name: default_window_name(),
            features: default_window_features(),
            browser_command: default_browser_command(),
        }
    }
}

fn default_window_name() -> String {
    "_blank".to_string()
}

fn default_window_features() -> String {
    "width=1200,height=800,scrollbars=yes,resizable=yes,status=yes,toolbar=yes,menubar=yes,location=yes"
        .to_string()
}

fn default_browser_command() -> Vec<String> {
    vec!["firefox".to_string(), "--new-window".to_string()]
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
