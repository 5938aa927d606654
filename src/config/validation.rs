use super::models::Config;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Timer interval must be positive: {field}")]
    ZeroInterval { field: &'static str },

    #[error("tick_interval must be 1s, got {value}")]
    TickNotOneSecond { value: String },

    #[error("close_grace ({grace}) must be shorter than liveness_poll ({poll})")]
    GraceNotShorterThanPoll { grace: String, poll: String },

    #[error("window.browser_command must name a program")]
    EmptyBrowserCommand,

    #[error("notice_ttl must be positive")]
    ZeroNoticeTtl,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigValidationError> {
    validate_timing(config)?;
    validate_display(config)?;
    validate_window(config)?;
    Ok(())
}

fn validate_timing(config: &Config) -> Result<(), ConfigValidationError> {
    let timing = &config.timing;

    for (field, value) in [
        ("tick_interval", timing.tick_interval),
        ("settle_delay", timing.settle_delay),
        ("liveness_poll", timing.liveness_poll),
        ("close_grace", timing.close_grace),
    ] {
        if value.is_zero() {
            return Err(ConfigValidationError::ZeroInterval { field });
        }
    }

    // Countdowns are kept in whole seconds
    if timing.tick_interval.as_duration() != Duration::from_secs(1) {
        return Err(ConfigValidationError::TickNotOneSecond {
            value: timing.tick_interval.to_string(),
        });
    }

    if timing.close_grace >= timing.liveness_poll {
        return Err(ConfigValidationError::GraceNotShorterThanPoll {
            grace: timing.close_grace.to_string(),
            poll: timing.liveness_poll.to_string(),
        });
    }

    Ok(())
}

fn validate_display(config: &Config) -> Result<(), ConfigValidationError> {
    if config.display.notice_ttl.is_zero() {
        return Err(ConfigValidationError::ZeroNoticeTtl);
    }
    Ok(())
}

fn validate_window(config: &Config) -> Result<(), ConfigValidationError> {
    let program = config.window.browser_command.first();
    if program.is_none_or(|p| p.trim().is_empty()) {
        return Err(ConfigValidationError::EmptyBrowserCommand);
    }
    Ok(())
}
