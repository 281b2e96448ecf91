//! Configuration validation logic.

use crate::config::types::MemoraConfig;
use crate::errors::ConfigError;

/// Validate a MemoraConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - Scripting host name, if set, must not be blank
/// - Timeouts, if set, must be non-zero (delays may be zero)
/// - Window dimensions, if set, must be non-zero
/// - Shortcut accelerators, if set, must not be blank
pub fn validate_config(config: &MemoraConfig) -> Result<(), ConfigError> {
    if let Some(ref shell) = config.automation.shell
        && shell.trim().is_empty()
    {
        return Err(invalid("automation.shell must not be empty"));
    }

    let timeouts = [
        (
            "automation.subprocess_timeout_ms",
            config.automation.subprocess_timeout_ms,
        ),
        ("detection.timeout_ms", config.detection.timeout_ms),
        (
            "detection.fallback_timeout_ms",
            config.detection.fallback_timeout_ms,
        ),
        ("capture.timeout_ms", config.capture.timeout_ms),
        ("window.ready_timeout_ms", config.window.ready_timeout_ms),
    ];
    for (name, value) in timeouts {
        if value == Some(0) {
            return Err(invalid(&format!("{} must be greater than zero", name)));
        }
    }

    if config.window.width == Some(0) || config.window.height == Some(0) {
        return Err(invalid("window.width and window.height must be greater than zero"));
    }

    for (name, value) in [
        ("shortcut.primary", &config.shortcut.primary),
        ("shortcut.fallback", &config.shortcut.fallback),
    ] {
        if let Some(accelerator) = value
            && accelerator.trim().is_empty()
        {
            return Err(invalid(&format!("{} must not be empty", name)));
        }
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidConfiguration {
        message: message.to_string(),
    }
}
