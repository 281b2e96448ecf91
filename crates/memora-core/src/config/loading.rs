//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.memora/config.toml` (global user preferences)
//! 3. **Project config** - `./.memora/config.toml` (working-directory overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::types::{
    AutomationConfig, CaptureConfig, DetectionConfig, MemoraConfig, ShortcutConfig, WindowConfig,
};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

/// Load configuration from the hierarchy of config files.
///
/// Missing files are not errors; unreadable or unparsable files are.
/// The merged result is validated before it is returned.
pub fn load_hierarchy() -> Result<MemoraConfig, ConfigError> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".memora").join("config.toml"));
    }
    paths.push(std::env::current_dir()?.join(".memora").join("config.toml"));

    load_from_paths(&paths)
}

/// Load and merge the given config files in order, skipping missing ones.
pub fn load_from_paths(paths: &[PathBuf]) -> Result<MemoraConfig, ConfigError> {
    let mut config = MemoraConfig::default();

    for path in paths {
        match load_config_file(path) {
            Ok(layer) => {
                debug!(event = "core.config.layer_loaded", path = %path.display());
                config = merge_configs(config, layer);
            }
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    validate_config(&config)?;
    Ok(config)
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<MemoraConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}

/// Merge two configurations, with `override_config` taking precedence
/// wherever it sets a value.
pub fn merge_configs(base: MemoraConfig, override_config: MemoraConfig) -> MemoraConfig {
    let (b, o) = (base, override_config);
    MemoraConfig {
        automation: AutomationConfig {
            shell: o.automation.shell.or(b.automation.shell),
            subprocess_timeout_ms: o
                .automation
                .subprocess_timeout_ms
                .or(b.automation.subprocess_timeout_ms),
            script_dir: o.automation.script_dir.or(b.automation.script_dir),
        },
        detection: DetectionConfig {
            timeout_ms: o.detection.timeout_ms.or(b.detection.timeout_ms),
            fallback_timeout_ms: o
                .detection
                .fallback_timeout_ms
                .or(b.detection.fallback_timeout_ms),
            ui_mount_delay_ms: o
                .detection
                .ui_mount_delay_ms
                .or(b.detection.ui_mount_delay_ms),
        },
        capture: CaptureConfig {
            timeout_ms: o.capture.timeout_ms.or(b.capture.timeout_ms),
            activation_settle_ms: o
                .capture
                .activation_settle_ms
                .or(b.capture.activation_settle_ms),
            clipboard_settle_ms: o
                .capture
                .clipboard_settle_ms
                .or(b.capture.clipboard_settle_ms),
            keystroke_delay_ms: o
                .capture
                .keystroke_delay_ms
                .or(b.capture.keystroke_delay_ms),
        },
        window: WindowConfig {
            width: o.window.width.or(b.window.width),
            height: o.window.height.or(b.window.height),
            margin: o.window.margin.or(b.window.margin),
            ready_timeout_ms: o.window.ready_timeout_ms.or(b.window.ready_timeout_ms),
        },
        shortcut: ShortcutConfig {
            primary: o.shortcut.primary.or(b.shortcut.primary),
            fallback: o.shortcut.fallback.or(b.shortcut.fallback),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_config_hierarchy_integration() {
        let temp_dir = tempfile::tempdir().unwrap();
        let user_path = temp_dir.path().join("user.toml");
        let project_path = temp_dir.path().join("project.toml");

        fs::write(
            &user_path,
            r#"
[automation]
shell = "pwsh"
subprocess_timeout_ms = 20000

[capture]
keystroke_delay_ms = 800
"#,
        )
        .unwrap();
        fs::write(
            &project_path,
            r#"
[capture]
timeout_ms = 15000
"#,
        )
        .unwrap();

        let config = load_from_paths(&[user_path, project_path]).unwrap();
        assert_eq!(config.automation.shell(), "pwsh");
        assert_eq!(
            config.automation.subprocess_timeout(),
            Duration::from_secs(20)
        );
        // Project layer sets timeout, user layer keeps keystroke delay
        assert_eq!(config.capture.timeout(), Duration::from_secs(15));
        assert_eq!(
            config.capture.keystroke_delay(),
            Duration::from_millis(800)
        );
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load_from_paths(&[temp_dir.path().join("absent.toml")]).unwrap();
        assert_eq!(config, MemoraConfig::default());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "invalid toml [[[").unwrap();

        let result = load_from_paths(&[path]);
        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_invalid_layer_fails_validation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("zero.toml");
        fs::write(&path, "[capture]\ntimeout_ms = 0\n").unwrap();

        let result = load_from_paths(&[path]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_merge_keeps_base_when_override_unset() {
        let base: MemoraConfig = toml::from_str(
            r#"
[shortcut]
primary = "Ctrl+Shift+M"
fallback = "Alt+M"
"#,
        )
        .unwrap();
        let override_config: MemoraConfig = toml::from_str(
            r#"
[shortcut]
fallback = "Alt+Q"
"#,
        )
        .unwrap();

        let merged = merge_configs(base, override_config);
        assert_eq!(merged.shortcut.primary(), "Ctrl+Shift+M");
        assert_eq!(merged.shortcut.fallback(), "Alt+Q");
    }
}
