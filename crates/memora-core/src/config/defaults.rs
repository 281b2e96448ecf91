//! Built-in values for every optional configuration field.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::types::{
    AutomationConfig, CaptureConfig, DetectionConfig, ShortcutConfig, WindowConfig,
};

pub const DEFAULT_SHELL: &str = "powershell.exe";
pub const DEFAULT_SUBPROCESS_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_DETECTION_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_DETECTION_FALLBACK_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_UI_MOUNT_DELAY_MS: u64 = 500;

pub const DEFAULT_CAPTURE_TIMEOUT_MS: u64 = 12_000;
pub const DEFAULT_ACTIVATION_SETTLE_MS: u64 = 500;
pub const DEFAULT_CLIPBOARD_SETTLE_MS: u64 = 200;
pub const DEFAULT_KEYSTROKE_DELAY_MS: u64 = 600;
/// Bound for putting clipboard and focus back after a capture.
pub const DEFAULT_RESTORE_TIMEOUT_MS: u64 = 1_000;

pub const DEFAULT_WINDOW_WIDTH: u32 = 320;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 480;
pub const DEFAULT_WINDOW_MARGIN: u32 = 20;
pub const DEFAULT_WINDOW_READY_TIMEOUT_MS: u64 = 3_000;

pub const DEFAULT_PRIMARY_SHORTCUT: &str = "Ctrl+Space";
pub const DEFAULT_FALLBACK_SHORTCUT: &str = "Alt+Space";

/// Default directory for generated scripts.
///
/// Uses the per-user local data directory so it stays writable in installed
/// builds; falls back to the OS temp directory.
pub fn default_script_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("memora").join("scripts"),
        None => std::env::temp_dir().join("memora-scripts"),
    }
}

impl AutomationConfig {
    pub fn shell(&self) -> &str {
        self.shell.as_deref().unwrap_or(DEFAULT_SHELL)
    }

    pub fn subprocess_timeout(&self) -> Duration {
        Duration::from_millis(
            self.subprocess_timeout_ms
                .unwrap_or(DEFAULT_SUBPROCESS_TIMEOUT_MS),
        )
    }

    pub fn script_dir(&self) -> PathBuf {
        self.script_dir.clone().unwrap_or_else(default_script_dir)
    }
}

impl DetectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_DETECTION_TIMEOUT_MS))
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(
            self.fallback_timeout_ms
                .unwrap_or(DEFAULT_DETECTION_FALLBACK_TIMEOUT_MS),
        )
    }

    pub fn ui_mount_delay(&self) -> Duration {
        Duration::from_millis(self.ui_mount_delay_ms.unwrap_or(DEFAULT_UI_MOUNT_DELAY_MS))
    }
}

impl CaptureConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_CAPTURE_TIMEOUT_MS))
    }

    pub fn activation_settle(&self) -> Duration {
        Duration::from_millis(
            self.activation_settle_ms
                .unwrap_or(DEFAULT_ACTIVATION_SETTLE_MS),
        )
    }

    pub fn clipboard_settle(&self) -> Duration {
        Duration::from_millis(self.clipboard_settle_ms.unwrap_or(DEFAULT_CLIPBOARD_SETTLE_MS))
    }

    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_ms.unwrap_or(DEFAULT_KEYSTROKE_DELAY_MS))
    }
}

impl WindowConfig {
    pub fn width(&self) -> u32 {
        self.width.unwrap_or(DEFAULT_WINDOW_WIDTH)
    }

    pub fn height(&self) -> u32 {
        self.height.unwrap_or(DEFAULT_WINDOW_HEIGHT)
    }

    pub fn margin(&self) -> u32 {
        self.margin.unwrap_or(DEFAULT_WINDOW_MARGIN)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(
            self.ready_timeout_ms
                .unwrap_or(DEFAULT_WINDOW_READY_TIMEOUT_MS),
        )
    }
}

impl ShortcutConfig {
    pub fn primary(&self) -> &str {
        self.primary.as_deref().unwrap_or(DEFAULT_PRIMARY_SHORTCUT)
    }

    pub fn fallback(&self) -> &str {
        self.fallback.as_deref().unwrap_or(DEFAULT_FALLBACK_SHORTCUT)
    }
}
