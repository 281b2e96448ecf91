//! Configuration type definitions for Memora.
//!
//! These types are serialized/deserialized from TOML config files. Every
//! tunable is optional in the file so that project config can override a
//! single value without resetting its siblings; accessors in
//! [`super::defaults`] supply the built-in values.
//!
//! # Example Configuration
//!
//! ```toml
//! [automation]
//! shell = "powershell.exe"
//! subprocess_timeout_ms = 10000
//!
//! [detection]
//! timeout_ms = 8000
//! fallback_timeout_ms = 5000
//!
//! [capture]
//! timeout_ms = 12000
//! keystroke_delay_ms = 600
//!
//! [window]
//! width = 320
//! height = 480
//!
//! [shortcut]
//! primary = "Ctrl+Space"
//! fallback = "Alt+Space"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.memora/config.toml`
/// 2. Project config: `./.memora/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MemoraConfig {
    /// Scripting host settings
    #[serde(default)]
    pub automation: AutomationConfig,

    /// Active browser detection
    #[serde(default)]
    pub detection: DetectionConfig,

    /// URL capture sequence timing
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Quick capture window geometry
    #[serde(default)]
    pub window: WindowConfig,

    /// Global shortcut that toggles the quick window
    #[serde(default)]
    pub shortcut: ShortcutConfig,
}

/// Scripting host configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AutomationConfig {
    /// Scripting host executable.
    /// Default: `powershell.exe`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    /// Upper bound for a single scripting host invocation.
    /// Default: 10000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subprocess_timeout_ms: Option<u64>,

    /// Directory for generated scripts.
    /// Default: `<data_local_dir>/memora/scripts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DetectionConfig {
    /// Overall bound for one detection, enforced by the detector.
    /// Default: 8000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Independent timer in the quick window that reports `TIMEOUT`
    /// if detection has not answered yet.
    /// Default: 5000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_timeout_ms: Option<u64>,

    /// Delay between showing the window and starting detection, so the UI
    /// has mounted its listeners.
    /// Default: 500ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_mount_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CaptureConfig {
    /// Overall bound for one capture.
    /// Default: 12000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Wait after activating the target browser window.
    /// Default: 500ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_settle_ms: Option<u64>,

    /// Wait after clearing the clipboard.
    /// Default: 200ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard_settle_ms: Option<u64>,

    /// Wait after each synthetic keystroke.
    /// Default: 600ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keystroke_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WindowConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Distance from the bottom-right corner of the primary work area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,

    /// How long to wait for a freshly created window to report ready.
    /// Default: 3000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ShortcutConfig {
    /// Accelerator registered first.
    /// Default: `Ctrl+Space`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,

    /// Accelerator tried when the primary one is taken.
    /// Default: `Alt+Space`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}
