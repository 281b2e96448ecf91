use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::BrowserInfo;
use crate::capture::CaptureResult;
use crate::config::MemoraConfig;

/// Where the capture window is in its show/detect/capture cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickWindowState {
    Hidden,
    /// Window requested and being revealed; detection not started yet.
    Showing,
    DetectionPending,
    DetectionComplete(BrowserInfo),
    CapturePending,
    CaptureComplete(CaptureResult),
}

impl QuickWindowState {
    pub fn name(&self) -> &'static str {
        match self {
            QuickWindowState::Hidden => "hidden",
            QuickWindowState::Showing => "showing",
            QuickWindowState::DetectionPending => "detection_pending",
            QuickWindowState::DetectionComplete(_) => "detection_complete",
            QuickWindowState::CapturePending => "capture_pending",
            QuickWindowState::CaptureComplete(_) => "capture_complete",
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, QuickWindowState::CapturePending)
    }

    /// Whether a capture may start from this state.
    pub fn accepts_capture(&self) -> bool {
        matches!(
            self,
            QuickWindowState::DetectionPending
                | QuickWindowState::DetectionComplete(_)
                | QuickWindowState::CaptureComplete(_)
        )
    }
}

/// Usable area of the primary display, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkArea {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowGeometry {
    /// A `width` x `height` window `margin` pixels in from the bottom-right
    /// corner of `area`.
    pub fn bottom_right(area: &WorkArea, width: u32, height: u32, margin: u32) -> Self {
        let x = area.x as i64 + area.width as i64 - width as i64 - margin as i64;
        let y = area.y as i64 + area.height as i64 - height as i64 - margin as i64;
        Self {
            x: x.max(area.x as i64) as i32,
            y: y.max(area.y as i64) as i32,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlwaysOnTopLevel {
    Normal,
    /// Above full-screen and screen-saver windows, used while capturing.
    ScreenSaver,
}

/// Shell to UI notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiNotification {
    DetectionStarted,
    DetectionResult { result: BrowserInfo },
    CaptureResult { result: CaptureResult },
}

/// UI to shell commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiCommand {
    Toggle,
    RequestCapture,
    Hide,
    /// Re-run detection for the current cycle, without the mount delay.
    DetectBrowser,
    OpenExternal { url: String },
    /// Bring up the main application window.
    ShowMainWindow,
}

/// Events raised by the window backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowEvent {
    FocusLost,
    /// The global toggle shortcut fired.
    Shortcut,
    WindowClosed,
    Quit,
}

/// Geometry and timing the controller works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub ready_timeout: Duration,
    pub mount_delay: Duration,
    pub fallback_timeout: Duration,
    pub primary_shortcut: String,
    pub fallback_shortcut: String,
}

impl From<&MemoraConfig> for ControllerSettings {
    fn from(config: &MemoraConfig) -> Self {
        Self {
            width: config.window.width(),
            height: config.window.height(),
            margin: config.window.margin(),
            ready_timeout: config.window.ready_timeout(),
            mount_delay: config.detection.ui_mount_delay(),
            fallback_timeout: config.detection.fallback_timeout(),
            primary_shortcut: config.shortcut.primary().to_string(),
            fallback_shortcut: config.shortcut.fallback().to_string(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&MemoraConfig::default())
    }
}
