use async_trait::async_trait;

use crate::automation::errors::AutomationError;
use crate::automation::types::{KeySequence, WindowHandle, WindowInfo};

/// OS window and clipboard automation used by detection and capture.
///
/// Implementations wrap a platform mechanism (a scripting host on Windows).
/// Every call is independent: no state is carried between calls, and the
/// foreground window and clipboard may be changed by other programs in
/// between.
#[async_trait]
pub trait WindowAutomationPort: Send + Sync {
    /// Platform mechanism name, for logs.
    fn name(&self) -> &'static str;

    /// The window that currently has keyboard focus, if any.
    async fn foreground_window(&self) -> Result<Option<WindowHandle>, AutomationError>;

    /// Visible top-level windows with their owning process and title.
    async fn enumerate_visible_windows(&self) -> Result<Vec<WindowInfo>, AutomationError>;

    /// Ask the OS to activate `handle`.
    ///
    /// Returns `Ok(false)` when the OS refused the activation (focus-steal
    /// prevention) without the mechanism itself failing.
    async fn set_foreground_window(&self, handle: WindowHandle) -> Result<bool, AutomationError>;

    /// Current clipboard text, `None` when the clipboard holds no text.
    async fn read_clipboard_text(&self) -> Result<Option<String>, AutomationError>;

    /// Replace the clipboard text. An empty string clears the clipboard.
    async fn write_clipboard_text(&self, text: &str) -> Result<(), AutomationError>;

    /// Send synthetic keystrokes to whatever window has focus.
    async fn send_keystroke_sequence(&self, sequence: &KeySequence)
    -> Result<(), AutomationError>;
}
