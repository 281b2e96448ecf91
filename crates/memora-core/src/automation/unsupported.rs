use async_trait::async_trait;

use crate::automation::errors::AutomationError;
use crate::automation::traits::WindowAutomationPort;
use crate::automation::types::{KeySequence, WindowHandle, WindowInfo};

/// Port for platforms without an automation mechanism.
///
/// Every call fails with [`AutomationError::Unsupported`], so detection
/// falls back to the process table and capture reports a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedAutomation;

impl UnsupportedAutomation {
    fn unsupported<T>(&self) -> Result<T, AutomationError> {
        Err(AutomationError::Unsupported {
            platform: std::env::consts::OS,
        })
    }
}

#[async_trait]
impl WindowAutomationPort for UnsupportedAutomation {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    async fn foreground_window(&self) -> Result<Option<WindowHandle>, AutomationError> {
        self.unsupported()
    }

    async fn enumerate_visible_windows(&self) -> Result<Vec<WindowInfo>, AutomationError> {
        self.unsupported()
    }

    async fn set_foreground_window(&self, _handle: WindowHandle) -> Result<bool, AutomationError> {
        self.unsupported()
    }

    async fn read_clipboard_text(&self) -> Result<Option<String>, AutomationError> {
        self.unsupported()
    }

    async fn write_clipboard_text(&self, _text: &str) -> Result<(), AutomationError> {
        self.unsupported()
    }

    async fn send_keystroke_sequence(
        &self,
        _sequence: &KeySequence,
    ) -> Result<(), AutomationError> {
        self.unsupported()
    }
}
