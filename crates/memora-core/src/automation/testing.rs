//! In-memory automation port and process probe for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::automation::errors::AutomationError;
use crate::automation::traits::WindowAutomationPort;
use crate::automation::types::{KeyChord, KeySequence, WindowHandle, WindowInfo};
use crate::process::{ProcessError, ProcessProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailMode {
    Timeout,
    Script,
    Panic,
}

impl FailMode {
    fn error(self, operation: &'static str) -> AutomationError {
        match self {
            FailMode::Timeout => AutomationError::Timeout {
                operation,
                timeout_ms: 10,
            },
            FailMode::Script => AutomationError::ScriptFailed {
                operation,
                message: "simulated failure".to_string(),
            },
            FailMode::Panic => panic!("simulated panic in {operation}"),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub foreground: Option<WindowHandle>,
    pub windows: Vec<WindowInfo>,
    pub clipboard: Option<String>,
    /// What Ctrl+L, Ctrl+C copies while the given window is focused.
    pub address_bars: HashMap<WindowHandle, String>,
    pub refuse_activation: bool,
    pub failures: HashMap<&'static str, FailMode>,
    pub delays: HashMap<&'static str, Duration>,
    pub calls: Vec<String>,
}

/// Simulated desktop: windows, focus and a clipboard.
#[derive(Debug, Default)]
pub(crate) struct FakeAutomation {
    state: Mutex<FakeState>,
}

impl FakeAutomation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(&self, f: impl FnOnce(&mut FakeState)) {
        let mut state = self.state.lock().unwrap();
        f(&mut state);
    }

    pub fn add_window(&self, handle: i64, process: &str, title: &str) -> WindowHandle {
        let handle = WindowHandle::from_raw(handle);
        self.with_state(|s| {
            s.windows
                .push(WindowInfo::new(handle, handle.as_raw() as u32, process, title));
        });
        handle
    }

    pub fn fail(&self, operation: &'static str, mode: FailMode) {
        self.with_state(|s| {
            s.failures.insert(operation, mode);
        });
    }

    pub fn delay(&self, operation: &'static str, delay: Duration) {
        self.with_state(|s| {
            s.delays.insert(operation, delay);
        });
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clipboard(&self) -> Option<String> {
        self.state.lock().unwrap().clipboard.clone()
    }

    pub fn foreground(&self) -> Option<WindowHandle> {
        self.state.lock().unwrap().foreground
    }

    /// Record the call, apply any configured delay, then any failure.
    async fn enter(&self, operation: &'static str, detail: String) -> Result<(), AutomationError> {
        let (delay, failure) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(if detail.is_empty() {
                operation.to_string()
            } else {
                format!("{operation}:{detail}")
            });
            (
                state.delays.get(operation).copied(),
                state.failures.get(operation).copied(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(mode) => Err(mode.error(operation)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WindowAutomationPort for FakeAutomation {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn foreground_window(&self) -> Result<Option<WindowHandle>, AutomationError> {
        self.enter("foreground_window", String::new()).await?;
        Ok(self.foreground())
    }

    async fn enumerate_visible_windows(&self) -> Result<Vec<WindowInfo>, AutomationError> {
        self.enter("enumerate_visible_windows", String::new())
            .await?;
        Ok(self.state.lock().unwrap().windows.clone())
    }

    async fn set_foreground_window(&self, handle: WindowHandle) -> Result<bool, AutomationError> {
        self.enter("set_foreground_window", handle.as_raw().to_string())
            .await?;
        let mut state = self.state.lock().unwrap();
        if state.refuse_activation {
            return Ok(false);
        }
        state.foreground = Some(handle);
        Ok(true)
    }

    async fn read_clipboard_text(&self) -> Result<Option<String>, AutomationError> {
        self.enter("read_clipboard_text", String::new()).await?;
        Ok(self.clipboard())
    }

    async fn write_clipboard_text(&self, text: &str) -> Result<(), AutomationError> {
        self.enter("write_clipboard_text", text.to_string()).await?;
        let mut state = self.state.lock().unwrap();
        state.clipboard = (!text.is_empty()).then(|| text.to_string());
        Ok(())
    }

    async fn send_keystroke_sequence(
        &self,
        sequence: &KeySequence,
    ) -> Result<(), AutomationError> {
        let detail = sequence
            .chords()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.enter("send_keystroke_sequence", detail).await?;

        let mut state = self.state.lock().unwrap();
        if sequence.chords().contains(&KeyChord::COPY)
            && let Some(focused) = state.foreground
            && let Some(text) = state.address_bars.get(&focused).cloned()
        {
            state.clipboard = Some(text);
        }
        Ok(())
    }
}

/// Process table with a fixed answer.
#[derive(Debug)]
pub(crate) struct StaticProbe {
    result: Result<Vec<String>, String>,
}

impl StaticProbe {
    pub fn running(names: &[&str]) -> Self {
        Self {
            result: Ok(names.iter().map(|n| n.to_string()).collect()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl ProcessProbe for StaticProbe {
    async fn running_process_names(&self) -> Result<Vec<String>, ProcessError> {
        self.result
            .clone()
            .map_err(|message| ProcessError::SystemError { message })
    }
}
