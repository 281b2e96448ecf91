//! [`WindowAutomationPort`] backed by short-lived PowerShell processes.
//!
//! Each operation writes a script through the [`ScriptStore`], runs it with
//! the configured shell under a hard timeout and interprets the tagged
//! records it prints (see [`protocol`](crate::automation::protocol)).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use crate::automation::errors::AutomationError;
use crate::automation::protocol::{self, Record};
use crate::automation::scripts;
use crate::automation::traits::WindowAutomationPort;
use crate::automation::types::{KeySequence, WindowHandle, WindowInfo};
use crate::config::AutomationConfig;
use crate::process::{CommandOutput, Invocation, ProcessRunner};
use crate::script::ScriptStore;

const HOST_FLAGS: [&str; 7] = [
    "-NoProfile",
    "-NonInteractive",
    "-Sta",
    "-ExecutionPolicy",
    "Bypass",
    "-WindowStyle",
    "Hidden",
];

#[derive(Debug, Clone)]
pub struct PowerShellAutomation {
    shell: String,
    timeout: Duration,
    runner: ProcessRunner,
    store: ScriptStore,
}

impl PowerShellAutomation {
    pub fn new(shell: impl Into<String>, timeout: Duration, script_dir: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
            timeout,
            runner: ProcessRunner::new(),
            store: ScriptStore::new(script_dir, "ps1"),
        }
    }

    pub fn from_config(config: &AutomationConfig) -> Self {
        Self::new(
            config.shell(),
            config.subprocess_timeout(),
            config.script_dir(),
        )
    }

    /// Run one script to completion.
    ///
    /// The script goes through a temp file; if that cannot be written the
    /// body is passed inline as `-EncodedCommand` instead.
    async fn run_script(
        &self,
        operation: &'static str,
        script: &str,
    ) -> Result<CommandOutput, AutomationError> {
        let host = which::which(&self.shell).map_err(|e| AutomationError::HostUnavailable {
            message: format!("'{}' not found: {}", self.shell, e),
        })?;
        let program = host.to_string_lossy().to_string();

        debug!(
            event = "core.automation.script_started",
            operation = operation,
            host = %program
        );

        let base = Invocation::new(program, self.timeout)
            .args(HOST_FLAGS)
            .hidden_window();

        // Keep the guard alive until the host has exited.
        let (invocation, _script_file) = match self.store.write(operation, script) {
            Ok(file) => {
                let invocation = base
                    .arg("-File")
                    .arg(file.path().to_string_lossy().to_string());
                (invocation, Some(file))
            }
            Err(e) => {
                warn!(
                    event = "core.automation.script_inline_fallback",
                    operation = operation,
                    script_dir = %self.store.dir().display(),
                    error = %e
                );
                let invocation = base.arg("-EncodedCommand").arg(encode_command(script));
                (invocation, None)
            }
        };

        let output = self
            .runner
            .run(&invocation)
            .await
            .map_err(|e| AutomationError::from_process(operation, e))?;

        debug!(
            event = "core.automation.script_completed",
            operation = operation,
            exit_code = ?output.exit_code
        );

        Ok(output)
    }
}

/// Base64 of the UTF-16LE script text, as `-EncodedCommand` expects.
pub fn encode_command(script: &str) -> String {
    let bytes: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    STANDARD.encode(bytes)
}

/// Turn a finished script run into its deciding record.
///
/// A success record wins even when the exit status is non-zero. An
/// `ERROR` record, a non-zero exit without records, or output with no
/// records at all is a failure.
pub fn interpret_output<'a>(
    operation: &'static str,
    output: &'a CommandOutput,
    success_tags: &[&str],
) -> Result<Record<'a>, AutomationError> {
    match protocol::select_result(&output.stdout, success_tags) {
        Some(record) if success_tags.contains(&record.tag) => Ok(record),
        Some(record) if record.tag == protocol::TAG_ERROR => Err(AutomationError::ScriptFailed {
            operation,
            message: record.payload.trim().to_string(),
        }),
        _ if !output.success() => {
            let stderr = output.stderr.trim();
            Err(AutomationError::ScriptFailed {
                operation,
                message: if stderr.is_empty() {
                    format!("exited with status {:?}", output.exit_code)
                } else {
                    stderr.to_string()
                },
            })
        }
        _ => Err(AutomationError::UnexpectedOutput {
            operation,
            output: output.stdout.trim().to_string(),
        }),
    }
}

#[async_trait]
impl WindowAutomationPort for PowerShellAutomation {
    fn name(&self) -> &'static str {
        "powershell"
    }

    async fn foreground_window(&self) -> Result<Option<WindowHandle>, AutomationError> {
        const OP: &str = "foreground_window";
        let output = self.run_script(OP, &scripts::foreground_window()).await?;
        let record = interpret_output(OP, &output, &[protocol::TAG_FOREGROUND])?;
        let handle =
            protocol::parse_handle(record.payload).ok_or_else(|| AutomationError::UnexpectedOutput {
                operation: OP,
                output: record.payload.to_string(),
            })?;
        Ok((!handle.is_null()).then_some(handle))
    }

    async fn enumerate_visible_windows(&self) -> Result<Vec<WindowInfo>, AutomationError> {
        const OP: &str = "enumerate_visible_windows";
        let output = self
            .run_script(OP, &scripts::enumerate_visible_windows())
            .await?;
        interpret_output(OP, &output, &[protocol::TAG_DONE])?;

        let mut windows = Vec::new();
        for record in protocol::records_tagged(&output.stdout, protocol::TAG_WINDOW) {
            match protocol::parse_window(record.payload) {
                Some(window) => windows.push(window),
                None => debug!(
                    event = "core.automation.window_record_skipped",
                    payload = record.payload
                ),
            }
        }
        Ok(windows)
    }

    async fn set_foreground_window(&self, handle: WindowHandle) -> Result<bool, AutomationError> {
        const OP: &str = "set_foreground_window";
        let output = self
            .run_script(OP, &scripts::set_foreground_window(handle))
            .await?;
        let record = interpret_output(OP, &output, &[protocol::TAG_ACTIVATED])?;
        Ok(record.payload.trim().eq_ignore_ascii_case("true"))
    }

    async fn read_clipboard_text(&self) -> Result<Option<String>, AutomationError> {
        const OP: &str = "read_clipboard_text";
        let output = self.run_script(OP, &scripts::read_clipboard_text()).await?;
        let record = interpret_output(
            OP,
            &output,
            &[protocol::TAG_CLIPBOARD, protocol::TAG_CLIPBOARD_EMPTY],
        )?;
        if record.tag == protocol::TAG_CLIPBOARD_EMPTY {
            return Ok(None);
        }
        protocol::decode_text(record.payload)
            .map(Some)
            .ok_or_else(|| AutomationError::UnexpectedOutput {
                operation: OP,
                output: record.payload.to_string(),
            })
    }

    async fn write_clipboard_text(&self, text: &str) -> Result<(), AutomationError> {
        const OP: &str = "write_clipboard_text";
        let script = scripts::write_clipboard_text(&protocol::encode_text(text));
        let output = self.run_script(OP, &script).await?;
        interpret_output(OP, &output, &[protocol::TAG_OK])?;
        Ok(())
    }

    async fn send_keystroke_sequence(
        &self,
        sequence: &KeySequence,
    ) -> Result<(), AutomationError> {
        const OP: &str = "send_keystroke_sequence";
        let script =
            scripts::send_keystroke_sequence(sequence).ok_or_else(|| AutomationError::ScriptFailed {
                operation: OP,
                message: "sequence contains keys that cannot be sent".to_string(),
            })?;
        let output = self.run_script(OP, &script).await?;
        interpret_output(OP, &output, &[protocol::TAG_OK])?;
        Ok(())
    }
}
