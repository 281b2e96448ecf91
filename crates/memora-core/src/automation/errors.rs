use crate::errors::MemoraError;
use crate::process::ProcessError;

#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("Scripting host unavailable: {message}")]
    HostUnavailable { message: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("{operation} failed: {message}")]
    ScriptFailed {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} produced unexpected output: {output}")]
    UnexpectedOutput {
        operation: &'static str,
        output: String,
    },

    #[error("Window automation is not supported on {platform}")]
    Unsupported { platform: &'static str },
}

impl AutomationError {
    /// Attach the operation name to a process failure.
    pub fn from_process(operation: &'static str, error: ProcessError) -> Self {
        match error {
            ProcessError::Timeout { timeout_ms, .. } => AutomationError::Timeout {
                operation,
                timeout_ms,
            },
            ProcessError::ExecutableNotFound { .. } | ProcessError::SpawnFailed { .. } => {
                AutomationError::HostUnavailable {
                    message: error.to_string(),
                }
            }
            ProcessError::SystemError { message } => {
                AutomationError::ScriptFailed { operation, message }
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AutomationError::Timeout { .. })
    }
}

impl MemoraError for AutomationError {
    fn error_code(&self) -> &'static str {
        match self {
            AutomationError::HostUnavailable { .. } => "AUTOMATION_HOST_UNAVAILABLE",
            AutomationError::Timeout { .. } => "AUTOMATION_TIMEOUT",
            AutomationError::ScriptFailed { .. } => "AUTOMATION_SCRIPT_FAILED",
            AutomationError::UnexpectedOutput { .. } => "AUTOMATION_UNEXPECTED_OUTPUT",
            AutomationError::Unsupported { .. } => "AUTOMATION_UNSUPPORTED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            AutomationError::HostUnavailable { .. } | AutomationError::Unsupported { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_process_timeout() {
        let error = AutomationError::from_process(
            "read_clipboard_text",
            ProcessError::Timeout {
                program: "powershell.exe".to_string(),
                timeout_ms: 10000,
            },
        );
        assert!(error.is_timeout());
        assert_eq!(
            error.to_string(),
            "read_clipboard_text timed out after 10000ms"
        );
        assert_eq!(error.error_code(), "AUTOMATION_TIMEOUT");
    }

    #[test]
    fn test_from_process_missing_host() {
        let error = AutomationError::from_process(
            "foreground_window",
            ProcessError::ExecutableNotFound {
                program: "powershell.exe".to_string(),
            },
        );
        assert!(matches!(error, AutomationError::HostUnavailable { .. }));
        assert!(error.to_string().contains("powershell.exe"));
        assert!(error.is_user_error());
    }

    #[test]
    fn test_unsupported_display() {
        let error = AutomationError::Unsupported { platform: "linux" };
        assert_eq!(
            error.to_string(),
            "Window automation is not supported on linux"
        );
        assert!(!error.is_timeout());
    }
}
