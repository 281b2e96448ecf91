use crate::errors::MemoraError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Executable '{program}' not found")]
    ExecutableNotFound { program: String },

    #[error("Failed to spawn '{program}': {message}")]
    SpawnFailed { program: String, message: String },

    #[error("'{program}' did not finish within {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    #[error("System error: {message}")]
    SystemError { message: String },
}

impl MemoraError for ProcessError {
    fn error_code(&self) -> &'static str {
        match self {
            ProcessError::ExecutableNotFound { .. } => "PROCESS_EXECUTABLE_NOT_FOUND",
            ProcessError::SpawnFailed { .. } => "PROCESS_SPAWN_FAILED",
            ProcessError::Timeout { .. } => "PROCESS_TIMEOUT",
            ProcessError::SystemError { .. } => "PROCESS_SYSTEM_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ProcessError::ExecutableNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let error = ProcessError::Timeout {
            program: "powershell.exe".to_string(),
            timeout_ms: 10000,
        };
        assert_eq!(
            error.to_string(),
            "'powershell.exe' did not finish within 10000ms"
        );
        assert_eq!(error.error_code(), "PROCESS_TIMEOUT");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_executable_not_found_is_user_error() {
        let error = ProcessError::ExecutableNotFound {
            program: "pwsh".to_string(),
        };
        assert!(error.is_user_error());
        assert_eq!(error.error_code(), "PROCESS_EXECUTABLE_NOT_FOUND");
    }
}
