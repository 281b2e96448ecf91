use crate::automation::AutomationError;
use crate::errors::MemoraError;

/// Why a capture produced no URL.
///
/// `Display` is the diagnostic text for logs; [`CaptureFailure::user_message`]
/// is what the UI shows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureFailure {
    #[error("No browser process is running")]
    NoBrowserRunning,

    #[error("No visible browser window")]
    NoBrowserWindow,

    #[error("Captured value is not a URL: {raw:?}")]
    InvalidCapturedValue { raw: String },

    #[error("Automation subprocess timed out: {message}")]
    SubprocessTimeout { message: String },

    #[error("Capture did not finish within {timeout_ms}ms")]
    OperationTimeout { timeout_ms: u64 },

    #[error("Automation subprocess failed: {message}")]
    SubprocessFailure { message: String },

    #[error("Capture window is not ready for capture (state: {state})")]
    NotReady { state: &'static str },

    #[error("Unexpected capture error: {message}")]
    Unexpected { message: String },
}

impl CaptureFailure {
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureFailure::NoBrowserRunning => "No browser is currently running",
            CaptureFailure::NoBrowserWindow => "No browser windows are currently open",
            CaptureFailure::InvalidCapturedValue { .. } => {
                "Could not capture a URL from the current browser tab"
            }
            CaptureFailure::SubprocessTimeout { .. } | CaptureFailure::OperationTimeout { .. } => {
                "URL capture timed out - please try again"
            }
            CaptureFailure::SubprocessFailure { .. } => {
                "Browser automation is unavailable on this system"
            }
            CaptureFailure::NotReady { .. } => {
                "The capture window is still loading - please try again"
            }
            CaptureFailure::Unexpected { .. } => {
                "An unexpected error occurred while capturing the URL"
            }
        }
    }
}

impl From<AutomationError> for CaptureFailure {
    fn from(error: AutomationError) -> Self {
        if error.is_timeout() {
            CaptureFailure::SubprocessTimeout {
                message: error.to_string(),
            }
        } else {
            CaptureFailure::SubprocessFailure {
                message: error.to_string(),
            }
        }
    }
}

impl MemoraError for CaptureFailure {
    fn error_code(&self) -> &'static str {
        match self {
            CaptureFailure::NoBrowserRunning => "NO_BROWSER_RUNNING",
            CaptureFailure::NoBrowserWindow => "NO_BROWSER_WINDOW",
            CaptureFailure::InvalidCapturedValue { .. } => "INVALID_CAPTURED_VALUE",
            CaptureFailure::SubprocessTimeout { .. } => "SUBPROCESS_TIMEOUT",
            CaptureFailure::OperationTimeout { .. } => "OPERATION_TIMEOUT",
            CaptureFailure::SubprocessFailure { .. } => "SUBPROCESS_FAILURE",
            CaptureFailure::NotReady { .. } => "NOT_READY",
            CaptureFailure::Unexpected { .. } => "UNEXPECTED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            CaptureFailure::NoBrowserRunning
                | CaptureFailure::NoBrowserWindow
                | CaptureFailure::InvalidCapturedValue { .. }
                | CaptureFailure::NotReady { .. }
        )
    }
}
