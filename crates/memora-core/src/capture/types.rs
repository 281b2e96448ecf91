use serde::{Deserialize, Serialize};

use crate::capture::errors::CaptureFailure;
use crate::errors::MemoraError;

/// Outcome of one capture, as delivered to the UI.
///
/// `url` is only set on success; `error` is the user-facing message and
/// `error_code` the stable taxonomy code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CaptureResult {
    pub fn succeeded(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            error: None,
            error_code: None,
        }
    }

    pub fn failed(failure: &CaptureFailure) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(failure.user_message().to_string()),
            error_code: Some(failure.error_code().to_string()),
        }
    }
}
