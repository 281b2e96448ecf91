use crate::errors::MemoraError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Failed to create window: {message}")]
    WindowCreateFailed { message: String },

    #[error("Window no longer exists")]
    WindowGone,

    #[error("Refusing to open '{url}': not an http(s) URL")]
    InvalidUrl { url: String },

    #[error("Failed to open '{url}': {message}")]
    OpenExternalFailed { url: String, message: String },

    #[error("UI channel closed")]
    ChannelClosed,
}

impl MemoraError for HostError {
    fn error_code(&self) -> &'static str {
        match self {
            HostError::WindowCreateFailed { .. } => "HOST_WINDOW_CREATE_FAILED",
            HostError::WindowGone => "HOST_WINDOW_GONE",
            HostError::InvalidUrl { .. } => "HOST_INVALID_URL",
            HostError::OpenExternalFailed { .. } => "HOST_OPEN_EXTERNAL_FAILED",
            HostError::ChannelClosed => "HOST_CHANNEL_CLOSED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, HostError::InvalidUrl { .. })
    }
}
