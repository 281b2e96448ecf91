use std::path::PathBuf;

use crate::errors::MemoraError;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Failed to create script directory '{path}': {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write script '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MemoraError for ScriptError {
    fn error_code(&self) -> &'static str {
        match self {
            ScriptError::DirectoryCreateFailed { .. } => "SCRIPT_DIRECTORY_CREATE_FAILED",
            ScriptError::WriteFailed { .. } => "SCRIPT_WRITE_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_write_failed_keeps_source() {
        let error = ScriptError::WriteFailed {
            path: PathBuf::from("/tmp/x.ps1"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().starts_with("Failed to write script"));
        assert!(error.source().is_some());
        assert_eq!(error.error_code(), "SCRIPT_WRITE_FAILED");
        assert!(!error.is_user_error());
    }
}
