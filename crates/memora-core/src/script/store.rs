//! Transient on-disk storage for generated automation scripts.
//!
//! Each script is written once under a unique name, executed once and
//! deleted when its [`ScriptFile`] guard is dropped. Nothing here persists
//! across invocations.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::script::errors::ScriptError;

#[derive(Debug, Clone)]
pub struct ScriptStore {
    dir: PathBuf,
    extension: String,
}

impl ScriptStore {
    /// `extension` without the leading dot, e.g. `"ps1"`.
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `body` to a fresh file named after `name`.
    ///
    /// The directory is created on demand. Concurrent writes with the same
    /// `name` never collide because every file gets a random suffix.
    pub fn write(&self, name: &str, body: &str) -> Result<ScriptFile, ScriptError> {
        fs::create_dir_all(&self.dir).map_err(|source| ScriptError::DirectoryCreateFailed {
            path: self.dir.clone(),
            source,
        })?;

        let file_name = format!("{}-{}.{}", name, uuid::Uuid::new_v4(), self.extension);
        let path = self.dir.join(file_name);

        fs::write(&path, body).map_err(|source| ScriptError::WriteFailed {
            path: path.clone(),
            source,
        })?;

        debug!(event = "core.script.write_completed", path = %path.display());
        Ok(ScriptFile { path })
    }
}

/// A written script. The file is removed when this guard is dropped.
#[derive(Debug)]
pub struct ScriptFile {
    path: PathBuf,
}

impl ScriptFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScriptFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(event = "core.script.cleanup_completed", path = %self.path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(
                    event = "core.script.cleanup_failed",
                    path = %self.path.display(),
                    error = %e,
                    message = "Script file left behind"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_drop_removes_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ScriptStore::new(temp_dir.path().join("scripts"), "ps1");

        let script = store.write("detect_browser", "Write-Output 'OK|'").unwrap();
        let path = script.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.parent(), Some(store.dir()));
        assert_eq!(path.extension().unwrap(), "ps1");
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("detect_browser-")
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "Write-Output 'OK|'");

        drop(script);
        assert!(!path.exists());
    }

    #[test]
    fn test_same_name_gets_distinct_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ScriptStore::new(temp_dir.path(), "ps1");

        let first = store.write("capture", "a").unwrap();
        let second = store.write("capture", "b").unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn test_drop_tolerates_already_deleted_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ScriptStore::new(temp_dir.path(), "ps1");

        let script = store.write("gone", "x").unwrap();
        fs::remove_file(script.path()).unwrap();
        drop(script);
    }

    #[test]
    fn test_unwritable_directory_reports_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "file in the way").unwrap();

        let store = ScriptStore::new(blocker.join("scripts"), "ps1");
        let result = store.write("detect", "x");
        assert!(matches!(
            result,
            Err(ScriptError::DirectoryCreateFailed { .. })
        ));
    }
}
