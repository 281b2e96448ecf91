//! Process table queries.

use async_trait::async_trait;
use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

use crate::process::errors::ProcessError;

/// Answers "which processes are running right now".
///
/// Kept behind a trait so browser presence checks can be exercised without
/// a real process table.
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    /// Names of all running processes, as reported by the OS
    /// (may include an `.exe` suffix or a path on some platforms).
    async fn running_process_names(&self) -> Result<Vec<String>, ProcessError>;
}

/// [`ProcessProbe`] backed by `sysinfo`.
#[derive(Debug, Clone, Default)]
pub struct SysinfoProbe;

impl SysinfoProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessProbe for SysinfoProbe {
    async fn running_process_names(&self) -> Result<Vec<String>, ProcessError> {
        // A full refresh walks the whole process table; keep it off the
        // async worker threads.
        let names = tokio::task::spawn_blocking(|| {
            let mut system = System::new();
            system.refresh_processes(ProcessesToUpdate::All, true);
            system
                .processes()
                .values()
                .map(|process| process.name().to_string_lossy().to_string())
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| ProcessError::SystemError {
            message: format!("process enumeration task failed: {}", e),
        })?;

        debug!(event = "core.process.probe_completed", count = names.len());
        Ok(names)
    }
}
