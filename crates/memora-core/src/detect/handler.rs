use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::automation::{WindowAutomationPort, WindowHandle, WindowInfo};
use crate::browser::{BrowserInfo, BrowserKind, running_browsers};
use crate::config::DetectionConfig;
use crate::process::ProcessProbe;

/// A visible window owned by an allow-listed browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserWindow {
    pub kind: BrowserKind,
    pub window: WindowInfo,
}

/// Keep only browser windows, preserving enumeration order.
pub fn browser_windows(windows: Vec<WindowInfo>) -> Vec<BrowserWindow> {
    windows
        .into_iter()
        .filter_map(|window| window.browser().map(|kind| BrowserWindow { kind, window }))
        .collect()
}

/// The foreground candidate, else the first one with a title.
pub fn preferred_window(
    candidates: &[BrowserWindow],
    foreground: Option<WindowHandle>,
) -> Option<&BrowserWindow> {
    if let Some(handle) = foreground
        && let Some(focused) = candidates.iter().find(|c| c.window.handle == handle)
    {
        return Some(focused);
    }
    candidates.iter().find(|c| c.window.has_title())
}

/// Answers "which browser is the user looking at".
///
/// Never fails: every error path ends in a [`BrowserInfo`] with a sentinel
/// browser value.
#[derive(Clone)]
pub struct BrowserDetector {
    port: Arc<dyn WindowAutomationPort>,
    probe: Arc<dyn ProcessProbe>,
    timeout: Duration,
}

impl BrowserDetector {
    pub fn new(
        port: Arc<dyn WindowAutomationPort>,
        probe: Arc<dyn ProcessProbe>,
        timeout: Duration,
    ) -> Self {
        Self {
            port,
            probe,
            timeout,
        }
    }

    pub fn from_config(
        port: Arc<dyn WindowAutomationPort>,
        probe: Arc<dyn ProcessProbe>,
        config: &DetectionConfig,
    ) -> Self {
        Self::new(port, probe, config.timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn detect(&self) -> BrowserInfo {
        info!(
            event = "core.detect.detect_started",
            port = self.port.name(),
            timeout_ms = self.timeout.as_millis() as u64
        );

        let result = match tokio::time::timeout(self.timeout, self.detect_windows()).await {
            Ok(info) => info,
            Err(_) => {
                warn!(
                    event = "core.detect.detect_timed_out",
                    timeout_ms = self.timeout.as_millis() as u64
                );
                BrowserInfo::timed_out()
            }
        };

        info!(
            event = "core.detect.detect_completed",
            success = result.success,
            browser = %result.browser,
            has_browser = result.has_browser
        );
        result
    }

    async fn detect_windows(&self) -> BrowserInfo {
        let windows = match self.port.enumerate_visible_windows().await {
            Ok(windows) => windows,
            Err(e) => {
                warn!(
                    event = "core.detect.enumerate_failed",
                    error = %e,
                    message = "Falling back to process table"
                );
                return self.detect_processes(&e.to_string()).await;
            }
        };

        let candidates = browser_windows(windows);
        debug!(
            event = "core.detect.candidates_found",
            count = candidates.len()
        );
        if candidates.is_empty() {
            return BrowserInfo::none();
        }

        let foreground = match self.port.foreground_window().await {
            Ok(handle) => handle,
            Err(e) => {
                debug!(event = "core.detect.foreground_failed", error = %e);
                None
            }
        };

        match preferred_window(&candidates, foreground) {
            Some(chosen) => BrowserInfo::found(chosen.kind, chosen.window.title.clone()),
            None => BrowserInfo::none(),
        }
    }

    /// Coarse answer from the process table when windows cannot be listed.
    async fn detect_processes(&self, window_error: &str) -> BrowserInfo {
        match self.probe.running_process_names().await {
            Ok(names) => {
                let running = running_browsers(&names);
                debug!(
                    event = "core.detect.process_fallback_completed",
                    browsers = running.len()
                );
                if running.is_empty() {
                    BrowserInfo::none()
                } else {
                    BrowserInfo::process_detected()
                }
            }
            Err(e) => {
                warn!(event = "core.detect.process_fallback_failed", error = %e);
                BrowserInfo::error(format!("{}; {}", window_error, e))
            }
        }
    }
}
