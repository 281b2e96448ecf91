use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::automation::{KeySequence, WindowAutomationPort, WindowHandle};
use crate::browser::running_browsers;
use crate::capture::errors::CaptureFailure;
use crate::capture::types::CaptureResult;
use crate::config::CaptureConfig;
use crate::config::defaults::DEFAULT_RESTORE_TIMEOUT_MS;
use crate::detect::{browser_windows, preferred_window};
use crate::errors::MemoraError;
use crate::process::ProcessProbe;

/// Delays and bounds for one capture.
///
/// A capture returns within `timeout + restore_timeout` whatever the
/// automation host does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTimings {
    /// Bound for the sequence up to the clipboard read.
    pub timeout: Duration,
    /// Bound for putting clipboard and focus back.
    pub restore_timeout: Duration,
    pub activation_settle: Duration,
    pub clipboard_settle: Duration,
    /// Pause after each keystroke chord.
    pub keystroke_delay: Duration,
}

impl From<&CaptureConfig> for CaptureTimings {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            timeout: config.timeout(),
            restore_timeout: Duration::from_millis(DEFAULT_RESTORE_TIMEOUT_MS),
            activation_settle: config.activation_settle(),
            clipboard_settle: config.clipboard_settle(),
            keystroke_delay: config.keystroke_delay(),
        }
    }
}

impl Default for CaptureTimings {
    fn default() -> Self {
        Self::from(&CaptureConfig::default())
    }
}

/// State the sequence has disturbed and must put back.
#[derive(Debug, Clone, Default)]
struct RestorePlan {
    foreground: Option<WindowHandle>,
    target: Option<WindowHandle>,
    clipboard: Option<String>,
    clipboard_touched: bool,
}

/// Plan shared with the sequence task, so it survives a panic or an abort.
#[derive(Debug, Clone, Default)]
struct SharedPlan(Arc<StdMutex<RestorePlan>>);

impl SharedPlan {
    fn lock(&self) -> MutexGuard<'_, RestorePlan> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(&self) -> RestorePlan {
        self.lock().clone()
    }
}

/// Check a captured value and return the trimmed URL.
pub fn validate_url(raw: &str) -> Result<String, CaptureFailure> {
    let value = raw.trim();
    let has_scheme = value.starts_with("http://") || value.starts_with("https://");
    let has_host = value.split_once("://").is_some_and(|(_, rest)| !rest.is_empty());

    if !has_scheme || !has_host || value.chars().any(char::is_whitespace) {
        return Err(CaptureFailure::InvalidCapturedValue {
            raw: raw.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Copies the address-bar URL out of the user's browser.
///
/// Only one capture runs at a time; later calls wait for the lock because
/// two overlapping sequences would restore each other's clipboard.
pub struct UrlCapture {
    port: Arc<dyn WindowAutomationPort>,
    probe: Arc<dyn ProcessProbe>,
    timings: CaptureTimings,
    lock: Mutex<()>,
}

impl UrlCapture {
    pub fn new(
        port: Arc<dyn WindowAutomationPort>,
        probe: Arc<dyn ProcessProbe>,
        timings: CaptureTimings,
    ) -> Self {
        Self {
            port,
            probe,
            timings,
            lock: Mutex::new(()),
        }
    }

    pub fn timings(&self) -> CaptureTimings {
        self.timings
    }

    pub async fn capture(&self) -> CaptureResult {
        let _serialized = self.lock.lock().await;

        info!(
            event = "core.capture.capture_started",
            port = self.port.name(),
            timeout_ms = self.timings.timeout.as_millis() as u64
        );

        let plan = SharedPlan::default();
        let sequence = CaptureSequence {
            port: self.port.clone(),
            probe: self.probe.clone(),
            timings: self.timings,
            plan: plan.clone(),
        };
        let mut task = tokio::spawn(sequence.run());

        let outcome = match tokio::time::timeout(self.timings.timeout, &mut task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(event = "core.capture.sequence_panicked", error = %e);
                Err(CaptureFailure::Unexpected {
                    message: e.to_string(),
                })
            }
            Err(_) => {
                task.abort();
                Err(CaptureFailure::OperationTimeout {
                    timeout_ms: self.timings.timeout.as_millis() as u64,
                })
            }
        };

        let plan = plan.snapshot();
        if tokio::time::timeout(self.timings.restore_timeout, self.restore(&plan))
            .await
            .is_err()
        {
            warn!(
                event = "core.capture.restore_timed_out",
                timeout_ms = self.timings.restore_timeout.as_millis() as u64,
                message = "Clipboard or focus may not have been restored"
            );
        }

        match outcome.and_then(|raw| validate_url(&raw)) {
            Ok(url) => {
                info!(event = "core.capture.capture_completed", url = %url);
                CaptureResult::succeeded(url)
            }
            Err(failure) => {
                warn!(
                    event = "core.capture.capture_failed",
                    error_code = failure.error_code(),
                    error = %failure
                );
                CaptureResult::failed(&failure)
            }
        }
    }

    /// Put back clipboard, then focus. Failures are logged only.
    async fn restore(&self, plan: &RestorePlan) {
        if plan.clipboard_touched
            && let Some(original) = &plan.clipboard
        {
            match self.port.write_clipboard_text(original).await {
                Ok(()) => debug!(event = "core.capture.clipboard_restore_completed"),
                Err(e) => warn!(event = "core.capture.clipboard_restore_failed", error = %e),
            }
        }

        if let (Some(original), Some(target)) = (plan.foreground, plan.target)
            && original != target
        {
            match self.port.set_foreground_window(original).await {
                Ok(_) => debug!(event = "core.capture.focus_restore_completed"),
                Err(e) => warn!(event = "core.capture.focus_restore_failed", error = %e),
            }
        }
    }
}

/// The steps of one capture, run as their own task.
struct CaptureSequence {
    port: Arc<dyn WindowAutomationPort>,
    probe: Arc<dyn ProcessProbe>,
    timings: CaptureTimings,
    plan: SharedPlan,
}

impl CaptureSequence {
    /// Steps up to and including the clipboard read. Every mutation is
    /// recorded in the plan before it happens.
    async fn run(self) -> Result<String, CaptureFailure> {
        match self.probe.running_process_names().await {
            Ok(names) if running_browsers(&names).is_empty() => {
                return Err(CaptureFailure::NoBrowserRunning);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    event = "core.capture.probe_failed",
                    error = %e,
                    message = "Relying on window enumeration"
                );
            }
        }

        let candidates = browser_windows(self.port.enumerate_visible_windows().await?);

        let foreground = match self.port.foreground_window().await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(event = "core.capture.foreground_snapshot_failed", error = %e);
                None
            }
        };
        self.plan.lock().foreground = foreground;

        let Some(target) = preferred_window(&candidates, foreground).or(candidates.first())
        else {
            return Err(CaptureFailure::NoBrowserWindow);
        };
        debug!(
            event = "core.capture.target_selected",
            browser = %target.kind,
            handle = %target.window.handle,
            was_foreground = Some(target.window.handle) == foreground
        );

        self.plan.lock().target = Some(target.window.handle);
        if !self.port.set_foreground_window(target.window.handle).await? {
            warn!(
                event = "core.capture.activation_refused",
                handle = %target.window.handle,
                message = "OS refused activation, sending keys anyway"
            );
        }
        tokio::time::sleep(self.timings.activation_settle).await;

        match self.port.read_clipboard_text().await {
            Ok(Some(text)) if !text.is_empty() => {
                self.plan.lock().clipboard = Some(text);
            }
            Ok(_) => {}
            Err(e) => warn!(event = "core.capture.clipboard_snapshot_failed", error = %e),
        }

        self.plan.lock().clipboard_touched = true;
        if let Err(e) = self.port.write_clipboard_text("").await {
            warn!(event = "core.capture.clipboard_clear_failed", error = %e);
        }
        tokio::time::sleep(self.timings.clipboard_settle).await;

        let keys = KeySequence::copy_address_bar(self.timings.keystroke_delay);
        self.port.send_keystroke_sequence(&keys).await?;

        let raw = self.port.read_clipboard_text().await?.unwrap_or_default();
        debug!(event = "core.capture.clipboard_read", length = raw.len());
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::testing::{FailMode, FakeAutomation, StaticProbe};

    fn fast_timings() -> CaptureTimings {
        CaptureTimings {
            timeout: Duration::from_secs(2),
            restore_timeout: Duration::from_millis(300),
            activation_settle: Duration::from_millis(1),
            clipboard_settle: Duration::from_millis(1),
            keystroke_delay: Duration::from_millis(1),
        }
    }

    fn capture(port: &Arc<FakeAutomation>, running: &[&str]) -> UrlCapture {
        UrlCapture::new(
            port.clone(),
            Arc::new(StaticProbe::running(running)),
            fast_timings(),
        )
    }

    /// Editor focused, Chrome in the background showing example.com.
    fn desktop_with_chrome() -> (Arc<FakeAutomation>, WindowHandle, WindowHandle) {
        let port = Arc::new(FakeAutomation::new());
        let editor = port.add_window(10, "code", "notes.md");
        let chrome = port.add_window(20, "chrome", "Example Domain - Google Chrome");
        port.with_state(|s| {
            s.foreground = Some(editor);
            s.clipboard = Some("previous clipboard".to_string());
            s.address_bars
                .insert(chrome, "  https://example.com/path?q=1\r\n".to_string());
        });
        (port, editor, chrome)
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(
            validate_url(" https://example.com \n").unwrap(),
            "https://example.com"
        );
        assert_eq!(validate_url("http://localhost:3000").unwrap(), "http://localhost:3000");
        for raw in ["", "   ", "not a url", "ftp://host", "https://", "https://a b", "example.com"] {
            assert!(
                matches!(
                    validate_url(raw),
                    Err(CaptureFailure::InvalidCapturedValue { .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_chrome_capture_restores_state() {
        let (port, editor, chrome) = desktop_with_chrome();

        let result = capture(&port, &["chrome.exe"]).capture().await;

        assert_eq!(result, CaptureResult::succeeded("https://example.com/path?q=1"));
        assert_eq!(port.clipboard().as_deref(), Some("previous clipboard"));
        assert_eq!(port.foreground(), Some(editor));

        let calls = port.calls();
        let activate = calls
            .iter()
            .position(|c| *c == format!("set_foreground_window:{}", chrome.as_raw()))
            .unwrap();
        let keys = calls
            .iter()
            .position(|c| c == "send_keystroke_sequence:Ctrl+L,Ctrl+C")
            .unwrap();
        let restore_clipboard = calls
            .iter()
            .position(|c| c == "write_clipboard_text:previous clipboard")
            .unwrap();
        let restore_focus = calls
            .iter()
            .rposition(|c| *c == format!("set_foreground_window:{}", editor.as_raw()))
            .unwrap();
        assert!(activate < keys);
        assert!(keys < restore_clipboard);
        assert!(restore_clipboard < restore_focus);
    }

    #[tokio::test]
    async fn test_foreground_browser_is_not_refocused() {
        let (port, _editor, chrome) = desktop_with_chrome();
        port.with_state(|s| s.foreground = Some(chrome));

        let result = capture(&port, &["chrome"]).capture().await;
        assert!(result.success);

        let activations = port
            .calls()
            .iter()
            .filter(|c| c.starts_with("set_foreground_window"))
            .count();
        assert_eq!(activations, 1);
    }

    #[tokio::test]
    async fn test_no_browser_running() {
        let (port, _, _) = desktop_with_chrome();
        let result = capture(&port, &["explorer.exe"]).capture().await;
        assert_eq!(result, CaptureResult::failed(&CaptureFailure::NoBrowserRunning));
        assert_eq!(result.error.as_deref(), Some("No browser is currently running"));
        assert!(port.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_browser_window() {
        let port = Arc::new(FakeAutomation::new());
        port.add_window(1, "code", "editor");
        let result = capture(&port, &["firefox"]).capture().await;
        assert_eq!(result.error_code.as_deref(), Some("NO_BROWSER_WINDOW"));
        assert!(!port.calls().iter().any(|c| c.starts_with("write_clipboard")));
    }

    #[tokio::test]
    async fn test_not_a_url_restores_clipboard() {
        let (port, editor, chrome) = desktop_with_chrome();
        port.with_state(|s| {
            s.address_bars.insert(chrome, "not a url".to_string());
        });

        let result = capture(&port, &["chrome"]).capture().await;

        assert!(!result.success);
        assert!(result.url.is_none());
        assert_eq!(result.error_code.as_deref(), Some("INVALID_CAPTURED_VALUE"));
        assert_eq!(
            result.error.as_deref(),
            Some("Could not capture a URL from the current browser tab")
        );
        assert_eq!(port.clipboard().as_deref(), Some("previous clipboard"));
        assert_eq!(port.foreground(), Some(editor));
    }

    #[tokio::test]
    async fn test_empty_clipboard_after_copy_is_invalid() {
        let (port, _, chrome) = desktop_with_chrome();
        port.with_state(|s| {
            s.address_bars.remove(&chrome);
        });

        let result = capture(&port, &["chrome"]).capture().await;
        assert_eq!(result.error_code.as_deref(), Some("INVALID_CAPTURED_VALUE"));
        assert_eq!(port.clipboard().as_deref(), Some("previous clipboard"));
    }

    #[tokio::test]
    async fn test_empty_original_clipboard_is_not_restored() {
        let (port, _, _) = desktop_with_chrome();
        port.with_state(|s| s.clipboard = None);

        let result = capture(&port, &["chrome"]).capture().await;
        assert!(result.success);
        let writes: Vec<_> = port
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("write_clipboard_text"))
            .collect();
        assert_eq!(writes, vec!["write_clipboard_text".to_string()]);
    }

    #[tokio::test]
    async fn test_refused_activation_still_captures() {
        let (port, _, _) = desktop_with_chrome();
        port.with_state(|s| s.refuse_activation = true);
        let result = capture(&port, &["chrome"]).capture().await;
        // Keys went to the editor, which has no address bar.
        assert_eq!(result.error_code.as_deref(), Some("INVALID_CAPTURED_VALUE"));
    }

    #[tokio::test]
    async fn test_clipboard_clear_failure_is_best_effort() {
        let (port, _, _) = desktop_with_chrome();
        port.fail("write_clipboard_text", FailMode::Script);

        let result = capture(&port, &["chrome"]).capture().await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_subprocess_timeout_maps_to_timeout() {
        let (port, _, _) = desktop_with_chrome();
        port.fail("read_clipboard_text", FailMode::Timeout);

        let result = capture(&port, &["chrome"]).capture().await;
        assert_eq!(result.error_code.as_deref(), Some("SUBPROCESS_TIMEOUT"));
        assert_eq!(
            result.error.as_deref(),
            Some("URL capture timed out - please try again")
        );
    }

    #[tokio::test]
    async fn test_keystroke_failure_is_subprocess_failure() {
        let (port, editor, _) = desktop_with_chrome();
        port.fail("send_keystroke_sequence", FailMode::Script);

        let result = capture(&port, &["chrome"]).capture().await;
        assert_eq!(result.error_code.as_deref(), Some("SUBPROCESS_FAILURE"));
        assert_eq!(port.clipboard().as_deref(), Some("previous clipboard"));
        assert_eq!(port.foreground(), Some(editor));
    }

    #[tokio::test]
    async fn test_operation_timeout_still_restores() {
        let (port, editor, _) = desktop_with_chrome();
        port.delay("send_keystroke_sequence", Duration::from_secs(10));

        let capture = UrlCapture::new(
            port.clone(),
            Arc::new(StaticProbe::running(&["chrome"])),
            CaptureTimings {
                timeout: Duration::from_millis(100),
                ..fast_timings()
            },
        );
        let started = std::time::Instant::now();
        let result = capture.capture().await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(result.error_code.as_deref(), Some("OPERATION_TIMEOUT"));
        assert_eq!(port.clipboard().as_deref(), Some("previous clipboard"));
        assert_eq!(port.foreground(), Some(editor));
    }

    #[tokio::test]
    async fn test_probe_failure_falls_through_to_windows() {
        let (port, _, _) = desktop_with_chrome();
        let capture = UrlCapture::new(
            port.clone(),
            Arc::new(StaticProbe::failing("denied")),
            fast_timings(),
        );
        assert!(capture.capture().await.success);
    }

    #[tokio::test]
    async fn test_concurrent_captures_do_not_interleave() {
        let (port, _, _) = desktop_with_chrome();
        port.delay("send_keystroke_sequence", Duration::from_millis(50));
        let capture = Arc::new(capture(&port, &["chrome"]));

        let (a, b) = tokio::join!(capture.capture(), capture.capture());
        assert!(a.success && b.success);

        let calls = port.calls();
        let keys: Vec<_> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| c.starts_with("send_keystroke_sequence"))
            .map(|(i, _)| i)
            .collect();
        let probes_between = calls[keys[0]..keys[1]]
            .iter()
            .filter(|c| *c == "enumerate_visible_windows")
            .count();
        assert_eq!(probes_between, 1);
        assert_eq!(port.clipboard().as_deref(), Some("previous clipboard"));
    }

    #[tokio::test]
    async fn test_hung_restore_is_bounded() {
        let (port, _, _) = desktop_with_chrome();
        port.delay("write_clipboard_text", Duration::from_secs(3));

        let capture = UrlCapture::new(
            port.clone(),
            Arc::new(StaticProbe::running(&["chrome"])),
            CaptureTimings {
                timeout: Duration::from_millis(200),
                restore_timeout: Duration::from_millis(300),
                ..fast_timings()
            },
        );
        let started = std::time::Instant::now();
        let result = capture.capture().await;

        assert!(
            started.elapsed() < Duration::from_millis(1200),
            "capture took {:?}",
            started.elapsed()
        );
        assert_eq!(result.error_code.as_deref(), Some("OPERATION_TIMEOUT"));
        assert!(
            port.calls()
                .contains(&"write_clipboard_text:previous clipboard".to_string())
        );
    }

    #[tokio::test]
    async fn test_panicking_port_still_restores() {
        let (port, editor, _) = desktop_with_chrome();
        port.fail("send_keystroke_sequence", FailMode::Panic);

        let result = capture(&port, &["chrome"]).capture().await;

        assert_eq!(result.error_code.as_deref(), Some("UNEXPECTED"));
        assert_eq!(port.clipboard().as_deref(), Some("previous clipboard"));
        assert_eq!(port.foreground(), Some(editor));
    }

    #[tokio::test]
    async fn test_untitled_window_is_not_preferred() {
        let port = Arc::new(FakeAutomation::new());
        let editor = port.add_window(10, "code", "notes.md");
        let untitled = port.add_window(20, "chrome", "");
        let firefox = port.add_window(30, "firefox", "Rust - Mozilla Firefox");
        port.with_state(|s| {
            s.foreground = Some(editor);
            s.address_bars
                .insert(untitled, "https://wrong.example".to_string());
            s.address_bars
                .insert(firefox, "https://www.rust-lang.org/".to_string());
        });

        let result = capture(&port, &["chrome", "firefox"]).capture().await;

        assert_eq!(result, CaptureResult::succeeded("https://www.rust-lang.org/"));
        assert!(
            !port
                .calls()
                .contains(&format!("set_foreground_window:{}", untitled.as_raw()))
        );
    }
}
