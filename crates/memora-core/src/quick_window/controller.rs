//! Capture window lifecycle.
//!
//! The controller is an actor: [`QuickWindowController::run`] owns all
//! state and reacts to UI commands, window events and the outcomes of the
//! tasks it spawns. Every show starts a new cycle; a task outcome tagged
//! with an older cycle is dropped on arrival.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::browser::BrowserInfo;
use crate::capture::{CaptureFailure, CaptureResult, UrlCapture, validate_url};
use crate::detect::BrowserDetector;
use crate::events;
use crate::quick_window::errors::HostError;
use crate::quick_window::host::QuickWindowHost;
use crate::quick_window::types::{
    AlwaysOnTopLevel, ControllerSettings, QuickWindowState, UiCommand, UiNotification,
    WindowEvent, WindowGeometry,
};

#[derive(Debug)]
enum TaskOutcome {
    WindowReady { cycle: u64, ready: bool },
    MountSettled { cycle: u64 },
    DetectionFinished { cycle: u64, info: BrowserInfo },
    DetectionTimedOut { cycle: u64 },
    CaptureFinished { cycle: u64, result: CaptureResult },
}

pub struct QuickWindowController {
    host: Arc<dyn QuickWindowHost>,
    detector: Arc<BrowserDetector>,
    capture: Arc<UrlCapture>,
    settings: ControllerSettings,
    notifications: mpsc::UnboundedSender<UiNotification>,
    state: QuickWindowState,
    cycle: u64,
    outcomes_tx: mpsc::UnboundedSender<TaskOutcome>,
    outcomes_rx: Option<mpsc::UnboundedReceiver<TaskOutcome>>,
}

impl QuickWindowController {
    pub fn new(
        host: Arc<dyn QuickWindowHost>,
        detector: Arc<BrowserDetector>,
        capture: Arc<UrlCapture>,
        settings: ControllerSettings,
        notifications: mpsc::UnboundedSender<UiNotification>,
    ) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            host,
            detector,
            capture,
            settings,
            notifications,
            state: QuickWindowState::Hidden,
            cycle: 0,
            outcomes_tx,
            outcomes_rx: Some(outcomes_rx),
        }
    }

    pub fn state(&self) -> &QuickWindowState {
        &self.state
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Register the global shortcut, trying the fallback accelerator when
    /// the primary one is taken. Returns the accelerator in use.
    pub fn start(&self) -> Option<String> {
        for accelerator in [
            &self.settings.primary_shortcut,
            &self.settings.fallback_shortcut,
        ] {
            if self.host.register_shortcut(accelerator) {
                info!(
                    event = "core.quick_window.shortcut_registered",
                    accelerator = %accelerator
                );
                return Some(accelerator.clone());
            }
            warn!(
                event = "core.quick_window.shortcut_register_failed",
                accelerator = %accelerator
            );
        }
        error!(
            event = "core.quick_window.shortcut_unavailable",
            message = "No global shortcut could be registered"
        );
        None
    }

    pub fn shutdown(&mut self) {
        info!(event = "core.quick_window.shutdown_started", cycle = self.cycle);
        self.host.unregister_shortcuts();
        self.host.destroy();
        self.state = QuickWindowState::Hidden;
        info!(event = "core.quick_window.shutdown_completed");
    }

    /// Drive the controller until the command channel closes or the app
    /// quits, then shut down.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<UiCommand>,
        mut events: mpsc::UnboundedReceiver<WindowEvent>,
    ) {
        let Some(mut outcomes) = self.outcomes_rx.take() else {
            error!(
                event = "core.quick_window.run_failed",
                message = "Controller already ran"
            );
            return;
        };

        self.start();
        let mut events_open = true;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        debug!(event = "core.quick_window.commands_closed");
                        break;
                    }
                },
                event = events.recv(), if events_open => match event {
                    Some(WindowEvent::Quit) => break,
                    Some(event) => self.handle_window_event(event),
                    None => events_open = false,
                },
                Some(outcome) = outcomes.recv() => self.handle_outcome(outcome),
            }
        }

        self.shutdown();
    }

    pub fn handle_command(&mut self, command: UiCommand) {
        debug!(
            event = "core.quick_window.command_received",
            command = ?command,
            state = self.state.name()
        );
        match command {
            UiCommand::Toggle => self.toggle(),
            UiCommand::RequestCapture => self.request_capture(),
            UiCommand::Hide => self.hide("command"),
            UiCommand::DetectBrowser => self.detect_now(),
            UiCommand::OpenExternal { url } => {
                if let Err(e) = self.open_external(&url) {
                    warn!(event = "core.quick_window.open_external_failed", error = %e);
                }
            }
            UiCommand::ShowMainWindow => match self.host.show_main_window() {
                Ok(()) => info!(event = "core.quick_window.main_window_shown"),
                Err(e) => warn!(event = "core.quick_window.main_window_failed", error = %e),
            },
        }
    }

    pub fn handle_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::FocusLost => {
                if self.state.is_capturing() || self.host.dev_tools_open() {
                    debug!(
                        event = "core.quick_window.focus_lost_ignored",
                        state = self.state.name()
                    );
                    return;
                }
                self.hide("focus_lost");
            }
            WindowEvent::Shortcut => self.toggle(),
            WindowEvent::WindowClosed => {
                debug!(event = "core.quick_window.window_closed", cycle = self.cycle);
                self.state = QuickWindowState::Hidden;
            }
            WindowEvent::Quit => self.shutdown(),
        }
    }

    fn is_visible(&self) -> bool {
        self.host.exists() && self.host.is_visible()
    }

    fn geometry(&self) -> WindowGeometry {
        WindowGeometry::bottom_right(
            &self.host.primary_work_area(),
            self.settings.width,
            self.settings.height,
            self.settings.margin,
        )
    }

    fn notify(&self, notification: UiNotification) {
        if self.notifications.send(notification).is_err() {
            warn!(
                event = "core.quick_window.notify_failed",
                error = %HostError::ChannelClosed
            );
        }
    }

    fn toggle(&mut self) {
        if self.is_visible() {
            self.hide("toggle");
        } else {
            self.show();
        }
    }

    fn hide(&mut self, reason: &'static str) {
        if self.is_visible() {
            self.host.hide();
        }
        if self.state != QuickWindowState::Hidden {
            info!(
                event = "core.quick_window.hide_completed",
                reason = reason,
                cycle = self.cycle,
                from = self.state.name()
            );
        }
        self.state = QuickWindowState::Hidden;
    }

    fn show(&mut self) {
        self.cycle += 1;
        self.state = QuickWindowState::Showing;
        let cycle = self.cycle;
        info!(event = "core.quick_window.show_started", cycle = cycle);

        if self.host.exists() {
            self.reveal();
            return;
        }

        let ready = match self.host.create(self.geometry()) {
            Ok(ready) => ready,
            Err(e) => {
                error!(event = "core.quick_window.create_failed", error = %e);
                self.state = QuickWindowState::Hidden;
                return;
            }
        };

        let tx = self.outcomes_tx.clone();
        let ready_timeout = self.settings.ready_timeout;
        tokio::spawn(async move {
            let ready = matches!(tokio::time::timeout(ready_timeout, ready).await, Ok(Ok(())));
            let _ = tx.send(TaskOutcome::WindowReady { cycle, ready });
        });
    }

    /// Show the existing window and schedule detection after the mount delay.
    fn reveal(&mut self) {
        if let Err(e) = self.host.show_and_focus(self.geometry()) {
            error!(event = "core.quick_window.show_failed", error = %e);
            self.state = QuickWindowState::Hidden;
            return;
        }

        let tx = self.outcomes_tx.clone();
        let cycle = self.cycle;
        let delay = self.settings.mount_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(TaskOutcome::MountSettled { cycle });
        });
    }

    fn detect_now(&mut self) {
        if !self.is_visible() || self.state.is_capturing() {
            warn!(
                event = "core.quick_window.detect_rejected",
                state = self.state.name()
            );
            return;
        }
        self.begin_detection();
    }

    /// Notify the UI, start the detector and arm the fallback timer.
    fn begin_detection(&mut self) {
        self.state = QuickWindowState::DetectionPending;
        self.notify(UiNotification::DetectionStarted);

        let cycle = self.cycle;
        let detector = self.detector.clone();
        let detection: JoinHandle<BrowserInfo> = tokio::spawn(async move { detector.detect().await });

        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let info = match detection.await {
                Ok(info) => info,
                Err(e) => {
                    error!(event = "core.quick_window.detection_task_failed", error = %e);
                    BrowserInfo::error(e.to_string())
                }
            };
            let _ = tx.send(TaskOutcome::DetectionFinished { cycle, info });
        });

        let tx = self.outcomes_tx.clone();
        let fallback = self.settings.fallback_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(fallback).await;
            let _ = tx.send(TaskOutcome::DetectionTimedOut { cycle });
        });
    }

    fn request_capture(&mut self) {
        if self.state.is_capturing() {
            warn!(
                event = "core.quick_window.capture_rejected",
                cycle = self.cycle,
                message = "Capture already in flight"
            );
            return;
        }
        if !self.is_visible() {
            warn!(
                event = "core.quick_window.capture_rejected",
                state = self.state.name(),
                message = "Window is hidden"
            );
            return;
        }
        if !self.state.accepts_capture() {
            let failure = CaptureFailure::NotReady {
                state: self.state.name(),
            };
            warn!(
                event = "core.quick_window.capture_rejected",
                state = self.state.name(),
                error = %failure
            );
            self.notify(UiNotification::CaptureResult {
                result: CaptureResult::failed(&failure),
            });
            return;
        }
        if self.state == QuickWindowState::DetectionPending {
            debug!(event = "core.quick_window.detection_superseded", cycle = self.cycle);
        }

        self.state = QuickWindowState::CapturePending;
        self.host.set_always_on_top(AlwaysOnTopLevel::ScreenSaver);
        info!(event = "core.quick_window.capture_started", cycle = self.cycle);

        let cycle = self.cycle;
        let capture = self.capture.clone();
        let task: JoinHandle<CaptureResult> = tokio::spawn(async move { capture.capture().await });

        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    error!(event = "core.quick_window.capture_task_failed", error = %e);
                    CaptureResult::failed(&CaptureFailure::Unexpected {
                        message: e.to_string(),
                    })
                }
            };
            let _ = tx.send(TaskOutcome::CaptureFinished { cycle, result });
        });
    }

    fn open_external(&self, url: &str) -> Result<(), HostError> {
        let url = validate_url(url).map_err(|_| HostError::InvalidUrl {
            url: url.to_string(),
        })?;
        self.host.open_external(&url)?;
        info!(event = "core.quick_window.open_external_completed", url = %url);
        Ok(())
    }

    fn is_current(&self, cycle: u64) -> bool {
        cycle == self.cycle
    }

    fn handle_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::WindowReady { cycle, ready } => {
                if !ready {
                    warn!(
                        event = "core.quick_window.ready_timed_out",
                        cycle = cycle,
                        timeout_ms = self.settings.ready_timeout.as_millis() as u64
                    );
                }
                if self.is_current(cycle) && self.state == QuickWindowState::Showing {
                    self.reveal();
                }
            }
            TaskOutcome::MountSettled { cycle } => {
                if self.is_current(cycle)
                    && self.state == QuickWindowState::Showing
                    && self.is_visible()
                {
                    self.begin_detection();
                } else {
                    debug!(event = "core.quick_window.mount_stale", cycle = cycle);
                }
            }
            TaskOutcome::DetectionFinished { cycle, info } => {
                self.complete_detection(cycle, info);
            }
            TaskOutcome::DetectionTimedOut { cycle } => {
                self.complete_detection(cycle, BrowserInfo::timed_out());
            }
            TaskOutcome::CaptureFinished { cycle, result } => {
                self.complete_capture(cycle, result);
            }
        }
    }

    /// First detection outcome of the current cycle wins.
    fn complete_detection(&mut self, cycle: u64, info: BrowserInfo) {
        if !self.is_current(cycle)
            || self.state != QuickWindowState::DetectionPending
            || !self.is_visible()
        {
            debug!(
                event = "core.quick_window.detection_dropped",
                cycle = cycle,
                current_cycle = self.cycle,
                state = self.state.name()
            );
            return;
        }

        info!(
            event = "core.quick_window.detection_completed",
            cycle = cycle,
            browser = %info.browser
        );
        self.state = QuickWindowState::DetectionComplete(info.clone());
        self.notify(UiNotification::DetectionResult { result: info });
    }

    fn complete_capture(&mut self, cycle: u64, result: CaptureResult) {
        let owns_state = self.is_current(cycle) && self.state.is_capturing();

        // A newer capture may already hold the raised level.
        if owns_state || !self.state.is_capturing() {
            self.host.set_always_on_top(AlwaysOnTopLevel::Normal);
        }

        if !owns_state {
            debug!(
                event = "core.quick_window.capture_dropped",
                cycle = cycle,
                current_cycle = self.cycle,
                success = result.success
            );
            return;
        }

        debug!(event = "core.quick_window.capture_completed", cycle = cycle);
        events::log_capture_finished(&result);
        self.state = QuickWindowState::CaptureComplete(result.clone());
        if self.is_visible() {
            self.notify(UiNotification::CaptureResult { result });
        }
    }
}
