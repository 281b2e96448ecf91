//! `memora serve`: the quick window controller over JSON Lines on stdio.
//!
//! The desktop shell owns the real window. It writes UI commands, window
//! events and host signals to our stdin, one JSON object per line, and
//! reads host directives and UI notifications from our stdout. Every
//! message carries a `type` field; the two directions never share a type.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use memora_core::config::MemoraConfig;
use memora_core::events;
use memora_core::quick_window::{
    AlwaysOnTopLevel, ControllerSettings, HostError, QuickWindowController, QuickWindowHost,
    UiCommand, UiNotification, WindowEvent, WindowGeometry, WorkArea,
};

use crate::commands::Services;

/// Requests to the desktop shell's window backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostDirective {
    CreateWindow { geometry: WindowGeometry },
    ShowWindow { geometry: WindowGeometry },
    HideWindow,
    DestroyWindow,
    SetAlwaysOnTop { level: AlwaysOnTopLevel },
    RegisterShortcut { accelerator: String },
    UnregisterShortcuts,
    OpenExternal { url: String },
    /// Open the main application window, or focus it when already open.
    FocusMainWindow,
}

const OUTPUT_CLOSED: &str = "UI output channel closed";

/// Facts the window backend reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostSignal {
    /// The created window can receive notifications.
    WindowReady,
    DevTools { open: bool },
    WorkArea { x: i32, y: i32, width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum Inbound {
    Command(UiCommand),
    Event(WindowEvent),
    Signal(HostSignal),
}

const DEFAULT_WORK_AREA: WorkArea = WorkArea {
    x: 0,
    y: 0,
    width: 1920,
    height: 1080,
};

struct HostState {
    exists: bool,
    visible: bool,
    dev_tools_open: bool,
    work_area: WorkArea,
    ready: Option<oneshot::Sender<()>>,
}

/// [`QuickWindowHost`] that mirrors the shell's window through stdio.
///
/// Directives are fire-and-forget; the mirrored state is what the shell
/// was last told to do, corrected by the signals and events it sends back.
pub struct StdioHost {
    out: mpsc::UnboundedSender<String>,
    state: Mutex<HostState>,
}

impl StdioHost {
    pub fn new(out: mpsc::UnboundedSender<String>) -> Self {
        Self {
            out,
            state: Mutex::new(HostState {
                exists: false,
                visible: false,
                dev_tools_open: false,
                work_area: DEFAULT_WORK_AREA,
                ready: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, directive: HostDirective) -> bool {
        let Some(line) = encode_line(&directive) else {
            return false;
        };
        if self.out.send(line).is_err() {
            warn!(
                event = "cli.serve.directive_dropped",
                directive = ?directive,
                message = "Output channel closed"
            );
            return false;
        }
        true
    }

    pub fn apply_signal(&self, signal: HostSignal) {
        let mut state = self.state();
        match signal {
            HostSignal::WindowReady => match state.ready.take() {
                Some(ready) => {
                    // The controller may have given up waiting already.
                    let _ = ready.send(());
                }
                None => debug!(event = "cli.serve.window_ready_unexpected"),
            },
            HostSignal::DevTools { open } => state.dev_tools_open = open,
            HostSignal::WorkArea {
                x,
                y,
                width,
                height,
            } => {
                state.work_area = WorkArea {
                    x,
                    y,
                    width,
                    height,
                };
            }
        }
    }

    pub fn mark_closed(&self) {
        let mut state = self.state();
        state.exists = false;
        state.visible = false;
        state.dev_tools_open = false;
        state.ready = None;
    }
}

impl QuickWindowHost for StdioHost {
    fn create(&self, geometry: WindowGeometry) -> Result<oneshot::Receiver<()>, HostError> {
        if !self.emit(HostDirective::CreateWindow { geometry }) {
            return Err(HostError::WindowCreateFailed {
                message: OUTPUT_CLOSED.to_string(),
            });
        }
        let (ready_tx, ready_rx) = oneshot::channel();
        let mut state = self.state();
        state.exists = true;
        state.visible = false;
        state.ready = Some(ready_tx);
        Ok(ready_rx)
    }

    fn exists(&self) -> bool {
        self.state().exists
    }

    fn is_visible(&self) -> bool {
        let state = self.state();
        state.exists && state.visible
    }

    fn show_and_focus(&self, geometry: WindowGeometry) -> Result<(), HostError> {
        if !self.exists() {
            return Err(HostError::WindowGone);
        }
        if !self.emit(HostDirective::ShowWindow { geometry }) {
            return Err(HostError::ChannelClosed);
        }
        self.state().visible = true;
        Ok(())
    }

    fn hide(&self) {
        self.emit(HostDirective::HideWindow);
        self.state().visible = false;
    }

    fn destroy(&self) {
        self.emit(HostDirective::DestroyWindow);
        self.mark_closed();
    }

    fn set_always_on_top(&self, level: AlwaysOnTopLevel) {
        self.emit(HostDirective::SetAlwaysOnTop { level });
    }

    fn dev_tools_open(&self) -> bool {
        self.state().dev_tools_open
    }

    fn primary_work_area(&self) -> WorkArea {
        self.state().work_area
    }

    // The shell performs the registration; a refusal shows up there.
    fn register_shortcut(&self, accelerator: &str) -> bool {
        self.emit(HostDirective::RegisterShortcut {
            accelerator: accelerator.to_string(),
        })
    }

    fn unregister_shortcuts(&self) {
        self.emit(HostDirective::UnregisterShortcuts);
    }

    fn open_external(&self, url: &str) -> Result<(), HostError> {
        if self.emit(HostDirective::OpenExternal {
            url: url.to_string(),
        }) {
            Ok(())
        } else {
            Err(HostError::OpenExternalFailed {
                url: url.to_string(),
                message: OUTPUT_CLOSED.to_string(),
            })
        }
    }

    fn show_main_window(&self) -> Result<(), HostError> {
        if self.emit(HostDirective::FocusMainWindow) {
            Ok(())
        } else {
            Err(HostError::ChannelClosed)
        }
    }
}

fn encode_line<T: Serialize + std::fmt::Debug>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(line) => Some(line),
        Err(e) => {
            error!(
                event = "cli.serve.encode_failed",
                value = ?value,
                error = %e
            );
            None
        }
    }
}

/// Dispatch one inbound line. Blank lines are ignored.
pub fn route_line(
    line: &str,
    host: &StdioHost,
    commands: &mpsc::UnboundedSender<UiCommand>,
    events: &mpsc::UnboundedSender<WindowEvent>,
) -> Result<(), serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    match serde_json::from_str::<Inbound>(line)? {
        Inbound::Command(command) => {
            if commands.send(command).is_err() {
                debug!(event = "cli.serve.command_dropped");
            }
        }
        Inbound::Event(event) => {
            if event == WindowEvent::WindowClosed {
                host.mark_closed();
            }
            if events.send(event).is_err() {
                debug!(event = "cli.serve.event_dropped");
            }
        }
        Inbound::Signal(signal) => host.apply_signal(signal),
    }
    Ok(())
}

async fn write_lines(mut lines: mpsc::UnboundedReceiver<String>) {
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.recv().await {
        let written = async {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await
        }
        .await;
        if let Err(e) = written {
            warn!(event = "cli.serve.write_failed", error = %e);
            break;
        }
    }
}

pub async fn run(config: &MemoraConfig) -> Result<(), Box<dyn std::error::Error>> {
    events::log_serve_started(config.shortcut.primary());

    let services = Services::from_config(config);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(out_rx));

    let host = Arc::new(StdioHost::new(out_tx.clone()));
    let (notifications_tx, mut notifications_rx) = mpsc::unbounded_channel::<UiNotification>();
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let controller = QuickWindowController::new(
        host.clone(),
        services.detector,
        services.capture,
        ControllerSettings::from(config),
        notifications_tx,
    );
    let mut controller_task = tokio::spawn(controller.run(commands_rx, events_rx));

    let notifications_out = out_tx.clone();
    let forwarder = tokio::spawn(async move {
        while let Some(notification) = notifications_rx.recv().await {
            if let Some(line) = encode_line(&notification)
                && notifications_out.send(line).is_err()
            {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut controller_done = false;
    let mut routed: u64 = 0;
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    match route_line(&line, &host, &commands_tx, &events_tx) {
                        Ok(()) => routed += 1,
                        Err(e) => {
                            warn!(event = "cli.serve.line_invalid", line = %line, error = %e)
                        }
                    }
                }
                Ok(None) => {
                    debug!(event = "cli.serve.stdin_closed");
                    break;
                }
                Err(e) => {
                    warn!(event = "cli.serve.read_failed", error = %e);
                    break;
                }
            },
            joined = &mut controller_task => {
                controller_done = true;
                if let Err(e) = joined {
                    error!(event = "cli.serve.controller_failed", error = %e);
                }
                break;
            }
        }
    }

    drop(commands_tx);
    drop(events_tx);
    if !controller_done && let Err(e) = controller_task.await {
        error!(event = "cli.serve.controller_failed", error = %e);
    }

    drop(host);
    drop(out_tx);
    if let Err(e) = forwarder.await {
        warn!(event = "cli.serve.forwarder_failed", error = %e);
    }
    if let Err(e) = writer.await {
        warn!(event = "cli.serve.writer_failed", error = %e);
    }

    events::log_serve_stopped(routed);
    Ok(())
}
