use tracing::{error, info, warn};

use crate::capture::CaptureResult;

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

pub fn log_app_shutdown() {
    info!(event = "core.app.shutdown_started");
}

pub fn log_app_error(error: &dyn std::error::Error) {
    error!(
        event = "core.app.error_occurred",
        error = %error,
        error_type = std::any::type_name_of_val(error)
    );
}

/// Terminal outcome of one capture, whichever surface requested it.
pub fn log_capture_finished(result: &CaptureResult) {
    if result.success {
        info!(event = "core.capture.finished", success = true);
    } else {
        warn!(
            event = "core.capture.finished",
            success = false,
            error_code = result.error_code.as_deref().unwrap_or("UNKNOWN")
        );
    }
}

pub fn log_serve_started(shortcut: &str) {
    info!(event = "core.serve.started", shortcut = shortcut);
}

pub fn log_serve_stopped(commands_handled: u64) {
    info!(
        event = "core.serve.stopped",
        commands_handled = commands_handled
    );
}
