//! memora-core: Core library for Memora's browser URL capture
//!
//! Finds the browser the user is looking at and copies the URL out of its
//! address bar, driving the OS through a scripting host. Used by the
//! `memora` CLI and by the desktop shell through `memora serve`.
//!
//! # Main Entry Points
//!
//! - [`detect`] - Which browser is in front
//! - [`capture`] - Copy the active tab's URL, restoring clipboard and focus
//! - [`quick_window`] - Capture window lifecycle and UI messages
//! - [`automation`] - OS window and clipboard automation port
//! - [`config`] - Configuration management

pub mod automation;
pub mod browser;
pub mod capture;
pub mod config;
pub mod detect;
pub mod errors;
pub mod events;
pub mod logging;
pub mod process;
pub mod quick_window;
pub mod script;

// Re-export commonly used types at crate root for convenience
pub use automation::{WindowAutomationPort, platform_port};
pub use browser::{BrowserInfo, BrowserKind};
pub use capture::{CaptureFailure, CaptureResult, CaptureTimings, UrlCapture};
pub use config::MemoraConfig;
pub use detect::BrowserDetector;
pub use errors::{MemoraError, MemoraResult};
pub use process::{ProcessProbe, SysinfoProbe};
pub use quick_window::{
    ControllerSettings, QuickWindowController, QuickWindowHost, UiCommand, UiNotification,
    WindowEvent,
};

// Re-export logging initialization
pub use logging::init_logging;
