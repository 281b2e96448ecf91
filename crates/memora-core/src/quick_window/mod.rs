//! The quick capture window: lifecycle, state machine and UI messages.

pub mod controller;
pub mod errors;
pub mod host;
pub mod types;

pub use controller::QuickWindowController;
pub use errors::HostError;
pub use host::QuickWindowHost;
pub use types::{
    AlwaysOnTopLevel, ControllerSettings, QuickWindowState, UiCommand, UiNotification,
    WindowEvent, WindowGeometry, WorkArea,
};
