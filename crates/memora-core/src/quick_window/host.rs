use tokio::sync::oneshot;

use crate::quick_window::errors::HostError;
use crate::quick_window::types::{AlwaysOnTopLevel, WindowGeometry, WorkArea};

/// The window backend that owns the real capture window.
///
/// Calls are synchronous requests; anything the backend learns later
/// (focus loss, shortcut presses, the window closing) arrives as a
/// [`WindowEvent`](crate::quick_window::WindowEvent).
pub trait QuickWindowHost: Send + Sync {
    /// Create the (hidden) window.
    ///
    /// The returned receiver resolves once the window can receive
    /// notifications. Dropping the sender means it never will.
    fn create(&self, geometry: WindowGeometry) -> Result<oneshot::Receiver<()>, HostError>;

    fn exists(&self) -> bool;

    fn is_visible(&self) -> bool;

    /// Resize, move, show and focus.
    fn show_and_focus(&self, geometry: WindowGeometry) -> Result<(), HostError>;

    fn hide(&self);

    fn destroy(&self);

    fn set_always_on_top(&self, level: AlwaysOnTopLevel);

    fn dev_tools_open(&self) -> bool;

    fn primary_work_area(&self) -> WorkArea;

    /// Register a global toggle shortcut. `false` when the OS refused it.
    fn register_shortcut(&self, accelerator: &str) -> bool;

    fn unregister_shortcuts(&self);

    fn open_external(&self, url: &str) -> Result<(), HostError>;

    /// Open the main application window, or focus it if already open.
    fn show_main_window(&self) -> Result<(), HostError>;
}
