//! OS window and clipboard automation.
//!
//! Detection and capture only talk to [`WindowAutomationPort`]. The Windows
//! build drives PowerShell; other platforms get [`UnsupportedAutomation`].

pub mod errors;
pub mod powershell;
pub mod protocol;
pub mod scripts;
pub mod traits;
pub mod types;
pub mod unsupported;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use errors::AutomationError;
pub use powershell::PowerShellAutomation;
pub use traits::WindowAutomationPort;
pub use types::{KeyChord, KeySequence, WindowHandle, WindowInfo};
pub use unsupported::UnsupportedAutomation;

use crate::config::AutomationConfig;

/// The automation port for the current platform.
#[cfg(windows)]
pub fn platform_port(config: &AutomationConfig) -> Arc<dyn WindowAutomationPort> {
    Arc::new(PowerShellAutomation::from_config(config))
}

/// The automation port for the current platform.
#[cfg(not(windows))]
pub fn platform_port(_config: &AutomationConfig) -> Arc<dyn WindowAutomationPort> {
    Arc::new(UnsupportedAutomation)
}
