//! Active browser detection.

pub mod handler;

pub use handler::{BrowserDetector, BrowserWindow, browser_windows, preferred_window};
