//! Browser URL capture through keyboard automation and the clipboard.

pub mod errors;
pub mod handler;
pub mod types;

pub use errors::CaptureFailure;
pub use handler::{CaptureTimings, UrlCapture, validate_url};
pub use types::CaptureResult;
