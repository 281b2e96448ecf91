use serde::{Deserialize, Serialize};

/// Browser identifier reported to the UI, plus detection sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrowserKind {
    Edge,
    Chrome,
    Firefox,
    Opera,
    Brave,
    Vivaldi,
    Ie,
    /// No browser found.
    None,
    /// A browser matched but could not be identified.
    Unknown,
    /// Detection did not answer in time.
    Timeout,
    /// Detection failed entirely.
    Error,
    /// A browser process runs, but its windows could not be inspected.
    Detected,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Edge => "EDGE",
            BrowserKind::Chrome => "CHROME",
            BrowserKind::Firefox => "FIREFOX",
            BrowserKind::Opera => "OPERA",
            BrowserKind::Brave => "BRAVE",
            BrowserKind::Vivaldi => "VIVALDI",
            BrowserKind::Ie => "IE",
            BrowserKind::None => "NONE",
            BrowserKind::Unknown => "UNKNOWN",
            BrowserKind::Timeout => "TIMEOUT",
            BrowserKind::Error => "ERROR",
            BrowserKind::Detected => "DETECTED",
        }
    }

    /// True for real browsers, false for sentinel values.
    pub fn is_browser(&self) -> bool {
        matches!(
            self,
            BrowserKind::Edge
                | BrowserKind::Chrome
                | BrowserKind::Firefox
                | BrowserKind::Opera
                | BrowserKind::Brave
                | BrowserKind::Vivaldi
                | BrowserKind::Ie
        )
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one detection attempt, consumed immediately by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserInfo {
    pub success: bool,
    pub browser: BrowserKind,
    pub has_browser: bool,
    pub window_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BrowserInfo {
    pub fn found(browser: BrowserKind, window_title: impl Into<String>) -> Self {
        Self {
            success: true,
            browser,
            has_browser: true,
            window_title: window_title.into(),
            error: None,
        }
    }

    pub fn none() -> Self {
        Self {
            success: true,
            browser: BrowserKind::None,
            has_browser: false,
            window_title: String::new(),
            error: None,
        }
    }

    /// A browser process is running but its windows could not be queried.
    pub fn process_detected() -> Self {
        Self::found(BrowserKind::Detected, "")
    }

    pub fn timed_out() -> Self {
        Self::failed(BrowserKind::Timeout, "Detection timed out")
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::failed(BrowserKind::Error, message)
    }

    fn failed(browser: BrowserKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            browser,
            has_browser: false,
            window_title: String::new(),
            error: Some(message.into()),
        }
    }
}
