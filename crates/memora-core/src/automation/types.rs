use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::{BrowserKind, browser_for_process};

/// Opaque OS window handle.
///
/// Only ever held for the duration of one detection or capture call; the
/// window it names may disappear at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(i64);

impl WindowHandle {
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> i64 {
        self.0
    }

    /// The null handle (no window).
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// A visible top-level window and the process that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub pid: u32,
    pub process_name: String,
    pub title: String,
}

impl WindowInfo {
    pub fn new(
        handle: WindowHandle,
        pid: u32,
        process_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            handle,
            pid,
            process_name: process_name.into(),
            title: title.into(),
        }
    }

    /// The browser owning this window, if the process is on the allow-list.
    pub fn browser(&self) -> Option<BrowserKind> {
        browser_for_process(&self.process_name)
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// A key plus modifiers, pressed and released together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Lowercase ASCII letter or digit.
    pub key: char,
}

impl KeyChord {
    pub const fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            alt: false,
            shift: false,
            key,
        }
    }

    /// Moves focus to the address bar and selects its contents.
    pub const FOCUS_ADDRESS_BAR: KeyChord = KeyChord::ctrl('l');

    pub const COPY: KeyChord = KeyChord::ctrl('c');
}

impl std::fmt::Display for KeyChord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        write!(f, "{}", self.key.to_ascii_uppercase())
    }
}

/// Chords sent in order, with a pause after each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySequence {
    chords: Vec<KeyChord>,
    delay_after_each: Duration,
}

impl KeySequence {
    pub fn new(chords: Vec<KeyChord>, delay_after_each: Duration) -> Self {
        Self {
            chords,
            delay_after_each,
        }
    }

    /// Focus the address bar, then copy its contents.
    pub fn copy_address_bar(delay_after_each: Duration) -> Self {
        Self::new(
            vec![KeyChord::FOCUS_ADDRESS_BAR, KeyChord::COPY],
            delay_after_each,
        )
    }

    pub fn chords(&self) -> &[KeyChord] {
        &self.chords
    }

    pub fn delay_after_each(&self) -> Duration {
        self.delay_after_each
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_info_browser_lookup() {
        let window = WindowInfo::new(
            WindowHandle::from_raw(0x1234),
            42,
            "chrome",
            "Example – Google Chrome",
        );
        assert_eq!(window.browser(), Some(BrowserKind::Chrome));
        assert!(window.has_title());

        let other = WindowInfo::new(WindowHandle::from_raw(1), 7, "notepad", "  ");
        assert_eq!(other.browser(), None);
        assert!(!other.has_title());
    }

    #[test]
    fn test_window_handle_display() {
        assert_eq!(WindowHandle::from_raw(255).to_string(), "0xff");
        assert!(WindowHandle::from_raw(0).is_null());
    }

    #[test]
    fn test_key_chord_display() {
        assert_eq!(KeyChord::FOCUS_ADDRESS_BAR.to_string(), "Ctrl+L");
        assert_eq!(KeyChord::COPY.to_string(), "Ctrl+C");
    }

    #[test]
    fn test_copy_address_bar_order() {
        let sequence = KeySequence::copy_address_bar(Duration::from_millis(600));
        assert_eq!(
            sequence.chords(),
            [KeyChord::FOCUS_ADDRESS_BAR, KeyChord::COPY]
        );
        assert_eq!(sequence.delay_after_each(), Duration::from_millis(600));
    }
}
