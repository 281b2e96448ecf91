//! Browser identification from OS process names.

pub mod types;

pub use types::{BrowserInfo, BrowserKind};

/// Executable names (without extension) of the supported browsers.
pub const BROWSER_PROCESSES: [(&str, BrowserKind); 7] = [
    ("msedge", BrowserKind::Edge),
    ("chrome", BrowserKind::Chrome),
    ("firefox", BrowserKind::Firefox),
    ("opera", BrowserKind::Opera),
    ("brave", BrowserKind::Brave),
    ("vivaldi", BrowserKind::Vivaldi),
    ("iexplore", BrowserKind::Ie),
];

/// Strip directories and an `.exe` suffix, and lowercase.
///
/// Handles both `/` and `\` separators since names may come from the
/// scripting host or from the process table.
fn normalize_process_name(name: &str) -> String {
    let base = name.trim().rsplit(['/', '\\']).next().unwrap_or(name);
    let lower = base.to_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

/// Map a process name to the browser it belongs to, if any.
///
/// Matching is exact on the normalized name so helpers such as
/// `chromedriver` are not mistaken for a browser.
pub fn browser_for_process(name: &str) -> Option<BrowserKind> {
    let normalized = normalize_process_name(name);
    BROWSER_PROCESSES
        .iter()
        .find(|(process, _)| *process == normalized)
        .map(|(_, kind)| *kind)
}

/// Browsers present in a list of running process names, in first-seen order.
pub fn running_browsers<S: AsRef<str>>(process_names: &[S]) -> Vec<BrowserKind> {
    let mut found = Vec::new();
    for name in process_names {
        if let Some(kind) = browser_for_process(name.as_ref())
            && !found.contains(&kind)
        {
            found.push(kind);
        }
    }
    found
}
