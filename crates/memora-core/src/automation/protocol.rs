//! Line protocol spoken by generated automation scripts.
//!
//! Each script prints records of the form `TAG|payload` (or `TAG:payload`),
//! one per line.
//! Free text (warnings, progress output from the host) may be interleaved
//! and is ignored. Text payloads that could contain `|` or newlines are
//! base64-encoded UTF-8.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::automation::types::{WindowHandle, WindowInfo};

pub const TAG_ERROR: &str = "ERROR";
pub const TAG_FOREGROUND: &str = "FOREGROUND";
pub const TAG_WINDOW: &str = "WINDOW";
pub const TAG_DONE: &str = "DONE";
pub const TAG_ACTIVATED: &str = "ACTIVATED";
pub const TAG_CLIPBOARD: &str = "CLIPBOARD";
pub const TAG_CLIPBOARD_EMPTY: &str = "CLIPBOARD_EMPTY";
pub const TAG_OK: &str = "OK";

static RECORD_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([A-Z][A-Z_]*)[:|](.*)$").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub tag: &'a str,
    pub payload: &'a str,
}

/// Parse one output line; `None` for anything that is not a record.
pub fn parse_record(line: &str) -> Option<Record<'_>> {
    let re = RECORD_LINE.as_ref()?;
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    let caps = re.captures(line)?;
    let tag = caps.get(1)?.as_str();
    let payload = caps.get(2)?.as_str();
    Some(Record { tag, payload })
}

/// All records in `stdout`, in output order.
pub fn records(stdout: &str) -> impl Iterator<Item = Record<'_>> {
    stdout.lines().filter_map(parse_record)
}

/// Records carrying `tag`.
pub fn records_tagged<'a>(stdout: &'a str, tag: &'a str) -> impl Iterator<Item = Record<'a>> {
    records(stdout).filter(move |record| record.tag == tag)
}

/// Pick the record that decides the outcome of a script run.
///
/// The first record with one of `success_tags` wins, so a script that
/// printed its answer and then tripped over cleanup still counts as a
/// success. Failing that, the last record (usually `ERROR`) is returned.
pub fn select_result<'a>(stdout: &'a str, success_tags: &[&str]) -> Option<Record<'a>> {
    if let Some(record) = records(stdout).find(|r| success_tags.contains(&r.tag)) {
        return Some(record);
    }
    records(stdout).last()
}

pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode a base64 UTF-8 payload. Invalid UTF-8 is replaced, not rejected.
pub fn decode_text(payload: &str) -> Option<String> {
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse a `WINDOW` payload: `handle|pid|process|base64(title)`.
pub fn parse_window(payload: &str) -> Option<WindowInfo> {
    let mut fields = payload.splitn(4, '|');
    let handle = fields.next()?.trim().parse::<i64>().ok()?;
    let pid = fields.next()?.trim().parse::<u32>().ok()?;
    let process_name = fields.next()?.trim();
    let title = decode_text(fields.next().unwrap_or(""))?;

    if process_name.is_empty() {
        return None;
    }

    Some(WindowInfo::new(
        WindowHandle::from_raw(handle),
        pid,
        process_name,
        title,
    ))
}

/// Parse a `FOREGROUND` payload. Zero means no foreground window.
pub fn parse_handle(payload: &str) -> Option<WindowHandle> {
    let raw = payload.trim().parse::<i64>().ok()?;
    Some(WindowHandle::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_ignores_noise() {
        assert_eq!(
            parse_record("OK|"),
            Some(Record {
                tag: "OK",
                payload: ""
            })
        );
        assert_eq!(
            parse_record("FOREGROUND|132456\r"),
            Some(Record {
                tag: "FOREGROUND",
                payload: "132456"
            })
        );
        assert_eq!(
            parse_record("OK:done"),
            Some(Record {
                tag: "OK",
                payload: "done"
            })
        );
        assert_eq!(parse_record("Something happened"), None);
        assert_eq!(parse_record("lowercase|nope"), None);
        assert_eq!(parse_record(""), None);
    }

    #[test]
    fn test_select_result_prefers_success_over_trailing_error() {
        let stdout = "noise\nCLIPBOARD|aGk=\nERROR|cleanup failed\n";
        let record = select_result(stdout, &[TAG_CLIPBOARD, TAG_CLIPBOARD_EMPTY]).unwrap();
        assert_eq!(record.tag, TAG_CLIPBOARD);
        assert_eq!(record.payload, "aGk=");
    }

    #[test]
    fn test_select_result_falls_back_to_last_record() {
        let stdout = "ERROR|first\nERROR|Access is denied\n";
        let record = select_result(stdout, &[TAG_OK]).unwrap();
        assert_eq!(record.tag, TAG_ERROR);
        assert_eq!(record.payload, "Access is denied");

        assert!(select_result("just text\n", &[TAG_OK]).is_none());
    }

    #[test]
    fn test_text_encoding_survives_separators() {
        let title = "a|b\nc – ü";
        assert_eq!(decode_text(&encode_text(title)).as_deref(), Some(title));
        assert_eq!(decode_text("not base64!!"), None);
    }

    #[test]
    fn test_parse_window() {
        let payload = format!("66060|4242|chrome|{}", encode_text("Inbox | Mail"));
        let window = parse_window(&payload).unwrap();
        assert_eq!(window.handle, WindowHandle::from_raw(66060));
        assert_eq!(window.pid, 4242);
        assert_eq!(window.process_name, "chrome");
        assert_eq!(window.title, "Inbox | Mail");
    }

    #[test]
    fn test_parse_window_rejects_malformed() {
        assert!(parse_window("abc|1|chrome|").is_none());
        assert!(parse_window("1|-5|chrome|").is_none());
        assert!(parse_window("1|2||").is_none());
        assert!(parse_window("1|2").is_none());
    }

    #[test]
    fn test_parse_window_empty_title() {
        let window = parse_window("10|20|msedge|").unwrap();
        assert_eq!(window.title, "");
    }

    #[test]
    fn test_records_tagged() {
        let stdout = "WINDOW|1|2|a|\nDONE|\nWINDOW|3|4|b|\n";
        assert_eq!(records_tagged(stdout, TAG_WINDOW).count(), 2);
    }
}
