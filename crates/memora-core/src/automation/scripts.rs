//! PowerShell script bodies for the Windows automation port.
//!
//! Every script turns any terminating error into an `ERROR|message` record.
//! Only the window scripts compile the user32 bindings; clipboard and
//! keystroke scripts load `System.Windows.Forms` alone, since the C#
//! compile dominates host startup. Values interpolated into scripts are
//! integers or base64, never raw text.

use crate::automation::types::{KeyChord, KeySequence, WindowHandle};

const HEADER: &str = r#"$ErrorActionPreference = 'Stop'
$ProgressPreference = 'SilentlyContinue'
try {
"#;

const USER32_BINDINGS: &str = r#"Add-Type -TypeDefinition @"
using System;
using System.Collections.Generic;
using System.Runtime.InteropServices;
using System.Text;
public static class MemoraWin32 {
    public delegate bool EnumWindowsProc(IntPtr hWnd, IntPtr lParam);
    [DllImport("user32.dll")] public static extern bool EnumWindows(EnumWindowsProc enumProc, IntPtr lParam);
    [DllImport("user32.dll")] public static extern uint GetWindowThreadProcessId(IntPtr hWnd, out uint processId);
    [DllImport("user32.dll", CharSet = CharSet.Unicode)] public static extern int GetWindowText(IntPtr hWnd, StringBuilder text, int count);
    [DllImport("user32.dll")] public static extern int GetWindowTextLength(IntPtr hWnd);
    [DllImport("user32.dll")] public static extern IntPtr GetForegroundWindow();
    [DllImport("user32.dll")] public static extern bool SetForegroundWindow(IntPtr hWnd);
    [DllImport("user32.dll")] public static extern bool IsWindowVisible(IntPtr hWnd);
    [DllImport("user32.dll")] public static extern bool IsIconic(IntPtr hWnd);
    [DllImport("user32.dll")] public static extern bool ShowWindowAsync(IntPtr hWnd, int nCmdShow);
    public static List<IntPtr> VisibleTopLevelWindows() {
        var handles = new List<IntPtr>();
        EnumWindows((h, l) => { if (IsWindowVisible(h)) { handles.Add(h); } return true; }, IntPtr.Zero);
        return handles;
    }
    public static string WindowTitle(IntPtr hWnd) {
        int length = GetWindowTextLength(hWnd);
        if (length <= 0) { return ""; }
        var title = new StringBuilder(length + 1);
        GetWindowText(hWnd, title, title.Capacity);
        return title.ToString();
    }
}
"@
"#;

const FORMS_BINDINGS: &str = "Add-Type -AssemblyName System.Windows.Forms\n";

const EPILOGUE: &str = r#"
} catch {
    Write-Output ("ERROR|" + ($_.Exception.Message -replace "\r?\n", " "))
    exit 1
}
"#;

const SW_RESTORE: i32 = 9;

#[derive(Debug, Clone, Copy)]
enum Bindings {
    User32,
    Forms,
}

fn wrap(bindings: Bindings, body: &str) -> String {
    let bindings = match bindings {
        Bindings::User32 => USER32_BINDINGS,
        Bindings::Forms => FORMS_BINDINGS,
    };
    let mut script =
        String::with_capacity(HEADER.len() + bindings.len() + body.len() + EPILOGUE.len());
    script.push_str(HEADER);
    script.push_str(bindings);
    script.push_str(body);
    script.push_str(EPILOGUE);
    script
}

pub fn foreground_window() -> String {
    wrap(
        Bindings::User32,
        r#"$h = [MemoraWin32]::GetForegroundWindow()
Write-Output ("FOREGROUND|" + $h.ToInt64())
"#,
    )
}

/// One `WINDOW` record per visible top-level window, then `DONE|`.
///
/// Browsers run many windows from one process, so windows are walked with
/// `EnumWindows` rather than through each process's main window.
pub fn enumerate_visible_windows() -> String {
    wrap(
        Bindings::User32,
        r#"$names = @{}
Get-Process | ForEach-Object { $names[[int]$_.Id] = $_.ProcessName }
foreach ($h in [MemoraWin32]::VisibleTopLevelWindows()) {
    $processId = [uint32]0
    [void][MemoraWin32]::GetWindowThreadProcessId($h, [ref]$processId)
    $name = $names[[int]$processId]
    if (-not $name) { continue }
    $title = [Convert]::ToBase64String([Text.Encoding]::UTF8.GetBytes([MemoraWin32]::WindowTitle($h)))
    Write-Output ("WINDOW|" + $h.ToInt64() + "|" + $processId + "|" + $name + "|" + $title)
}
Write-Output "DONE|"
"#,
    )
}

/// Restore the window if minimized, then activate it.
pub fn set_foreground_window(handle: WindowHandle) -> String {
    let body = format!(
        r#"$h = [IntPtr]::new([long]{handle})
if ([MemoraWin32]::IsIconic($h)) {{ [void][MemoraWin32]::ShowWindowAsync($h, {restore}) }}
$ok = [MemoraWin32]::SetForegroundWindow($h)
Write-Output ("ACTIVATED|" + $ok)
"#,
        handle = handle.as_raw(),
        restore = SW_RESTORE,
    );
    wrap(Bindings::User32, &body)
}

pub fn read_clipboard_text() -> String {
    wrap(
        Bindings::Forms,
        r#"if ([System.Windows.Forms.Clipboard]::ContainsText()) {
    $text = [System.Windows.Forms.Clipboard]::GetText()
    Write-Output ("CLIPBOARD|" + [Convert]::ToBase64String([Text.Encoding]::UTF8.GetBytes($text)))
} else {
    Write-Output "CLIPBOARD_EMPTY|"
}
"#,
    )
}

/// Set the clipboard to `encoded` (base64 UTF-8); empty text clears it.
pub fn write_clipboard_text(encoded: &str) -> String {
    let body = format!(
        r#"$text = [Text.Encoding]::UTF8.GetString([Convert]::FromBase64String('{encoded}'))
if ($text.Length -eq 0) {{
    [System.Windows.Forms.Clipboard]::Clear()
}} else {{
    [System.Windows.Forms.Clipboard]::SetText($text)
}}
Write-Output "OK|"
"#
    );
    wrap(Bindings::Forms, &body)
}

/// `SendKeys` token for a chord, e.g. `^l`. `None` for keys outside
/// ASCII letters and digits, which would need escaping.
pub fn send_keys_token(chord: &KeyChord) -> Option<String> {
    if !chord.key.is_ascii_alphanumeric() {
        return None;
    }
    let mut token = String::new();
    if chord.ctrl {
        token.push('^');
    }
    if chord.alt {
        token.push('%');
    }
    if chord.shift {
        token.push('+');
    }
    token.push(chord.key.to_ascii_lowercase());
    Some(token)
}

pub fn send_keystroke_sequence(sequence: &KeySequence) -> Option<String> {
    let delay_ms = sequence.delay_after_each().as_millis();
    let mut body = String::new();
    for chord in sequence.chords() {
        let token = send_keys_token(chord)?;
        body.push_str(&format!(
            "[System.Windows.Forms.SendKeys]::SendWait('{token}')\n"
        ));
        if delay_ms > 0 {
            body.push_str(&format!("Start-Sleep -Milliseconds {delay_ms}\n"));
        }
    }
    body.push_str("Write-Output \"OK|\"\n");
    Some(wrap(Bindings::Forms, &body))
}
