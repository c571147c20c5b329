//! Logging helpers that keep user-typed content on a single log line.

use std::fmt::Write;

/// Longest preview of user content written to a log line.
const MAX_PREVIEW: usize = 200;

/// Escape a string for single-line logging.
///
/// Backslashes, newlines, carriage returns and tabs are escaped; other control
/// characters become `\xNN`. Content past [`MAX_PREVIEW`] characters is cut
/// with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// `owner@channel`, the form used for session keys in logs and console prompts.
pub fn session_label(owner: &str, channel: &str) -> String {
    format!("{}@{}", owner, channel)
}
