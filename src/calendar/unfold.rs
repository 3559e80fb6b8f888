//! Reverses RFC 5545 line folding.
//!
//! A physical line that starts with a single space or tab continues the
//! previous logical line. That one leading character is removed and the rest
//! is appended verbatim.

/// Split raw feed text into logical lines.
///
/// Line endings are normalized first (`\r\n` and lone `\r` become `\n`) and
/// empty lines are dropped. A continuation line with nothing before it is
/// ignored.
pub fn unfold(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    for raw in normalized.split('\n') {
        if raw.is_empty() {
            continue;
        }
        match raw.strip_prefix([' ', '\t']) {
            Some(rest) => {
                if let Some(prev) = lines.last_mut() {
                    prev.push_str(rest);
                }
            }
            None => lines.push(raw.to_string()),
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
