//! Removal of terminal escape sequences from captured output

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // CSI sequences (colors, cursor movement) and OSC sequences (titles, hyperlinks)
    static ref ESCAPE_SEQUENCE: Regex = Regex::new(
        r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]"
    )
    .expect("Invalid escape sequence regex");
}

/// Strip ANSI escape sequences, leaving the plain text
pub fn strip_ansi(text: &str) -> String {
    ESCAPE_SEQUENCE.replace_all(text, "").into_owned()
}
