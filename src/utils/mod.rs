//! Utility functions and helpers.

pub mod http;
pub mod numerals;

pub use numerals::to_chinese_numeral;

/// Normalize line endings to LF and make sure the text ends with exactly
/// one trailing LF.
pub fn normalize_line_endings(text: &str) -> String {
    let mut normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    while normalized.ends_with("\n\n") {
        normalized.pop();
    }
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}
