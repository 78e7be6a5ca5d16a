//! Japanese-text detection for LaTeX sources.
//!
//! Strips single-line comments, then scans the remaining text for Japanese
//! script ranges. Pure functions over a string snapshot, no I/O.

use serde::Deserialize;

/// Document language as detected from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Japanese,
    English,
}

impl Language {
    /// Classify a document snapshot.
    pub fn of(text: &str) -> Self {
        if contains_japanese(text) {
            Language::Japanese
        } else {
            Language::English
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Japanese => write!(f, "japanese"),
            Language::English => write!(f, "english"),
        }
    }
}

/// Returns true if the text contains Japanese script outside comments.
///
/// Comments are stripped per line before scanning, so a CJK character that
/// only appears after a `%` never classifies the document as Japanese.
pub fn contains_japanese(text: &str) -> bool {
    text.lines()
        .any(|line| strip_comment(line).chars().any(is_japanese_char))
}

/// Hiragana, Katakana (U+3040..U+30FF) and CJK Unified Ideographs
/// (U+4E00..U+9FFF).
fn is_japanese_char(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}')
}

/// Return the part of `line` before the first non-escaped `%`.
///
/// A `%` directly preceded by a backslash is taken as escaped. This misreads
/// `\\%` (a line-break command followed by a real comment) as an escaped
/// percent, so text after it is still scanned; the tests pin this down as a
/// known imprecision rather than fixing it.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (idx, &b) in bytes.iter().enumerate() {
        if b == b'%' && (idx == 0 || bytes[idx - 1] != b'\\') {
            return &line[..idx];
        }
    }
    line
}
