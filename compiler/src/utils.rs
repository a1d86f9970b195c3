use crate::error::{Diagnostic, DiagnosticKind, Location};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// JSON-style quoting for names and snippets in diagnostic messages.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub fn error(kind: DiagnosticKind, msg: &str, block: Option<&str>, line: usize) -> Diagnostic {
    Diagnostic::new(kind, msg.to_string(), Location::new(block, line))
}

pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER.is_match(text)
}

/// Whether `ch` opens a quoted section. A `'` only does so at the start of a
/// token, so apostrophes inside words such as `O'Brien` stay literal.
pub fn opens_quote(ch: char, previous: Option<char>) -> bool {
    match ch {
        '"'  => true,
        '\'' => match previous {
            None => true,
            Some(p) => p.is_whitespace() || matches!(p, '=' | ':' | ',' | '[' | '('),
        },
        _ => false,
    }
}
