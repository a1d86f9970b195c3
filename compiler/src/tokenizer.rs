use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::error::{DiagnosticKind, Diagnostics, SyntaxErrorKind};
use crate::utils::{error, opens_quote, quote};

lazy_static! {
    pub static ref CONFIG_HEADER:    Regex = Regex::new(r"(?i)^\[\s*config\s*\]$").unwrap();
    pub static ref ENUM_HEADER:      Regex = Regex::new(r"^\[\s*enum\s+([A-Za-z_][A-Za-z0-9_]*)\s*\]$").unwrap();
    pub static ref INTERFACE_HEADER: Regex = Regex::new(
        r"^\[\s*interface\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s+extends\s+([A-Za-z_][A-Za-z0-9_]*))?\s*\]$"
    ).unwrap();
    static ref HEX_COLOR:            Regex = Regex::new(r"^(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})(?:\s|$)").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockHeader {
    Config,
    Enum { name: String },
    Interface { name: String, parent: Option<String> },
}

impl BlockHeader {
    /// Human readable label used in diagnostic locations, e.g. `interface Post`.
    pub fn label(&self) -> String {
        match self {
            BlockHeader::Config                => "config".to_string(),
            BlockHeader::Enum { name }         => format!("enum {}", name),
            BlockHeader::Interface { name, .. } => format!("interface {}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub line:   usize,
    pub lines:  Vec<SourceLine>,
}

impl Block {
    pub fn label(&self) -> String {
        self.header.label()
    }
}

/// Remove a trailing `#` comment. A `#` inside quotes is kept. With
/// `keep_colours`, a `#` that begins the value after `key:` and is followed
/// by a 3 or 6 digit hex colour such as `#e05c2a` is kept too.
pub fn strip_comment(line: &str, keep_colours: bool) -> String {
    let mut result   = String::with_capacity(line.len());
    let mut in_quote: Option<char> = None;
    let mut escaped  = false;
    let mut previous: Option<char> = None;

    for (index, ch) in line.char_indices() {
        if let Some(quote_char) = in_quote {
            result.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                in_quote = None;
            }
            previous = Some(ch);
            continue;
        }
        match ch {
            '#' => {
                let starts_value = result.trim_end().ends_with(':');
                if keep_colours && starts_value && HEX_COLOR.is_match(&line[index + 1..]) {
                    result.push(ch);
                } else {
                    break;
                }
            }
            _ => {
                if opens_quote(ch, previous) {
                    in_quote = Some(ch);
                }
                result.push(ch);
            }
        }
        previous = Some(ch);
    }

    result.trim_end().to_string()
}

fn parse_header(text: &str) -> Option<BlockHeader> {
    if CONFIG_HEADER.is_match(text) {
        return Some(BlockHeader::Config);
    }
    if let Some(caps) = ENUM_HEADER.captures(text) {
        return Some(BlockHeader::Enum { name: caps[1].to_string() });
    }
    if let Some(caps) = INTERFACE_HEADER.captures(text) {
        return Some(BlockHeader::Interface {
            name:   caps[1].to_string(),
            parent: caps.get(2).map(|m| m.as_str().to_string()),
        });
    }
    None
}

enum State {
    BeforeFirstHeader,
    InBlock(Block),
    SkippingMalformed,
}

/// Split source text into blocks of comment-stripped, non-blank lines.
///
/// Problems are pushed onto `diagnostics`; the blocks that could be read are
/// still returned so the block parser can report its own errors too.
pub fn tokenize_schema(text: &str, diagnostics: &mut Diagnostics) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut state  = State::BeforeFirstHeader;

    for (index, raw) in text.lines().enumerate() {
        let line     = index + 1;
        let in_config = matches!(&state, State::InBlock(Block { header: BlockHeader::Config, .. }));
        let stripped = strip_comment(raw, in_config);
        let trimmed  = stripped.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            if let State::InBlock(block) = std::mem::replace(&mut state, State::SkippingMalformed) {
                blocks.push(block);
            }
            match parse_header(trimmed) {
                Some(header) => {
                    trace!(line, header = %header.label(), "block header");
                    state = State::InBlock(Block { header, line, lines: Vec::new() });
                }
                None => {
                    diagnostics.push(error(
                        DiagnosticKind::syntax(SyntaxErrorKind::MalformedHeader),
                        &format!("Malformed block header {}", quote(trimmed)),
                        None,
                        line,
                    ));
                }
            }
            continue;
        }

        match &mut state {
            State::InBlock(block) => block.lines.push(SourceLine {
                text: trimmed.to_string(),
                line,
            }),
            State::BeforeFirstHeader => diagnostics.push(error(
                DiagnosticKind::syntax(SyntaxErrorKind::UnterminatedBlock),
                &format!("Content {} appears before any block header", quote(trimmed)),
                None,
                line,
            )),
            State::SkippingMalformed => {}
        }
    }

    if let State::InBlock(block) = state {
        blocks.push(block);
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_blocks() {
        let input = "\
[config]
title: Blog   # shown in headers

[enum Role]
admin, editor

[interface Post extends Entity]
title: string
";
        let mut diagnostics = Diagnostics::default();
        let blocks = tokenize_schema(input, &mut diagnostics);
        assert!(diagnostics.is_empty());
        assert_eq!(blocks.len(), 3);

        assert_eq!(blocks[0].header, BlockHeader::Config);
        assert_eq!(blocks[0].lines, vec![SourceLine { text: "title: Blog".into(), line: 2 }]);

        assert_eq!(blocks[1].header, BlockHeader::Enum { name: "Role".into() });
        assert_eq!(blocks[1].line, 4);

        assert_eq!(
            blocks[2].header,
            BlockHeader::Interface { name: "Post".into(), parent: Some("Entity".into()) }
        );
        assert_eq!(blocks[2].lines[0].line, 8);
    }

    #[test]
    fn test_blank_lines_do_not_end_blocks() {
        let input = "[interface A]\nx: int\n\n\ny: int\n";
        let mut diagnostics = Diagnostics::default();
        let blocks = tokenize_schema(input, &mut diagnostics);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 2);
        assert_eq!(blocks[0].lines[1].line, 5);
    }

    #[test]
    fn test_strip_comment_keeps_quoted_hash() {
        assert_eq!(strip_comment(r#"name: string @label="Issue #4" # trailing"#, false), r#"name: string @label="Issue #4""#);
        assert_eq!(strip_comment(r##"x: string @hint="say \"#hi\"""##, false), r##"x: string @hint="say \"#hi\"""##);
        assert_eq!(strip_comment("# whole line", false), "");
    }

    #[test]
    fn test_strip_comment_keeps_hex_colour_values() {
        assert_eq!(strip_comment("accent: #e05c2a  # brand", true), "accent: #e05c2a");
        assert_eq!(strip_comment("ink: #fff", true), "ink: #fff");
        assert_eq!(strip_comment("title: Blog #fed", true), "title: Blog");
        assert_eq!(strip_comment("accent: #e05c2a", false), "accent:");
    }

    #[test]
    fn test_hex_like_comment_is_stripped() {
        assert_eq!(strip_comment("x: int #add a note", false), "x: int");
        assert_eq!(strip_comment("x: int #cafe", false), "x: int");
        assert_eq!(strip_comment("x: int #note", false), "x: int");
    }

    #[test]
    fn test_apostrophe_does_not_hide_comment() {
        assert_eq!(strip_comment("title: Bob's App # comment", true), "title: Bob's App");
        assert_eq!(strip_comment("font: 'Fira #1', serif # body", true), "font: 'Fira #1', serif");
    }

    #[test]
    fn test_hex_like_comment_in_interface() {
        let mut diagnostics = Diagnostics::default();
        let blocks = tokenize_schema(
            "[config]\naccent: #c84b31 # brand\n[interface A]\nx: int #add a note\n",
            &mut diagnostics,
        );
        assert!(diagnostics.is_empty());
        assert_eq!(blocks[0].lines[0].text, "accent: #c84b31");
        assert_eq!(blocks[1].lines[0].text, "x: int");
    }

    #[test]
    fn test_content_before_header() {
        let input = "orphan: int\n[interface A]\nx: int\n";
        let mut diagnostics = Diagnostics::default();
        let blocks = tokenize_schema(input, &mut diagnostics);
        assert_eq!(blocks.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics.0[0];
        assert_eq!(diagnostic.kind, DiagnosticKind::syntax(SyntaxErrorKind::UnterminatedBlock));
        assert_eq!(diagnostic.location.line, 1);
    }

    #[test]
    fn test_malformed_header_skips_body() {
        let input = "[struct A]\nx: int\n[interface B]\ny: int\n";
        let mut diagnostics = Diagnostics::default();
        let blocks = tokenize_schema(input, &mut diagnostics);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].label(), "interface B");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.0[0].kind, DiagnosticKind::syntax(SyntaxErrorKind::MalformedHeader));
    }

    #[test]
    fn test_config_header_case_insensitive() {
        let mut diagnostics = Diagnostics::default();
        let blocks = tokenize_schema("[CONFIG]\ntitle: X\n", &mut diagnostics);
        assert_eq!(blocks[0].header, BlockHeader::Config);
    }
}
