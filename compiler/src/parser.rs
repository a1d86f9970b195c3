use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use yaif_schema::{
    Config, DefaultValue, Document, EnumDef, EnumMember, EnumValue, FieldDef, InterfaceDef,
    RESERVED_NAMES,
};

use crate::{
    annotations::{parse_annotations, split_annotation_tail},
    error::{DiagnosticKind, Diagnostics, SyntaxErrorKind},
    tokenizer::{Block, BlockHeader, SourceLine},
    type_expr::parse_type_expr,
    utils::{error, opens_quote, quote},
};

lazy_static! {
    static ref CONFIG_LINE:  Regex = Regex::new(r"^([A-Za-z_][\w.-]*)\s*:\s*(.+)$").unwrap();
    static ref FIELD_LINE:   Regex = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(.*)$").unwrap();
    static ref ENUM_MEMBER:  Regex = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?:=\s*(.*))?$").unwrap();
    static ref INTEGER:      Regex = Regex::new(r"^-?\d+$").unwrap();
    static ref BARE_WORD:    Regex = Regex::new(r"^[\w.-]+$").unwrap();
}

/// Strip one matching pair of outer single or double quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Split on `separator` wherever it is outside quotes and brackets.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts    = Vec::new();
    let mut in_quote: Option<char> = None;
    let mut escaped  = false;
    let mut depth    = 0usize;
    let mut start    = 0;
    let mut previous: Option<char> = None;

    for (index, ch) in text.char_indices() {
        let before = previous.replace(ch);
        if let Some(quote_char) = in_quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                in_quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' if opens_quote(ch, before) => in_quote = Some(ch),
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Split `Type = default` at the first top-level `=`.
fn split_default(head: &str) -> (&str, Option<&str>) {
    let parts = split_top_level(head, '=');
    if parts.len() == 1 {
        return (head.trim(), None);
    }
    // `parts[0]` is a prefix of `head`, so its length is the index of the `=`.
    let type_text = parts[0];
    (type_text.trim(), Some(head[type_text.len() + 1..].trim()))
}

fn parse_config(block: &Block, config: &mut Config, diagnostics: &mut Diagnostics) {
    let label = block.label();
    for SourceLine { text, line } in &block.lines {
        match CONFIG_LINE.captures(text) {
            Some(caps) => {
                let value = unquote(caps[2].trim());
                config.insert(&caps[1], value);
            }
            None => diagnostics.push(error(
                DiagnosticKind::syntax(SyntaxErrorKind::MalformedConfigLine),
                &format!("Invalid config syntax {}, expected \"key: value\"", quote(text)),
                Some(&label),
                *line,
            )),
        }
    }
}

fn parse_enum_value(raw: &str) -> Option<EnumValue> {
    let raw = raw.trim();
    if INTEGER.is_match(raw) {
        return raw.parse::<i64>().ok().map(EnumValue::Int);
    }
    let unquoted = unquote(raw);
    if unquoted.len() != raw.len() {
        return Some(EnumValue::String(unquoted.to_string()));
    }
    if BARE_WORD.is_match(raw) {
        return Some(EnumValue::String(raw.to_string()));
    }
    None
}

fn parse_enum(block: &Block, name: &str, diagnostics: &mut Diagnostics) -> EnumDef {
    let label = block.label();
    let mut declared: Vec<(String, Option<EnumValue>)> = Vec::new();
    let mut seen_names:  HashSet<String>    = HashSet::new();
    let mut seen_values: Vec<EnumValue>     = Vec::new();
    let mut had_errors = false;

    for SourceLine { text, line } in &block.lines {
        for item in split_top_level(text, ',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let caps = match ENUM_MEMBER.captures(item) {
                Some(caps) => caps,
                None => {
                    had_errors = true;
                    diagnostics.push(error(
                        DiagnosticKind::syntax(SyntaxErrorKind::MalformedEnumMember),
                        &format!("Invalid enum member {}", quote(item)),
                        Some(&label),
                        *line,
                    ));
                    continue;
                }
            };

            let member = caps[1].to_string();
            let value = match caps.get(2) {
                None => None,
                Some(raw) => match parse_enum_value(raw.as_str()) {
                    Some(value) => Some(value),
                    None => {
                        had_errors = true;
                        diagnostics.push(error(
                            DiagnosticKind::syntax(SyntaxErrorKind::MalformedEnumMember),
                            &format!("Invalid value {} for enum member {}", quote(raw.as_str()), quote(&member)),
                            Some(&label),
                            *line,
                        ));
                        continue;
                    }
                },
            };

            if !seen_names.insert(member.clone()) {
                had_errors = true;
                diagnostics.push(error(
                    DiagnosticKind::DuplicateEnumValueError,
                    &format!("Enum member {} is declared twice in {}", quote(&member), quote(name)),
                    Some(&label),
                    *line,
                ));
                continue;
            }
            if let Some(value) = &value {
                if seen_values.contains(value) {
                    had_errors = true;
                    diagnostics.push(error(
                        DiagnosticKind::DuplicateEnumValueError,
                        &format!("Value {} of enum member {} is used twice in {}", value, quote(&member), quote(name)),
                        Some(&label),
                        *line,
                    ));
                    continue;
                }
                seen_values.push(value.clone());
            }

            declared.push((member, value));
        }
    }

    if declared.is_empty() && !had_errors {
        diagnostics.push(error(
            DiagnosticKind::syntax(SyntaxErrorKind::EmptyEnum),
            &format!("Enum {} has no members", quote(name)),
            Some(&label),
            block.line,
        ));
    }

    // Unassigned members take the next integer after the running counter
    // that no explicit member already uses.
    let explicit: HashSet<i64> = seen_values
        .iter()
        .filter_map(|v| match v {
            EnumValue::Int(n) => Some(*n),
            EnumValue::String(_) => None,
        })
        .collect();
    let mut counter = 0i64;
    let members = declared
        .into_iter()
        .map(|(name, value)| match value {
            Some(value) => EnumMember { name, value, explicit: true },
            None => {
                counter += 1;
                while explicit.contains(&counter) {
                    counter += 1;
                }
                EnumMember { name, value: EnumValue::Int(counter), explicit: false }
            }
        })
        .collect();

    EnumDef {
        name: name.to_string(),
        line: block.line,
        members,
    }
}

fn parse_field(label: &str, source: &SourceLine, diagnostics: &mut Diagnostics) -> Option<FieldDef> {
    let SourceLine { text, line } = source;
    let malformed = |msg: String| {
        error(
            DiagnosticKind::syntax(SyntaxErrorKind::MalformedFieldLine),
            &msg,
            Some(label),
            *line,
        )
    };

    let caps = match FIELD_LINE.captures(text) {
        Some(caps) => caps,
        None => {
            diagnostics.push(malformed(format!(
                "Invalid field line {}, expected \"name: type\"",
                quote(text)
            )));
            return None;
        }
    };
    let name = caps[1].to_string();
    let (head, tail) = split_annotation_tail(caps.get(2).map_or("", |m| m.as_str()));

    let mut annotations = match parse_annotations(tail) {
        Ok(annotations) => annotations,
        Err(issue) => {
            diagnostics.push(issue.at(Some(label), *line));
            return None;
        }
    };

    let (type_text, default_text) = split_default(head);
    if type_text.is_empty() {
        diagnostics.push(malformed(format!("Field {} has no type", quote(&name))));
        return None;
    }
    let mut default = match default_text {
        Some("") => {
            diagnostics.push(malformed(format!("Field {} has \"=\" but no default value", quote(&name))));
            return None;
        }
        Some(raw) => Some(DefaultValue::parse(raw)),
        None => None,
    };

    let type_ = match parse_type_expr(type_text) {
        Ok(type_) => type_,
        Err(issue) => {
            diagnostics.push(issue.at(Some(label), *line));
            return None;
        }
    };

    // `@default=...` stands in for `= ...` when no inline default is written.
    if let Some(value) = annotations.remove("default") {
        if default.is_none() {
            default = Some(DefaultValue::parse(&value.to_string()));
        }
    }

    Some(FieldDef {
        name,
        line: *line,
        type_,
        default,
        annotations,
    })
}

fn parse_interface(
    block: &Block,
    name: &str,
    parent: &Option<String>,
    diagnostics: &mut Diagnostics,
) -> InterfaceDef {
    let label = block.label();
    let mut fields: Vec<FieldDef> = Vec::new();
    let mut seen:   HashSet<String> = HashSet::new();

    for source in &block.lines {
        let field = match parse_field(&label, source, diagnostics) {
            Some(field) => field,
            None => continue,
        };
        if !seen.insert(field.name.clone()) {
            diagnostics.push(error(
                DiagnosticKind::DuplicateFieldError,
                &format!("Field {} is declared twice in interface {}", quote(&field.name), quote(name)),
                Some(&label),
                source.line,
            ));
            continue;
        }
        fields.push(field);
    }

    InterfaceDef {
        name:   name.to_string(),
        line:   block.line,
        parent: parent.clone(),
        fields,
    }
}

/// Turn tokenized blocks into an unresolved `Document`.
///
/// Every independent mistake is pushed onto `diagnostics`; parsing carries on
/// with the next line or block so one run reports all of them.
pub fn parse_schema(blocks: &[Block], diagnostics: &mut Diagnostics) -> Document {
    let mut document = Document::default();
    let mut defined: HashMap<String, usize> = HashMap::new();

    for block in blocks {
        let name = match &block.header {
            BlockHeader::Config => {
                parse_config(block, &mut document.config, diagnostics);
                continue;
            }
            BlockHeader::Enum { name } | BlockHeader::Interface { name, .. } => name,
        };

        if RESERVED_NAMES.contains(&name.as_str()) {
            diagnostics.push(error(
                DiagnosticKind::syntax(SyntaxErrorKind::ReservedName),
                &format!("The type name {} is reserved", quote(name)),
                Some(&block.label()),
                block.line,
            ));
            continue;
        }
        if let Some(first_line) = defined.get(name) {
            diagnostics.push(error(
                DiagnosticKind::DuplicateDefinitionError,
                &format!("The type {} is defined twice (first on line {})", quote(name), first_line),
                Some(&block.label()),
                block.line,
            ));
            continue;
        }
        defined.insert(name.clone(), block.line);

        match &block.header {
            BlockHeader::Enum { name } => {
                document.enums.push(parse_enum(block, name, diagnostics));
            }
            BlockHeader::Interface { name, parent } => {
                document.interfaces.push(parse_interface(block, name, parent, diagnostics));
            }
            BlockHeader::Config => {}
        }
    }

    debug!(
        enums      = document.enums.len(),
        interfaces = document.interfaces.len(),
        errors     = diagnostics.len(),
        "parsed blocks"
    );

    document
}
