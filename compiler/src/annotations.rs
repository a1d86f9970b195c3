use yaif_schema::{AnnotationValue, Annotations};

use crate::error::{SyntaxErrorKind, SyntaxIssue};
use crate::utils::{opens_quote, quote};

/// Split the part of a field line after `name:` into the type/default head
/// and the annotation tail. The tail starts at the first `@` outside quotes
/// that is preceded by whitespace.
pub fn split_annotation_tail(rest: &str) -> (&str, &str) {
    let mut in_quote: Option<char> = None;
    let mut escaped  = false;
    let mut previous: Option<char> = None;

    for (index, ch) in rest.char_indices() {
        if let Some(quote_char) = in_quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                in_quote = None;
            }
        } else if opens_quote(ch, previous) {
            in_quote = Some(ch);
        } else if ch == '@' && previous.map_or(false, char::is_whitespace) {
            return (rest[..index].trim(), rest[index..].trim());
        }
        previous = Some(ch);
    }

    (rest.trim(), "")
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn typed_value(bare: &str) -> AnnotationValue {
    if bare.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(value) = bare.parse::<i64>() {
            return AnnotationValue::Int(value);
        }
    }
    AnnotationValue::String(bare.to_string())
}

/// Parse an annotation tail such as `@label="Full Name" @rows=5 @hidden`.
///
/// A key given twice keeps the value of its last occurrence.
pub fn parse_annotations(text: &str) -> Result<Annotations, SyntaxIssue> {
    let mut annotations = Annotations::new();
    let mut chars = text.char_indices().peekable();

    loop {
        while chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

        let (start, ch) = match chars.next() {
            Some(next) => next,
            None => break,
        };
        if ch != '@' {
            let token = text[start..].split_whitespace().next().unwrap_or("");
            return Err(SyntaxIssue::new(
                SyntaxErrorKind::MalformedAnnotation,
                format!("Expected an annotation starting with \"@\" but found {}", quote(token)),
            ));
        }

        let mut key = String::new();
        while let Some((_, ch)) = chars.next_if(|(_, ch)| is_key_char(*ch)) {
            key.push(ch);
        }
        if key.is_empty() {
            return Err(SyntaxIssue::new(
                SyntaxErrorKind::MalformedAnnotation,
                "Annotation is missing a key after \"@\"".to_string(),
            ));
        }

        let value = match chars.peek().map(|(_, ch)| *ch) {
            None => AnnotationValue::Bool(true),
            Some(ch) if ch.is_whitespace() => AnnotationValue::Bool(true),
            Some('=') => {
                chars.next();
                if chars.next_if(|(_, ch)| *ch == '"').is_some() {
                    let mut value   = String::new();
                    let mut closed  = false;
                    while let Some((_, ch)) = chars.next() {
                        match ch {
                            '\\' => match chars.next() {
                                Some((_, escaped)) => value.push(escaped),
                                None => break,
                            },
                            '"' => {
                                closed = true;
                                break;
                            }
                            other => value.push(other),
                        }
                    }
                    if !closed {
                        return Err(SyntaxIssue::new(
                            SyntaxErrorKind::UnterminatedQuote,
                            format!("Unterminated quoted value for annotation {}", quote(&key)),
                        ));
                    }
                    if let Some((_, ch)) = chars.peek() {
                        if !ch.is_whitespace() {
                            return Err(SyntaxIssue::new(
                                SyntaxErrorKind::MalformedAnnotation,
                                format!("Unexpected text after quoted value of annotation {}", quote(&key)),
                            ));
                        }
                    }
                    AnnotationValue::String(value)
                } else {
                    let mut bare = String::new();
                    while let Some((_, ch)) = chars.next_if(|(_, ch)| !ch.is_whitespace()) {
                        bare.push(ch);
                    }
                    if bare.is_empty() {
                        return Err(SyntaxIssue::new(
                            SyntaxErrorKind::MalformedAnnotation,
                            format!("Annotation {} has \"=\" but no value", quote(&key)),
                        ));
                    }
                    typed_value(&bare)
                }
            }
            Some(other) => {
                return Err(SyntaxIssue::new(
                    SyntaxErrorKind::MalformedAnnotation,
                    format!("Unexpected {} in annotation key {}", quote(&other.to_string()), quote(&key)),
                ))
            }
        };

        annotations.insert(&key, value);
    }

    Ok(annotations)
}
