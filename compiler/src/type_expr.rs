use yaif_schema::{Primitive, TypeExpr};

use crate::error::{SyntaxErrorKind, SyntaxIssue};
use crate::utils::quote;

/// Deepest generic nesting accepted before giving up.
pub const MAX_TYPE_DEPTH: usize = 32;

struct TypeParser<'a> {
    text: &'a str,
    pos:  usize,
}

impl<'a> TypeParser<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> Result<&'a str, SyntaxIssue> {
        self.skip_whitespace();
        let text  = self.text;
        let start = self.pos;
        let mut chars = text[start..].char_indices();
        match chars.next() {
            Some((_, ch)) if ch.is_ascii_alphabetic() || ch == '_' => {}
            Some((_, ch)) => {
                return Err(SyntaxIssue::new(
                    SyntaxErrorKind::MalformedType,
                    format!("Expected a type name but found {}", quote(&ch.to_string())),
                ))
            }
            None => {
                return Err(SyntaxIssue::new(
                    SyntaxErrorKind::MalformedType,
                    "Expected a type name but found end of input".to_string(),
                ))
            }
        }
        let end = chars
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '_'))
            .map(|(offset, _)| start + offset)
            .unwrap_or(text.len());
        self.pos = end;
        Ok(&text[start..end])
    }

    fn open(&mut self, keyword: &str) -> Result<(), SyntaxIssue> {
        if self.eat('[') {
            Ok(())
        } else {
            Err(SyntaxIssue::new(
                SyntaxErrorKind::MalformedType,
                format!("Expected \"[\" after {}", quote(keyword)),
            ))
        }
    }

    fn close(&mut self, keyword: &str) -> Result<(), SyntaxIssue> {
        if self.eat(']') {
            Ok(())
        } else {
            Err(SyntaxIssue::new(
                SyntaxErrorKind::UnbalancedBrackets,
                format!("Missing \"]\" to close {}[", keyword),
            ))
        }
    }

    fn parse_type(&mut self, depth: usize) -> Result<TypeExpr, SyntaxIssue> {
        if depth > MAX_TYPE_DEPTH {
            return Err(SyntaxIssue::new(
                SyntaxErrorKind::NestingTooDeep,
                format!("Type nesting deeper than {} levels", MAX_TYPE_DEPTH),
            ));
        }

        let name = self.identifier()?;
        match name {
            "list" => {
                self.open(name)?;
                let elem = self.parse_type(depth + 1)?;
                self.close(name)?;
                Ok(TypeExpr::list(elem))
            }
            "optional" => {
                self.open(name)?;
                let inner = self.parse_type(depth + 1)?;
                self.close(name)?;
                Ok(TypeExpr::optional(inner))
            }
            "dict" => {
                self.open(name)?;
                let key = self.parse_type(depth + 1)?;
                if !self.eat(',') {
                    return Err(SyntaxIssue::new(
                        SyntaxErrorKind::MissingDictSeparator,
                        "dict expects two type parameters separated by \",\"".to_string(),
                    ));
                }
                let value = self.parse_type(depth + 1)?;
                self.close(name)?;
                Ok(TypeExpr::dict(key, value))
            }
            other => Ok(match Primitive::from_name(other) {
                Some(primitive) => TypeExpr::primitive(primitive),
                None => TypeExpr::reference(other),
            }),
        }
    }
}

/// Parse a complete type expression. Names that are not primitives come back
/// as unresolved references.
pub fn parse_type_expr(text: &str) -> Result<TypeExpr, SyntaxIssue> {
    let mut parser = TypeParser { text, pos: 0 };
    let expr = parser.parse_type(0)?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(expr),
        Some(']') => Err(SyntaxIssue::new(
            SyntaxErrorKind::UnbalancedBrackets,
            format!("Unexpected \"]\" in type {}", quote(text)),
        )),
        Some(_) => Err(SyntaxIssue::new(
            SyntaxErrorKind::MalformedType,
            format!("Unexpected {} after type {}", quote(&text[parser.pos..]), quote(&text[..parser.pos])),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(text: &str) -> SyntaxErrorKind {
        parse_type_expr(text).unwrap_err().kind
    }

    #[test]
    fn test_primitives_and_references() {
        assert_eq!(parse_type_expr("int").unwrap(), TypeExpr::primitive(Primitive::Int));
        assert_eq!(parse_type_expr(" string ").unwrap(), TypeExpr::primitive(Primitive::String));
        assert_eq!(parse_type_expr("Author").unwrap(), TypeExpr::reference("Author"));
        // Keywords are lowercase only.
        assert_eq!(parse_type_expr("String").unwrap(), TypeExpr::reference("String"));
    }

    #[test]
    fn test_nested_generics() {
        let got = parse_type_expr("list[ dict[string, optional[Tag]] ]").unwrap();
        let expected = TypeExpr::list(TypeExpr::dict(
            TypeExpr::primitive(Primitive::String),
            TypeExpr::optional(TypeExpr::reference("Tag")),
        ));
        assert_eq!(got, expected);
    }

    #[test]
    fn test_dict_with_generic_key() {
        let got = parse_type_expr("dict[list[int],bool]").unwrap();
        assert_eq!(
            got,
            TypeExpr::dict(
                TypeExpr::list(TypeExpr::primitive(Primitive::Int)),
                TypeExpr::primitive(Primitive::Bool),
            )
        );
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert_eq!(kind_of("list[int"), SyntaxErrorKind::UnbalancedBrackets);
        assert_eq!(kind_of("list[int]]"), SyntaxErrorKind::UnbalancedBrackets);
        assert_eq!(kind_of("optional[list[int]"), SyntaxErrorKind::UnbalancedBrackets);
    }

    #[test]
    fn test_missing_dict_separator() {
        assert_eq!(kind_of("dict[string]"), SyntaxErrorKind::MissingDictSeparator);
        assert_eq!(kind_of("dict[string int]"), SyntaxErrorKind::MissingDictSeparator);
    }

    #[test]
    fn test_malformed_types() {
        assert_eq!(kind_of(""), SyntaxErrorKind::MalformedType);
        assert_eq!(kind_of("list"), SyntaxErrorKind::MalformedType);
        assert_eq!(kind_of("int string"), SyntaxErrorKind::MalformedType);
        assert_eq!(kind_of("9lives"), SyntaxErrorKind::MalformedType);
    }

    #[test]
    fn test_nesting_cap() {
        let ok = format!("{}int{}", "list[".repeat(MAX_TYPE_DEPTH), "]".repeat(MAX_TYPE_DEPTH));
        assert!(parse_type_expr(&ok).is_ok());

        let deep = format!("{}int{}", "list[".repeat(MAX_TYPE_DEPTH + 1), "]".repeat(MAX_TYPE_DEPTH + 1));
        assert_eq!(kind_of(&deep), SyntaxErrorKind::NestingTooDeep);
    }
}
