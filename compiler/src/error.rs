use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Fine-grained reason for a `SyntaxError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyntaxErrorKind {
    MalformedHeader,
    UnterminatedBlock,
    UnbalancedBrackets,
    MissingDictSeparator,
    NestingTooDeep,
    MalformedType,
    UnterminatedQuote,
    MalformedAnnotation,
    MalformedFieldLine,
    MalformedConfigLine,
    MalformedEnumMember,
    EmptyEnum,
    ReservedName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum DiagnosticKind {
    SyntaxError { reason: SyntaxErrorKind },
    DuplicateDefinitionError,
    DuplicateEnumValueError,
    UndefinedTypeError { name: String },
    CircularInheritanceError { path: Vec<String> },
    DuplicateFieldError,
}

impl DiagnosticKind {
    pub fn syntax(reason: SyntaxErrorKind) -> Self {
        DiagnosticKind::SyntaxError { reason }
    }

    /// Lexical and grammatical errors are reported by the parsing stage;
    /// the rest come from resolution.
    pub fn is_lexical(&self) -> bool {
        !matches!(
            self,
            DiagnosticKind::UndefinedTypeError { .. } | DiagnosticKind::CircularInheritanceError { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::SyntaxError { .. }              => "SyntaxError",
            DiagnosticKind::DuplicateDefinitionError        => "DuplicateDefinitionError",
            DiagnosticKind::DuplicateEnumValueError         => "DuplicateEnumValueError",
            DiagnosticKind::UndefinedTypeError { .. }       => "UndefinedTypeError",
            DiagnosticKind::CircularInheritanceError { .. } => "CircularInheritanceError",
            DiagnosticKind::DuplicateFieldError             => "DuplicateFieldError",
        }
    }
}

/// Where a diagnostic points: the enclosing block (if any) and the 1-based
/// line within the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub block: Option<String>,
    pub line:  usize,
}

impl Location {
    pub fn new(block: Option<&str>, line: usize) -> Self {
        Location { block: block.map(str::to_string), line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.block {
            Some(block) => write!(f, "line {} in [{}]", self.line, block),
            None        => write!(f, "line {}", self.line),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{}: {location}: {message}", .kind.name())]
pub struct Diagnostic {
    #[serde(flatten)]
    pub kind:     DiagnosticKind,
    pub message:  String,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: String, location: Location) -> Self {
        Diagnostic { kind, message, location }
    }
}

/// A syntax problem found inside a single line fragment (a type expression
/// or an annotation tail), before the caller knows the block and line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxIssue {
    pub kind:    SyntaxErrorKind,
    pub message: String,
}

impl SyntaxIssue {
    pub fn new(kind: SyntaxErrorKind, message: String) -> Self {
        SyntaxIssue { kind, message }
    }

    pub fn at(self, block: Option<&str>, line: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::syntax(self.kind), self.message, Location::new(block, line))
    }
}

/// Every problem found in one run, in the order they were discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[serde(transparent)]
#[error("{} error(s) found", .0.len())]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// `Ok(())` when nothing has been reported.
    pub fn into_result(self) -> Result<(), Diagnostics> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors surfaced to callers that also do I/O or serialization.
#[derive(Debug, Error)]
pub enum YaifError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema has errors: {0}")]
    Diagnostics(#[from] Diagnostics),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
