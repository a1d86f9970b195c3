//! yaif-compiler
//!
//! This crate implements:
//!  1) A tokenizer + block parser for `.yaif` schema files,
//!  2) Resolution (inheritance cycles, undefined types, field flattening),
//!  3) Diagnostics collected across the whole document rather than stopping at the first,
//!  4) Code generation for TypeScript, JSON Schema and Python (`generate` → `String`),
//!  5) Error types (`Diagnostic`, `YaifError`).

pub mod error;
pub mod utils;
pub mod tokenizer;
pub mod type_expr;
pub mod annotations;
pub mod parser;
pub mod inheritance;
pub mod references;
pub mod compiler;
pub mod generator;
pub mod gen_typescript;
pub mod gen_jsonschema;
pub mod gen_python;

pub use compiler::{compile_schema, parse_document, resolve_document, validate_schema};
pub use error::{Diagnostic, DiagnosticKind, Diagnostics, Location, SyntaxErrorKind, YaifError};
pub use generator::{generate, GenerateOptions, Target};
pub use yaif_schema;
