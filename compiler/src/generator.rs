use std::fmt;
use std::str::FromStr;

use yaif_schema::SchemaModel;

use crate::{
    error::YaifError,
    gen_jsonschema::compile_schema_to_jsonschema,
    gen_python::compile_schema_to_python,
    gen_typescript::compile_schema_to_typescript,
};

/// The emitters this crate ships. Selected by name on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    TypeScript,
    JsonSchema,
    Python,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::TypeScript, Target::JsonSchema, Target::Python];

    pub fn name(&self) -> &'static str {
        match self {
            Target::TypeScript => "typescript",
            Target::JsonSchema => "jsonschema",
            Target::Python     => "python",
        }
    }

    /// File extension (with the dot) for generated output.
    pub fn extension(&self) -> &'static str {
        match self {
            Target::TypeScript => ".ts",
            Target::JsonSchema => ".json",
            Target::Python     => ".py",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Target::ALL
            .into_iter()
            .find(|t| t.name() == lower || (lower == "ts" && *t == Target::TypeScript))
            .ok_or_else(|| {
                let known: Vec<&str> = Target::ALL.iter().map(Target::name).collect();
                format!("unknown target \"{}\" (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Options shared by every emitter. Emitters ignore what they do not use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Write each interface's complete field list instead of composing it
    /// from its parent.
    pub flatten: bool,
}

/// Run one emitter over a resolved model.
pub fn generate(model: &SchemaModel, target: Target, options: &GenerateOptions) -> Result<String, YaifError> {
    match target {
        Target::TypeScript => Ok(compile_schema_to_typescript(model, options)),
        Target::JsonSchema => compile_schema_to_jsonschema(model, options),
        Target::Python     => Ok(compile_schema_to_python(model, options)),
    }
}
