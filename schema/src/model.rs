use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

use crate::config::{Config, ResolvedConfig};
use crate::types::TypeExpr;

/// Value of a single `@key`, `@key=value` or `@key="value"` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl AnnotationValue {
    pub fn as_bool(&self) -> bool {
        match self {
            AnnotationValue::Bool(value) => *value,
            AnnotationValue::Int(value)  => *value != 0,
            AnnotationValue::String(value) => {
                matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Bool(value)   => write!(f, "{}", value),
            AnnotationValue::Int(value)    => write!(f, "{}", value),
            AnnotationValue::String(value) => f.write_str(value),
        }
    }
}

/// Ordered annotation list. Keys are unique; inserting an existing key
/// overwrites its value and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    entries: Vec<(String, AnnotationValue)>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: AnnotationValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&AnnotationValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<AnnotationValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// `true` when the key is present and truthy (`@hidden`, `@hidden=1`).
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).map(AnnotationValue::as_bool).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Annotations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Classified form of a default literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    EmptyList,
    EmptyDict,
}

/// A field default exactly as written plus its classified literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultValue {
    pub raw:     String,
    pub literal: LiteralValue,
}

impl DefaultValue {
    /// Classify a literal. Quotes are stripped from string literals; bare
    /// words that are not keywords or numbers are kept as strings.
    pub fn parse(raw: &str) -> DefaultValue {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        let literal = match lower.as_str() {
            "null" | "none" => LiteralValue::Null,
            "true"          => LiteralValue::Bool(true),
            "false"         => LiteralValue::Bool(false),
            "[]"            => LiteralValue::EmptyList,
            "{}"            => LiteralValue::EmptyDict,
            _ => {
                if let Ok(value) = raw.parse::<i64>() {
                    LiteralValue::Int(value)
                } else if let Some(value) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
                    LiteralValue::Float(value)
                } else if raw.len() >= 2
                    && ((raw.starts_with('"') && raw.ends_with('"'))
                        || (raw.starts_with('\'') && raw.ends_with('\'')))
                {
                    LiteralValue::String(raw[1..raw.len() - 1].to_string())
                } else {
                    LiteralValue::String(raw.to_string())
                }
            }
        };
        DefaultValue { raw: raw.to_string(), literal }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub name:        String,
    pub line:        usize,
    #[serde(rename = "type")]
    pub type_:       TypeExpr,
    pub default:     Option<DefaultValue>,
    pub annotations: Annotations,
}

impl FieldDef {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A field is required when it has no default and is not `optional[...]`.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.type_.is_optional()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EnumValue {
    Int(i64),
    String(String),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Int(value)    => write!(f, "{}", value),
            EnumValue::String(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    pub name:     String,
    pub value:    EnumValue,
    /// `false` when the value came from auto-numbering.
    pub explicit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDef {
    pub name:    String,
    pub line:    usize,
    pub members: Vec<EnumMember>,
}

impl EnumDef {
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDef {
    pub name:   String,
    pub line:   usize,
    pub parent: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl InterfaceDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A parsed but unresolved document. References carry no target yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub config:     Config,
    pub enums:      Vec<EnumDef>,
    pub interfaces: Vec<InterfaceDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInterface {
    pub name:             String,
    pub line:             usize,
    pub parent:           Option<String>,
    /// Fields declared on this interface, in declaration order.
    pub own_fields:       Vec<FieldDef>,
    /// Inherited fields first (child overrides kept in place), then the
    /// remaining own fields.
    pub flattened_fields: Vec<FieldDef>,
}

impl ResolvedInterface {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.flattened_fields.iter().find(|f| f.name == name)
    }
}

/// The fully resolved model handed to emitters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaModel {
    pub config:     ResolvedConfig,
    pub enums:      Vec<EnumDef>,
    pub interfaces: Vec<ResolvedInterface>,
}

impl SchemaModel {
    pub fn interface(&self, name: &str) -> Option<&ResolvedInterface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Whether any own field of `iface` replaces a field it inherits.
    /// Emitters that compose a child from its parent cannot express this.
    pub fn shadows_inherited(&self, iface: &ResolvedInterface) -> bool {
        let parent = match iface.parent.as_deref().and_then(|name| self.interface(name)) {
            Some(parent) => parent,
            None => return false,
        };
        let inherited: HashSet<&str> = parent.flattened_fields.iter().map(|f| f.name.as_str()).collect();
        iface.own_fields.iter().any(|f| inherited.contains(f.name.as_str()))
    }
}
