use serde::Serialize;
use std::fmt;

/// The four built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Int,
    Float,
    Bool,
}

impl Primitive {
    pub const ALL: [Primitive; 4] = [
        Primitive::String,
        Primitive::Int,
        Primitive::Float,
        Primitive::Bool,
    ];

    pub fn from_name(name: &str) -> Option<Primitive> {
        match name {
            "string" => Some(Primitive::String),
            "int"    => Some(Primitive::Int),
            "float"  => Some(Primitive::Float),
            "bool"   => Some(Primitive::Bool),
            _        => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Int    => "int",
            Primitive::Float  => "float",
            Primitive::Bool   => "bool",
        }
    }
}

/// What a named reference turned out to point at. Filled in by the reference
/// resolver; `None` on a freshly parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefTarget {
    Interface,
    Enum,
}

/// A parsed type expression such as `list[dict[string, optional[User]]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeExpr {
    Primitive { primitive: Primitive },
    List { elem: Box<TypeExpr> },
    Dict { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Optional { inner: Box<TypeExpr> },
    Reference { name: String, target: Option<RefTarget> },
}

impl TypeExpr {
    pub fn primitive(primitive: Primitive) -> TypeExpr {
        TypeExpr::Primitive { primitive }
    }

    pub fn list(elem: TypeExpr) -> TypeExpr {
        TypeExpr::List { elem: Box::new(elem) }
    }

    pub fn dict(key: TypeExpr, value: TypeExpr) -> TypeExpr {
        TypeExpr::Dict { key: Box::new(key), value: Box::new(value) }
    }

    pub fn optional(inner: TypeExpr) -> TypeExpr {
        TypeExpr::Optional { inner: Box::new(inner) }
    }

    pub fn reference(name: &str) -> TypeExpr {
        TypeExpr::Reference { name: name.to_string(), target: None }
    }

    /// True for `optional[...]` at the top level.
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeExpr::Optional { .. })
    }

    /// Visit every reference in this expression, depth first, left to right.
    pub fn for_each_reference_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&str, &mut Option<RefTarget>),
    {
        match self {
            TypeExpr::Primitive { .. } => {}
            TypeExpr::List { elem } => elem.for_each_reference_mut(f),
            TypeExpr::Dict { key, value } => {
                key.for_each_reference_mut(f);
                value.for_each_reference_mut(f);
            }
            TypeExpr::Optional { inner } => inner.for_each_reference_mut(f),
            TypeExpr::Reference { name, target } => f(name, target),
        }
    }

    /// Names of all references, in the order they appear.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Primitive { .. } => {}
            TypeExpr::List { elem } => elem.collect_references(names),
            TypeExpr::Dict { key, value } => {
                key.collect_references(names);
                value.collect_references(names);
            }
            TypeExpr::Optional { inner } => inner.collect_references(names),
            TypeExpr::Reference { name, .. } => names.push(name),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive { primitive } => f.write_str(primitive.name()),
            TypeExpr::List { elem } => write!(f, "list[{}]", elem),
            TypeExpr::Dict { key, value } => write!(f, "dict[{}, {}]", key, value),
            TypeExpr::Optional { inner } => write!(f, "optional[{}]", inner),
            TypeExpr::Reference { name, .. } => f.write_str(name),
        }
    }
}
