use std::collections::HashSet;

use yaif_schema::{
    EnumDef, EnumValue, FieldDef, LiteralValue, Primitive, RefTarget, ResolvedInterface,
    SchemaModel, TypeExpr,
};

use crate::{generator::GenerateOptions, utils::quote};

const HEADER: &str = "from __future__ import annotations

from dataclasses import dataclass, field
from enum import Enum
from typing import Optional";

fn map_type(type_: &TypeExpr) -> String {
    match type_ {
        TypeExpr::Primitive { primitive } => match primitive {
            Primitive::String => "str".to_string(),
            Primitive::Int    => "int".to_string(),
            Primitive::Float  => "float".to_string(),
            Primitive::Bool   => "bool".to_string(),
        },
        TypeExpr::List { elem } => format!("list[{}]", map_type(elem)),
        TypeExpr::Dict { key, value } => format!("dict[{}, {}]", map_type(key), map_type(value)),
        TypeExpr::Optional { inner } => format!("Optional[{}]", map_type(inner)),
        TypeExpr::Reference { name, .. } => name.clone(),
    }
}

/// Python expression for a field default. Optional fields without one
/// default to `None`.
fn default_expr(model: &SchemaModel, field: &FieldDef) -> Option<String> {
    let default = match &field.default {
        Some(default) => default,
        None if field.type_.is_optional() => return Some("None".to_string()),
        None => return None,
    };

    let expr = match &default.literal {
        LiteralValue::Null        => "None".to_string(),
        LiteralValue::Bool(true)  => "True".to_string(),
        LiteralValue::Bool(false) => "False".to_string(),
        LiteralValue::Int(_) | LiteralValue::Float(_) => default.raw.clone(),
        LiteralValue::EmptyList   => "field(default_factory=list)".to_string(),
        LiteralValue::EmptyDict   => "field(default_factory=dict)".to_string(),
        LiteralValue::String(value) => match &field.type_ {
            TypeExpr::Reference { name, target: Some(RefTarget::Enum) }
                if model.enum_def(name).and_then(|e| e.member(value)).is_some() =>
            {
                format!("{}.{}", name, value)
            }
            _ => quote(value),
        },
    };
    Some(expr)
}

fn generate_enum(definition: &EnumDef) -> String {
    let mut lines = vec![format!("class {}(Enum):", definition.name)];
    for member in &definition.members {
        let value = match &member.value {
            EnumValue::Int(value)    => value.to_string(),
            EnumValue::String(value) => quote(value),
        };
        lines.push(format!("    {} = {}", member.name, value));
    }
    lines.join("\n")
}

fn generate_dataclass(model: &SchemaModel, iface: &ResolvedInterface, options: &GenerateOptions) -> String {
    let (base, fields) = match (&iface.parent, options.flatten) {
        (Some(parent), false) => (format!("({})", parent), &iface.own_fields),
        _ => (String::new(), &iface.flattened_fields),
    };

    // Keyword-only fields let a subclass add required fields after a base
    // class with defaults.
    let mut lines = vec![
        "@dataclass(kw_only=True)".to_string(),
        format!("class {}{}:", iface.name, base),
    ];

    if fields.is_empty() {
        lines.push("    pass".to_string());
    }
    for field in fields {
        let annotation = format!("    {}: {}", field.name, map_type(&field.type_));
        match default_expr(model, field) {
            Some(expr) => lines.push(format!("{} = {}", annotation, expr)),
            None => lines.push(annotation),
        }
    }
    lines.join("\n")
}

/// Interfaces ordered so every parent class precedes its children.
fn class_order<'a>(model: &'a SchemaModel, options: &GenerateOptions) -> Vec<&'a ResolvedInterface> {
    if options.flatten {
        return model.interfaces.iter().collect();
    }

    let mut emitted: HashSet<&str> = HashSet::new();
    let mut ordered = Vec::with_capacity(model.interfaces.len());
    while ordered.len() < model.interfaces.len() {
        let before = ordered.len();
        for iface in &model.interfaces {
            if emitted.contains(iface.name.as_str()) {
                continue;
            }
            let ready = match &iface.parent {
                Some(parent) => emitted.contains(parent.as_str()),
                None => true,
            };
            if ready {
                emitted.insert(iface.name.as_str());
                ordered.push(iface);
            }
        }
        if ordered.len() == before {
            break;
        }
    }
    ordered
}

/// Compiles the model into Python `Enum` classes and dataclasses.
pub fn compile_schema_to_python(model: &SchemaModel, options: &GenerateOptions) -> String {
    let mut py_code: Vec<String> = Vec::new();

    let description = model.config.description();
    if !description.is_empty() {
        py_code.push(format!("\"\"\"{}\"\"\"", description.replace("\"\"\"", "\\\"\\\"\\\"")));
        py_code.push(String::new());
    }

    py_code.push(HEADER.to_string());

    for definition in &model.enums {
        py_code.push(String::new());
        py_code.push(String::new());
        py_code.push(generate_enum(definition));
    }

    for iface in class_order(model, options) {
        py_code.push(String::new());
        py_code.push(String::new());
        py_code.push(generate_dataclass(model, iface, options));
    }

    py_code.push(String::new());
    py_code.join("\n")
}
