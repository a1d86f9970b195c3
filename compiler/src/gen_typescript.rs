use yaif_schema::{EnumDef, EnumValue, FieldDef, Primitive, ResolvedInterface, SchemaModel, TypeExpr};

use crate::generator::GenerateOptions;

/// Maps a type expression to a TypeScript type.
fn map_type(type_: &TypeExpr) -> String {
    match type_ {
        TypeExpr::Primitive { primitive } => match primitive {
            Primitive::String => "string".to_string(),
            Primitive::Int | Primitive::Float => "number".to_string(),
            Primitive::Bool => "boolean".to_string(),
        },
        TypeExpr::List { elem } => match elem.as_ref() {
            // `T | null[]` would bind the brackets to `null`.
            TypeExpr::Optional { .. } => format!("({})[]", map_type(elem)),
            _ => format!("{}[]", map_type(elem)),
        },
        TypeExpr::Dict { key, value } => format!("Record<{}, {}>", map_type(key), map_type(value)),
        TypeExpr::Optional { inner } => format!("{} | null", map_type(inner)),
        TypeExpr::Reference { name, .. } => name.clone(),
    }
}

fn generate_enum(definition: &EnumDef) -> String {
    let mut lines = vec![format!("export enum {} {{", definition.name)];
    for member in &definition.members {
        let value = match &member.value {
            EnumValue::Int(value)    => value.to_string(),
            EnumValue::String(value) => format!("{:?}", value),
        };
        lines.push(format!("  {} = {},", member.name, value));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

fn generate_field(field: &FieldDef) -> String {
    let optional = if field.type_.is_optional() { "?" } else { "" };
    format!("  {}{}: {};", field.name, optional, map_type(&field.type_))
}

fn generate_interface(model: &SchemaModel, iface: &ResolvedInterface, options: &GenerateOptions) -> String {
    // An override with a new type would make `extends` invalid.
    let compose = !options.flatten && !model.shadows_inherited(iface);
    let (extends, fields) = match &iface.parent {
        Some(parent) if compose => (format!(" extends {}", parent), &iface.own_fields),
        _ => (String::new(), &iface.flattened_fields),
    };

    let mut lines = vec![format!("export interface {}{} {{", iface.name, extends)];
    lines.extend(fields.iter().map(generate_field));
    lines.push("}".to_string());
    lines.join("\n")
}

/// Compiles the model into TypeScript enums and interfaces.
pub fn compile_schema_to_typescript(model: &SchemaModel, options: &GenerateOptions) -> String {
    let mut ts_code: Vec<String> = Vec::new();

    let description = model.config.description();
    if !description.is_empty() {
        ts_code.push(format!("/** {} */", description));
        ts_code.push(String::new());
    }

    for definition in &model.enums {
        ts_code.push(generate_enum(definition));
        ts_code.push(String::new());
    }

    for iface in &model.interfaces {
        ts_code.push(generate_interface(model, iface, options));
        ts_code.push(String::new());
    }

    ts_code.join("\n")
}
