use serde_json::{json, Map, Number, Value};
use yaif_schema::{
    EnumDef, EnumValue, FieldDef, LiteralValue, Primitive, RefTarget, ResolvedInterface,
    SchemaModel, TypeExpr,
};

use crate::{error::YaifError, generator::GenerateOptions};

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

fn definition_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/definitions/{}", name) })
}

fn type_schema(type_: &TypeExpr) -> Value {
    match type_ {
        TypeExpr::Primitive { primitive } => {
            let name = match primitive {
                Primitive::String => "string",
                Primitive::Int    => "integer",
                Primitive::Float  => "number",
                Primitive::Bool   => "boolean",
            };
            json!({ "type": name })
        }
        TypeExpr::List { elem } => json!({ "type": "array", "items": type_schema(elem) }),
        TypeExpr::Dict { value, .. } => json!({
            "type": "object",
            "additionalProperties": type_schema(value),
        }),
        TypeExpr::Optional { inner } => json!({ "anyOf": [type_schema(inner), { "type": "null" }] }),
        TypeExpr::Reference { name, .. } => definition_ref(name),
    }
}

/// Default as a JSON value. A bare member name on an enum-typed field is
/// replaced with that member's value.
fn default_value(model: &SchemaModel, field: &FieldDef) -> Option<Value> {
    let default = field.default.as_ref()?;

    if let (TypeExpr::Reference { name, target: Some(RefTarget::Enum) }, LiteralValue::String(member)) =
        (&field.type_, &default.literal)
    {
        if let Some(member) = model.enum_def(name).and_then(|e| e.member(member)) {
            return Some(enum_value(&member.value));
        }
    }

    let value = match &default.literal {
        LiteralValue::Null          => Value::Null,
        LiteralValue::Bool(value)   => Value::Bool(*value),
        LiteralValue::Int(value)    => Value::from(*value),
        LiteralValue::Float(value)  => Number::from_f64(*value).map(Value::Number).unwrap_or(Value::Null),
        LiteralValue::String(value) => Value::String(value.clone()),
        LiteralValue::EmptyList     => json!([]),
        LiteralValue::EmptyDict     => json!({}),
    };
    Some(value)
}

fn enum_value(value: &EnumValue) -> Value {
    match value {
        EnumValue::Int(value)    => Value::from(*value),
        EnumValue::String(value) => Value::String(value.clone()),
    }
}

fn field_schema(model: &SchemaModel, field: &FieldDef) -> Value {
    let mut schema = match type_schema(&field.type_) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Some(label) = field.annotations.get("label") {
        schema.insert("title".to_string(), Value::String(label.to_string()));
    }
    if let Some(hint) = field.annotations.get("hint") {
        schema.insert("description".to_string(), Value::String(hint.to_string()));
    }
    if field.annotations.flag("readonly") {
        schema.insert("readOnly".to_string(), Value::Bool(true));
    }
    if let Some(default) = default_value(model, field) {
        schema.insert("default".to_string(), default);
    }

    Value::Object(schema)
}

fn object_schema(model: &SchemaModel, fields: &[FieldDef]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        properties.insert(field.name.clone(), field_schema(model, field));
    }
    let required: Vec<&str> = fields
        .iter()
        .filter(|f| f.is_required())
        .map(|f| f.name.as_str())
        .collect();

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), json!(required));
    }
    Value::Object(schema)
}

fn interface_schema(model: &SchemaModel, iface: &ResolvedInterface, options: &GenerateOptions) -> Value {
    // `allOf` cannot be satisfied when an override changes a parent's field.
    let compose = !options.flatten && !model.shadows_inherited(iface);
    match &iface.parent {
        Some(parent) if compose => json!({
            "allOf": [definition_ref(parent), object_schema(model, &iface.own_fields)],
        }),
        _ => object_schema(model, &iface.flattened_fields),
    }
}

fn enum_schema(definition: &EnumDef) -> Value {
    let values: Vec<Value> = definition.members.iter().map(|m| enum_value(&m.value)).collect();
    json!({ "enum": values })
}

/// Compiles the model into a single draft-07 JSON Schema document whose
/// `definitions` hold every enum and interface.
pub fn compile_schema_to_jsonschema(model: &SchemaModel, options: &GenerateOptions) -> Result<String, YaifError> {
    let mut definitions = Map::new();
    for definition in &model.enums {
        definitions.insert(definition.name.clone(), enum_schema(definition));
    }
    for iface in &model.interfaces {
        definitions.insert(iface.name.clone(), interface_schema(model, iface, options));
    }

    let mut root = Map::new();
    root.insert("$schema".to_string(), json!(DRAFT_07));
    root.insert("title".to_string(), json!(model.config.title()));
    let description = model.config.description();
    if !description.is_empty() {
        root.insert("description".to_string(), json!(description));
    }
    root.insert("definitions".to_string(), Value::Object(definitions));

    Ok(serde_json::to_string_pretty(&Value::Object(root))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_becomes_any_of_null() {
        let ty = TypeExpr::optional(TypeExpr::list(TypeExpr::primitive(Primitive::Float)));
        assert_eq!(
            type_schema(&ty),
            json!({ "anyOf": [{ "type": "array", "items": { "type": "number" } }, { "type": "null" }] })
        );
    }

    #[test]
    fn test_override_is_written_flat() {
        let model = crate::compiler::compile_schema(
            "[interface Base]\nx: int\ny: bool\n[interface Child extends Base]\nx: string\n",
        )
        .unwrap();
        let text = compile_schema_to_jsonschema(&model, &GenerateOptions::default()).unwrap();
        let schema: Value = serde_json::from_str(&text).unwrap();
        let child = &schema["definitions"]["Child"];
        assert!(child.get("allOf").is_none());
        assert_eq!(child["properties"]["x"]["type"], "string");
        assert_eq!(child["properties"]["y"]["type"], "boolean");
        assert_eq!(child["required"], json!(["x", "y"]));
    }

    #[test]
    fn test_dict_values_become_additional_properties() {
        let ty = TypeExpr::dict(TypeExpr::primitive(Primitive::String), TypeExpr::reference("Tag"));
        assert_eq!(
            type_schema(&ty),
            json!({ "type": "object", "additionalProperties": { "$ref": "#/definitions/Tag" } })
        );
    }
}
