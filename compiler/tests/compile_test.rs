#![cfg(test)]

use serde_json::Value;
use yaif_compiler::{
    compile_schema, generate, validate_schema,
    yaif_schema::{AnnotationValue, EnumValue, FieldDef, Primitive, RefTarget, TypeExpr},
    DiagnosticKind, GenerateOptions, Target,
};

const BLOG: &str = r#"
[config]
title: Blog
description: Posts and their authors

[enum Status]
draft, published = "pub"   # stored as a string

[interface Post extends BaseEntity]
title: string @label="Title" @hint="Shown in lists"
author: Author
status: Status = draft
tags: list[string] = []
subtitle: optional[string]

[interface BaseEntity]
id: int @readonly
created_at: string

[interface Author]
name: string = "Anon"
"#;

fn shape(fields: &[FieldDef]) -> Vec<(&str, String)> {
    fields.iter().map(|f| (f.name.as_str(), f.type_.to_string())).collect()
}

#[test]
fn test_compile_is_deterministic() {
    let first  = compile_schema(BLOG).expect("compile failed");
    let second = compile_schema(BLOG).expect("compile failed");
    assert_eq!(first, second);

    let names: Vec<&str> = first.interfaces.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Post", "BaseEntity", "Author"]);
}

#[test]
fn test_inherited_fields_come_first() {
    let model = compile_schema(BLOG).unwrap();
    let post = model.interface("Post").unwrap();
    assert_eq!(
        shape(&post.flattened_fields),
        vec![
            ("id", "int".to_string()),
            ("created_at", "string".to_string()),
            ("title", "string".to_string()),
            ("author", "Author".to_string()),
            ("status", "Status".to_string()),
            ("tags", "list[string]".to_string()),
            ("subtitle", "optional[string]".to_string()),
        ]
    );
    assert_eq!(post.own_fields.len(), 5);
    assert_eq!(post.parent.as_deref(), Some("BaseEntity"));
}

#[test]
fn test_override_keeps_parent_position() {
    let model = compile_schema("[interface Base]\nx: int\ny: bool\n[interface Child extends Base]\nx: string\n").unwrap();
    let child = model.interface("Child").unwrap();
    assert_eq!(
        shape(&child.flattened_fields),
        vec![("x", "string".to_string()), ("y", "bool".to_string())]
    );
}

#[test]
fn test_circular_inheritance() {
    let diagnostics = validate_schema("[interface A extends B]\n[interface B extends A]\n");
    assert_eq!(diagnostics.len(), 1);
    match &diagnostics.0[0].kind {
        DiagnosticKind::CircularInheritanceError { path } => {
            assert!(path.contains(&"A".to_string()));
            assert!(path.contains(&"B".to_string()));
            assert_eq!(path.first(), path.last());
        }
        other => panic!("unexpected diagnostic {:?}", other),
    }
}

#[test]
fn test_enum_auto_numbering() {
    let model = compile_schema("[enum Role]\nadmin, editor, viewer\n\n[enum P]\nlow=1, normal, high=3, urgent\n").unwrap();

    let values = |name: &str| -> Vec<(String, EnumValue)> {
        model
            .enum_def(name)
            .unwrap()
            .members
            .iter()
            .map(|m| (m.name.clone(), m.value.clone()))
            .collect()
    };
    assert_eq!(
        values("Role"),
        vec![
            ("admin".into(), EnumValue::Int(1)),
            ("editor".into(), EnumValue::Int(2)),
            ("viewer".into(), EnumValue::Int(3)),
        ]
    );
    assert_eq!(
        values("P"),
        vec![
            ("low".into(), EnumValue::Int(1)),
            ("normal".into(), EnumValue::Int(2)),
            ("high".into(), EnumValue::Int(3)),
            ("urgent".into(), EnumValue::Int(4)),
        ]
    );
}

#[test]
fn test_forward_reference_resolves() {
    let model = compile_schema(BLOG).unwrap();
    let post = model.interface("Post").unwrap();
    assert_eq!(
        post.field("author").unwrap().type_,
        TypeExpr::Reference { name: "Author".into(), target: Some(RefTarget::Interface) }
    );
    assert_eq!(
        post.field("status").unwrap().type_,
        TypeExpr::Reference { name: "Status".into(), target: Some(RefTarget::Enum) }
    );
}

#[test]
fn test_undefined_reference_reported_once() {
    let diagnostics = validate_schema("[interface A]\nx: Foo\ny: int\n");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.0[0].kind, DiagnosticKind::UndefinedTypeError { name: "Foo".into() });
    assert_eq!(diagnostics.0[0].location.line, 2);
    assert_eq!(diagnostics.0[0].location.block.as_deref(), Some("interface A"));
}

#[test]
fn test_annotation_typing() {
    let model = compile_schema("[interface Form]\nbio: string @rows=5 @label=\"Full Name\" @hidden\n").unwrap();
    let annotations = &model.interface("Form").unwrap().field("bio").unwrap().annotations;
    assert_eq!(annotations.get("rows"), Some(&AnnotationValue::Int(5)));
    assert_eq!(annotations.get("label"), Some(&AnnotationValue::String("Full Name".into())));
    assert_eq!(annotations.get("hidden"), Some(&AnnotationValue::Bool(true)));
    let keys: Vec<&str> = annotations.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["rows", "label", "hidden"]);
}

#[test]
fn test_reparse_after_fix_has_no_residue() {
    let broken = "[interface A]\nx: list[int\n[interface A]\n";
    let fixed  = "[interface A]\nx: list[int]\n";

    assert!(!validate_schema(broken).is_empty());
    assert!(validate_schema(fixed).is_empty());

    let after_failure = compile_schema(fixed).unwrap();
    let fresh = compile_schema(fixed).unwrap();
    assert_eq!(after_failure, fresh);
    assert_eq!(
        after_failure.interfaces[0].own_fields[0].type_,
        TypeExpr::list(TypeExpr::primitive(Primitive::Int))
    );
}

#[test]
fn test_lexical_errors_collected_across_blocks() {
    let diagnostics = validate_schema("[enum E]\na, a\n[interface E]\n[interface B]\nbad line\n");
    let kinds: Vec<&str> = diagnostics.iter().map(|d| d.kind.name()).collect();
    assert_eq!(kinds, vec!["DuplicateEnumValueError", "DuplicateDefinitionError", "SyntaxError"]);
}

#[test]
fn test_config_defaults_and_explicit_keys() {
    let model = compile_schema(BLOG).unwrap();
    assert_eq!(model.config.title(), "Blog");
    assert_eq!(model.config.get("accent"), Some("#c84b31"));
    assert!(model.config.is_explicit("description"));
}

#[test]
fn test_generate_typescript() {
    let model = compile_schema(BLOG).unwrap();
    let ts = generate(&model, Target::TypeScript, &GenerateOptions::default()).unwrap();

    assert!(ts.starts_with("/** Posts and their authors */"));
    assert!(ts.contains("export enum Status {\n  draft = 1,\n  published = \"pub\",\n}"));
    assert!(ts.contains("export interface Post extends BaseEntity {\n  title: string;\n  author: Author;"));
    assert!(ts.contains("  tags: string[];"));
    assert!(ts.contains("  subtitle?: string | null;"));

    let flat = generate(&model, Target::TypeScript, &GenerateOptions { flatten: true }).unwrap();
    assert!(flat.contains("export interface Post {\n  id: number;\n  created_at: string;\n  title: string;"));
}

#[test]
fn test_generate_jsonschema() {
    let model = compile_schema(BLOG).unwrap();
    let text = generate(&model, Target::JsonSchema, &GenerateOptions::default()).unwrap();
    let schema: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(schema["title"], "Blog");
    assert_eq!(schema["definitions"]["Status"]["enum"], serde_json::json!([1, "pub"]));

    let post = &schema["definitions"]["Post"]["allOf"];
    assert_eq!(post[0]["$ref"], "#/definitions/BaseEntity");
    assert_eq!(post[1]["required"], serde_json::json!(["title", "author"]));
    assert_eq!(post[1]["properties"]["title"]["title"], "Title");
    assert_eq!(post[1]["properties"]["title"]["description"], "Shown in lists");
    assert_eq!(post[1]["properties"]["status"]["default"], 1);
    assert_eq!(post[1]["properties"]["author"]["$ref"], "#/definitions/Author");

    let base = &schema["definitions"]["BaseEntity"];
    assert_eq!(base["properties"]["id"]["readOnly"], true);

    let keys: Vec<&String> = schema["definitions"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["Status", "Post", "BaseEntity", "Author"]);
}

#[test]
fn test_comment_after_field_is_ignored() {
    assert!(validate_schema("[interface A]\nx: int #add a note\ny: string #cafe\n").is_empty());
}

#[test]
fn test_apostrophes_in_defaults_and_config() {
    let model = compile_schema("[config]\ntitle: Bob's App # comment\n[interface A]\nx: string = O'Brien @hidden\n").unwrap();
    assert_eq!(model.config.title(), "Bob's App");
    let x = model.interface("A").unwrap().field("x").unwrap();
    assert_eq!(x.default.as_ref().unwrap().raw, "O'Brien");
    assert!(x.annotations.flag("hidden"));
}

#[test]
fn test_generate_python_with_defaulted_base() {
    let model = compile_schema("[interface Base]\nnote: optional[string]\n[interface Child extends Base]\ntitle: string\n").unwrap();
    let py = generate(&model, Target::Python, &GenerateOptions::default()).unwrap();
    assert_eq!(py.matches("@dataclass(kw_only=True)").count(), 2);
    assert!(py.contains("class Child(Base):\n    title: str"));
}

#[test]
fn test_generate_python() {
    let model = compile_schema(BLOG).unwrap();
    let py = generate(&model, Target::Python, &GenerateOptions::default()).unwrap();

    assert!(py.contains("class Status(Enum):\n    draft = 1\n    published = \"pub\""));
    assert!(py.contains(
        "@dataclass(kw_only=True)\nclass Post(BaseEntity):\n    title: str\n    author: Author\n    \
         status: Status = Status.draft\n    tags: list[str] = field(default_factory=list)\n    \
         subtitle: Optional[str] = None"
    ));
    assert!(py.contains("    name: str = \"Anon\""));

    // Base classes must be defined before subclasses.
    let base = py.find("class BaseEntity:").unwrap();
    let post = py.find("class Post(BaseEntity):").unwrap();
    assert!(base < post);
}
