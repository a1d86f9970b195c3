use tracing::debug;
use yaif_schema::{Document, ResolvedInterface, SchemaModel};

use crate::{
    error::Diagnostics,
    inheritance::check_inheritance,
    parser::parse_schema,
    references::resolve_references,
    tokenizer::tokenize_schema,
};

/// Tokenize and parse `text` into an unresolved `Document`.
/// Returns every lexical or grammatical problem found in the whole text.
pub fn parse_document(text: &str) -> Result<Document, Diagnostics> {
    let mut diagnostics = Diagnostics::default();
    let blocks   = tokenize_schema(text, &mut diagnostics);
    let document = parse_schema(&blocks, &mut diagnostics);
    debug!(blocks = blocks.len(), errors = diagnostics.len(), "parsed document");
    diagnostics.into_result()?;
    Ok(document)
}

/// Resolve a structurally valid `Document`: check the inheritance graph, tag
/// references, then flatten inherited fields.
pub fn resolve_document(mut document: Document) -> Result<SchemaModel, Diagnostics> {
    let mut diagnostics = Diagnostics::default();
    let graph = check_inheritance(&document, &mut diagnostics);
    resolve_references(&mut document, &mut diagnostics);
    diagnostics.into_result()?;

    let flattened = graph.flatten(&document.interfaces);
    let interfaces = document
        .interfaces
        .into_iter()
        .zip(flattened)
        .map(|(iface, flattened_fields)| ResolvedInterface {
            name:       iface.name,
            line:       iface.line,
            parent:     iface.parent,
            own_fields: iface.fields,
            flattened_fields,
        })
        .collect();

    Ok(SchemaModel {
        config: document.config.resolve(),
        enums:  document.enums,
        interfaces,
    })
}

/// Compile schema text into a resolved `SchemaModel`.
///
/// Resolution is only attempted when parsing reported nothing, since it
/// relies on a structurally valid document.
pub fn compile_schema(text: &str) -> Result<SchemaModel, Diagnostics> {
    let document = parse_document(text)?;
    let model = resolve_document(document)?;
    debug!(
        enums      = model.enums.len(),
        interfaces = model.interfaces.len(),
        "compiled schema"
    );
    Ok(model)
}

/// Validate-only mode: run the full pipeline and return its diagnostics,
/// which are empty for a valid document.
pub fn validate_schema(text: &str) -> Diagnostics {
    match compile_schema(text) {
        Ok(_) => Diagnostics::default(),
        Err(diagnostics) => diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_skipped_after_syntax_errors() {
        // `Foo` is undefined, but the malformed line stops the run before resolution.
        let diagnostics = validate_schema("[interface A]\nx: Foo\ny: list[int\n");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.0[0].kind.is_lexical());
    }

    #[test]
    fn test_resolution_errors_are_collected_together() {
        let diagnostics = validate_schema(
            "[interface A extends B]\nx: Foo\n[interface B extends A]\ny: Bar\n",
        );
        let kinds: Vec<&str> = diagnostics.iter().map(|d| d.kind.name()).collect();
        assert_eq!(
            kinds,
            vec!["CircularInheritanceError", "UndefinedTypeError", "UndefinedTypeError"]
        );
    }

    #[test]
    fn test_missing_config_gets_defaults() {
        let model = compile_schema("[interface A]\nx: int\n").unwrap();
        assert_eq!(model.config.title(), "YAIF App");
        assert!(model.config.explicit.is_empty());
    }
}
