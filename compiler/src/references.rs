use std::collections::HashMap;

use tracing::debug;
use yaif_schema::{Document, RefTarget};

use crate::{
    error::{DiagnosticKind, Diagnostics},
    utils::{error, quote},
};

/// Tag every named reference in the document with what it points at.
///
/// Lookup is against the whole document, so a field may name an interface or
/// enum declared further down. Each unknown name is reported at its field.
pub fn resolve_references(document: &mut Document, diagnostics: &mut Diagnostics) {
    let mut targets: HashMap<String, RefTarget> = HashMap::new();
    for def in &document.enums {
        targets.insert(def.name.clone(), RefTarget::Enum);
    }
    for iface in &document.interfaces {
        targets.insert(iface.name.clone(), RefTarget::Interface);
    }

    let mut resolved = 0usize;
    for iface in &mut document.interfaces {
        let label = format!("interface {}", iface.name);
        for field in &mut iface.fields {
            let (field_name, line) = (field.name.as_str(), field.line);
            field.type_.for_each_reference_mut(&mut |name, target| match targets.get(name) {
                Some(kind) => {
                    *target = Some(*kind);
                    resolved += 1;
                }
                None => diagnostics.push(error(
                    DiagnosticKind::UndefinedTypeError { name: name.to_string() },
                    &format!("The type {} is not defined for field {}", quote(name), quote(field_name)),
                    Some(&label),
                    line,
                )),
            });
        }
    }

    debug!(resolved, errors = diagnostics.len(), "resolved references");
}
