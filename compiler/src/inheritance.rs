use std::collections::{HashMap, HashSet};

use tracing::debug;
use yaif_schema::{Document, FieldDef, InterfaceDef};

use crate::{
    error::{DiagnosticKind, Diagnostics},
    utils::{error, quote},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Parent edges between interfaces, indexed by declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceGraph {
    pub names:   Vec<String>,
    pub parents: Vec<Option<usize>>,
}

impl InheritanceGraph {
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Ancestors of `index`, nearest first. Stops early on a cycle.
    pub fn ancestors(&self, index: usize) -> Vec<&str> {
        let mut result = Vec::new();
        let mut seen   = HashSet::new();
        let mut current = self.parents.get(index).copied().flatten();
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            result.push(self.names[parent].as_str());
            current = self.parents[parent];
        }
        result
    }

    /// Flattened field list of every interface, aligned with `interfaces`.
    ///
    /// Each list is computed once and reused by descendants. The graph must be
    /// acyclic; `check_inheritance` reports cycles beforehand.
    pub fn flatten(&self, interfaces: &[InterfaceDef]) -> Vec<Vec<FieldDef>> {
        let count = interfaces.len();
        let mut memo: Vec<Option<Vec<FieldDef>>> = vec![None; count];

        for start in 0..count {
            let mut chain   = Vec::new();
            let mut current = Some(start);
            while let Some(index) = current {
                if memo[index].is_some() || chain.len() > count {
                    break;
                }
                chain.push(index);
                current = self.parents[index];
            }

            for &index in chain.iter().rev() {
                let own = &interfaces[index].fields;
                let merged = match self.parents[index] {
                    Some(parent) => merge_fields(memo[parent].as_deref().unwrap_or(&[]), own),
                    None => own.clone(),
                };
                memo[index] = Some(merged);
            }
        }

        memo.into_iter().map(Option::unwrap_or_default).collect()
    }
}

/// Walk the parent's flattened fields in order, substituting any own field of
/// the same name in place, then append the own fields not used that way.
pub fn merge_fields(inherited: &[FieldDef], own: &[FieldDef]) -> Vec<FieldDef> {
    let own_index: HashMap<&str, usize> = own
        .iter()
        .enumerate()
        .map(|(i, field)| (field.name.as_str(), i))
        .collect();
    let mut consumed = vec![false; own.len()];
    let mut merged   = Vec::with_capacity(inherited.len() + own.len());

    for field in inherited {
        match own_index.get(field.name.as_str()).copied() {
            Some(index) => {
                consumed[index] = true;
                merged.push(own[index].clone());
            }
            None => merged.push(field.clone()),
        }
    }

    merged.extend(
        own.iter()
            .zip(&consumed)
            .filter(|(_, used)| !**used)
            .map(|(field, _)| field.clone()),
    );
    merged
}

/// Build the parent graph, reporting unknown or non-interface parents and
/// every inheritance cycle (with its full path).
pub fn check_inheritance(document: &Document, diagnostics: &mut Diagnostics) -> InheritanceGraph {
    let names: Vec<String> = document.interfaces.iter().map(|i| i.name.clone()).collect();
    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    let enum_names: HashSet<&str> = document.enums.iter().map(|e| e.name.as_str()).collect();

    let mut parents = Vec::with_capacity(names.len());
    for iface in &document.interfaces {
        let label = format!("interface {}", iface.name);
        let parent = match &iface.parent {
            None => None,
            Some(parent) => match index.get(parent.as_str()) {
                Some(&parent_index) => Some(parent_index),
                None => {
                    let msg = if enum_names.contains(parent.as_str()) {
                        format!(
                            "Interface {} extends {}, which is an enum, not an interface",
                            quote(&iface.name),
                            quote(parent)
                        )
                    } else {
                        format!(
                            "Interface {} extends unknown interface {}",
                            quote(&iface.name),
                            quote(parent)
                        )
                    };
                    diagnostics.push(error(
                        DiagnosticKind::UndefinedTypeError { name: parent.clone() },
                        &msg,
                        Some(&label),
                        iface.line,
                    ));
                    None
                }
            },
        };
        parents.push(parent);
    }

    let graph = InheritanceGraph { names, parents };

    let mut marks = vec![Mark::Unvisited; graph.names.len()];
    for start in 0..graph.names.len() {
        if marks[start] == Mark::Done {
            continue;
        }
        let mut path: Vec<usize> = Vec::new();
        let mut current = Some(start);
        while let Some(node) = current {
            match marks[node] {
                Mark::Done => break,
                Mark::OnPath => {
                    let first = path.iter().position(|&n| n == node).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[first..].iter().map(|&n| graph.names[n].clone()).collect();
                    cycle.push(graph.names[node].clone());
                    let head = &document.interfaces[node];
                    diagnostics.push(error(
                        DiagnosticKind::CircularInheritanceError { path: cycle.clone() },
                        &format!("Circular inheritance detected: {}", cycle.join(" -> ")),
                        Some(&format!("interface {}", head.name)),
                        head.line,
                    ));
                    break;
                }
                Mark::Unvisited => {
                    marks[node] = Mark::OnPath;
                    path.push(node);
                    current = graph.parents[node];
                }
            }
        }
        for node in path {
            marks[node] = Mark::Done;
        }
    }

    debug!(interfaces = graph.names.len(), errors = diagnostics.len(), "checked inheritance");
    graph
}
