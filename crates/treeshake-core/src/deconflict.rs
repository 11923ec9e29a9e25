//! Gives included bindings of merged modules unique rendered names.
//!
//! Top-level bindings of all modules share one namespace in the output. The
//! first claimant of a name keeps it, later ones get `name$1`, `name$2`, ...
//! Globals any module references are never claimed. Nested scopes then avoid
//! shadowing whatever they reference from outside.

use crate::ast::Bundle;
use crate::scope::{ScopeId, VariableId, VariableKind};
use rustc_hash::FxHashSet as HashSet;
use tracing::debug;

/// Assigns rendered names. Safe to call more than once per run.
pub fn deconflict_bundle(bundle: &Bundle) {
    let mut used: HashSet<String> = bundle
        .modules()
        .flat_map(|(_, module)| module.global_names.iter().cloned())
        .collect();

    for (_, module) in bundle.modules() {
        let Some(scope) = module.scope else {
            continue;
        };
        for (_, var) in bundle.scope(scope).variables() {
            let variable = bundle.variable(var);
            if variable.kind == VariableKind::Import || !variable.is_included() {
                continue;
            }
            claim(bundle, var, &mut used);
        }
    }

    for (_, module) in bundle.modules() {
        if let Some(scope) = module.scope {
            for &child in &bundle.scope(scope).children {
                deconflict_scope(bundle, child);
            }
        }
    }
}

fn deconflict_scope(bundle: &Bundle, scope_id: ScopeId) {
    let scope = bundle.scope(scope_id);
    let mut used: HashSet<String> = scope.accessed_globals.iter().cloned().collect();
    for &outside in &scope.accessed_outside {
        let variable = bundle.variable(bundle.resolve_origin(outside));
        used.insert(variable.render_base().unwrap_or(variable.rendered_name()).to_string());
    }
    for (_, var) in scope.variables() {
        if bundle.variable(var).kind != VariableKind::Import {
            claim(bundle, var, &mut used);
        }
    }
    for &child in &scope.children {
        deconflict_scope(bundle, child);
    }
}

fn claim(bundle: &Bundle, var: VariableId, used: &mut HashSet<String>) {
    let variable = bundle.variable(var);
    let name = safe_name(variable.rendered_name(), used);
    if name != variable.rendered_name() && variable.set_rendered_name(name.clone()) {
        debug!("Renaming {} to {}", variable.name, name);
    }
    used.insert(variable.rendered_name().to_string());
}

fn safe_name(base: &str, used: &HashSet<String>) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|suffix| format!("{base}${suffix}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_name_suffixes() {
        let mut used = HashSet::default();
        assert_eq!(safe_name("foo", &used), "foo");
        used.insert("foo".to_string());
        assert_eq!(safe_name("foo", &used), "foo$1");
        used.insert("foo$1".to_string());
        assert_eq!(safe_name("foo", &used), "foo$2");
    }
}
