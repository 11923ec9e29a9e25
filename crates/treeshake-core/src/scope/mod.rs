mod binder;
mod variable;

pub use binder::bind_bundle;
pub use variable::{Variable, VariableId, VariableKind};

use crate::ast::{Bundle, ModuleId, NodeId};
use id_arena::Id;
use indexmap::{IndexMap, IndexSet};

pub type ScopeId = Id<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
    Class,
}

/// A lexical scope. Variables are kept in declaration order so renaming is
/// deterministic.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub module: ModuleId,
    /// The node that opened this scope.
    pub node: NodeId,
    pub(crate) variables: IndexMap<String, VariableId>,
    /// Variables of enclosing scopes referenced from inside this one.
    pub(crate) accessed_outside: IndexSet<VariableId>,
    /// Unresolved names referenced from inside this scope.
    pub(crate) accessed_globals: IndexSet<String>,
    pub(crate) children: Vec<ScopeId>,
}

impl Scope {
    pub(crate) fn new(kind: ScopeKind, parent: Option<ScopeId>, module: ModuleId, node: NodeId) -> Self {
        Scope {
            kind,
            parent,
            module,
            node,
            variables: IndexMap::new(),
            accessed_outside: IndexSet::new(),
            accessed_globals: IndexSet::new(),
            children: Vec::new(),
        }
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, VariableId)> {
        self.variables.iter().map(|(name, var)| (name.as_str(), *var))
    }

    pub fn lookup_local(&self, name: &str) -> Option<VariableId> {
        self.variables.get(name).copied()
    }

    /// The nearest scope that owns `var` declarations.
    pub fn is_var_scope(&self) -> bool {
        matches!(self.kind, ScopeKind::Module | ScopeKind::Function)
    }
}

impl Bundle {
    /// Resolves `name` from `scope` outwards.
    pub fn find_variable(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id];
            if let Some(var) = scope.lookup_local(name) {
                return Some(var);
            }
            current = scope.parent;
        }
        None
    }
}
