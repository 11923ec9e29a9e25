use crate::ast::{ModuleId, NodeId};
use crate::latch::Latch;
use crate::path_tracker::DeoptimizationTracker;
use crate::scope::ScopeId;
use id_arena::Id;
use std::cell::OnceCell;

pub type VariableId = Id<Variable>;

/// Kind of binding a Variable was declared by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Parameter,
    Import,
    /// The synthetic binding behind `export default <expression>`.
    ExportDefault,
}

impl VariableKind {
    /// Bindings that cannot be read before their declaration has run.
    pub fn has_temporal_dead_zone(self) -> bool {
        matches!(
            self,
            VariableKind::Let | VariableKind::Const | VariableKind::Class
        )
    }

    /// Whether a second declaration of the same name in the same scope is legal.
    pub fn allows_redeclaration(self) -> bool {
        matches!(
            self,
            VariableKind::Var | VariableKind::Function | VariableKind::Parameter
        )
    }
}

/// A named binding in a scope.
///
/// Shared by every Identifier that resolves to it; owned by the Bundle's
/// variable arena for the duration of one run.
#[derive(Debug)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    pub scope: ScopeId,
    pub module: ModuleId,
    /// Declaring nodes: Identifiers, or the export-default node itself.
    pub(crate) declarations: Vec<NodeId>,
    /// The initializer, while it is the only value this binding ever holds.
    pub(crate) init: Option<NodeId>,
    /// For import bindings, the exported Variable they read.
    pub(crate) origin: Option<VariableId>,
    reassigned: Latch,
    declaration_reached: Latch,
    included: Latch,
    pub(crate) tracker: DeoptimizationTracker,
    rendered_name: OnceCell<String>,
    /// Set when this binding renders as a property of an object, as
    /// `<base>.<name>`.
    render_base: OnceCell<String>,
}

impl Variable {
    pub(crate) fn new(name: String, kind: VariableKind, scope: ScopeId, module: ModuleId) -> Self {
        Variable {
            name,
            kind,
            scope,
            module,
            declarations: Vec::new(),
            init: None,
            origin: None,
            reassigned: Latch::new(),
            declaration_reached: Latch::new(),
            included: Latch::new(),
            tracker: DeoptimizationTracker::new(),
            rendered_name: OnceCell::new(),
            render_base: OnceCell::new(),
        }
    }

    pub fn declarations(&self) -> &[NodeId] {
        &self.declarations
    }

    pub fn init(&self) -> Option<NodeId> {
        self.init
    }

    pub fn origin(&self) -> Option<VariableId> {
        self.origin
    }

    pub fn is_reassigned(&self) -> bool {
        self.reassigned.is_set()
    }

    pub(crate) fn mark_reassigned(&self) -> bool {
        self.reassigned.set()
    }

    pub fn is_declaration_reached(&self) -> bool {
        self.declaration_reached.is_set()
    }

    pub(crate) fn mark_declaration_reached(&self) -> bool {
        self.declaration_reached.set()
    }

    pub fn is_included(&self) -> bool {
        self.included.is_set()
    }

    pub(crate) fn mark_included(&self) -> bool {
        self.included.set()
    }

    pub fn tracker(&self) -> &DeoptimizationTracker {
        &self.tracker
    }

    /// The identifier this binding renders as, without any base object.
    pub fn rendered_name(&self) -> &str {
        self.rendered_name.get().map_or(self.name.as_str(), String::as_str)
    }

    pub fn render_base(&self) -> Option<&str> {
        self.render_base.get().map(String::as_str)
    }

    /// Fixes the rendered name. The first assignment in a run wins.
    pub(crate) fn set_rendered_name(&self, name: String) -> bool {
        self.rendered_name.set(name).is_ok()
    }

    pub fn set_render_base(&self, base: impl Into<String>) -> bool {
        self.render_base.set(base.into()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tdz_kinds() {
        assert!(VariableKind::Let.has_temporal_dead_zone());
        assert!(VariableKind::Class.has_temporal_dead_zone());
        assert!(!VariableKind::Var.has_temporal_dead_zone());
        assert!(!VariableKind::Function.has_temporal_dead_zone());
    }

    #[test]
    fn test_redeclaration_rules() {
        assert!(VariableKind::Var.allows_redeclaration());
        assert!(!VariableKind::Const.allows_redeclaration());
    }
}
