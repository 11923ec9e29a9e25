//! Variable-level halves of the node protocol: inclusion of a binding's
//! declarations and path queries answered from its initializer.

use super::CallOptions;
use crate::ast::*;
use crate::context::{HasEffectsContext, InclusionContext, Work};
use crate::path_tracker::{PathKey, UNKNOWN_PATH};
use crate::scope::{VariableId, VariableKind};
use tracing::trace;

impl Bundle {
    /// Marks `var` included; its declarations follow through the worklist.
    pub(crate) fn include_variable(&self, var: VariableId, ctx: &mut InclusionContext) {
        let variable = &self.variables[var];
        if variable.mark_included() {
            trace!("Including variable {}", variable.name);
            ctx.variable_included();
            ctx.queue(Work::Variable(var));
        }
    }

    /// Includes every declaration site of `var`, marking ancestors included
    /// up to the first one that already was, and queues the outermost newly
    /// marked node so its own inclusion logic runs.
    pub(crate) fn include_variable_declarations(&self, var: VariableId, ctx: &mut InclusionContext) {
        for &declaration in &self.variables[var].declarations {
            self.mark_included(declaration, ctx);
            let mut root = declaration;
            while let Some(parent) = self.nodes[root].parent {
                if !self.mark_included(parent, ctx) {
                    break;
                }
                root = parent;
            }
            ctx.queue(Work::Node(root));
        }
    }

    pub(crate) fn deoptimize_variable_path(&self, var: VariableId, path: &[PathKey]) {
        let variable = &self.variables[var];
        if variable.is_reassigned() {
            return;
        }
        if path.is_empty() {
            variable.mark_reassigned();
            variable.tracker.escalate();
            if let Some(init) = variable.init {
                self.deoptimize_path(init, UNKNOWN_PATH);
            }
        } else if variable.tracker.deoptimize_path(path) {
            if let Some(init) = variable.init {
                self.deoptimize_path(init, path);
            }
        }
    }

    /// Whether the object holding `path`'s last key is no longer known.
    fn is_parent_path_deoptimized(&self, var: VariableId, path: &[PathKey]) -> bool {
        let variable = &self.variables[var];
        variable.is_reassigned()
            || variable
                .tracker
                .is_path_deoptimized(&path[..path.len().saturating_sub(1)])
    }

    pub(crate) fn variable_has_effects_on_access(
        &self,
        var: VariableId,
        path: &[PathKey],
        ctx: &mut HasEffectsContext,
    ) -> bool {
        if path.is_empty() {
            return false;
        }
        if self.is_parent_path_deoptimized(var, path) {
            return self.options.property_read_side_effects;
        }
        match self.variables[var].init {
            Some(init) => ctx.enter_access(var, path) && self.has_effects_on_access_at_path(init, path, ctx),
            None => self.options.property_read_side_effects,
        }
    }

    pub(crate) fn variable_has_effects_on_assignment(
        &self,
        var: VariableId,
        path: &[PathKey],
        ctx: &mut HasEffectsContext,
    ) -> bool {
        let variable = &self.variables[var];
        if path.is_empty() && matches!(variable.kind, VariableKind::Const | VariableKind::Import) {
            // throws a TypeError
            return true;
        }
        if variable.is_included() {
            return true;
        }
        if path.is_empty() {
            return false;
        }
        if self.is_parent_path_deoptimized(var, path) {
            return true;
        }
        match variable.init {
            Some(init) => {
                ctx.enter_assignment(var, path) && self.has_effects_on_assignment_at_path(init, path, ctx)
            }
            // a parameter, a destructured binding or `undefined`
            None => true,
        }
    }

    pub(crate) fn variable_has_effects_when_called(
        &self,
        var: VariableId,
        path: &[PathKey],
        call: CallOptions,
        ctx: &mut HasEffectsContext,
    ) -> bool {
        let variable = &self.variables[var];
        if variable.is_reassigned() || variable.tracker.is_path_deoptimized(path) {
            return true;
        }
        match variable.init {
            Some(init) => {
                ctx.enter_variable_call(var, path)
                    && self.has_effects_when_called_at_path(init, path, call, ctx)
            }
            None => true,
        }
    }
}
