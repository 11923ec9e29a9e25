use super::CallOptions;
use crate::ast::*;
use crate::context::HasEffectsContext;
use crate::error::Result;
use crate::globals;
use crate::path_tracker::PathKey;
use crate::render::{NodeRenderOptions, RenderOptions, SpliceBuffer};
use crate::scope::VariableKind;

impl Bundle {
    pub(crate) fn identifier_has_effects(&self, node: NodeId, ident: &Identifier) -> bool {
        if ident.role == IdentifierRole::Declaration {
            return ident.conflicting_redeclaration;
        }
        match ident.variable {
            Some(_) => self.is_possible_tdz_access(node, ident),
            None => {
                self.options.unknown_global_side_effects && !globals::is_known_global(&ident.name)
            }
        }
    }

    /// Whether reading `ident` may hit a binding before its declaration ran.
    ///
    /// Only bindings of this module are considered; a read positioned before
    /// the declaration in the same function body always is one.
    fn is_possible_tdz_access(&self, node: NodeId, ident: &Identifier) -> bool {
        // the unresolved binding: imports are never in their own TDZ
        let Some(var) = ident.variable else {
            return false;
        };
        let variable = &self.variables[var];
        if !variable.kind.has_temporal_dead_zone() {
            return false;
        }
        if let [declaration] = variable.declarations.as_slice() {
            if self.nodes[node].span.start < self.nodes[*declaration].span.start
                && self.closest_function_or_program(node) == self.closest_function_or_program(*declaration)
            {
                return true;
            }
        }
        !variable.is_declaration_reached()
    }

    fn closest_function_or_program(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.nodes[node].parent;
        while let Some(id) = current {
            if matches!(
                self.nodes[id].kind,
                NodeKind::FunctionExpression(_)
                    | NodeKind::ArrowFunctionExpression(_)
                    | NodeKind::FunctionDeclaration(_)
                    | NodeKind::Program(_)
            ) {
                return Some(id);
            }
            current = self.nodes[id].parent;
        }
        None
    }

    pub(crate) fn identifier_has_effects_on_access(
        &self,
        ident: &Identifier,
        path: &[PathKey],
        ctx: &mut HasEffectsContext,
    ) -> bool {
        match ident.variable.map(|var| self.resolve_origin(var)) {
            Some(var) => self.variable_has_effects_on_access(var, path, ctx),
            None => {
                !globals::is_pure_global_access(&ident.name, path) && self.options.property_read_side_effects
            }
        }
    }

    pub(crate) fn identifier_has_effects_on_assignment(
        &self,
        ident: &Identifier,
        path: &[PathKey],
        ctx: &mut HasEffectsContext,
    ) -> bool {
        let Some(local) = ident.variable else {
            // writing a global
            return true;
        };
        if path.is_empty() && self.variables[local].kind == VariableKind::Import {
            return true;
        }
        self.variable_has_effects_on_assignment(self.resolve_origin(local), path, ctx)
    }

    pub(crate) fn identifier_has_effects_when_called(
        &self,
        ident: &Identifier,
        path: &[PathKey],
        call: CallOptions,
        ctx: &mut HasEffectsContext,
    ) -> bool {
        match ident.variable.map(|var| self.resolve_origin(var)) {
            Some(var) => self.variable_has_effects_when_called(var, path, call, ctx),
            None => !globals::is_pure_global_call(&ident.name, path, call.is_new),
        }
    }

    /// The text an identifier resolving to `ident`'s Variable renders as.
    pub(crate) fn identifier_render_name(&self, ident: &Identifier, options: &RenderOptions) -> Option<String> {
        let var = self.resolve_origin(ident.variable?);
        let variable = &self.variables[var];
        match (ident.role, variable.render_base()) {
            (IdentifierRole::Reference, Some(base)) => Some(format!(
                "{base}{}",
                options.snippets.property_access(variable.rendered_name())
            )),
            _ => Some(variable.rendered_name().to_string()),
        }
    }

    pub(crate) fn render_identifier(
        &self,
        node: NodeId,
        ident: &Identifier,
        code: &mut SpliceBuffer<'_>,
        options: &RenderOptions,
        node_options: NodeRenderOptions,
    ) -> Result<()> {
        let Some(name) = self.identifier_render_name(ident, options) else {
            return Ok(());
        };
        if name == ident.name {
            return Ok(());
        }
        let span = self.nodes[node].span;
        if node_options.is_shorthand_property {
            code.overwrite(
                span.start,
                span.end,
                format!("{}:{}{name}", ident.name, options.snippets.space),
            )
        } else {
            code.overwrite(span.start, span.end, name)
        }
    }
}
