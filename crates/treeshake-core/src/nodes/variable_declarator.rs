//! `id = init` inside a variable declaration.

use crate::ast::*;
use crate::context::{HasEffectsContext, InclusionContext, IncludeChildren};
use crate::error::{Result, ShakeError};
use crate::render::helpers::{find_first_occurrence_outside_comment, find_non_whitespace};
use crate::render::{NodeRenderOptions, RenderOptions, SpliceBuffer};

impl Bundle {
    pub(crate) fn declarator_has_effects(&self, decl: &VariableDeclarator, ctx: &mut HasEffectsContext) -> bool {
        let init_effect = decl.init.is_some_and(|init| self.has_effects(init, ctx));
        // reaching the declaration counts even when the answer is already known
        self.mark_declaration_reached(decl.id);
        init_effect || self.has_effects(decl.id, ctx)
    }

    pub(crate) fn declarator_include(
        &self,
        decl: &VariableDeclarator,
        ctx: &mut InclusionContext,
        children: IncludeChildren,
    ) {
        if let Some(init) = decl.init {
            self.include(init, ctx, children);
        }
        self.mark_declaration_reached(decl.id);
        if children.is_all() || self.should_be_included(decl.id) {
            self.include(decl.id, ctx, children);
        }
    }

    /// Marks every binding of `pattern` as having had its declaration run.
    pub(crate) fn mark_declaration_reached(&self, pattern: NodeId) {
        for ident in self.declared_identifiers(pattern) {
            if let NodeKind::Identifier(Identifier {
                variable: Some(var), ..
            }) = &self.nodes[ident].kind
            {
                self.variables[*var].mark_declaration_reached();
            }
        }
    }

    /// Whether `var` is exported from an entry module and written after its
    /// declaration, so it must exist as an assignable slot.
    pub(crate) fn is_reassigned_exports_member(&self, ident: &Identifier, options: &RenderOptions) -> bool {
        ident.variable.is_some_and(|var| {
            let var = self.resolve_origin(var);
            self.variables[var].is_reassigned() && options.export_names_by_variable.contains_key(&var)
        })
    }

    pub(crate) fn render_declarator(
        &self,
        node: NodeId,
        decl: &VariableDeclarator,
        code: &mut SpliceBuffer<'_>,
        options: &RenderOptions,
    ) -> Result<()> {
        let span = self.nodes[node].span;
        let id_span = self.nodes[decl.id].span;
        let render_id = self.is_included(decl.id);
        if render_id {
            self.render(decl.id, code, options, NodeRenderOptions::default())?;
        } else {
            let source = code.original();
            let operator = find_first_occurrence_outside_comment(source, "=", id_span.end_usize()).ok_or(
                ShakeError::UnexpectedNode {
                    expected: "initializer",
                    found: "VariableDeclarator",
                    span,
                },
            )?;
            code.remove(span.start, find_non_whitespace(source, operator + 1) as u32)?;
        }

        match decl.init {
            Some(init) => {
                if let NodeKind::Identifier(ident) = &self.nodes[decl.id].kind {
                    self.sync_anonymous_init_name(ident, init, code)?;
                }
                let init_options = if render_id {
                    NodeRenderOptions::default()
                } else {
                    NodeRenderOptions::statement()
                };
                self.render(init, code, options, init_options)
            }
            None => match &self.nodes[decl.id].kind {
                NodeKind::Identifier(ident) if self.is_reassigned_exports_member(ident, options) => {
                    let space = options.snippets.space;
                    code.append_at(span.end, format!("{space}={space}{}", options.snippets.undefined))
                }
                _ => Ok(()),
            },
        }
    }

    /// Gives an anonymous class or function assigned to a renamed binding
    /// that binding's rendered name, so its intrinsic `name` stays in sync.
    fn sync_anonymous_init_name(
        &self,
        ident: &Identifier,
        init: NodeId,
        code: &mut SpliceBuffer<'_>,
    ) -> Result<()> {
        let keyword_end = match &self.nodes[init].kind {
            NodeKind::ClassExpression(Class { id: None, .. }) => Some(self.nodes[init].span.start + 5),
            NodeKind::FunctionExpression(function @ Function { id: None, .. }) => {
                self.function_keyword_end(init, function, code.original())
            }
            _ => None,
        };
        let Some(keyword_end) = keyword_end else {
            return Ok(());
        };
        let Some(var) = ident.variable else {
            return Ok(());
        };
        let rendered = self.variables[self.resolve_origin(var)].rendered_name();
        if rendered != ident.name {
            code.append_at(keyword_end, format!(" {rendered}"))?;
        }
        Ok(())
    }
}
