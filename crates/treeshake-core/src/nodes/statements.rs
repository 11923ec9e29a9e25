//! Statement lists and module-level export statements.

use crate::ast::*;
use crate::error::Result;
use crate::render::helpers::statement_boundary;
use crate::render::{NodeRenderOptions, RenderOptions, SpliceBuffer};

impl Bundle {
    /// Whether a statement produces any output.
    fn renders_statement(&self, stmt: NodeId) -> bool {
        self.is_included(stmt)
            && !matches!(
                self.nodes[stmt].kind,
                NodeKind::ImportDeclaration(_)
                    | NodeKind::ExportNamedDeclaration(ExportNamedDeclaration { declaration: None, .. })
            )
    }

    /// Renders the statements of a program or block body ending at `end`.
    ///
    /// Each statement owns the text from the line break after its
    /// predecessor up to the line break after itself; a dropped statement
    /// takes that whole slot with it, comments and blank lines included.
    pub(crate) fn render_statement_list(
        &self,
        body: &[NodeId],
        start: u32,
        end: u32,
        code: &mut SpliceBuffer<'_>,
        options: &RenderOptions,
    ) -> Result<()> {
        let Some(&first) = body.first() else {
            return Ok(());
        };
        let source = code.original();
        let mut slot_start = self.nodes[first].span.start.max(start);
        for (index, &stmt) in body.iter().enumerate() {
            let slot_end = match body.get(index + 1) {
                Some(&next) => statement_boundary(
                    source,
                    self.nodes[stmt].span.end_usize(),
                    self.nodes[next].span.start_usize(),
                ) as u32,
                None => end.max(self.nodes[stmt].span.end),
            };
            if self.renders_statement(stmt) {
                self.render(stmt, code, options, NodeRenderOptions::default())?;
            } else {
                code.remove(slot_start, slot_end)?;
            }
            slot_start = slot_end;
        }
        Ok(())
    }

    pub(crate) fn render_export_named(
        &self,
        node: NodeId,
        export: &ExportNamedDeclaration,
        code: &mut SpliceBuffer<'_>,
        options: &RenderOptions,
    ) -> Result<()> {
        let span = self.nodes[node].span;
        match export.declaration {
            Some(declaration) => {
                code.remove(span.start, self.nodes[declaration].span.start)?;
                self.render(declaration, code, options, NodeRenderOptions::default())
            }
            None => code.remove(span.start, span.end),
        }
    }

    /// `export default` becomes a plain declaration, a binding for the
    /// exported value, or a bare expression statement when nothing reads it.
    pub(crate) fn render_export_default(
        &self,
        node: NodeId,
        export: &ExportDefaultDeclaration,
        code: &mut SpliceBuffer<'_>,
        options: &RenderOptions,
    ) -> Result<()> {
        let span = self.nodes[node].span;
        let declaration = export.declaration;
        let declaration_span = self.nodes[declaration].span;
        let variable = export.variable.map(|var| &self.variables[var]);
        let variable_included = variable.is_some_and(|variable| variable.is_included());

        let keyword_end = match &self.nodes[declaration].kind {
            NodeKind::FunctionDeclaration(Function { id: Some(_), .. })
            | NodeKind::ClassDeclaration(Class { id: Some(_), .. }) => {
                code.remove(span.start, declaration_span.start)?;
                return self.render(declaration, code, options, NodeRenderOptions::default());
            }
            NodeKind::FunctionDeclaration(function) => {
                self.function_keyword_end(declaration, function, code.original())
            }
            NodeKind::ClassDeclaration(_) => Some(declaration_span.start + "class".len() as u32),
            _ => None,
        };

        if let Some(keyword_end) = keyword_end {
            code.remove(span.start, declaration_span.start)?;
            match variable {
                Some(variable) if variable_included => {
                    code.append_at(keyword_end, format!(" {}", variable.rendered_name()))?;
                }
                _ => {
                    code.insert_at(declaration_span.start, "(")?;
                    code.append_at(declaration_span.end, ");")?;
                }
            }
            return self.render(declaration, code, options, NodeRenderOptions::default());
        }

        match variable {
            Some(variable) if variable_included => {
                let space = options.snippets.space;
                code.overwrite(
                    span.start,
                    declaration_span.start,
                    format!(
                        "{} {}{space}={space}",
                        options.snippets.binding_keyword,
                        variable.rendered_name()
                    ),
                )?;
                self.render(declaration, code, options, NodeRenderOptions::default())?;
            }
            _ => {
                code.remove(span.start, declaration_span.start)?;
                self.render(declaration, code, options, NodeRenderOptions::statement())?;
            }
        }
        if !code.original()[..span.end_usize()].trim_end().ends_with(';') {
            code.append_at(span.end, ";")?;
        }
        Ok(())
    }
}
