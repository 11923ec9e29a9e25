use crate::ast::*;
use crate::context::{InclusionContext, IncludeChildren};
use crate::error::Result;
use crate::render::{NodeRenderOptions, RenderOptions, SpliceBuffer};

impl Bundle {
    pub(crate) fn variable_declaration_include(
        &self,
        decl: &VariableDeclaration,
        ctx: &mut InclusionContext,
        children: IncludeChildren,
    ) {
        for &declarator in &decl.declarations {
            if children.is_all() || self.should_be_included(declarator) {
                self.include(declarator, ctx, children);
            }
        }
    }

    /// Renders the included declarators of a declaration.
    ///
    /// Excluded declarators disappear with their separators. A declarator
    /// whose binding was dropped becomes an expression statement, so the
    /// declaration is split around it and the keyword is repeated for the
    /// bindings that follow.
    pub(crate) fn render_variable_declaration(
        &self,
        node: NodeId,
        decl: &VariableDeclaration,
        code: &mut SpliceBuffer<'_>,
        options: &RenderOptions,
    ) -> Result<()> {
        let span = self.nodes[node].span;
        let source = code.original();
        let content_end = if source[..span.end_usize()].ends_with(';') {
            span.end - 1
        } else {
            span.end
        };
        let keyword = format!("{} ", decl.kind.keyword());
        let snippets = &options.snippets;

        // (index in the declaration, declarator, binding kept)
        let mut previous: Option<(usize, NodeId, bool)> = None;
        for (index, &declarator) in decl.declarations.iter().enumerate() {
            if !self.is_included(declarator) {
                continue;
            }
            let NodeKind::VariableDeclarator(inner) = &self.nodes[declarator].kind else {
                continue;
            };
            let keeps_binding = self.is_included(inner.id);
            let start = self.nodes[declarator].span.start;
            match previous {
                None if index == 0 => {
                    if !keeps_binding {
                        code.remove(span.start, start)?;
                    }
                }
                None => {
                    code.remove(span.start, start)?;
                    if keeps_binding {
                        code.append_at(start, keyword.clone())?;
                    }
                }
                Some((previous_index, previous_declarator, previous_kept)) => {
                    let previous_end = self.nodes[previous_declarator].span.end;
                    if keeps_binding && previous_kept {
                        if previous_index + 1 != index {
                            code.remove(previous_end, start)?;
                            code.append_at(start, snippets.list_separator())?;
                        }
                    } else {
                        code.remove(previous_end, start)?;
                        let separator = snippets.statement_separator();
                        if keeps_binding {
                            code.append_at(start, format!("{separator}{keyword}"))?;
                        } else {
                            code.append_at(start, separator)?;
                        }
                    }
                }
            }
            self.render(declarator, code, options, NodeRenderOptions::default())?;
            previous = Some((index, declarator, keeps_binding));
        }

        if let Some((_, last, _)) = previous {
            let last_end = self.nodes[last].span.end;
            if content_end > last_end {
                code.remove(last_end, content_end)?;
            }
        }
        Ok(())
    }
}
