use super::CallOptions;
use crate::ast::*;
use crate::context::{HasEffectsContext, IncludeChildren, InclusionContext};
use crate::render::helpers::find_first_occurrence_outside_comment;

impl Bundle {
    /// Whether running the body of `function` once has an effect.
    ///
    /// A function already being checked further up the same query counts as
    /// effect-free, which terminates recursion.
    pub(crate) fn function_has_effects_when_called(
        &self,
        node: NodeId,
        function: &Function,
        call: CallOptions,
        ctx: &mut HasEffectsContext,
    ) -> bool {
        let is_arrow = matches!(self.nodes[node].kind, NodeKind::ArrowFunctionExpression(_));
        if call.is_new && (is_arrow || function.is_async || function.is_generator) {
            // not constructible: throws
            return true;
        }
        if !ctx.enter_call(node) {
            return false;
        }
        if function.params.iter().any(|&param| self.has_effects(param, ctx)) {
            return true;
        }
        if function.is_generator {
            return false;
        }
        let ignore_return = std::mem::replace(&mut ctx.ignore_return, true);
        let body_effect = self.has_effects(function.body, ctx);
        ctx.ignore_return = ignore_return;
        body_effect
    }

    pub(crate) fn function_include(
        &self,
        function: &Function,
        ctx: &mut InclusionContext,
        children: IncludeChildren,
    ) {
        if let Some(id) = function.id {
            self.include(id, ctx, children);
        }
        // parameters keep call sites positionally intact
        for &param in &function.params {
            self.include(param, ctx, IncludeChildren::All);
        }
        self.include(function.body, ctx, children);
    }

    /// Offset just past `function` (or `function*`) at the start of a
    /// function expression, where a name would go.
    pub(crate) fn function_keyword_end(&self, node: NodeId, function: &Function, source: &str) -> Option<u32> {
        let start = self.nodes[node].span.start_usize();
        let keyword = find_first_occurrence_outside_comment(source, "function", start)? + "function".len();
        let end = if function.is_generator {
            find_first_occurrence_outside_comment(source, "*", keyword)? + 1
        } else {
            keyword
        };
        u32::try_from(end).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeshakeOptions;
    use crate::span::Span;

    fn function_node(bundle: &mut Bundle, source: &str, is_generator: bool) -> NodeId {
        let mut builder = AstBuilder::new(bundle);
        let end = source.len() as u32;
        let body = builder.block(Span::new(end - 2, end), Vec::new());
        builder.function_expression(
            Span::new(0, end),
            Function {
                id: None,
                params: Vec::new(),
                body,
                is_async: false,
                is_generator,
            },
        )
    }

    #[test]
    fn test_function_keyword_end() {
        let mut bundle = Bundle::new(TreeshakeOptions::default());
        let source = "function () {}";
        let node = function_node(&mut bundle, source, false);
        let NodeKind::FunctionExpression(function) = bundle.kind(node).clone() else {
            panic!("expected a function expression");
        };
        assert_eq!(bundle.function_keyword_end(node, &function, source), Some(8));
    }

    #[test]
    fn test_generator_keyword_end() {
        let mut bundle = Bundle::new(TreeshakeOptions::default());
        let source = "function * () {}";
        let node = function_node(&mut bundle, source, true);
        let NodeKind::FunctionExpression(function) = bundle.kind(node).clone() else {
            panic!("expected a function expression");
        };
        assert_eq!(bundle.function_keyword_end(node, &function, source), Some(10));
    }
}
