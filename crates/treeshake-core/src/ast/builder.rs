use super::*;
use crate::span::Span;

/// Builds AST nodes bottom-up into a [`Bundle`]: children are created before
/// their parent, and allocating the parent links them.
pub struct AstBuilder<'b> {
    bundle: &'b mut Bundle,
}

impl<'b> AstBuilder<'b> {
    pub fn new(bundle: &'b mut Bundle) -> Self {
        AstBuilder { bundle }
    }

    pub fn bundle(&mut self) -> &mut Bundle {
        &mut *self.bundle
    }

    pub fn node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.bundle.alloc_node(kind, span)
    }

    pub fn span_of(&self, node: NodeId) -> Span {
        self.bundle.span(node)
    }

    // ==================== Statements ====================

    pub fn program(&mut self, span: Span, body: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::Program(Program { body }), span)
    }

    pub fn block(&mut self, span: Span, body: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::BlockStatement(BlockStatement { body }), span)
    }

    pub fn expression_statement(&mut self, span: Span, expression: NodeId) -> NodeId {
        self.node(NodeKind::ExpressionStatement(ExpressionStatement { expression }), span)
    }

    pub fn variable_declaration(
        &mut self,
        span: Span,
        kind: DeclarationKind,
        declarations: Vec<NodeId>,
    ) -> NodeId {
        self.node(
            NodeKind::VariableDeclaration(VariableDeclaration { kind, declarations }),
            span,
        )
    }

    pub fn declarator(&mut self, id: NodeId, init: Option<NodeId>) -> NodeId {
        let start = self.span_of(id).start;
        let end = init.map_or(self.span_of(id).end, |init| self.span_of(init).end);
        self.node(
            NodeKind::VariableDeclarator(VariableDeclarator { id, init }),
            Span::new(start, end),
        )
    }

    pub fn if_statement(
        &mut self,
        span: Span,
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    ) -> NodeId {
        self.node(
            NodeKind::IfStatement(IfStatement {
                test,
                consequent,
                alternate,
            }),
            span,
        )
    }

    pub fn return_statement(&mut self, span: Span, argument: Option<NodeId>) -> NodeId {
        self.node(NodeKind::ReturnStatement(ReturnStatement { argument }), span)
    }

    pub fn empty_statement(&mut self, span: Span) -> NodeId {
        self.node(NodeKind::EmptyStatement, span)
    }

    pub fn import_declaration(
        &mut self,
        span: Span,
        source: impl Into<String>,
        specifiers: Vec<ImportSpecifier>,
    ) -> NodeId {
        self.node(
            NodeKind::ImportDeclaration(ImportDeclaration {
                source: source.into(),
                specifiers,
            }),
            span,
        )
    }

    pub fn export_named(
        &mut self,
        span: Span,
        declaration: Option<NodeId>,
        specifiers: Vec<ExportSpecifier>,
    ) -> NodeId {
        self.node(
            NodeKind::ExportNamedDeclaration(ExportNamedDeclaration {
                declaration,
                specifiers,
            }),
            span,
        )
    }

    pub fn export_default(&mut self, span: Span, declaration: NodeId) -> NodeId {
        self.node(
            NodeKind::ExportDefaultDeclaration(ExportDefaultDeclaration {
                declaration,
                variable: None,
            }),
            span,
        )
    }

    // ==================== Patterns and identifiers ====================

    pub fn identifier(&mut self, span: Span, name: impl Into<String>) -> NodeId {
        self.ident(span, name, IdentifierRole::Reference)
    }

    pub fn binding(&mut self, span: Span, name: impl Into<String>) -> NodeId {
        self.ident(span, name, IdentifierRole::Declaration)
    }

    fn ident(&mut self, span: Span, name: impl Into<String>, role: IdentifierRole) -> NodeId {
        self.node(
            NodeKind::Identifier(Identifier {
                name: name.into(),
                variable: None,
                role,
                conflicting_redeclaration: false,
            }),
            span,
        )
    }

    pub fn object_pattern(&mut self, span: Span, properties: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::ObjectPattern(ObjectPattern { properties }), span)
    }

    pub fn array_pattern(&mut self, span: Span, elements: Vec<Option<NodeId>>) -> NodeId {
        self.node(NodeKind::ArrayPattern(ArrayPattern { elements }), span)
    }

    pub fn assignment_pattern(&mut self, left: NodeId, right: NodeId) -> NodeId {
        let span = Span::new(self.span_of(left).start, self.span_of(right).end);
        self.node(NodeKind::AssignmentPattern(AssignmentPattern { left, right }), span)
    }

    pub fn rest_element(&mut self, span: Span, argument: NodeId) -> NodeId {
        self.node(NodeKind::RestElement(RestElement { argument }), span)
    }

    // ==================== Expressions ====================

    pub fn literal(&mut self, span: Span, value: LiteralValue) -> NodeId {
        self.node(NodeKind::Literal(Literal { value }), span)
    }

    pub fn property(
        &mut self,
        span: Span,
        key: PropertyKey,
        value: NodeId,
        kind: PropertyKind,
        shorthand: bool,
    ) -> NodeId {
        self.node(
            NodeKind::Property(Property {
                key,
                value,
                kind,
                shorthand,
            }),
            span,
        )
    }

    pub fn spread(&mut self, span: Span, argument: NodeId) -> NodeId {
        self.node(NodeKind::SpreadElement(SpreadElement { argument }), span)
    }

    pub fn object(&mut self, span: Span, properties: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::ObjectExpression(ObjectExpression { properties }), span)
    }

    pub fn array(&mut self, span: Span, elements: Vec<Option<NodeId>>) -> NodeId {
        self.node(NodeKind::ArrayExpression(ArrayExpression { elements }), span)
    }

    pub fn call(&mut self, span: Span, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.node(
            NodeKind::CallExpression(CallExpression {
                callee,
                arguments,
                is_new: false,
                optional: false,
                pure_annotation: false,
            }),
            span,
        )
    }

    pub fn call_expression(&mut self, span: Span, call: CallExpression) -> NodeId {
        self.node(NodeKind::CallExpression(call), span)
    }

    pub fn member(&mut self, span: Span, object: NodeId, property: MemberProperty) -> NodeId {
        self.node(
            NodeKind::MemberExpression(MemberExpression {
                object,
                property,
                optional: false,
            }),
            span,
        )
    }

    pub fn assignment(
        &mut self,
        operator: AssignmentOperator,
        left: NodeId,
        right: NodeId,
    ) -> NodeId {
        let span = Span::new(self.span_of(left).start, self.span_of(right).end);
        self.node(
            NodeKind::AssignmentExpression(AssignmentExpression {
                operator,
                left,
                right,
            }),
            span,
        )
    }

    pub fn binary(&mut self, operator: BinaryOperator, left: NodeId, right: NodeId) -> NodeId {
        let span = Span::new(self.span_of(left).start, self.span_of(right).end);
        self.node(
            NodeKind::BinaryExpression(BinaryExpression {
                operator,
                left,
                right,
            }),
            span,
        )
    }

    pub fn logical(&mut self, operator: LogicalOperator, left: NodeId, right: NodeId) -> NodeId {
        let span = Span::new(self.span_of(left).start, self.span_of(right).end);
        self.node(
            NodeKind::LogicalExpression(LogicalExpression {
                operator,
                left,
                right,
            }),
            span,
        )
    }

    pub fn unary(&mut self, span: Span, operator: UnaryOperator, argument: NodeId) -> NodeId {
        self.node(NodeKind::UnaryExpression(UnaryExpression { operator, argument }), span)
    }

    pub fn conditional(&mut self, test: NodeId, consequent: NodeId, alternate: NodeId) -> NodeId {
        let span = Span::new(self.span_of(test).start, self.span_of(alternate).end);
        self.node(
            NodeKind::ConditionalExpression(ConditionalExpression {
                test,
                consequent,
                alternate,
            }),
            span,
        )
    }

    pub fn function_expression(&mut self, span: Span, function: Function) -> NodeId {
        self.node(NodeKind::FunctionExpression(function), span)
    }

    pub fn arrow_function(&mut self, span: Span, function: Function) -> NodeId {
        self.node(NodeKind::ArrowFunctionExpression(function), span)
    }

    pub fn function_declaration(&mut self, span: Span, function: Function) -> NodeId {
        self.node(NodeKind::FunctionDeclaration(function), span)
    }

    pub fn class_expression(&mut self, span: Span, class: Class) -> NodeId {
        self.node(NodeKind::ClassExpression(class), span)
    }

    pub fn class_declaration(&mut self, span: Span, class: Class) -> NodeId {
        self.node(NodeKind::ClassDeclaration(class), span)
    }

    pub fn class_member(&mut self, span: Span, member: ClassMember) -> NodeId {
        self.node(NodeKind::ClassMember(member), span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeshakeOptions;

    #[test]
    fn test_parent_links_set_on_alloc() {
        let mut bundle = Bundle::new(TreeshakeOptions::default());
        let mut b = AstBuilder::new(&mut bundle);
        let id = b.binding(Span::new(4, 5), "x");
        let init = b.literal(Span::new(8, 9), LiteralValue::Number(1.0));
        let decl = b.declarator(id, Some(init));
        let stmt = b.variable_declaration(Span::new(0, 10), DeclarationKind::Let, vec![decl]);

        assert_eq!(bundle.node(id).parent, Some(decl));
        assert_eq!(bundle.node(init).parent, Some(decl));
        assert_eq!(bundle.node(decl).parent, Some(stmt));
        assert_eq!(bundle.span(decl), Span::new(4, 9));
        assert_eq!(bundle.node(stmt).parent, None);
    }

    #[test]
    fn test_shorthand_property_links_value_once() {
        let mut bundle = Bundle::new(TreeshakeOptions::default());
        let mut b = AstBuilder::new(&mut bundle);
        let value = b.identifier(Span::new(1, 2), "a");
        let prop = b.property(
            Span::new(1, 2),
            PropertyKey::Static("a".into()),
            value,
            PropertyKind::Init,
            true,
        );
        let object = b.object(Span::new(0, 3), vec![prop]);

        assert_eq!(bundle.kind(prop).children(), vec![value]);
        assert_eq!(bundle.node(value).parent, Some(prop));
        assert_eq!(bundle.node(prop).parent, Some(object));
    }
}
