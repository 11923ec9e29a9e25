//! Fixture parsing: runs `parse-js` over a module and lowers its AST into
//! the tree-shaker's arena through [`AstBuilder`].
//!
//! Produces ESTree-shaped spans: a parenthesized expression keeps its inner
//! span, while the nodes built around it start and end at the parentheses.
//! Statement spans include their terminating semicolon.
//! Not supported: template literals, regular expressions, `this`, loops,
//! sequence expressions, update expressions, namespace imports and re-exports.

use parse_js::ast::class_or_object::{
    self, ClassOrObjKey, ClassOrObjMemberDirectKey, ClassOrObjVal, ObjMemberType,
};
use parse_js::ast::expr::lit::{LitArrElem, LitArrExpr, LitObjExpr};
use parse_js::ast::expr::pat::{ArrPat, ClassOrFuncName, ObjPat, Pat};
use parse_js::ast::expr::{BinaryExpr, CallArg, CallExpr, Expr, UnaryExpr};
use parse_js::ast::func::{Func, FuncBody};
use parse_js::ast::import_export::{ExportNames, ImportNames};
use parse_js::ast::node::Node;
use parse_js::ast::stmt::decl::{ClassDecl, FuncDecl, ParamDecl, VarDecl, VarDeclMode};
use parse_js::ast::stmt::{ExportListStmt, ImportStmt, Stmt};
use parse_js::error::SyntaxError;
use parse_js::loc::Loc;
use parse_js::operator::OperatorName;
use parse_js::token::TT;
use thiserror::Error;
use treeshake_core::ast::{
    AssignmentExpression, AssignmentOperator, AssignmentPattern, AstBuilder, BinaryExpression,
    BinaryOperator, Bundle, CallExpression, Class, ClassMember, ClassMemberKind,
    ConditionalExpression, DeclarationKind, ExportSpecifier, Function, IdentifierRole,
    ImportSpecifier, ImportedName, LiteralValue, LogicalExpression, LogicalOperator,
    MemberExpression, MemberProperty, ModuleId, NodeId, NodeKind, PropertyKey, PropertyKind,
    UnaryOperator, VariableDeclarator,
};
use treeshake_core::span::Span;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: u32,
}

impl From<SyntaxError> for ParseError {
    fn from(err: SyntaxError) -> Self {
        ParseError {
            message: err.to_string(),
            offset: err.loc.0 as u32,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

fn unsupported<T>(offset: usize, what: &str) -> ParseResult<T> {
    Err(ParseError {
        message: format!("Unsupported syntax: {what}"),
        offset: offset as u32,
    })
}

const PURE_ANNOTATIONS: [&str; 2] = ["/*#__PURE__*/", "/*@__PURE__*/"];

/// Parses `source` and registers it in `bundle` as module `id`.
pub fn parse_module(bundle: &mut Bundle, id: &str, source: &str, is_entry: bool) -> ParseResult<ModuleId> {
    let top_level = parse_js::parse(source.as_bytes())?;
    let program = {
        let mut lowering = Lowering {
            source,
            builder: AstBuilder::new(bundle),
        };
        let body = lowering.statements(top_level.stx.body)?;
        lowering.builder.program(Span::new(0, source.len() as u32), body)
    };
    Ok(bundle.add_module(id, source, program, is_entry))
}

fn span_of(loc: Loc) -> Span {
    Span::new(loc.0 as u32, loc.1 as u32)
}

struct Lowering<'s, 'b> {
    source: &'s str,
    builder: AstBuilder<'b>,
}

impl Lowering<'_, '_> {
    // ==================== Source helpers ====================

    /// The extent of `node` including any parentheses wrapped around it.
    fn outer(&self, node: NodeId) -> Span {
        let span = self.builder.span_of(node);
        let (mut start, mut end) = (span.start as usize, span.end as usize);
        loop {
            let before = self.source[..start].trim_end();
            let after = self.source[end..].trim_start();
            if !(before.ends_with('(') && after.starts_with(')')) {
                break;
            }
            start = before.len() - 1;
            end = self.source.len() - after.len() + 1;
        }
        Span::new(start as u32, end as u32)
    }

    fn between(&self, first: NodeId, last: NodeId) -> Span {
        Span::new(self.outer(first).start, self.outer(last).end)
    }

    /// Extends `span` over a `;` that directly follows it.
    fn through_semicolon(&self, span: Span) -> Span {
        let end = span.end as usize;
        if self.source[..end].ends_with(';') {
            return span;
        }
        match self.source[end..].trim_start().strip_prefix(';') {
            Some(after) => Span::new(span.start, (self.source.len() - after.len()) as u32),
            None => span,
        }
    }

    /// Start of a `...` directly before `start`, or `start` itself.
    fn spread_start(&self, start: u32) -> u32 {
        let before = self.source[..start as usize].trim_end();
        match before.strip_suffix("...") {
            Some(rest) => rest.len() as u32,
            None => start,
        }
    }

    /// Where a declaration's own keyword starts, past `export` and `default`.
    fn declaration_start(&self, start: usize) -> u32 {
        let mut rest = &self.source[start..];
        if let Some(after) = rest.strip_prefix("export") {
            rest = after.trim_start();
            if let Some(after) = rest.strip_prefix("default") {
                rest = after.trim_start();
            }
        }
        (self.source.len() - rest.len()) as u32
    }

    fn is_pure_annotated(&self, start: u32) -> bool {
        let before = self.source[..start as usize].trim_end();
        PURE_ANNOTATIONS.iter().any(|annotation| before.ends_with(annotation))
    }

    // ==================== Statements ====================

    fn statements(&mut self, statements: Vec<Node<Stmt>>) -> ParseResult<Vec<NodeId>> {
        let mut body = Vec::with_capacity(statements.len());
        for statement in statements {
            body.push(self.statement(statement)?);
        }
        Ok(body)
    }

    fn statement(&mut self, statement: Node<Stmt>) -> ParseResult<NodeId> {
        let loc = statement.loc;
        match *statement.stx {
            Stmt::Block(block) => {
                let body = self.statements(block.stx.body)?;
                Ok(self.builder.block(span_of(loc), body))
            }
            Stmt::Empty(_) => Ok(self.builder.empty_statement(span_of(loc))),
            Stmt::Expr(stmt) => {
                let expression = self.expression(stmt.stx.expr)?;
                let span = self.through_semicolon(span_of(loc));
                Ok(self.builder.expression_statement(span, expression))
            }
            Stmt::If(stmt) => {
                let stmt = *stmt.stx;
                let test = self.expression(stmt.test)?;
                let consequent = self.statement(stmt.consequent)?;
                let alternate = match stmt.alternate {
                    Some(alternate) => Some(self.statement(alternate)?),
                    None => None,
                };
                Ok(self
                    .builder
                    .if_statement(span_of(loc), test, consequent, alternate))
            }
            Stmt::Return(stmt) => {
                let argument = match stmt.stx.value {
                    Some(value) => Some(self.expression(value)?),
                    None => None,
                };
                let span = self.through_semicolon(span_of(loc));
                Ok(self.builder.return_statement(span, argument))
            }
            Stmt::VarDecl(decl) => self.variable_declaration(loc, *decl.stx),
            Stmt::FunctionDecl(decl) => self.function_declaration(loc, *decl.stx),
            Stmt::ClassDecl(decl) => self.class_declaration(loc, *decl.stx),
            Stmt::Import(import) => self.import(loc, *import.stx),
            Stmt::ExportList(export) => self.export_list(loc, *export.stx),
            Stmt::ExportDefaultExpr(export) => {
                let declaration = self.expression(export.stx.expression)?;
                let span = self.through_semicolon(span_of(loc));
                Ok(self.builder.export_default(span, declaration))
            }
            _ => unsupported(loc.0, "statement"),
        }
    }

    fn variable_declaration(&mut self, loc: Loc, decl: VarDecl) -> ParseResult<NodeId> {
        let kind = match decl.mode {
            VarDeclMode::Var => DeclarationKind::Var,
            VarDeclMode::Let => DeclarationKind::Let,
            VarDeclMode::Const => DeclarationKind::Const,
            _ => return unsupported(loc.0, "`using` declaration"),
        };
        let mut declarations = Vec::with_capacity(decl.declarators.len());
        for declarator in decl.declarators {
            let start = declarator.pattern.loc.0 as u32;
            let id = self.pattern(declarator.pattern.stx.pat, IdentifierRole::Declaration)?;
            let (init, end) = match declarator.initializer {
                Some(init) => {
                    let init = self.expression(init)?;
                    (Some(init), self.outer(init).end)
                }
                None => (None, self.builder.span_of(id).end),
            };
            declarations.push(self.builder.node(
                NodeKind::VariableDeclarator(VariableDeclarator { id, init }),
                Span::new(start, end),
            ));
        }
        let span = self.through_semicolon(span_of(loc));
        let start = self.declaration_start(loc.0);
        let node = self
            .builder
            .variable_declaration(Span::new(start, span.end), kind, declarations);
        Ok(self.exported(span, node, decl.export, false))
    }

    fn function_declaration(&mut self, loc: Loc, decl: FuncDecl) -> ParseResult<NodeId> {
        let id = self.name(decl.name);
        let function = self.function(id, decl.function)?;
        let start = self.declaration_start(loc.0);
        let node = self
            .builder
            .function_declaration(Span::new(start, loc.1 as u32), function);
        Ok(self.exported(span_of(loc), node, decl.export, decl.export_default))
    }

    fn class_declaration(&mut self, loc: Loc, decl: ClassDecl) -> ParseResult<NodeId> {
        let class = self.class(decl.name, decl.extends, decl.members)?;
        let start = self.declaration_start(loc.0);
        let node = self
            .builder
            .class_declaration(Span::new(start, loc.1 as u32), class);
        Ok(self.exported(span_of(loc), node, decl.export, decl.export_default))
    }

    fn exported(&mut self, span: Span, declaration: NodeId, export: bool, export_default: bool) -> NodeId {
        if export_default {
            self.builder.export_default(span, declaration)
        } else if export {
            self.builder.export_named(span, Some(declaration), Vec::new())
        } else {
            declaration
        }
    }

    fn import(&mut self, loc: Loc, import: ImportStmt) -> ParseResult<NodeId> {
        let mut specifiers = Vec::new();
        if let Some(default) = import.default {
            specifiers.push(ImportSpecifier {
                imported: ImportedName::Default,
                local: self.pattern(default.stx.pat, IdentifierRole::Declaration)?,
            });
        }
        match import.names {
            Some(ImportNames::All(alias)) => {
                let star = self.source[loc.0..alias.loc.0]
                    .find('*')
                    .map_or(alias.loc.0, |index| loc.0 + index);
                return unsupported(star, "namespace import");
            }
            Some(ImportNames::Specific(names)) => {
                for name in names {
                    let name = *name.stx;
                    let imported = match name.importable.as_str() {
                        "default" => ImportedName::Default,
                        other => ImportedName::Named(other.to_string()),
                    };
                    specifiers.push(ImportSpecifier {
                        imported,
                        local: self.pattern(name.alias.stx.pat, IdentifierRole::Declaration)?,
                    });
                }
            }
            None => {}
        }
        let span = self.through_semicolon(span_of(loc));
        Ok(self.builder.import_declaration(span, import.module, specifiers))
    }

    fn export_list(&mut self, loc: Loc, export: ExportListStmt) -> ParseResult<NodeId> {
        if export.from.is_some() {
            return unsupported(loc.0, "re-export");
        }
        let ExportNames::Specific(names) = export.names else {
            return unsupported(loc.0, "re-export");
        };
        let mut specifiers = Vec::with_capacity(names.len());
        for name in names {
            let start = name.loc.0 as u32;
            let name = *name.stx;
            let local = name.exportable.as_str().to_string();
            let span = Span::new(start, start + local.len() as u32);
            specifiers.push(ExportSpecifier {
                local: self.builder.identifier(span, local),
                exported: name.alias.stx.name,
            });
        }
        let span = self.through_semicolon(span_of(loc));
        Ok(self.builder.export_named(span, None, specifiers))
    }

    // ==================== Patterns ====================

    fn pattern(&mut self, pattern: Node<Pat>, role: IdentifierRole) -> ParseResult<NodeId> {
        let span = span_of(pattern.loc);
        match *pattern.stx {
            Pat::Id(id) => Ok(self.ident(span, id.stx.name, role)),
            Pat::Obj(pat) => self.object_pattern(span, *pat.stx, role),
            Pat::Arr(pat) => self.array_pattern(span, *pat.stx, role),
        }
    }

    fn ident(&mut self, span: Span, name: String, role: IdentifierRole) -> NodeId {
        match role {
            IdentifierRole::Declaration => self.builder.binding(span, name),
            IdentifierRole::Reference => self.builder.identifier(span, name),
        }
    }

    fn with_default(&mut self, left: NodeId, default: Node<Expr>) -> ParseResult<NodeId> {
        let right = self.expression(default)?;
        let span = Span::new(self.builder.span_of(left).start, self.outer(right).end);
        Ok(self
            .builder
            .node(NodeKind::AssignmentPattern(AssignmentPattern { left, right }), span))
    }

    fn object_pattern(&mut self, span: Span, pattern: ObjPat, role: IdentifierRole) -> ParseResult<NodeId> {
        let mut properties = Vec::with_capacity(pattern.properties.len() + 1);
        for property in pattern.properties {
            let property_span = span_of(property.loc);
            let property = *property.stx;
            let shorthand = match &property.key {
                ClassOrObjKey::Direct(key) => property.shorthand && key.loc == property.target.loc,
                ClassOrObjKey::Computed(_) => false,
            };
            let key = self.property_key(property.key)?;
            let mut value = self.pattern(property.target, role)?;
            if let Some(default) = property.default_value {
                value = self.with_default(value, default)?;
            }
            properties.push(self.builder.property(
                property_span,
                key,
                value,
                PropertyKind::Init,
                shorthand,
            ));
        }
        if let Some(rest) = pattern.rest {
            let rest_span = span_of(rest.loc);
            let argument = self.ident(rest_span, rest.stx.name, role);
            let start = self.spread_start(rest_span.start);
            properties.push(
                self.builder
                    .rest_element(Span::new(start, rest_span.end), argument),
            );
        }
        Ok(self.builder.object_pattern(span, properties))
    }

    fn array_pattern(&mut self, span: Span, pattern: ArrPat, role: IdentifierRole) -> ParseResult<NodeId> {
        let mut elements = Vec::with_capacity(pattern.elements.len() + 1);
        for element in pattern.elements {
            let Some(element) = element else {
                elements.push(None);
                continue;
            };
            let mut target = self.pattern(element.target, role)?;
            if let Some(default) = element.default_value {
                target = self.with_default(target, default)?;
            }
            elements.push(Some(target));
        }
        if let Some(rest) = pattern.rest {
            let rest_span = span_of(rest.loc);
            let argument = self.pattern(rest, role)?;
            let start = self.spread_start(rest_span.start);
            elements.push(Some(
                self.builder
                    .rest_element(Span::new(start, rest_span.end), argument),
            ));
        }
        Ok(self.builder.array_pattern(span, elements))
    }

    /// The left-hand side of an assignment: a member chain or a pattern.
    fn assignment_target(&mut self, target: Node<Expr>) -> ParseResult<NodeId> {
        if matches!(target.stx.as_ref(), Expr::Member(_) | Expr::ComputedMember(_)) {
            return self.expression(target);
        }
        let loc = target.loc;
        let span = span_of(loc);
        match *target.stx {
            Expr::Id(id) => Ok(self.builder.identifier(span, id.stx.name)),
            Expr::IdPat(id) => Ok(self.builder.identifier(span, id.stx.name)),
            Expr::ObjPat(pat) => self.object_pattern(span, *pat.stx, IdentifierRole::Reference),
            Expr::ArrPat(pat) => self.array_pattern(span, *pat.stx, IdentifierRole::Reference),
            _ => unsupported(loc.0, "assignment target"),
        }
    }

    // ==================== Expressions ====================

    fn expression(&mut self, expression: Node<Expr>) -> ParseResult<NodeId> {
        let loc = expression.loc;
        let span = span_of(loc);
        match *expression.stx {
            Expr::Id(id) => Ok(self.builder.identifier(span, id.stx.name)),
            Expr::LitNull(_) => Ok(self.builder.literal(span, LiteralValue::Null)),
            Expr::LitBool(lit) => Ok(self.builder.literal(span, LiteralValue::Boolean(lit.stx.value))),
            Expr::LitNum(lit) => Ok(self.builder.literal(span, LiteralValue::Number(lit.stx.value.0))),
            Expr::LitStr(lit) => Ok(self.builder.literal(span, LiteralValue::String(lit.stx.value))),
            Expr::LitArr(lit) => self.array(span, *lit.stx),
            Expr::LitObj(lit) => self.object(span, *lit.stx),
            Expr::Binary(binary) => self.binary(loc, *binary.stx),
            Expr::Cond(cond) => {
                let cond = *cond.stx;
                let test = self.expression(cond.test)?;
                let consequent = self.expression(cond.consequent)?;
                let alternate = self.expression(cond.alternate)?;
                let span = self.between(test, alternate);
                Ok(self.builder.node(
                    NodeKind::ConditionalExpression(ConditionalExpression {
                        test,
                        consequent,
                        alternate,
                    }),
                    span,
                ))
            }
            Expr::Unary(unary) => self.unary(span, *unary.stx),
            Expr::Call(call) => self.call(loc, *call.stx),
            Expr::Member(member) => {
                let member = *member.stx;
                let object = self.expression(member.left)?;
                let property = MemberProperty::Static(member.right);
                Ok(self.member(object, span.end, property, member.optional_chaining))
            }
            Expr::ComputedMember(member) => {
                let member = *member.stx;
                let object = self.expression(member.object)?;
                let property = MemberProperty::Computed(self.expression(member.member)?);
                Ok(self.member(object, span.end, property, member.optional_chaining))
            }
            Expr::ArrowFunc(arrow) => {
                let function = self.function(None, arrow.stx.func)?;
                Ok(self.builder.arrow_function(span, function))
            }
            Expr::Func(func) => {
                let func = *func.stx;
                let id = self.name(func.name);
                let function = self.function(id, func.func)?;
                Ok(self.builder.function_expression(span, function))
            }
            Expr::Class(class) => {
                let class = *class.stx;
                let class = self.class(class.name, class.extends, class.members)?;
                Ok(self.builder.class_expression(span, class))
            }
            Expr::This(_) => unsupported(loc.0, "`this`"),
            Expr::LitTemplate(_) | Expr::TaggedTemplate(_) => unsupported(loc.0, "template literal"),
            Expr::LitRegex(_) => unsupported(loc.0, "regular expression"),
            Expr::UnaryPostfix(_) => unsupported(loc.0, "update expression"),
            _ => unsupported(loc.0, "expression"),
        }
    }

    fn member(&mut self, object: NodeId, end: u32, property: MemberProperty, optional: bool) -> NodeId {
        let start = self.outer(object).start;
        self.builder.node(
            NodeKind::MemberExpression(MemberExpression {
                object,
                property,
                optional,
            }),
            Span::new(start, end),
        )
    }

    fn binary(&mut self, loc: Loc, binary: BinaryExpr) -> ParseResult<NodeId> {
        if let Some(operator) = assignment_operator(binary.operator) {
            let left = self.assignment_target(binary.left)?;
            let right = self.expression(binary.right)?;
            let span = self.between(left, right);
            return Ok(self.builder.node(
                NodeKind::AssignmentExpression(AssignmentExpression {
                    operator,
                    left,
                    right,
                }),
                span,
            ));
        }
        let logical = logical_operator(binary.operator);
        let arithmetic = binary_operator(binary.operator);
        if logical.is_none() && arithmetic.is_none() {
            return unsupported(loc.0, "sequence expression");
        }
        let left = self.expression(binary.left)?;
        let right = self.expression(binary.right)?;
        let span = self.between(left, right);
        let kind = match (logical, arithmetic) {
            (Some(operator), _) => NodeKind::LogicalExpression(LogicalExpression {
                operator,
                left,
                right,
            }),
            (None, Some(operator)) => NodeKind::BinaryExpression(BinaryExpression {
                operator,
                left,
                right,
            }),
            (None, None) => return unsupported(loc.0, "sequence expression"),
        };
        Ok(self.builder.node(kind, span))
    }

    fn unary(&mut self, span: Span, unary: UnaryExpr) -> ParseResult<NodeId> {
        let operator = match unary.operator {
            OperatorName::New => return self.new_expression(span, unary.argument),
            OperatorName::LogicalNot => UnaryOperator::Not,
            OperatorName::UnaryNegation => UnaryOperator::Minus,
            OperatorName::UnaryPlus => UnaryOperator::Plus,
            OperatorName::BitwiseNot => UnaryOperator::BitNot,
            OperatorName::Typeof => UnaryOperator::Typeof,
            OperatorName::Void => UnaryOperator::Void,
            OperatorName::Delete => UnaryOperator::Delete,
            OperatorName::PrefixIncrement | OperatorName::PrefixDecrement => {
                return unsupported(span.start as usize, "update expression")
            }
            _ => return unsupported(span.start as usize, "unary operator"),
        };
        let argument = self.expression(unary.argument)?;
        Ok(self.builder.unary(span, operator, argument))
    }

    /// `new Foo(a)` arrives as `new` applied to the call `Foo(a)`.
    fn new_expression(&mut self, span: Span, target: Node<Expr>) -> ParseResult<NodeId> {
        let loc = target.loc;
        let (callee, arguments) = match *target.stx {
            Expr::Call(call) => {
                let call = *call.stx;
                let callee = self.expression(call.callee)?;
                (callee, self.arguments(call.arguments)?)
            }
            other => (self.expression(Node::new(loc, other))?, Vec::new()),
        };
        let pure_annotation = self.is_pure_annotated(span.start);
        Ok(self.builder.call_expression(
            span,
            CallExpression {
                callee,
                arguments,
                is_new: true,
                optional: false,
                pure_annotation,
            },
        ))
    }

    fn call(&mut self, loc: Loc, call: CallExpr) -> ParseResult<NodeId> {
        // only the first call of a chain carries the annotation
        let starts_chain = !chain_has_call(&call.callee);
        let callee = self.expression(call.callee)?;
        let start = self.outer(callee).start;
        let arguments = self.arguments(call.arguments)?;
        let pure_annotation = starts_chain && self.is_pure_annotated(start);
        Ok(self.builder.call_expression(
            Span::new(start, loc.1 as u32),
            CallExpression {
                callee,
                arguments,
                is_new: false,
                optional: call.optional_chaining,
                pure_annotation,
            },
        ))
    }

    fn arguments(&mut self, arguments: Vec<Node<CallArg>>) -> ParseResult<Vec<NodeId>> {
        let mut lowered = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let argument = *argument.stx;
            let value = self.expression(argument.value)?;
            if argument.spread {
                lowered.push(self.spread(value));
            } else {
                lowered.push(value);
            }
        }
        Ok(lowered)
    }

    fn spread(&mut self, argument: NodeId) -> NodeId {
        let outer = self.outer(argument);
        let start = self.spread_start(outer.start);
        self.builder.spread(Span::new(start, outer.end), argument)
    }

    fn array(&mut self, span: Span, array: LitArrExpr) -> ParseResult<NodeId> {
        let mut elements = Vec::with_capacity(array.elements.len());
        for element in array.elements {
            match element {
                LitArrElem::Single(value) => elements.push(Some(self.expression(value)?)),
                LitArrElem::Rest(value) => {
                    let value = self.expression(value)?;
                    elements.push(Some(self.spread(value)));
                }
                LitArrElem::Empty => elements.push(None),
            }
        }
        Ok(self.builder.array(span, elements))
    }

    fn object(&mut self, span: Span, object: LitObjExpr) -> ParseResult<NodeId> {
        let mut properties = Vec::with_capacity(object.members.len());
        for member in object.members {
            let loc = member.loc;
            let member_span = span_of(loc);
            let member = *member.stx;
            let property = match member.typ {
                ObjMemberType::Valued { key, val } => {
                    let key = self.property_key(key)?;
                    let (value, kind) = match val {
                        ClassOrObjVal::Prop(Some(value)) => (self.expression(value)?, PropertyKind::Init),
                        ClassOrObjVal::Getter(getter) => (self.method(getter.stx.func)?, PropertyKind::Get),
                        ClassOrObjVal::Setter(setter) => (self.method(setter.stx.func)?, PropertyKind::Set),
                        ClassOrObjVal::Method(method) => (self.method(method.stx.func)?, PropertyKind::Method),
                        _ => return unsupported(loc.0, "object member"),
                    };
                    self.builder.property(member_span, key, value, kind, false)
                }
                ObjMemberType::Shorthand { id } => {
                    let name = id.stx.name;
                    let value = self.builder.identifier(member_span, name.clone());
                    self.builder.property(
                        member_span,
                        PropertyKey::Static(name),
                        value,
                        PropertyKind::Init,
                        true,
                    )
                }
                ObjMemberType::Rest { val } => {
                    let argument = self.expression(val)?;
                    self.spread(argument)
                }
            };
            properties.push(property);
        }
        Ok(self.builder.object(span, properties))
    }

    fn property_key(&mut self, key: ClassOrObjKey) -> ParseResult<PropertyKey> {
        Ok(match key {
            ClassOrObjKey::Direct(key) => PropertyKey::Static(direct_key(*key.stx)),
            ClassOrObjKey::Computed(expression) => PropertyKey::Computed(self.expression(expression)?),
        })
    }

    // ==================== Functions and classes ====================

    fn name(&mut self, name: Option<Node<ClassOrFuncName>>) -> Option<NodeId> {
        let name = name?;
        Some(self.builder.binding(span_of(name.loc), name.stx.name))
    }

    fn function(&mut self, id: Option<NodeId>, func: Node<Func>) -> ParseResult<Function> {
        let end = func.loc.1;
        let func = *func.stx;
        let mut params = Vec::with_capacity(func.parameters.len());
        for parameter in func.parameters {
            params.push(self.parameter(parameter)?);
        }
        let body = match func.body {
            FuncBody::Block(body) => self.function_body(body, end)?,
            FuncBody::Expression(expression) => self.expression(expression)?,
        };
        Ok(Function {
            id,
            params,
            body,
            is_async: func.async_,
            is_generator: func.generator,
        })
    }

    /// The braces of a function body are not a node of their own, so the
    /// block starts at the last `{` before its first statement.
    fn function_body(&mut self, body: Vec<Node<Stmt>>, end: usize) -> ParseResult<NodeId> {
        let limit = body
            .first()
            .map_or(end.saturating_sub(1), |statement| statement.loc.0);
        let start = self.source[..limit].rfind('{').unwrap_or(limit);
        let body = self.statements(body)?;
        Ok(self.builder.block(Span::new(start as u32, end as u32), body))
    }

    fn parameter(&mut self, parameter: Node<ParamDecl>) -> ParseResult<NodeId> {
        let span = span_of(parameter.loc);
        let parameter = *parameter.stx;
        let mut target = self.pattern(parameter.pattern.stx.pat, IdentifierRole::Declaration)?;
        if let Some(default) = parameter.default_value {
            target = self.with_default(target, default)?;
        }
        if parameter.rest {
            let start = self.spread_start(span.start);
            target = self.builder.rest_element(Span::new(start, span.end), target);
        }
        Ok(target)
    }

    /// A method, getter or setter body, as a function expression.
    fn method(&mut self, func: Node<Func>) -> ParseResult<NodeId> {
        let span = span_of(func.loc);
        let function = self.function(None, func)?;
        Ok(self.builder.function_expression(span, function))
    }

    fn class(
        &mut self,
        name: Option<Node<ClassOrFuncName>>,
        extends: Option<Node<Expr>>,
        members: Vec<Node<class_or_object::ClassMember>>,
    ) -> ParseResult<Class> {
        let id = self.name(name);
        let super_class = match extends {
            Some(extends) => Some(self.expression(extends)?),
            None => None,
        };
        let mut body = Vec::with_capacity(members.len());
        for member in members {
            body.push(self.class_member(member)?);
        }
        Ok(Class { id, super_class, body })
    }

    fn class_member(&mut self, member: Node<class_or_object::ClassMember>) -> ParseResult<NodeId> {
        let loc = member.loc;
        let member = *member.stx;
        let is_static = member.static_;
        let is_constructor = !is_static
            && matches!(&member.key, ClassOrObjKey::Direct(key) if key.stx.key == "constructor");
        let key = self.property_key(member.key)?;
        let (kind, value) = match member.val {
            ClassOrObjVal::Method(method) => {
                let kind = if is_constructor {
                    ClassMemberKind::Constructor
                } else {
                    ClassMemberKind::Method
                };
                (kind, Some(self.method(method.stx.func)?))
            }
            ClassOrObjVal::Getter(getter) => (ClassMemberKind::Getter, Some(self.method(getter.stx.func)?)),
            ClassOrObjVal::Setter(setter) => (ClassMemberKind::Setter, Some(self.method(setter.stx.func)?)),
            ClassOrObjVal::Prop(value) => {
                let value = match value {
                    Some(value) => Some(self.expression(value)?),
                    None => None,
                };
                (ClassMemberKind::Field, value)
            }
            _ => return unsupported(loc.0, "class member"),
        };
        let span = match kind {
            ClassMemberKind::Field => self.through_semicolon(span_of(loc)),
            _ => span_of(loc),
        };
        Ok(self.builder.class_member(
            span,
            ClassMember {
                key,
                kind,
                is_static,
                value,
            },
        ))
    }
}

fn chain_has_call(expression: &Node<Expr>) -> bool {
    match expression.stx.as_ref() {
        Expr::Call(_) => true,
        Expr::Member(member) => chain_has_call(&member.stx.left),
        Expr::ComputedMember(member) => chain_has_call(&member.stx.object),
        _ => false,
    }
}

fn assignment_operator(operator: OperatorName) -> Option<AssignmentOperator> {
    match operator {
        OperatorName::Assignment => Some(AssignmentOperator::Assign),
        OperatorName::AssignmentAddition
        | OperatorName::AssignmentBitwiseAnd
        | OperatorName::AssignmentBitwiseLeftShift
        | OperatorName::AssignmentBitwiseOr
        | OperatorName::AssignmentBitwiseRightShift
        | OperatorName::AssignmentBitwiseUnsignedRightShift
        | OperatorName::AssignmentBitwiseXor
        | OperatorName::AssignmentDivision
        | OperatorName::AssignmentExponentiation
        | OperatorName::AssignmentLogicalAnd
        | OperatorName::AssignmentLogicalOr
        | OperatorName::AssignmentMultiplication
        | OperatorName::AssignmentNullishCoalescing
        | OperatorName::AssignmentRemainder
        | OperatorName::AssignmentSubtraction => Some(AssignmentOperator::Compound),
        _ => None,
    }
}

fn logical_operator(operator: OperatorName) -> Option<LogicalOperator> {
    match operator {
        OperatorName::LogicalAnd => Some(LogicalOperator::And),
        OperatorName::LogicalOr => Some(LogicalOperator::Or),
        OperatorName::NullishCoalescing => Some(LogicalOperator::Nullish),
        _ => None,
    }
}

fn binary_operator(operator: OperatorName) -> Option<BinaryOperator> {
    match operator {
        OperatorName::Addition
        | OperatorName::Subtraction
        | OperatorName::Multiplication
        | OperatorName::Division
        | OperatorName::Remainder
        | OperatorName::Exponentiation => Some(BinaryOperator::Arithmetic),
        OperatorName::LessThan
        | OperatorName::LessThanOrEqual
        | OperatorName::GreaterThan
        | OperatorName::GreaterThanOrEqual => Some(BinaryOperator::Comparison),
        OperatorName::Equality
        | OperatorName::Inequality
        | OperatorName::StrictEquality
        | OperatorName::StrictInequality => Some(BinaryOperator::Equality),
        OperatorName::BitwiseAnd
        | OperatorName::BitwiseOr
        | OperatorName::BitwiseXor
        | OperatorName::BitwiseLeftShift
        | OperatorName::BitwiseRightShift
        | OperatorName::BitwiseUnsignedRightShift => Some(BinaryOperator::Bitwise),
        OperatorName::In | OperatorName::Instanceof => Some(BinaryOperator::Relational),
        _ => None,
    }
}

/// Numeric keys are stored in their canonical string form (`1`, not `1.0`).
fn direct_key(key: ClassOrObjMemberDirectKey) -> String {
    if key.tt == TT::LiteralNumber {
        if let Ok(value) = key.key.parse::<f64>() {
            return number_key(value);
        }
    }
    key.key
}

fn number_key(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treeshake_core::TreeshakeOptions;

    fn parse(source: &str) -> (Bundle, ModuleId) {
        let mut bundle = Bundle::new(TreeshakeOptions::default());
        let module = parse_module(&mut bundle, "main.js", source, true).unwrap();
        (bundle, module)
    }

    fn body(bundle: &Bundle, module: ModuleId) -> Vec<NodeId> {
        match bundle.kind(bundle.module(module).program) {
            NodeKind::Program(program) => program.body.clone(),
            other => panic!("expected a program, found {}", other.name()),
        }
    }

    fn call_of(bundle: &Bundle, statement: NodeId) -> &CallExpression {
        match bundle.kind(statement) {
            NodeKind::ExpressionStatement(stmt) => match bundle.kind(stmt.expression) {
                NodeKind::CallExpression(call) => call,
                other => panic!("expected a call, found {}", other.name()),
            },
            other => panic!("expected a statement, found {}", other.name()),
        }
    }

    #[test]
    fn test_statement_spans_include_semicolons() {
        let source = "const a = 1, b = (2);\nfoo();";
        let (bundle, module) = parse(source);
        let body = body(&bundle, module);
        assert_eq!(body.len(), 2);
        assert_eq!(bundle.span(body[0]), Span::new(0, 21));
        assert_eq!(bundle.span(body[1]), Span::new(22, 28));

        let NodeKind::VariableDeclaration(decl) = bundle.kind(body[0]) else {
            panic!("expected a declaration");
        };
        // the declarator reaches the closing parenthesis
        assert_eq!(bundle.span(decl.declarations[1]), Span::new(13, 20));
    }

    #[test]
    fn test_exported_declaration_starts_at_its_keyword() {
        let (bundle, module) = parse("export const a = 1;\n");
        let body = body(&bundle, module);
        assert_eq!(bundle.span(body[0]), Span::new(0, 19));
        let NodeKind::ExportNamedDeclaration(export) = bundle.kind(body[0]) else {
            panic!("expected a named export");
        };
        let declaration = export.declaration.map(|decl| bundle.span(decl));
        assert_eq!(declaration, Some(Span::new(7, 19)));
    }

    #[test]
    fn test_pure_annotation() {
        let (bundle, module) = parse("/*#__PURE__*/ make(); other();");
        let body = body(&bundle, module);
        let pure: Vec<bool> = body
            .iter()
            .map(|&stmt| call_of(&bundle, stmt).pure_annotation)
            .collect();
        assert_eq!(pure, vec![true, false]);
    }

    #[test]
    fn test_new_expression_takes_call_arguments() {
        let (bundle, module) = parse("/*@__PURE__*/ new Foo(1, 2);");
        let body = body(&bundle, module);
        let call = call_of(&bundle, body[0]);
        assert!(call.is_new);
        assert!(call.pure_annotation);
        assert_eq!(call.arguments.len(), 2);
        assert!(matches!(bundle.kind(call.callee), NodeKind::Identifier(id) if id.name == "Foo"));
    }

    #[test]
    fn test_arrow_and_destructuring() {
        let (bundle, module) = parse("const f = async ({ a, b: [c] }) => a + c; ({ x } = obj);");
        let body = body(&bundle, module);
        let NodeKind::ExpressionStatement(stmt) = bundle.kind(body[1]) else {
            panic!("expected an expression statement");
        };
        let NodeKind::AssignmentExpression(assignment) = bundle.kind(stmt.expression) else {
            panic!("expected an assignment");
        };
        assert!(matches!(bundle.kind(assignment.left), NodeKind::ObjectPattern(_)));
    }

    #[test]
    fn test_class_members() {
        let (bundle, module) = parse("class A extends B { static x = 1; constructor() {} get y() { return 1; } }");
        let body = body(&bundle, module);
        let NodeKind::ClassDeclaration(class) = bundle.kind(body[0]) else {
            panic!("expected a class");
        };
        let kinds: Vec<ClassMemberKind> = class
            .body
            .iter()
            .map(|&member| match bundle.kind(member) {
                NodeKind::ClassMember(member) => member.kind,
                other => panic!("expected a member, found {}", other.name()),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![ClassMemberKind::Field, ClassMemberKind::Constructor, ClassMemberKind::Getter]
        );
    }

    #[test]
    fn test_unsupported_syntax_is_an_error() {
        let mut bundle = Bundle::new(TreeshakeOptions::default());
        let err = parse_module(&mut bundle, "main.js", "import * as ns from './a.js';", true).unwrap_err();
        assert_eq!(err.offset, 7);
    }
}
