//! The node protocol: effect queries, inclusion, deoptimization and rendering
//! for every node kind, dispatched by exhaustive match over [`NodeKind`].
//!
//! Everything here takes `&Bundle`; the only state these calls change is held
//! in one-way latches and deoptimization trackers.

mod classes;
mod expressions;
mod functions;
mod identifier;
mod patterns;
mod statements;
mod variable_declaration;
mod variable_declarator;
mod variables;

use crate::ast::*;
use crate::context::{HasEffectsContext, InclusionContext, IncludeChildren};
use crate::error::Result;
use crate::path_tracker::{PathKey, EMPTY_PATH, UNKNOWN_PATH};
use crate::render::{NodeRenderOptions, RenderOptions, SpliceBuffer};

/// How a value is being invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub is_new: bool,
}

impl Bundle {
    // ==================== Effects ====================

    /// Whether evaluating `node` has an observable effect beyond its value.
    pub fn has_effects(&self, node: NodeId, ctx: &mut HasEffectsContext) -> bool {
        self.apply_deoptimizations(node);
        match &self.nodes[node].kind {
            NodeKind::Program(Program { body }) | NodeKind::BlockStatement(BlockStatement { body }) => {
                body.iter().any(|&stmt| self.has_effects(stmt, ctx))
            }
            NodeKind::VariableDeclaration(decl) => decl
                .declarations
                .iter()
                .any(|&declarator| self.has_effects(declarator, ctx)),
            NodeKind::VariableDeclarator(decl) => self.declarator_has_effects(decl, ctx),
            NodeKind::Identifier(ident) => self.identifier_has_effects(node, ident),
            NodeKind::ObjectPattern(_)
            | NodeKind::ArrayPattern(_)
            | NodeKind::AssignmentPattern(_)
            | NodeKind::RestElement(_) => self.pattern_has_effects(node, ctx),
            NodeKind::Property(property) => self.property_has_effects(property, ctx),
            NodeKind::SpreadElement(spread) => self.spread_has_effects(spread, ctx),
            NodeKind::Literal(_) | NodeKind::EmptyStatement | NodeKind::ImportDeclaration(_) => false,
            NodeKind::CallExpression(call) => self.call_has_effects(call, ctx),
            NodeKind::MemberExpression(member) => self.member_has_effects(member, ctx),
            NodeKind::AssignmentExpression(assignment) => self.assignment_has_effects(assignment, ctx),
            NodeKind::BinaryExpression(binary) => {
                self.has_effects(binary.left, ctx)
                    || self.has_effects(binary.right, ctx)
                    || (binary.operator == BinaryOperator::Relational
                        && self.relational_operand_may_throw(binary.right))
            }
            NodeKind::LogicalExpression(logical) => {
                self.has_effects(logical.left, ctx) || self.has_effects(logical.right, ctx)
            }
            NodeKind::UnaryExpression(unary) => self.unary_has_effects(unary, ctx),
            NodeKind::ConditionalExpression(cond) => {
                self.has_effects(cond.test, ctx)
                    || self.has_effects(cond.consequent, ctx)
                    || self.has_effects(cond.alternate, ctx)
            }
            NodeKind::ObjectExpression(ObjectExpression { properties }) => {
                properties.iter().any(|&property| self.has_effects(property, ctx))
            }
            NodeKind::ArrayExpression(ArrayExpression { elements }) => elements
                .iter()
                .flatten()
                .any(|&element| self.has_effects(element, ctx)),
            // creating a function runs none of its code
            NodeKind::FunctionExpression(_)
            | NodeKind::ArrowFunctionExpression(_)
            | NodeKind::FunctionDeclaration(_) => false,
            NodeKind::ClassExpression(class) | NodeKind::ClassDeclaration(class) => {
                self.class_has_effects(class, ctx)
            }
            NodeKind::ClassMember(member) => self.class_member_has_effects(member, ctx),
            NodeKind::ExpressionStatement(stmt) => self.has_effects(stmt.expression, ctx),
            NodeKind::IfStatement(stmt) => {
                self.has_effects(stmt.test, ctx)
                    || self.has_effects(stmt.consequent, ctx)
                    || stmt.alternate.is_some_and(|alt| self.has_effects(alt, ctx))
            }
            NodeKind::ReturnStatement(stmt) => {
                !ctx.ignore_return || stmt.argument.is_some_and(|arg| self.has_effects(arg, ctx))
            }
            NodeKind::ExportNamedDeclaration(export) => export
                .declaration
                .is_some_and(|declaration| self.has_effects(declaration, ctx)),
            NodeKind::ExportDefaultDeclaration(export) => self.has_effects(export.declaration, ctx),
        }
    }

    /// Whether reading `<node>.<path>` has an effect.
    pub fn has_effects_on_access_at_path(
        &self,
        node: NodeId,
        path: &[PathKey],
        ctx: &mut HasEffectsContext,
    ) -> bool {
        if path.is_empty() {
            return false;
        }
        match &self.nodes[node].kind {
            NodeKind::Identifier(ident) => self.identifier_has_effects_on_access(ident, path, ctx),
            NodeKind::MemberExpression(member) => {
                let path = self.member_path(member, path);
                self.has_effects_on_access_at_path(member.object, &path, ctx)
            }
            NodeKind::ObjectExpression(object) => self.object_has_effects_on_access(object, path, ctx),
            NodeKind::Literal(literal) => {
                literal.value == LiteralValue::Null
                    || (path.len() > 1 && self.options.property_read_side_effects)
            }
            NodeKind::FunctionExpression(_)
            | NodeKind::ArrowFunctionExpression(_)
            | NodeKind::FunctionDeclaration(_)
            | NodeKind::ArrayExpression(_)
            | NodeKind::BinaryExpression(_)
            | NodeKind::UnaryExpression(_) => path.len() > 1 && self.options.property_read_side_effects,
            NodeKind::ClassExpression(class) | NodeKind::ClassDeclaration(class) => {
                self.class_has_effects_on_access(class, path, ctx)
            }
            NodeKind::ConditionalExpression(cond) => {
                self.has_effects_on_access_at_path(cond.consequent, path, ctx)
                    || self.has_effects_on_access_at_path(cond.alternate, path, ctx)
            }
            NodeKind::LogicalExpression(logical) => {
                self.has_effects_on_access_at_path(logical.left, path, ctx)
                    || self.has_effects_on_access_at_path(logical.right, path, ctx)
            }
            NodeKind::AssignmentExpression(assignment) => {
                self.has_effects_on_access_at_path(assignment.right, path, ctx)
            }
            _ => self.options.property_read_side_effects,
        }
    }

    /// Whether writing to `<node>.<path>` has an effect.
    pub fn has_effects_on_assignment_at_path(
        &self,
        node: NodeId,
        path: &[PathKey],
        ctx: &mut HasEffectsContext,
    ) -> bool {
        match &self.nodes[node].kind {
            NodeKind::Identifier(ident) => self.identifier_has_effects_on_assignment(ident, path, ctx),
            NodeKind::MemberExpression(member) => {
                let path = self.member_path(member, path);
                self.has_effects_on_assignment_at_path(member.object, &path, ctx)
            }
            NodeKind::ObjectExpression(object) => self.object_has_effects_on_assignment(object, path, ctx),
            NodeKind::FunctionExpression(_)
            | NodeKind::ArrowFunctionExpression(_)
            | NodeKind::FunctionDeclaration(_)
            | NodeKind::ArrayExpression(_) => path.len() != 1,
            NodeKind::ClassExpression(class) | NodeKind::ClassDeclaration(class) => {
                path.len() != 1 || self.class_has_static_accessor(class, &path[0])
            }
            NodeKind::ConditionalExpression(cond) => {
                self.has_effects_on_assignment_at_path(cond.consequent, path, ctx)
                    || self.has_effects_on_assignment_at_path(cond.alternate, path, ctx)
            }
            _ => true,
        }
    }

    /// Whether calling `<node>.<path>(...)` has an effect, arguments aside.
    pub fn has_effects_when_called_at_path(
        &self,
        node: NodeId,
        path: &[PathKey],
        call: CallOptions,
        ctx: &mut HasEffectsContext,
    ) -> bool {
        match &self.nodes[node].kind {
            NodeKind::Identifier(ident) => self.identifier_has_effects_when_called(ident, path, call, ctx),
            NodeKind::MemberExpression(member) => {
                let path = self.member_path(member, path);
                self.has_effects_when_called_at_path(member.object, &path, call, ctx)
            }
            NodeKind::FunctionExpression(function)
            | NodeKind::ArrowFunctionExpression(function)
            | NodeKind::FunctionDeclaration(function) => {
                !path.is_empty() || self.function_has_effects_when_called(node, function, call, ctx)
            }
            NodeKind::ClassExpression(class) | NodeKind::ClassDeclaration(class) => {
                self.class_has_effects_when_called(node, class, path, call, ctx)
            }
            NodeKind::ObjectExpression(object) => self.object_has_effects_when_called(object, path, call, ctx),
            NodeKind::ConditionalExpression(cond) => {
                self.has_effects_when_called_at_path(cond.consequent, path, call, ctx)
                    || self.has_effects_when_called_at_path(cond.alternate, path, call, ctx)
            }
            NodeKind::LogicalExpression(logical) => {
                self.has_effects_when_called_at_path(logical.left, path, call, ctx)
                    || self.has_effects_when_called_at_path(logical.right, path, call, ctx)
            }
            _ => true,
        }
    }

    /// Whether `node` must be included: it already is, or it has effects.
    pub fn should_be_included(&self, node: NodeId) -> bool {
        self.nodes[node].included.is_set() || self.has_effects(node, &mut HasEffectsContext::new())
    }

    // ==================== Deoptimization ====================

    /// Records that `<node>.<path>` may change in ways analysis cannot follow.
    pub fn deoptimize_path(&self, node: NodeId, path: &[PathKey]) {
        match &self.nodes[node].kind {
            NodeKind::Identifier(_) => {
                if let Some(var) = self.identifier_variable(node) {
                    self.deoptimize_variable_path(var, path);
                }
            }
            NodeKind::MemberExpression(member) => {
                let path = self.member_path(member, path);
                self.deoptimize_path(member.object, &path);
            }
            NodeKind::ObjectExpression(object) => self.object_deoptimize_path(object, path),
            NodeKind::ArrayExpression(ArrayExpression { elements }) => {
                if !path.is_empty() {
                    for &element in elements.iter().flatten() {
                        self.deoptimize_path(element, UNKNOWN_PATH);
                    }
                }
            }
            NodeKind::ConditionalExpression(cond) => {
                self.deoptimize_path(cond.consequent, path);
                self.deoptimize_path(cond.alternate, path);
            }
            NodeKind::LogicalExpression(logical) => {
                self.deoptimize_path(logical.left, path);
                self.deoptimize_path(logical.right, path);
            }
            NodeKind::AssignmentExpression(assignment) => self.deoptimize_path(assignment.right, path),
            NodeKind::SpreadElement(spread) => self.deoptimize_path(spread.argument, path),
            NodeKind::VariableDeclarator(decl) => self.deoptimize_path(decl.id, path),
            NodeKind::ObjectPattern(_)
            | NodeKind::ArrayPattern(_)
            | NodeKind::AssignmentPattern(_)
            | NodeKind::RestElement(_) => self.pattern_deoptimize_path(node, path),
            _ => {}
        }
    }

    /// Applies, once per node, the deoptimizations evaluating it implies.
    pub(crate) fn apply_deoptimizations(&self, node: NodeId) {
        if !self.nodes[node].deoptimized.set() {
            return;
        }
        match &self.nodes[node].kind {
            NodeKind::CallExpression(call) => self.call_apply_deoptimizations(call),
            NodeKind::AssignmentExpression(assignment) => {
                self.deoptimize_path(assignment.left, EMPTY_PATH);
                self.deoptimize_path(assignment.right, UNKNOWN_PATH);
            }
            NodeKind::UnaryExpression(unary) if unary.operator == UnaryOperator::Delete => {
                self.deoptimize_path(unary.argument, EMPTY_PATH);
            }
            NodeKind::ReturnStatement(ReturnStatement { argument: Some(argument) }) => {
                self.deoptimize_path(*argument, UNKNOWN_PATH);
            }
            _ => {}
        }
    }

    // ==================== Inclusion ====================

    /// Marks `node` included and includes whatever it needs. Idempotent.
    pub fn include(&self, node: NodeId, ctx: &mut InclusionContext, children: IncludeChildren) {
        self.apply_deoptimizations(node);
        self.mark_included(node, ctx);
        match &self.nodes[node].kind {
            NodeKind::Program(Program { body }) | NodeKind::BlockStatement(BlockStatement { body }) => {
                for &stmt in body {
                    if children.is_all() || self.should_be_included(stmt) {
                        self.include(stmt, ctx, children);
                    }
                }
            }
            NodeKind::VariableDeclaration(decl) => self.variable_declaration_include(decl, ctx, children),
            NodeKind::VariableDeclarator(decl) => self.declarator_include(decl, ctx, children),
            NodeKind::Identifier(_) => {
                if let Some(var) = self.identifier_variable(node) {
                    self.include_variable(var, ctx);
                }
            }
            NodeKind::AssignmentExpression(assignment) => self.assignment_include(assignment, ctx, children),
            NodeKind::FunctionExpression(function)
            | NodeKind::ArrowFunctionExpression(function)
            | NodeKind::FunctionDeclaration(function) => self.function_include(function, ctx, children),
            NodeKind::ClassExpression(class) | NodeKind::ClassDeclaration(class) => {
                self.class_include(class, ctx, children)
            }
            NodeKind::ExportNamedDeclaration(export) => {
                if let Some(declaration) = export.declaration {
                    self.include(declaration, ctx, children);
                }
            }
            NodeKind::ImportDeclaration(_) => {}
            kind => {
                for child in kind.children() {
                    self.include(child, ctx, children);
                }
            }
        }
    }

    pub(crate) fn mark_included(&self, node: NodeId, ctx: &mut InclusionContext) -> bool {
        let changed = self.nodes[node].included.set();
        if changed {
            ctx.node_included();
        }
        changed
    }

    // ==================== Rendering ====================

    /// Emits the edits that turn `node`'s source into its rendered form.
    pub fn render(
        &self,
        node: NodeId,
        code: &mut SpliceBuffer<'_>,
        options: &RenderOptions,
        node_options: NodeRenderOptions,
    ) -> Result<()> {
        let span = self.nodes[node].span;
        if node_options.rendered_surrounding_element.is_some() && self.needs_statement_parens(node, code.original()) {
            code.insert_at(span.start, "(")?;
            code.append_at(span.end, ")")?;
        }
        match &self.nodes[node].kind {
            NodeKind::Program(Program { body }) => {
                self.render_statement_list(body, span.start, span.end, code, options)
            }
            NodeKind::BlockStatement(BlockStatement { body }) => {
                self.render_statement_list(body, span.start + 1, span.end.saturating_sub(1), code, options)
            }
            NodeKind::VariableDeclaration(decl) => self.render_variable_declaration(node, decl, code, options),
            NodeKind::VariableDeclarator(decl) => self.render_declarator(node, decl, code, options),
            NodeKind::Identifier(ident) => self.render_identifier(node, ident, code, options, node_options),
            NodeKind::Property(property) if property.shorthand => self.render(
                property.value,
                code,
                options,
                NodeRenderOptions {
                    is_shorthand_property: true,
                    ..Default::default()
                },
            ),
            NodeKind::AssignmentPattern(pattern) => {
                self.render(pattern.left, code, options, NodeRenderOptions {
                    is_shorthand_property: node_options.is_shorthand_property,
                    ..Default::default()
                })?;
                self.render(pattern.right, code, options, NodeRenderOptions::default())
            }
            NodeKind::AssignmentExpression(assignment) => {
                self.render_assignment(assignment, code, options, node_options)
            }
            NodeKind::ExpressionStatement(stmt) => {
                self.render(stmt.expression, code, options, NodeRenderOptions::statement())
            }
            NodeKind::ExportNamedDeclaration(export) => self.render_export_named(node, export, code, options),
            NodeKind::ExportDefaultDeclaration(export) => self.render_export_default(node, export, code, options),
            NodeKind::ImportDeclaration(_) => code.remove(span.start, span.end),
            kind => {
                for child in kind.children() {
                    self.render(child, code, options, NodeRenderOptions::default())?;
                }
                Ok(())
            }
        }
    }

    /// Expressions that would read as a declaration or block at statement start.
    fn needs_statement_parens(&self, node: NodeId, source: &str) -> bool {
        matches!(
            self.nodes[node].kind,
            NodeKind::FunctionExpression(_)
                | NodeKind::ClassExpression(_)
                | NodeKind::ObjectExpression(_)
                | NodeKind::CallExpression(_)
                | NodeKind::MemberExpression(_)
                | NodeKind::BinaryExpression(_)
                | NodeKind::LogicalExpression(_)
                | NodeKind::ConditionalExpression(_)
                | NodeKind::AssignmentExpression(_)
        ) && crate::render::helpers::starts_like_statement(source, self.nodes[node].span.start_usize())
    }
}
