use super::NodeId;
use crate::scope::VariableId;

#[derive(Debug, Clone)]
pub enum NodeKind {
    Program(Program),
    VariableDeclaration(VariableDeclaration),
    VariableDeclarator(VariableDeclarator),
    Identifier(Identifier),
    ObjectPattern(ObjectPattern),
    ArrayPattern(ArrayPattern),
    AssignmentPattern(AssignmentPattern),
    RestElement(RestElement),
    Property(Property),
    SpreadElement(SpreadElement),
    Literal(Literal),
    CallExpression(CallExpression),
    MemberExpression(MemberExpression),
    AssignmentExpression(AssignmentExpression),
    BinaryExpression(BinaryExpression),
    LogicalExpression(LogicalExpression),
    UnaryExpression(UnaryExpression),
    ConditionalExpression(ConditionalExpression),
    ObjectExpression(ObjectExpression),
    ArrayExpression(ArrayExpression),
    FunctionExpression(Function),
    ArrowFunctionExpression(Function),
    FunctionDeclaration(Function),
    ClassExpression(Class),
    ClassDeclaration(Class),
    ClassMember(ClassMember),
    ExpressionStatement(ExpressionStatement),
    BlockStatement(BlockStatement),
    IfStatement(IfStatement),
    ReturnStatement(ReturnStatement),
    ImportDeclaration(ImportDeclaration),
    ExportNamedDeclaration(ExportNamedDeclaration),
    ExportDefaultDeclaration(ExportDefaultDeclaration),
    EmptyStatement,
}

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::Program(Program { body }) | NodeKind::BlockStatement(BlockStatement { body }) => {
                out.extend(body.iter().copied())
            }
            NodeKind::VariableDeclaration(decl) => out.extend(decl.declarations.iter().copied()),
            NodeKind::VariableDeclarator(decl) => {
                out.push(decl.id);
                out.extend(decl.init);
            }
            NodeKind::Identifier(_) | NodeKind::Literal(_) | NodeKind::EmptyStatement => {}
            NodeKind::ObjectPattern(ObjectPattern { properties })
            | NodeKind::ObjectExpression(ObjectExpression { properties }) => {
                out.extend(properties.iter().copied())
            }
            NodeKind::ArrayPattern(ArrayPattern { elements })
            | NodeKind::ArrayExpression(ArrayExpression { elements }) => {
                out.extend(elements.iter().flatten().copied())
            }
            NodeKind::AssignmentPattern(pattern) => {
                out.push(pattern.left);
                out.push(pattern.right);
            }
            NodeKind::RestElement(RestElement { argument })
            | NodeKind::SpreadElement(SpreadElement { argument }) => out.push(*argument),
            NodeKind::Property(property) => {
                if let PropertyKey::Computed(key) = property.key {
                    out.push(key);
                }
                // shorthand properties share one identifier for key and value
                out.push(property.value);
            }
            NodeKind::CallExpression(call) => {
                out.push(call.callee);
                out.extend(call.arguments.iter().copied());
            }
            NodeKind::MemberExpression(member) => {
                out.push(member.object);
                if let MemberProperty::Computed(property) = member.property {
                    out.push(property);
                }
            }
            NodeKind::AssignmentExpression(assignment) => {
                out.push(assignment.left);
                out.push(assignment.right);
            }
            NodeKind::BinaryExpression(BinaryExpression { left, right, .. })
            | NodeKind::LogicalExpression(LogicalExpression { left, right, .. }) => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::UnaryExpression(unary) => out.push(unary.argument),
            NodeKind::ConditionalExpression(cond) => {
                out.push(cond.test);
                out.push(cond.consequent);
                out.push(cond.alternate);
            }
            NodeKind::FunctionExpression(function)
            | NodeKind::ArrowFunctionExpression(function)
            | NodeKind::FunctionDeclaration(function) => {
                out.extend(function.id);
                out.extend(function.params.iter().copied());
                out.push(function.body);
            }
            NodeKind::ClassExpression(class) | NodeKind::ClassDeclaration(class) => {
                out.extend(class.id);
                out.extend(class.super_class);
                out.extend(class.body.iter().copied());
            }
            NodeKind::ClassMember(member) => {
                if let PropertyKey::Computed(key) = member.key {
                    out.push(key);
                }
                out.extend(member.value);
            }
            NodeKind::ExpressionStatement(stmt) => out.push(stmt.expression),
            NodeKind::IfStatement(stmt) => {
                out.push(stmt.test);
                out.push(stmt.consequent);
                out.extend(stmt.alternate);
            }
            NodeKind::ReturnStatement(stmt) => out.extend(stmt.argument),
            NodeKind::ImportDeclaration(import) => {
                out.extend(import.specifiers.iter().map(|spec| spec.local))
            }
            NodeKind::ExportNamedDeclaration(export) => {
                out.extend(export.declaration);
                out.extend(export.specifiers.iter().map(|spec| spec.local));
            }
            NodeKind::ExportDefaultDeclaration(export) => out.push(export.declaration),
        }
        out
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program(_) => "Program",
            NodeKind::VariableDeclaration(_) => "VariableDeclaration",
            NodeKind::VariableDeclarator(_) => "VariableDeclarator",
            NodeKind::Identifier(_) => "Identifier",
            NodeKind::ObjectPattern(_) => "ObjectPattern",
            NodeKind::ArrayPattern(_) => "ArrayPattern",
            NodeKind::AssignmentPattern(_) => "AssignmentPattern",
            NodeKind::RestElement(_) => "RestElement",
            NodeKind::Property(_) => "Property",
            NodeKind::SpreadElement(_) => "SpreadElement",
            NodeKind::Literal(_) => "Literal",
            NodeKind::CallExpression(call) if call.is_new => "NewExpression",
            NodeKind::CallExpression(_) => "CallExpression",
            NodeKind::MemberExpression(_) => "MemberExpression",
            NodeKind::AssignmentExpression(_) => "AssignmentExpression",
            NodeKind::BinaryExpression(_) => "BinaryExpression",
            NodeKind::LogicalExpression(_) => "LogicalExpression",
            NodeKind::UnaryExpression(_) => "UnaryExpression",
            NodeKind::ConditionalExpression(_) => "ConditionalExpression",
            NodeKind::ObjectExpression(_) => "ObjectExpression",
            NodeKind::ArrayExpression(_) => "ArrayExpression",
            NodeKind::FunctionExpression(_) => "FunctionExpression",
            NodeKind::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
            NodeKind::FunctionDeclaration(_) => "FunctionDeclaration",
            NodeKind::ClassExpression(_) => "ClassExpression",
            NodeKind::ClassDeclaration(_) => "ClassDeclaration",
            NodeKind::ClassMember(_) => "ClassMember",
            NodeKind::ExpressionStatement(_) => "ExpressionStatement",
            NodeKind::BlockStatement(_) => "BlockStatement",
            NodeKind::IfStatement(_) => "IfStatement",
            NodeKind::ReturnStatement(_) => "ReturnStatement",
            NodeKind::ImportDeclaration(_) => "ImportDeclaration",
            NodeKind::ExportNamedDeclaration(_) => "ExportNamedDeclaration",
            NodeKind::ExportDefaultDeclaration(_) => "ExportDefaultDeclaration",
            NodeKind::EmptyStatement => "EmptyStatement",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

impl DeclarationKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::Var => "var",
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub kind: DeclarationKind,
    pub declarations: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    /// Binding pattern: an Identifier, ObjectPattern or ArrayPattern.
    pub id: NodeId,
    pub init: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: String,
    /// Filled in by the binder. `None` for unresolved (global) references.
    pub variable: Option<VariableId>,
    pub role: IdentifierRole,
    /// Set by the binder when this declaration conflicts with an existing
    /// lexical binding of the same name.
    pub conflicting_redeclaration: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierRole {
    Reference,
    Declaration,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectPattern {
    /// Property and RestElement nodes.
    pub properties: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayPattern {
    pub elements: Vec<Option<NodeId>>,
}

#[derive(Debug, Clone)]
pub struct AssignmentPattern {
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Debug, Clone)]
pub struct RestElement {
    pub argument: NodeId,
}

#[derive(Debug, Clone)]
pub struct SpreadElement {
    pub argument: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Static(String),
    Computed(NodeId),
}

impl PropertyKey {
    pub fn as_static(&self) -> Option<&str> {
        match self {
            PropertyKey::Static(name) => Some(name),
            PropertyKey::Computed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
    Method,
}

/// A property of an object literal or of an object pattern.
#[derive(Debug, Clone)]
pub struct Property {
    pub key: PropertyKey,
    pub value: NodeId,
    pub kind: PropertyKind,
    pub shorthand: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub value: LiteralValue,
}

#[derive(Debug, Clone)]
pub struct CallExpression {
    pub callee: NodeId,
    pub arguments: Vec<NodeId>,
    pub is_new: bool,
    pub optional: bool,
    /// Preceded by a `/*#__PURE__*/` (or `@__PURE__`) annotation.
    pub pure_annotation: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    Static(String),
    Computed(NodeId),
}

#[derive(Debug, Clone)]
pub struct MemberExpression {
    pub object: NodeId,
    pub property: MemberProperty,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    /// `+=`, `||=` and the other read-modify-write forms.
    Compound,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpression {
    pub operator: AssignmentOperator,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Arithmetic,
    Comparison,
    Equality,
    Bitwise,
    /// `in` and `instanceof` throw on non-object right operands.
    Relational,
}

#[derive(Debug, Clone)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Nullish,
}

#[derive(Debug, Clone)]
pub struct LogicalExpression {
    pub operator: LogicalOperator,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
    BitNot,
    Typeof,
    Void,
    Delete,
}

#[derive(Debug, Clone)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub argument: NodeId,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpression {
    pub test: NodeId,
    pub consequent: NodeId,
    pub alternate: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectExpression {
    /// Property and SpreadElement nodes.
    pub properties: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayExpression {
    pub elements: Vec<Option<NodeId>>,
}

/// Shared by function declarations, function expressions and arrows.
#[derive(Debug, Clone)]
pub struct Function {
    pub id: Option<NodeId>,
    pub params: Vec<NodeId>,
    /// A BlockStatement, or any expression for concise arrow bodies.
    pub body: NodeId,
    pub is_async: bool,
    pub is_generator: bool,
}

#[derive(Debug, Clone)]
pub struct Class {
    pub id: Option<NodeId>,
    pub super_class: Option<NodeId>,
    /// ClassMember nodes.
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassMemberKind {
    Constructor,
    Method,
    Getter,
    Setter,
    Field,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub key: PropertyKey,
    pub kind: ClassMemberKind,
    pub is_static: bool,
    /// The method's FunctionExpression, or the field initializer.
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub expression: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct BlockStatement {
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub test: NodeId,
    pub consequent: NodeId,
    pub alternate: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ReturnStatement {
    pub argument: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    Default,
    Named(String),
}

#[derive(Debug, Clone)]
pub struct ImportSpecifier {
    pub imported: ImportedName,
    /// Declaration Identifier of the local binding.
    pub local: NodeId,
}

#[derive(Debug, Clone)]
pub struct ImportDeclaration {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
}

#[derive(Debug, Clone)]
pub struct ExportSpecifier {
    /// Reference Identifier of the exported local.
    pub local: NodeId,
    pub exported: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExportNamedDeclaration {
    pub declaration: Option<NodeId>,
    pub specifiers: Vec<ExportSpecifier>,
}

#[derive(Debug, Clone)]
pub struct ExportDefaultDeclaration {
    /// An expression, or a (possibly anonymous) function/class declaration.
    pub declaration: NodeId,
    /// The exported binding, filled in by the binder.
    pub variable: Option<VariableId>,
}
