//! Declares every binding and resolves every reference of a bundle.
//!
//! Binding runs in two walks per module so hoisted declarations (functions,
//! `var`) are visible to references that precede them; imports are linked to
//! their exporting Variables once every module has been bound.

use super::{Scope, ScopeId, ScopeKind, Variable, VariableId, VariableKind};
use crate::ast::*;
use crate::error::{Result, ShakeError};
use crate::identifiers::module_binding_name;
use rustc_hash::FxHashMap as HashMap;
use tracing::debug;

struct Binder<'b> {
    bundle: &'b mut Bundle,
    module: ModuleId,
    /// Scope opened by each scope-creating node.
    scope_of: HashMap<NodeId, ScopeId>,
}

/// Binds every module of `bundle` and links imports across modules.
pub fn bind_bundle(bundle: &mut Bundle) -> Result<()> {
    let modules: Vec<ModuleId> = bundle.modules.iter().map(|(id, _)| id).collect();
    for module in modules {
        Binder {
            bundle: &mut *bundle,
            module,
            scope_of: HashMap::default(),
        }
        .bind_module()?;
    }
    bundle.link_modules();
    bundle.bound = true;
    Ok(())
}

impl Bundle {
    /// Binds every module. Must run once, after all modules are registered.
    pub fn bind(&mut self) -> Result<()> {
        bind_bundle(self)
    }

    /// Points every import binding at the Variable its source module exports.
    /// Imports of unregistered modules or missing exports stay unresolved.
    pub fn link_modules(&mut self) {
        let mut links = Vec::new();
        for (_, module) in self.modules.iter() {
            let NodeKind::Program(Program { body }) = &self.nodes[module.program].kind else {
                continue;
            };
            for &stmt in body {
                let NodeKind::ImportDeclaration(import) = &self.nodes[stmt].kind else {
                    continue;
                };
                let Some(target) = resolve_module(self, &import.source) else {
                    debug!("Import from unknown module {:?} stays unresolved", import.source);
                    continue;
                };
                for spec in &import.specifiers {
                    let NodeKind::Identifier(Identifier { variable: Some(local), .. }) =
                        &self.nodes[spec.local].kind
                    else {
                        continue;
                    };
                    let exported = match &spec.imported {
                        ImportedName::Default => "default",
                        ImportedName::Named(name) => name.as_str(),
                    };
                    match self.modules[target].exports.get(exported) {
                        Some(origin) => links.push((*local, *origin)),
                        None => debug!(
                            "Module {:?} has no export {:?}",
                            self.modules[target].id, exported
                        ),
                    }
                }
            }
        }
        for (local, origin) in links {
            if local != origin {
                self.variables[local].origin = Some(origin);
            }
        }
    }
}

/// Matches an import source against registered module ids, tolerating a
/// leading `./` and a missing `.js` extension.
fn resolve_module(bundle: &Bundle, source: &str) -> Option<ModuleId> {
    let trimmed = source.strip_prefix("./").unwrap_or(source);
    [source.to_string(), trimmed.to_string(), format!("{trimmed}.js")]
        .iter()
        .find_map(|candidate| bundle.module_ids.get(candidate).copied())
}

impl<'b> Binder<'b> {
    fn bind_module(&mut self) -> Result<()> {
        let program = self.bundle.modules[self.module].program;
        if !matches!(self.bundle.nodes[program].kind, NodeKind::Program(_)) {
            return Err(ShakeError::UnexpectedNode {
                expected: "Program",
                found: self.bundle.nodes[program].kind.name(),
                span: self.bundle.nodes[program].span,
            });
        }
        let scope = self.new_scope(ScopeKind::Module, None, program);
        self.bundle.modules[self.module].scope = Some(scope);

        self.declare_in(program, scope);
        self.resolve_in(program, scope);
        self.collect_specifier_exports(program);

        debug!(
            "Bound module {}: {} top-level bindings, {} globals",
            self.bundle.modules[self.module].id,
            self.bundle.scopes[scope].variables.len(),
            self.bundle.modules[self.module].global_names.len()
        );
        Ok(())
    }

    fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>, node: NodeId) -> ScopeId {
        let id = self
            .bundle
            .scopes
            .alloc(Scope::new(kind, parent, self.module, node));
        if let Some(parent) = parent {
            self.bundle.scopes[parent].children.push(id);
        }
        self.scope_of.insert(node, id);
        id
    }

    fn var_scope(&self, mut scope: ScopeId) -> ScopeId {
        while !self.bundle.scopes[scope].is_var_scope() {
            match self.bundle.scopes[scope].parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        scope
    }

    // ==================== Declaration walk ====================

    fn declare_in(&mut self, node: NodeId, scope: ScopeId) {
        let kind = self.bundle.nodes[node].kind.clone();
        match kind {
            NodeKind::Program(Program { body }) => {
                for stmt in body {
                    self.declare_in(stmt, scope);
                }
            }
            NodeKind::BlockStatement(BlockStatement { body }) => {
                let block = self.new_scope(ScopeKind::Block, Some(scope), node);
                for stmt in body {
                    self.declare_in(stmt, block);
                }
            }
            NodeKind::VariableDeclaration(decl) => {
                let (var_kind, target) = match decl.kind {
                    DeclarationKind::Var => (VariableKind::Var, self.var_scope(scope)),
                    DeclarationKind::Let => (VariableKind::Let, scope),
                    DeclarationKind::Const => (VariableKind::Const, scope),
                };
                for declarator in decl.declarations {
                    self.declare_declarator(declarator, var_kind, target, scope);
                }
            }
            NodeKind::FunctionDeclaration(function) => {
                if let Some(id) = function.id {
                    self.declare_identifier(id, VariableKind::Function, Some(node), scope);
                }
                self.declare_function(node, &function, scope, false);
            }
            NodeKind::FunctionExpression(function) => self.declare_function(node, &function, scope, true),
            NodeKind::ArrowFunctionExpression(function) => self.declare_function(node, &function, scope, false),
            NodeKind::ClassDeclaration(class) => {
                if let Some(id) = class.id {
                    self.declare_identifier(id, VariableKind::Class, Some(node), scope);
                }
                self.declare_class(node, &class, scope, false);
            }
            NodeKind::ClassExpression(class) => self.declare_class(node, &class, scope, true),
            NodeKind::ImportDeclaration(import) => {
                for spec in import.specifiers {
                    self.declare_identifier(spec.local, VariableKind::Import, None, scope);
                }
            }
            NodeKind::ExportNamedDeclaration(export) => {
                if let Some(declaration) = export.declaration {
                    self.declare_in(declaration, scope);
                    for ident in self.bundle.declared_identifiers(declaration) {
                        if let NodeKind::Identifier(Identifier {
                            name,
                            variable: Some(var),
                            ..
                        }) = &self.bundle.nodes[ident].kind
                        {
                            self.bundle.modules[self.module].exports.insert(name.clone(), *var);
                        }
                    }
                }
            }
            NodeKind::ExportDefaultDeclaration(export) => self.declare_export_default(node, export.declaration, scope),
            other => {
                for child in other.children() {
                    self.declare_in(child, scope);
                }
            }
        }
    }

    fn declare_declarator(&mut self, declarator: NodeId, kind: VariableKind, target: ScopeId, scope: ScopeId) {
        let NodeKind::VariableDeclarator(decl) = self.bundle.nodes[declarator].kind.clone() else {
            return;
        };
        self.declare_pattern(decl.id, kind, decl.init, target, scope);
        if let Some(init) = decl.init {
            self.declare_in(init, scope);
        }
    }

    /// Declares every binding of `pattern`. Only a plain identifier keeps the
    /// initializer; destructured bindings have no single known value.
    fn declare_pattern(
        &mut self,
        pattern: NodeId,
        kind: VariableKind,
        init: Option<NodeId>,
        target: ScopeId,
        scope: ScopeId,
    ) {
        match self.bundle.nodes[pattern].kind.clone() {
            NodeKind::Identifier(_) => {
                self.declare_identifier(pattern, kind, init, target);
            }
            NodeKind::ObjectPattern(ObjectPattern { properties }) => {
                for property in properties {
                    match self.bundle.nodes[property].kind.clone() {
                        NodeKind::Property(prop) => {
                            if let PropertyKey::Computed(key) = prop.key {
                                self.declare_in(key, scope);
                            }
                            self.declare_pattern(prop.value, kind, None, target, scope);
                        }
                        _ => self.declare_pattern(property, kind, None, target, scope),
                    }
                }
            }
            NodeKind::ArrayPattern(ArrayPattern { elements }) => {
                for element in elements.into_iter().flatten() {
                    self.declare_pattern(element, kind, None, target, scope);
                }
            }
            NodeKind::AssignmentPattern(AssignmentPattern { left, right }) => {
                self.declare_pattern(left, kind, None, target, scope);
                self.declare_in(right, scope);
            }
            NodeKind::RestElement(RestElement { argument }) => {
                self.declare_pattern(argument, kind, None, target, scope);
            }
            _ => self.declare_in(pattern, scope),
        }
    }

    fn declare_identifier(
        &mut self,
        ident: NodeId,
        kind: VariableKind,
        init: Option<NodeId>,
        scope: ScopeId,
    ) -> Option<VariableId> {
        let NodeKind::Identifier(Identifier { name, .. }) = &self.bundle.nodes[ident].kind else {
            return None;
        };
        let name = name.clone();

        let var = match self.bundle.scopes[scope].lookup_local(&name) {
            Some(existing) => {
                let existing_kind = self.bundle.variables[existing].kind;
                let conflicting = !(kind.allows_redeclaration() && existing_kind.allows_redeclaration());
                let variable = &mut self.bundle.variables[existing];
                variable.declarations.push(ident);
                if variable.init.is_some() || init.is_some() {
                    // more than one value flows into this binding
                    variable.init = None;
                    variable.mark_reassigned();
                    variable.tracker.escalate();
                }
                if conflicting {
                    debug!("Conflicting redeclaration of {name}");
                    if let NodeKind::Identifier(identifier) = &mut self.bundle.nodes[ident].kind {
                        identifier.conflicting_redeclaration = true;
                    }
                }
                existing
            }
            None => {
                let mut variable = Variable::new(name.clone(), kind, scope, self.module);
                variable.declarations.push(ident);
                variable.init = init;
                let id = self.bundle.variables.alloc(variable);
                self.bundle.scopes[scope].variables.insert(name, id);
                id
            }
        };
        if let NodeKind::Identifier(identifier) = &mut self.bundle.nodes[ident].kind {
            identifier.variable = Some(var);
        }
        Some(var)
    }

    fn declare_function(&mut self, node: NodeId, function: &Function, scope: ScopeId, names_itself: bool) {
        let function_scope = self.new_scope(ScopeKind::Function, Some(scope), node);
        if names_itself {
            if let Some(id) = function.id {
                if let Some(var) = self.declare_identifier(id, VariableKind::Function, Some(node), function_scope) {
                    self.bundle.variables[var].mark_declaration_reached();
                }
            }
        }
        for &param in &function.params {
            self.declare_pattern(param, VariableKind::Parameter, None, function_scope, function_scope);
        }
        for &param in &function.params {
            self.bundle.mark_pattern_declarations_reached(param);
        }
        match self.bundle.nodes[function.body].kind.clone() {
            // the body block shares the function scope
            NodeKind::BlockStatement(BlockStatement { body }) => {
                self.scope_of.insert(function.body, function_scope);
                for stmt in body {
                    self.declare_in(stmt, function_scope);
                }
            }
            _ => self.declare_in(function.body, function_scope),
        }
    }

    fn declare_class(&mut self, node: NodeId, class: &Class, scope: ScopeId, names_itself: bool) {
        if let Some(super_class) = class.super_class {
            self.declare_in(super_class, scope);
        }
        let class_scope = self.new_scope(ScopeKind::Class, Some(scope), node);
        if names_itself {
            if let Some(id) = class.id {
                if let Some(var) = self.declare_identifier(id, VariableKind::Class, Some(node), class_scope) {
                    self.bundle.variables[var].mark_declaration_reached();
                }
            }
        }
        for &member in &class.body {
            self.declare_in(member, class_scope);
        }
    }

    fn declare_export_default(&mut self, node: NodeId, declaration: NodeId, scope: ScopeId) {
        let named_declaration = match &self.bundle.nodes[declaration].kind {
            NodeKind::FunctionDeclaration(Function { id: Some(id), .. })
            | NodeKind::ClassDeclaration(Class { id: Some(id), .. }) => Some(*id),
            _ => None,
        };
        self.declare_in(declaration, scope);
        let var = match named_declaration.and_then(|id| self.bundle.identifier_variable(id)) {
            Some(var) => var,
            None => {
                let name = module_binding_name(&self.bundle.modules[self.module].id);
                let mut variable = Variable::new(name, VariableKind::ExportDefault, scope, self.module);
                variable.declarations.push(node);
                variable.init = Some(declaration);
                let var = self.bundle.variables.alloc(variable);
                // not resolvable by name; lives beside the module's own bindings
                self.bundle.scopes[scope].variables.insert(format!("*default*{}", var.index()), var);
                var
            }
        };
        if let NodeKind::ExportDefaultDeclaration(export) = &mut self.bundle.nodes[node].kind {
            export.variable = Some(var);
        }
        self.bundle.modules[self.module].exports.insert("default".to_string(), var);
    }

    // ==================== Resolution walk ====================

    fn resolve_in(&mut self, node: NodeId, scope: ScopeId) {
        let scope = self.scope_of.get(&node).copied().unwrap_or(scope);
        let (reference, children) = match &self.bundle.nodes[node].kind {
            NodeKind::Identifier(Identifier {
                name,
                role: IdentifierRole::Reference,
                ..
            }) => (Some(name.clone()), Vec::new()),
            kind => (None, kind.children()),
        };
        if let Some(name) = reference {
            self.resolve_reference(node, &name, scope);
            return;
        }
        for child in children {
            self.resolve_in(child, scope);
        }
    }

    fn resolve_reference(&mut self, node: NodeId, name: &str, scope: ScopeId) {
        match self.bundle.find_variable(scope, name) {
            Some(var) => {
                let owner = self.bundle.variables[var].scope;
                let mut current = Some(scope);
                while let Some(id) = current.filter(|id| *id != owner) {
                    self.bundle.scopes[id].accessed_outside.insert(var);
                    current = self.bundle.scopes[id].parent;
                }
                if let NodeKind::Identifier(identifier) = &mut self.bundle.nodes[node].kind {
                    identifier.variable = Some(var);
                }
            }
            None => {
                let mut current = Some(scope);
                while let Some(id) = current {
                    self.bundle.scopes[id].accessed_globals.insert(name.to_string());
                    current = self.bundle.scopes[id].parent;
                }
                self.bundle.modules[self.module].global_names.insert(name.to_string());
            }
        }
    }

    fn collect_specifier_exports(&mut self, program: NodeId) {
        let NodeKind::Program(Program { body }) = self.bundle.nodes[program].kind.clone() else {
            return;
        };
        for stmt in body {
            let NodeKind::ExportNamedDeclaration(export) = &self.bundle.nodes[stmt].kind else {
                continue;
            };
            let resolved: Vec<(String, Option<VariableId>)> = export
                .specifiers
                .iter()
                .map(|spec| (spec.exported.clone(), self.bundle.identifier_variable(spec.local)))
                .collect();
            for (exported, var) in resolved {
                match var {
                    Some(var) => {
                        self.bundle.modules[self.module].exports.insert(exported, var);
                    }
                    None => debug!("Export {exported} refers to an undeclared binding"),
                }
            }
        }
    }
}

impl Bundle {
    /// Binding identifiers introduced by a declaration or pattern.
    pub fn declared_identifiers(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_declared(node, &mut out);
        out
    }

    fn collect_declared(&self, node: NodeId, out: &mut Vec<NodeId>) {
        match &self.nodes[node].kind {
            NodeKind::Identifier(Identifier {
                role: IdentifierRole::Declaration,
                ..
            }) => out.push(node),
            NodeKind::VariableDeclaration(decl) => {
                for &declarator in &decl.declarations {
                    self.collect_declared(declarator, out);
                }
            }
            NodeKind::VariableDeclarator(decl) => self.collect_declared(decl.id, out),
            NodeKind::FunctionDeclaration(Function { id: Some(id), .. })
            | NodeKind::ClassDeclaration(Class { id: Some(id), .. }) => out.push(*id),
            NodeKind::ObjectPattern(ObjectPattern { properties }) => {
                for &property in properties {
                    match &self.nodes[property].kind {
                        NodeKind::Property(prop) => self.collect_declared(prop.value, out),
                        _ => self.collect_declared(property, out),
                    }
                }
            }
            NodeKind::ArrayPattern(ArrayPattern { elements }) => {
                for &element in elements.iter().flatten() {
                    self.collect_declared(element, out);
                }
            }
            NodeKind::AssignmentPattern(pattern) => self.collect_declared(pattern.left, out),
            NodeKind::RestElement(rest) => self.collect_declared(rest.argument, out),
            _ => {}
        }
    }

    fn mark_pattern_declarations_reached(&self, pattern: NodeId) {
        for ident in self.declared_identifiers(pattern) {
            if let Some(var) = self.identifier_variable(ident) {
                self.variables[var].mark_declaration_reached();
            }
        }
    }
}
