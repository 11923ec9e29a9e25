//! Arena-allocated AST shared by every module of one bundling run.
//!
//! Nodes own their children by handle (the tree is never a graph); identifiers
//! refer to Variables by handle without owning them. Only the inclusion and
//! deoptimization latches change after binding.

pub mod builder;
mod kinds;

pub use builder::AstBuilder;
pub use kinds::*;

use crate::config::TreeshakeOptions;
use crate::latch::Latch;
use crate::scope::{Scope, ScopeId, Variable, VariableId};
use crate::span::Span;
use id_arena::{Arena, Id};
use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;

pub type NodeId = Id<Node>;
pub type ModuleId = Id<Module>;

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub(crate) included: Latch,
    /// Set once the node's deoptimizations (escaping arguments, reassigned
    /// targets, ...) have been applied to the Variables it touches.
    pub(crate) deoptimized: Latch,
}

impl Node {
    pub fn is_included(&self) -> bool {
        self.included.is_set()
    }
}

/// One source module: its text, its Program node and its export table.
#[derive(Debug)]
pub struct Module {
    pub id: String,
    pub source: String,
    pub program: NodeId,
    pub is_entry: bool,
    pub(crate) scope: Option<ScopeId>,
    /// Exported name -> local Variable, in declaration order.
    pub(crate) exports: IndexMap<String, VariableId>,
    /// Globals read by this module; never used as rendered names.
    pub(crate) global_names: indexmap::IndexSet<String>,
}

impl Module {
    pub fn exports(&self) -> impl Iterator<Item = (&str, VariableId)> {
        self.exports.iter().map(|(name, var)| (name.as_str(), *var))
    }

    pub fn export(&self, name: &str) -> Option<VariableId> {
        self.exports.get(name).copied()
    }
}

/// Every node, scope and Variable of one bundling run.
///
/// A `Bundle` is created fresh per run and dropped at its end; inclusion and
/// deoptimization state therefore always starts out unset. The interior
/// mutability used by the latches makes it `!Sync`, so runs cannot share one.
#[derive(Debug)]
pub struct Bundle {
    pub(crate) nodes: Arena<Node>,
    pub(crate) variables: Arena<Variable>,
    pub(crate) scopes: Arena<Scope>,
    pub(crate) modules: Arena<Module>,
    pub(crate) module_ids: HashMap<String, ModuleId>,
    pub(crate) options: TreeshakeOptions,
    pub(crate) bound: bool,
    pub(crate) shaken: Latch,
}

impl Bundle {
    pub fn new(options: TreeshakeOptions) -> Self {
        Bundle {
            nodes: Arena::new(),
            variables: Arena::new(),
            scopes: Arena::new(),
            modules: Arena::new(),
            module_ids: HashMap::default(),
            options,
            bound: false,
            shaken: Latch::new(),
        }
    }

    pub fn options(&self) -> &TreeshakeOptions {
        &self.options
    }

    /// Allocates a node and links its already-allocated children to it.
    pub fn alloc_node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let children = kind.children();
        let id = self.nodes.alloc(Node {
            kind,
            span,
            parent: None,
            included: Latch::new(),
            deoptimized: Latch::new(),
        });
        for child in children {
            self.nodes[child].parent = Some(id);
        }
        id
    }

    /// Registers a parsed module. Modules render in registration order, which
    /// the caller is expected to make the execution order.
    pub fn add_module(
        &mut self,
        id: impl Into<String>,
        source: impl Into<String>,
        program: NodeId,
        is_entry: bool,
    ) -> ModuleId {
        let id = id.into();
        let module_id = self.modules.alloc(Module {
            id: id.clone(),
            source: source.into(),
            program,
            is_entry,
            scope: None,
            exports: IndexMap::new(),
            global_names: indexmap::IndexSet::new(),
        });
        self.module_ids.insert(id, module_id);
        module_id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span
    }

    pub fn is_included(&self, id: NodeId) -> bool {
        self.nodes[id].included.is_set()
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    pub fn module_by_name(&self, name: &str) -> Option<ModuleId> {
        self.module_ids.get(name).copied()
    }

    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_shaken(&self) -> bool {
        self.shaken.is_set()
    }

    /// The Variable an identifier node resolved to, following import links.
    pub fn identifier_variable(&self, id: NodeId) -> Option<VariableId> {
        match &self.nodes[id].kind {
            NodeKind::Identifier(ident) => ident.variable.map(|var| self.resolve_origin(var)),
            _ => None,
        }
    }

    /// Follows import bindings to the Variable that owns the value.
    pub fn resolve_origin(&self, mut var: VariableId) -> VariableId {
        // cyclic re-exports end at whichever binding closes the cycle
        for _ in 0..self.variables.len() {
            match self.variables[var].origin {
                Some(origin) => var = origin,
                None => break,
            }
        }
        var
    }

    /// Finds a top-level variable of `module` by its source name.
    pub fn top_level_variable(&self, module: ModuleId, name: &str) -> Option<VariableId> {
        let scope = self.modules[module].scope?;
        self.scopes[scope].variables.get(name).copied()
    }

    pub(crate) fn source_of(&self, module: ModuleId) -> &str {
        &self.modules[module].source
    }
}
