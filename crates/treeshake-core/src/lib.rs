pub mod ast;
pub mod config;
pub mod context;
pub mod deconflict;
pub mod error;
pub mod globals;
pub mod identifiers;
pub mod latch;
pub mod nodes;
pub mod path_tracker;
pub mod render;
pub mod scope;
pub mod span;
pub mod treeshake;

pub use ast::{AstBuilder, Bundle, Module, ModuleId, Node, NodeId, NodeKind};
pub use config::{ConfigError, GeneratedCodeOptions, OutputOptions, ShakeConfig, TreeshakeOptions};
pub use context::{HasEffectsContext, IncludeChildren, InclusionContext};
pub use error::{Result, ShakeError};
pub use path_tracker::{DeoptimizationTracker, ObjectPath, PathKey};
pub use render::{render_bundle, RenderedBundle, RenderedModule};
pub use scope::{Scope, ScopeId, ScopeKind, Variable, VariableId, VariableKind};
pub use span::Span;
pub use treeshake::{shake, ShakeStats, TreeShaker};
