//! Turns the final inclusion state into edited source text.

pub mod helpers;
pub mod snippets;
pub mod splice;

pub use snippets::Snippets;
pub use splice::{MappedChunk, PositionMap, RenderedText, SpliceBuffer};

use crate::ast::{Bundle, ModuleId};
use crate::config::OutputOptions;
use crate::deconflict::deconflict_bundle;
use crate::error::{Result, ShakeError};
use crate::scope::VariableId;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub snippets: Snippets,
    /// Variables exported from entry modules, with every name they are
    /// exported under.
    pub export_names_by_variable: IndexMap<VariableId, Vec<String>>,
}

/// The syntactic position a node is rendered into, when that differs from
/// where it sits in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurroundingElement {
    ExpressionStatement,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeRenderOptions {
    pub rendered_surrounding_element: Option<SurroundingElement>,
    /// The identifier is the value of a shorthand property (`{ a }`).
    pub is_shorthand_property: bool,
}

impl NodeRenderOptions {
    pub fn statement() -> Self {
        NodeRenderOptions {
            rendered_surrounding_element: Some(SurroundingElement::ExpressionStatement),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedModule {
    pub id: String,
    pub code: String,
    /// Where this module's code starts in the bundle output.
    pub offset: u32,
    pub positions: PositionMap,
    pub edits: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedBundle {
    pub code: String,
    pub modules: Vec<RenderedModule>,
}

impl Bundle {
    /// Renders one module's included code.
    pub fn render_module(&self, module: ModuleId, options: &RenderOptions) -> Result<RenderedModule> {
        if !self.is_shaken() {
            return Err(ShakeError::RenderBeforeFixedPoint);
        }
        let mut code = SpliceBuffer::new(self.source_of(module));
        self.render(self.modules[module].program, &mut code, options, NodeRenderOptions::default())?;
        let edits = code.edit_count();
        let rendered = code.finish();
        debug!(
            "Rendered module {}: {} edits, {} bytes",
            self.modules[module].id,
            edits,
            rendered.code.len()
        );
        Ok(RenderedModule {
            id: self.modules[module].id.clone(),
            code: rendered.code,
            offset: 0,
            positions: rendered.positions,
            edits,
        })
    }

    /// Entry-module exports, keyed by the Variable that owns each value.
    pub fn export_names_by_variable(&self) -> IndexMap<VariableId, Vec<String>> {
        let mut names: IndexMap<VariableId, Vec<String>> = IndexMap::new();
        for (_, module) in self.modules.iter().filter(|(_, m)| m.is_entry) {
            for (name, var) in module.exports() {
                names
                    .entry(self.resolve_origin(var))
                    .or_default()
                    .push(name.to_string());
            }
        }
        names
    }
}

/// Deconflicts names and renders every module, in registration order, into
/// one output followed by the entry exports.
pub fn render_bundle(bundle: &Bundle, output: &OutputOptions) -> Result<RenderedBundle> {
    if !bundle.is_shaken() {
        return Err(ShakeError::RenderBeforeFixedPoint);
    }
    deconflict_bundle(bundle);
    let options = RenderOptions {
        snippets: Snippets::new(output),
        export_names_by_variable: bundle.export_names_by_variable(),
    };

    let mut code = String::new();
    let mut modules = Vec::new();
    for (id, _) in bundle.modules() {
        let mut rendered = bundle.render_module(id, &options)?;
        let trimmed_len = rendered.code.trim_end().len();
        rendered.code.truncate(trimmed_len);
        if !rendered.code.is_empty() {
            if !code.is_empty() {
                code.push_str("\n\n");
            }
            rendered.offset = code.len() as u32;
            code.push_str(&rendered.code);
        }
        modules.push(rendered);
    }

    let exports = render_entry_exports(bundle, &options);
    if !exports.is_empty() {
        if !code.is_empty() {
            code.push_str("\n\n");
        }
        code.push_str(&exports);
    }
    if !code.is_empty() {
        code.push('\n');
    }
    Ok(RenderedBundle { code, modules })
}

fn render_entry_exports(bundle: &Bundle, options: &RenderOptions) -> String {
    let space = options.snippets.space;
    let specifiers: Vec<String> = options
        .export_names_by_variable
        .iter()
        .flat_map(|(var, names)| {
            let local = bundle.variable(*var).rendered_name().to_string();
            names.iter().map(move |name| {
                if *name == local {
                    local.clone()
                } else {
                    format!("{local} as {name}")
                }
            })
        })
        .collect();
    if specifiers.is_empty() {
        return String::new();
    }
    format!(
        "export{space}{{{space}{}{space}}};",
        specifiers.join(&options.snippets.list_separator())
    )
}
