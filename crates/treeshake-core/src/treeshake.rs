//! Fixed-point driver for inclusion.
//!
//! Every pass re-includes each module's program, which re-asks every
//! not-yet-included statement whether it now has effects, then drains the
//! worklist of variables and subtrees that became included. Inclusion and
//! deoptimization only ever grow, so the first pass that changes nothing is
//! final.

use crate::ast::{Bundle, ModuleId};
use crate::context::{IncludeChildren, InclusionContext, Work};
use crate::error::{Result, ShakeError};
use crate::path_tracker::UNKNOWN_PATH;
use serde::Serialize;
use tracing::{debug, info};

/// Summary of one tree-shaking run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShakeStats {
    /// Passes run, the final one that changed nothing included.
    pub passes: usize,
    pub included_nodes: usize,
    pub included_variables: usize,
    pub total_nodes: usize,
}

/// Drives one run over a bound bundle.
pub struct TreeShaker<'b> {
    bundle: &'b Bundle,
    ctx: InclusionContext,
    modules: Vec<ModuleId>,
}

impl<'b> TreeShaker<'b> {
    pub fn new(bundle: &'b Bundle) -> Self {
        TreeShaker {
            bundle,
            ctx: InclusionContext::new(),
            modules: bundle.modules().map(|(id, _)| id).collect(),
        }
    }

    pub fn run(mut self) -> Result<ShakeStats> {
        if !self.bundle.bound {
            return Err(ShakeError::Unbound);
        }
        if self.bundle.is_shaken() {
            debug!("Bundle already shaken; nothing to do");
            return Ok(self.stats(0));
        }

        let passes = if self.bundle.options.enabled {
            self.include_entry_exports();
            self.run_to_fixed_point()
        } else {
            self.include_everything()
        };

        self.bundle.shaken.set();
        let stats = self.stats(passes);
        info!(
            "Tree-shaking finished after {} passes: {}/{} nodes, {} variables included",
            stats.passes, stats.included_nodes, stats.total_nodes, stats.included_variables
        );
        Ok(stats)
    }

    /// Entry exports are observable from outside the bundle: they are kept,
    /// and whatever the host does with them is unknown.
    fn include_entry_exports(&mut self) {
        let bundle = self.bundle;
        for &module in &self.modules {
            let module = bundle.module(module);
            if !module.is_entry {
                continue;
            }
            for (name, var) in module.exports() {
                let var = bundle.resolve_origin(var);
                debug!("Including export {} of {}", name, module.id);
                bundle.deoptimize_variable_path(var, UNKNOWN_PATH);
                bundle.include_variable(var, &mut self.ctx);
            }
        }
    }

    fn run_to_fixed_point(&mut self) -> usize {
        let mut passes = 0;
        loop {
            passes += 1;
            for &module in &self.modules {
                self.bundle
                    .include(self.bundle.module(module).program, &mut self.ctx, IncludeChildren::Needed);
            }
            let drained = self.drain();
            let changes = self.ctx.take_changes();
            debug!(
                "Pass {}: {} work items, {} changes ({} nodes, {} variables included so far)",
                passes, drained, changes, self.ctx.included_nodes, self.ctx.included_variables
            );
            if changes == 0 {
                return passes;
            }
        }
    }

    fn include_everything(&mut self) -> usize {
        debug!("Tree-shaking disabled; including every statement");
        for &module in &self.modules {
            self.bundle
                .include(self.bundle.module(module).program, &mut self.ctx, IncludeChildren::All);
        }
        self.include_entry_exports();
        self.drain();
        self.ctx.take_changes();
        1
    }

    /// Processes queued work until none is left. Returns the items handled.
    fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Some(work) = self.ctx.next() {
            handled += 1;
            match work {
                Work::Variable(var) => self.bundle.include_variable_declarations(var, &mut self.ctx),
                Work::Node(node) => self.bundle.include(node, &mut self.ctx, IncludeChildren::Needed),
            }
        }
        handled
    }

    fn stats(&self, passes: usize) -> ShakeStats {
        let bundle = self.bundle;
        ShakeStats {
            passes,
            included_nodes: bundle.nodes.iter().filter(|(_, node)| node.is_included()).count(),
            included_variables: bundle.variables.iter().filter(|(_, var)| var.is_included()).count(),
            total_nodes: bundle.node_count(),
        }
    }
}

/// Runs tree-shaking over a bound bundle to its fixed point.
pub fn shake(bundle: &Bundle) -> Result<ShakeStats> {
    TreeShaker::new(bundle).run()
}

impl Bundle {
    pub fn shake(&self) -> Result<ShakeStats> {
        shake(self)
    }
}
