//! Per-query and per-run state threaded through the node protocols.

use crate::ast::NodeId;
use crate::path_tracker::{ObjectPath, PathKey};
use crate::scope::VariableId;
use rustc_hash::FxHashSet as HashSet;
use std::collections::VecDeque;

/// State for one side-effect query.
///
/// Created fresh by the caller of each top-level query; it only guards
/// recursion and never outlives the query.
#[derive(Debug, Default)]
pub struct HasEffectsContext {
    /// Functions whose bodies are currently being checked as "called".
    called: HashSet<NodeId>,
    /// Variable/path pairs whose initializers are currently being inspected.
    accessed: HashSet<(VariableId, ObjectPath)>,
    assigned: HashSet<(VariableId, ObjectPath)>,
    variable_calls: HashSet<(VariableId, ObjectPath)>,
    /// Inside a function body checked for a call, `return` is not an effect.
    pub(crate) ignore_return: bool,
}

impl HasEffectsContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `function` as checked for this query. Returns `false` if it
    /// already was, in which case a repeated call contributes no new effects.
    pub(crate) fn enter_call(&mut self, function: NodeId) -> bool {
        self.called.insert(function)
    }

    pub(crate) fn enter_variable_call(&mut self, var: VariableId, path: &[PathKey]) -> bool {
        self.variable_calls.insert((var, path.to_vec()))
    }

    pub(crate) fn enter_access(&mut self, var: VariableId, path: &[PathKey]) -> bool {
        self.accessed.insert((var, path.to_vec()))
    }

    pub(crate) fn enter_assignment(&mut self, var: VariableId, path: &[PathKey]) -> bool {
        self.assigned.insert((var, path.to_vec()))
    }
}

/// Whether `include` should pull in every child regardless of effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeChildren {
    /// Children are included only if they are needed.
    Needed,
    /// The whole subtree is included.
    All,
}

impl IncludeChildren {
    pub fn is_all(self) -> bool {
        self == IncludeChildren::All
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Work {
    /// A Variable became included; its declarations must follow.
    Variable(VariableId),
    /// A subtree whose root was newly marked by an ancestor walk.
    Node(NodeId),
}

/// State for one tree-shaking run: the worklist and progress counters.
#[derive(Debug, Default)]
pub struct InclusionContext {
    worklist: VecDeque<Work>,
    /// Latch transitions (nodes and variables) since the counter was reset.
    changes: usize,
    pub(crate) included_nodes: usize,
    pub(crate) included_variables: usize,
}

impl InclusionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn queue(&mut self, work: Work) {
        self.worklist.push_back(work);
    }

    pub(crate) fn next(&mut self) -> Option<Work> {
        self.worklist.pop_front()
    }

    pub(crate) fn node_included(&mut self) {
        self.changes += 1;
        self.included_nodes += 1;
    }

    pub(crate) fn variable_included(&mut self) {
        self.changes += 1;
        self.included_variables += 1;
    }

    /// Returns the number of transitions since the last call and resets it.
    pub(crate) fn take_changes(&mut self) -> usize {
        std::mem::take(&mut self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_changes_resets() {
        let mut ctx = InclusionContext::new();
        ctx.node_included();
        ctx.variable_included();
        assert_eq!(ctx.take_changes(), 2);
        assert_eq!(ctx.take_changes(), 0);
        assert_eq!(ctx.included_nodes, 1);
    }

    #[test]
    fn test_include_children_flag() {
        assert!(IncludeChildren::All.is_all());
        assert!(!IncludeChildren::Needed.is_all());
    }
}
