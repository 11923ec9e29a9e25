//! Destructuring patterns in declarations and assignments.

use crate::ast::*;
use crate::context::HasEffectsContext;
use crate::path_tracker::PathKey;

impl Bundle {
    /// The value a pattern destructures and the path within it, when the
    /// pattern sits in a declaration or assignment with a known right side.
    fn destructuring_source(&self, node: NodeId) -> Option<(NodeId, Vec<PathKey>)> {
        let parent = self.nodes[node].parent?;
        match &self.nodes[parent].kind {
            NodeKind::VariableDeclarator(decl) if decl.id == node => decl.init.map(|init| (init, Vec::new())),
            NodeKind::AssignmentExpression(assignment) if assignment.left == node => {
                Some((assignment.right, Vec::new()))
            }
            NodeKind::AssignmentPattern(pattern) if pattern.left == node => self.destructuring_source(parent),
            NodeKind::Property(property) => {
                let (source, mut path) = self.destructuring_source(self.nodes[parent].parent?)?;
                path.push(self.property_path_key(&property.key));
                Some((source, path))
            }
            NodeKind::ArrayPattern(_) => {
                let (source, mut path) = self.destructuring_source(parent)?;
                path.push(PathKey::Unknown);
                Some((source, path))
            }
            _ => None,
        }
    }

    fn destructured_read_has_effects(
        &self,
        source: Option<&(NodeId, Vec<PathKey>)>,
        key: PathKey,
        ctx: &mut HasEffectsContext,
    ) -> bool {
        match source {
            Some((value, base)) => {
                let mut path = base.clone();
                path.push(key);
                self.has_effects_on_access_at_path(*value, &path, ctx)
            }
            None => self.options.property_read_side_effects,
        }
    }

    pub(crate) fn pattern_has_effects(&self, node: NodeId, ctx: &mut HasEffectsContext) -> bool {
        match &self.nodes[node].kind {
            NodeKind::ObjectPattern(ObjectPattern { properties }) => {
                let source = self.destructuring_source(node);
                properties.iter().any(|&property| match &self.nodes[property].kind {
                    NodeKind::Property(property) => {
                        matches!(property.key, PropertyKey::Computed(key) if self.has_effects(key, ctx))
                            || self.destructured_read_has_effects(
                                source.as_ref(),
                                self.property_path_key(&property.key),
                                ctx,
                            )
                            || self.has_effects(property.value, ctx)
                    }
                    NodeKind::RestElement(rest) => {
                        self.destructured_read_has_effects(source.as_ref(), PathKey::Unknown, ctx)
                            || self.has_effects(rest.argument, ctx)
                    }
                    _ => self.has_effects(property, ctx),
                })
            }
            NodeKind::ArrayPattern(ArrayPattern { elements }) => {
                // iterating anything but an array literal runs user code
                let iterates_literal = matches!(
                    self.destructuring_source(node),
                    Some((source, base))
                        if base.is_empty() && matches!(self.nodes[source].kind, NodeKind::ArrayExpression(_))
                );
                !iterates_literal || elements.iter().flatten().any(|&element| self.has_effects(element, ctx))
            }
            NodeKind::AssignmentPattern(pattern) => {
                self.has_effects(pattern.left, ctx) || self.has_effects(pattern.right, ctx)
            }
            NodeKind::RestElement(rest) => self.has_effects(rest.argument, ctx),
            _ => false,
        }
    }

    /// Reassigning a pattern reassigns every binding it declares.
    pub(crate) fn pattern_deoptimize_path(&self, node: NodeId, path: &[PathKey]) {
        if !path.is_empty() {
            return;
        }
        for ident in self.pattern_identifiers(node) {
            if let Some(var) = self.identifier_variable(ident) {
                self.deoptimize_variable_path(var, path);
            }
        }
    }

    /// Every identifier a pattern writes to, whatever its role.
    fn pattern_identifiers(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            match &self.nodes[current].kind {
                NodeKind::Identifier(_) => out.push(current),
                NodeKind::ObjectPattern(ObjectPattern { properties }) => {
                    for &property in properties {
                        match &self.nodes[property].kind {
                            NodeKind::Property(property) => stack.push(property.value),
                            _ => stack.push(property),
                        }
                    }
                }
                NodeKind::ArrayPattern(ArrayPattern { elements }) => stack.extend(elements.iter().flatten()),
                NodeKind::AssignmentPattern(pattern) => stack.push(pattern.left),
                NodeKind::RestElement(rest) => stack.push(rest.argument),
                _ => {}
            }
        }
        out
    }
}
