//! Object literals, member access, calls, assignments and operators.

use super::CallOptions;
use crate::ast::*;
use crate::context::{HasEffectsContext, IncludeChildren, InclusionContext};
use crate::error::Result;
use crate::globals;
use crate::path_tracker::{PathKey, EMPTY_PATH, UNKNOWN_PATH};
use crate::render::{NodeRenderOptions, RenderOptions, SpliceBuffer};

/// Result of looking a key up among the properties of an object literal.
enum PropertyLookup<'a> {
    Found(&'a Property),
    Missing,
    /// A spread or a dynamic key may provide it.
    Unknown,
}

impl Bundle {
    /// The path key a property key denotes: static names and string or
    /// numeric literal keys are known, anything else is not.
    pub(crate) fn property_path_key(&self, key: &PropertyKey) -> PathKey {
        match key {
            PropertyKey::Static(name) => PathKey::named(name.as_str()),
            PropertyKey::Computed(node) => self.literal_key(*node),
        }
    }

    fn literal_key(&self, node: NodeId) -> PathKey {
        match &self.nodes[node].kind {
            NodeKind::Literal(Literal {
                value: LiteralValue::String(value),
            }) => PathKey::named(value.as_str()),
            NodeKind::Literal(Literal {
                value: LiteralValue::Number(value),
            }) if value.is_finite() && value.fract() == 0.0 => PathKey::named((*value as i64).to_string()),
            NodeKind::Literal(Literal {
                value: LiteralValue::Number(value),
            }) => PathKey::named(value.to_string()),
            _ => PathKey::Unknown,
        }
    }

    fn member_key(&self, member: &MemberExpression) -> PathKey {
        match &member.property {
            MemberProperty::Static(name) => PathKey::named(name.as_str()),
            MemberProperty::Computed(node) => self.literal_key(*node),
        }
    }

    /// `path` as seen from the member's object: its own key goes first.
    pub(crate) fn member_path(&self, member: &MemberExpression, path: &[PathKey]) -> Vec<PathKey> {
        let mut full = Vec::with_capacity(path.len() + 1);
        full.push(self.member_key(member));
        full.extend_from_slice(path);
        full
    }

    // ==================== Object literals ====================

    fn find_property<'a>(&'a self, object: &ObjectExpression, key: &PathKey) -> PropertyLookup<'a> {
        let PathKey::Named(name) = key else {
            return PropertyLookup::Unknown;
        };
        for &property in object.properties.iter().rev() {
            match &self.nodes[property].kind {
                NodeKind::Property(property) => match self.property_path_key(&property.key) {
                    PathKey::Named(property_name) if property_name == *name => {
                        return PropertyLookup::Found(property);
                    }
                    PathKey::Named(_) => {}
                    PathKey::Unknown => return PropertyLookup::Unknown,
                },
                _ => return PropertyLookup::Unknown,
            }
        }
        PropertyLookup::Missing
    }

    fn object_has_accessor(&self, object: &ObjectExpression, key: &PathKey, kind: PropertyKind) -> bool {
        object.properties.iter().any(|&property| match &self.nodes[property].kind {
            NodeKind::Property(property) if property.kind == kind => {
                match (self.property_path_key(&property.key), key) {
                    (PathKey::Named(property_name), PathKey::Named(name)) => property_name == *name,
                    _ => true,
                }
            }
            _ => false,
        })
    }

    pub(crate) fn object_has_effects_on_access(
        &self,
        object: &ObjectExpression,
        path: &[PathKey],
        ctx: &mut HasEffectsContext,
    ) -> bool {
        let [key, rest @ ..] = path else {
            return false;
        };
        if self.object_has_accessor(object, key, PropertyKind::Get) {
            return true;
        }
        match self.find_property(object, key) {
            PropertyLookup::Found(property) => self.has_effects_on_access_at_path(property.value, rest, ctx),
            // reading through `undefined` throws
            PropertyLookup::Missing => !rest.is_empty(),
            PropertyLookup::Unknown => !rest.is_empty() && self.options.property_read_side_effects,
        }
    }

    pub(crate) fn object_has_effects_on_assignment(
        &self,
        object: &ObjectExpression,
        path: &[PathKey],
        ctx: &mut HasEffectsContext,
    ) -> bool {
        let [key, rest @ ..] = path else {
            return true;
        };
        if self.object_has_accessor(object, key, PropertyKind::Set)
            || self.object_has_accessor(object, key, PropertyKind::Get)
        {
            return true;
        }
        if rest.is_empty() {
            return false;
        }
        match self.find_property(object, key) {
            PropertyLookup::Found(property) => self.has_effects_on_assignment_at_path(property.value, rest, ctx),
            PropertyLookup::Missing | PropertyLookup::Unknown => true,
        }
    }

    pub(crate) fn object_has_effects_when_called(
        &self,
        object: &ObjectExpression,
        path: &[PathKey],
        call: CallOptions,
        ctx: &mut HasEffectsContext,
    ) -> bool {
        let [key, rest @ ..] = path else {
            return true;
        };
        match self.find_property(object, key) {
            PropertyLookup::Found(property) if matches!(property.kind, PropertyKind::Init | PropertyKind::Method) => {
                self.has_effects_when_called_at_path(property.value, rest, call, ctx)
            }
            _ => true,
        }
    }

    pub(crate) fn object_deoptimize_path(&self, object: &ObjectExpression, path: &[PathKey]) {
        let [key, rest @ ..] = path else {
            return;
        };
        match self.find_property(object, key) {
            PropertyLookup::Found(property) => {
                if !rest.is_empty() {
                    self.deoptimize_path(property.value, rest);
                }
            }
            PropertyLookup::Missing => {}
            PropertyLookup::Unknown => {
                for &property in &object.properties {
                    match &self.nodes[property].kind {
                        NodeKind::Property(property) => self.deoptimize_path(property.value, UNKNOWN_PATH),
                        NodeKind::SpreadElement(spread) => self.deoptimize_path(spread.argument, UNKNOWN_PATH),
                        _ => {}
                    }
                }
            }
        }
    }

    pub(crate) fn property_has_effects(&self, property: &Property, ctx: &mut HasEffectsContext) -> bool {
        matches!(property.key, PropertyKey::Computed(key) if self.has_effects(key, ctx))
            || self.has_effects(property.value, ctx)
    }

    /// Spreading reads every property of its argument.
    pub(crate) fn spread_has_effects(&self, spread: &SpreadElement, ctx: &mut HasEffectsContext) -> bool {
        self.has_effects(spread.argument, ctx) || self.has_effects_on_access_at_path(spread.argument, UNKNOWN_PATH, ctx)
    }

    // ==================== Calls and member access ====================

    pub(crate) fn call_has_effects(&self, call: &CallExpression, ctx: &mut HasEffectsContext) -> bool {
        if call.arguments.iter().any(|&argument| self.has_effects(argument, ctx)) {
            return true;
        }
        if call.pure_annotation && self.options.annotations {
            return false;
        }
        self.has_effects(call.callee, ctx)
            || self.has_effects_when_called_at_path(
                call.callee,
                EMPTY_PATH,
                CallOptions { is_new: call.is_new },
                ctx,
            )
    }

    /// The callee may do anything with its arguments, and with the object a
    /// method is called on unless that method is an own property of a known
    /// object literal.
    pub(crate) fn call_apply_deoptimizations(&self, call: &CallExpression) {
        for &argument in &call.arguments {
            self.deoptimize_path(argument, UNKNOWN_PATH);
        }
        if let NodeKind::MemberExpression(member) = &self.nodes[call.callee].kind {
            if !self.is_own_method_call(member) {
                self.deoptimize_path(member.object, UNKNOWN_PATH);
            }
        }
    }

    fn is_own_method_call(&self, member: &MemberExpression) -> bool {
        let Some(var) = self.identifier_variable(member.object) else {
            return false;
        };
        let Some(init) = self.variables[var].init else {
            return false;
        };
        let NodeKind::ObjectExpression(object) = &self.nodes[init].kind else {
            return false;
        };
        matches!(
            self.find_property(object, &self.member_key(member)),
            PropertyLookup::Found(Property {
                kind: PropertyKind::Init | PropertyKind::Method,
                ..
            })
        )
    }

    pub(crate) fn member_has_effects(&self, member: &MemberExpression, ctx: &mut HasEffectsContext) -> bool {
        self.has_effects(member.object, ctx)
            || matches!(member.property, MemberProperty::Computed(key) if self.has_effects(key, ctx))
            || (self.options.property_read_side_effects
                && self.has_effects_on_access_at_path(member.object, &[self.member_key(member)], ctx))
    }

    // ==================== Operators ====================

    pub(crate) fn assignment_has_effects(
        &self,
        assignment: &AssignmentExpression,
        ctx: &mut HasEffectsContext,
    ) -> bool {
        if self.has_effects(assignment.right, ctx) {
            return true;
        }
        let compound = assignment.operator == AssignmentOperator::Compound;
        match &self.nodes[assignment.left].kind {
            NodeKind::Identifier(_) => {
                self.has_effects(assignment.left, ctx)
                    || self.has_effects_on_assignment_at_path(assignment.left, EMPTY_PATH, ctx)
            }
            NodeKind::MemberExpression(member) => {
                self.has_effects(member.object, ctx)
                    || matches!(member.property, MemberProperty::Computed(key) if self.has_effects(key, ctx))
                    || (compound && self.has_effects_on_access_at_path(member.object, &[self.member_key(member)], ctx))
                    || self.has_effects_on_assignment_at_path(assignment.left, EMPTY_PATH, ctx)
            }
            // destructuring assignment
            _ => true,
        }
    }

    /// The target is kept when writing to it matters; the value always is.
    pub(crate) fn assignment_include(
        &self,
        assignment: &AssignmentExpression,
        ctx: &mut InclusionContext,
        children: IncludeChildren,
    ) {
        let include_left = children.is_all()
            || assignment.operator == AssignmentOperator::Compound
            || self.is_included(assignment.left)
            || {
                let mut effects = HasEffectsContext::new();
                self.has_effects_on_assignment_at_path(assignment.left, EMPTY_PATH, &mut effects)
                    || self.has_effects(assignment.left, &mut effects)
            };
        if include_left {
            self.include(assignment.left, ctx, children);
        }
        self.include(assignment.right, ctx, children);
    }

    pub(crate) fn render_assignment(
        &self,
        assignment: &AssignmentExpression,
        code: &mut SpliceBuffer<'_>,
        options: &RenderOptions,
        node_options: NodeRenderOptions,
    ) -> Result<()> {
        if self.is_included(assignment.left) {
            self.render(assignment.left, code, options, NodeRenderOptions::default())?;
            return self.render(assignment.right, code, options, NodeRenderOptions::default());
        }
        code.remove(self.nodes[assignment.left].span.start, self.nodes[assignment.right].span.start)?;
        self.render(assignment.right, code, options, node_options)
    }

    pub(crate) fn unary_has_effects(&self, unary: &UnaryExpression, ctx: &mut HasEffectsContext) -> bool {
        let argument = &self.nodes[unary.argument].kind;
        match unary.operator {
            UnaryOperator::Typeof if matches!(argument, NodeKind::Identifier(Identifier { variable: None, .. })) => {
                false
            }
            UnaryOperator::Delete => {
                self.has_effects(unary.argument, ctx)
                    || matches!(argument, NodeKind::Identifier(_))
                    || self.has_effects_on_assignment_at_path(unary.argument, EMPTY_PATH, ctx)
            }
            _ => self.has_effects(unary.argument, ctx),
        }
    }

    /// `in` and `instanceof` throw unless the right operand is an object.
    pub(crate) fn relational_operand_may_throw(&self, right: NodeId) -> bool {
        let mut current = right;
        // bounded: initializers may refer to each other in a cycle
        for _ in 0..=self.variables.len() {
            match &self.nodes[current].kind {
                NodeKind::ObjectExpression(_)
                | NodeKind::ArrayExpression(_)
                | NodeKind::FunctionExpression(_)
                | NodeKind::ArrowFunctionExpression(_)
                | NodeKind::FunctionDeclaration(_)
                | NodeKind::ClassExpression(_)
                | NodeKind::ClassDeclaration(_) => return false,
                NodeKind::Identifier(ident) => {
                    let Some(var) = ident.variable.map(|var| self.resolve_origin(var)) else {
                        return !globals::is_known_global(&ident.name)
                            || matches!(ident.name.as_str(), "undefined" | "NaN" | "Infinity");
                    };
                    let variable = &self.variables[var];
                    match variable.init {
                        Some(init) if !variable.is_reassigned() => current = init,
                        _ => return true,
                    }
                }
                _ => return true,
            }
        }
        true
    }
}
