use super::CallOptions;
use crate::ast::*;
use crate::context::{HasEffectsContext, IncludeChildren, InclusionContext};
use crate::path_tracker::{PathKey, EMPTY_PATH};

impl Bundle {
    /// Defining a class evaluates its heritage, computed keys and static
    /// field initializers.
    pub(crate) fn class_has_effects(&self, class: &Class, ctx: &mut HasEffectsContext) -> bool {
        let effect = class.super_class.is_some_and(|super_class| self.has_effects(super_class, ctx))
            || class.body.iter().any(|&member| self.has_effects(member, ctx));
        if let Some(id) = class.id {
            self.mark_declaration_reached(id);
        }
        effect
    }

    pub(crate) fn class_member_has_effects(&self, member: &ClassMember, ctx: &mut HasEffectsContext) -> bool {
        if let PropertyKey::Computed(key) = member.key {
            if self.has_effects(key, ctx) {
                return true;
            }
        }
        member.is_static
            && member.kind == ClassMemberKind::Field
            && member.value.is_some_and(|value| self.has_effects(value, ctx))
    }

    /// The static member a key names, if it can be determined.
    fn class_static_member<'a>(&'a self, class: &Class, key: &PathKey) -> Option<&'a ClassMember> {
        let name = key.as_name()?;
        for &member in class.body.iter().rev() {
            let NodeKind::ClassMember(member) = &self.nodes[member].kind else {
                continue;
            };
            if !member.is_static {
                continue;
            }
            match self.property_path_key(&member.key) {
                PathKey::Named(member_name) if member_name == name => return Some(member),
                PathKey::Named(_) => {}
                PathKey::Unknown => return None,
            }
        }
        None
    }

    pub(crate) fn class_has_static_accessor(&self, class: &Class, key: &PathKey) -> bool {
        class.body.iter().any(|&member| {
            let NodeKind::ClassMember(member) = &self.nodes[member].kind else {
                return false;
            };
            member.is_static
                && matches!(member.kind, ClassMemberKind::Getter | ClassMemberKind::Setter)
                && match (self.property_path_key(&member.key), key) {
                    (PathKey::Named(member_name), PathKey::Named(name)) => member_name == *name,
                    _ => true,
                }
        })
    }

    pub(crate) fn class_has_effects_on_access(
        &self,
        class: &Class,
        path: &[PathKey],
        ctx: &mut HasEffectsContext,
    ) -> bool {
        let [key, rest @ ..] = path else {
            return false;
        };
        if self.class_has_static_accessor(class, key) {
            return true;
        }
        match self.class_static_member(class, key) {
            Some(member) => member
                .value
                .map_or(!rest.is_empty(), |value| self.has_effects_on_access_at_path(value, rest, ctx)),
            None => path.len() > 1 && self.options.property_read_side_effects,
        }
    }

    /// Instantiating a class runs its constructor and instance field
    /// initializers; a static path calls one of its static methods.
    pub(crate) fn class_has_effects_when_called(
        &self,
        node: NodeId,
        class: &Class,
        path: &[PathKey],
        call: CallOptions,
        ctx: &mut HasEffectsContext,
    ) -> bool {
        if let [key] = path {
            return match self.class_static_member(class, key) {
                Some(ClassMember {
                    kind: ClassMemberKind::Method,
                    value: Some(value),
                    ..
                }) => self.has_effects_when_called_at_path(*value, EMPTY_PATH, CallOptions::default(), ctx),
                _ => true,
            };
        }
        if !path.is_empty() || !call.is_new || class.super_class.is_some() {
            return true;
        }
        if !ctx.enter_call(node) {
            return false;
        }
        class.body.iter().any(|&member| {
            let NodeKind::ClassMember(member) = &self.nodes[member].kind else {
                return false;
            };
            match (member.kind, member.value) {
                (ClassMemberKind::Constructor, Some(constructor)) => {
                    self.has_effects_when_called_at_path(constructor, EMPTY_PATH, CallOptions::default(), ctx)
                }
                (ClassMemberKind::Field, Some(value)) if !member.is_static => self.has_effects(value, ctx),
                _ => false,
            }
        })
    }

    pub(crate) fn class_include(&self, class: &Class, ctx: &mut InclusionContext, children: IncludeChildren) {
        if let Some(id) = class.id {
            self.include(id, ctx, children);
            self.mark_declaration_reached(id);
        }
        if let Some(super_class) = class.super_class {
            self.include(super_class, ctx, children);
        }
        // members are part of the class value and always kept with it
        for &member in &class.body {
            self.include(member, ctx, children);
        }
    }
}
