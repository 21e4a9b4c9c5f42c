//! Group instantiation: constructs, reuses or appends the object a group
//! argument binds into.

use argbind_core::{
    ArgumentKind, ConversionError, DeclaredType, EnumConstant, MemberDecl, ObjectRef,
    ParsedArgument, TypeNotFound, Value,
};
use tracing::{debug, warn};

use crate::assign::Binder;
use crate::config::EnumSeedPolicy;
use crate::convert::enum_constants;
use crate::error::{GroupContext, InstantiationError};
use crate::factory::{self, FactoryRef, LookupFailure};
use crate::member::{base_type_name, resolve_member};
use crate::slot::{self, SlotError};

impl Binder {
    /// Produces the instance a group argument binds into and stores it in
    /// the group's member of `target`.
    ///
    /// Multiple groups append a new instance to the member's array or list.
    /// A single group needs a member that is neither an array nor a list.
    /// A single reusable group returns the instance the member already holds
    /// when its type matches. Otherwise a new instance is created through
    /// the group's factory (seeded from `seed` when it was parsed) or the
    /// base type's constructor.
    ///
    /// Returns `Ok(None)` when the group names no member.
    ///
    /// # Errors
    ///
    /// Returns an [`InstantiationError`] when the member or a type cannot be
    /// resolved, construction fails, a reused instance has the wrong type,
    /// or the member cannot hold the instance.
    pub fn instantiate_group(
        &self,
        group: &dyn ParsedArgument,
        target: &ObjectRef,
        seed: Option<&dyn ParsedArgument>,
    ) -> Result<Option<Value>, InstantiationError> {
        let Some(variable) = group.variable() else {
            return Ok(None);
        };
        let target_type = target.type_name();
        let context = GroupContext::new(variable, &target_type);
        let member = match resolve_member(self.registry(), &target_type, variable) {
            Ok(Some(found)) => found.decl,
            Ok(None) => return Err(InstantiationError::MemberNotFound { context }),
            Err(TypeNotFound(type_name)) => {
                return Err(InstantiationError::TypeNotFound { type_name, context });
            }
        };
        let base = base_type_name(&member.ty, group.instance_type());

        if group.is_multiple() {
            return self.append_instance(group, target, member, &base, seed, context).map(Some);
        }

        if member.ty.component().is_some() || member.ty.is_list() {
            return Err(InstantiationError::Incompatible {
                reason: format!("single group needs a non-array, non-list member, found {}", member.ty),
                context,
            });
        }

        if group.is_reusable() {
            if let Some(existing) = target.get(&member.name).filter(|v| !v.is_null()) {
                let existing_type = existing.type_name();
                if existing_type != base {
                    return Err(InstantiationError::ReuseMismatch {
                        existing: existing_type,
                        expected: base,
                        context,
                    });
                }
                debug!(member = variable, type_name = %base, "reusing group instance");
                return Ok(Some(existing));
            }
        }

        let instance = self.construct(group, &base, seed, &context)?;
        let instance = self.fit(instance, &member.ty, &context)?;
        slot::write(target, member, instance.clone()).map_err(|e| slot_error(e, context))?;
        Ok(Some(instance))
    }

    fn append_instance(
        &self,
        group: &dyn ParsedArgument,
        target: &ObjectRef,
        member: &MemberDecl,
        base: &str,
        seed: Option<&dyn ParsedArgument>,
        context: GroupContext,
    ) -> Result<Value, InstantiationError> {
        if let Some(component) = member.ty.component() {
            let instance = self.construct(group, base, seed, &context)?;
            let instance = self.fit(instance, &component, &context)?;
            slot::grow_array(target, member, vec![instance.clone()])
                .map_err(|e| slot_error(e, context))?;
            return Ok(instance);
        }
        if member.ty.is_list() {
            let instance = self.construct(group, base, seed, &context)?;
            let list = slot::ensure_list(target, member).map_err(|e| slot_error(e, context))?;
            list.push(instance.clone());
            return Ok(instance);
        }
        Err(InstantiationError::Incompatible {
            reason: format!("multiple group needs an array or list member, found {}", member.ty),
            context,
        })
    }

    fn construct(
        &self,
        group: &dyn ParsedArgument,
        base: &str,
        seed: Option<&dyn ParsedArgument>,
        context: &GroupContext,
    ) -> Result<Value, InstantiationError> {
        let Some(reference) = group.factory_function() else {
            return self.construct_default(base, context);
        };

        let reference = FactoryRef::parse(reference);
        let owner = reference.owner_or(base);
        let seed = self.seed_value(seed, context)?;
        let params: &[&str] = if seed.is_some() { &["String"] } else { &[] };
        let signature = factory::signature(base, owner, reference.function, params);

        let found = match factory::lookup(self.registry(), owner, reference.function, params) {
            Ok(found) => found,
            Err(LookupFailure::TypeNotFound(TypeNotFound(type_name))) => {
                return Err(InstantiationError::TypeNotFound {
                    type_name,
                    context: context.clone(),
                });
            }
            Err(LookupFailure::NotFound) => {
                return Err(InstantiationError::FactoryNotFound {
                    signature,
                    context: context.clone(),
                });
            }
            Err(LookupFailure::Inaccessible) => {
                return Err(InstantiationError::FactoryInaccessible {
                    signature,
                    context: context.clone(),
                });
            }
        };

        debug!(member = %context.member, %signature, "constructing group through factory");
        let args: Vec<Value> = seed.into_iter().map(Value::Str).collect();
        found
            .invoke(&args)
            .map_err(|source| InstantiationError::FactoryFailed {
                signature,
                context: context.clone(),
                source,
            })
    }

    fn construct_default(&self, base: &str, context: &GroupContext) -> Result<Value, InstantiationError> {
        let descriptor = self
            .registry()
            .load_type(base)
            .map_err(|TypeNotFound(type_name)| InstantiationError::TypeNotFound {
                type_name,
                context: context.clone(),
            })?;
        debug!(member = %context.member, type_name = base, "constructing group");
        match descriptor.construct(self.registry()) {
            Some(Ok(instance)) => Ok(instance),
            Some(Err(source)) => Err(InstantiationError::ConstructorFailed {
                type_name: base.to_string(),
                context: context.clone(),
                source,
            }),
            None => Err(InstantiationError::NoConstructor {
                type_name: base.to_string(),
                context: context.clone(),
            }),
        }
    }

    /// Seed passed to a factory: `None` without a parsed seed argument, the
    /// resolved constant name for enum seeds, the first value's text
    /// otherwise.
    fn seed_value(
        &self,
        seed: Option<&dyn ParsedArgument>,
        context: &GroupContext,
    ) -> Result<Option<String>, InstantiationError> {
        let Some(seed) = seed.filter(|s| s.is_parsed()) else {
            return Ok(None);
        };
        let Some(raw) = seed.value(0) else {
            return Ok(None);
        };
        if seed.kind() != ArgumentKind::Enum {
            return Ok(Some(raw.to_string()));
        }

        match self.resolve_enum_seed(seed) {
            Ok(constant) => Ok(Some(constant.name)),
            Err(source) => match self.config().enum_seed_policy {
                EnumSeedPolicy::Fallback => {
                    warn!(member = %context.member, error = %source, "enum seed did not resolve, passing raw value");
                    Ok(Some(raw.to_string()))
                }
                EnumSeedPolicy::Strict => Err(InstantiationError::SeedResolution {
                    context: context.clone(),
                    source,
                }),
            },
        }
    }

    fn resolve_enum_seed(&self, seed: &dyn ParsedArgument) -> Result<EnumConstant, ConversionError> {
        let enum_type = seed
            .instance_type()
            .ok_or_else(|| TypeNotFound("<unspecified enum type>".to_string()))?;
        let constants = enum_constants(self.registry(), enum_type)?;
        seed.as_enum(0, &constants)
    }

    /// Checks that a constructed instance may be stored as `declared`.
    fn fit(&self, instance: Value, declared: &DeclaredType, context: &GroupContext) -> Result<Value, InstantiationError> {
        let widening = self.config().numeric_widening;
        self.registry()
            .conform(instance, declared, widening)
            .map_err(|source| InstantiationError::Incompatible {
                reason: source.to_string(),
                context: context.clone(),
            })
    }
}

fn slot_error(error: SlotError, context: GroupContext) -> InstantiationError {
    match error {
        SlotError::ReadOnly => InstantiationError::ReadOnly { context },
        other => InstantiationError::Incompatible {
            reason: other.reason(),
            context,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use argbind_core::{CmdLineArg, TypeDecl, TypeRegistry};

    use super::*;

    fn binder() -> Binder {
        let mut registry = TypeRegistry::new();
        registry.declare(TypeDecl::abstract_class("Shape"));
        registry.declare(
            TypeDecl::class("Canvas")
                .with_member(MemberDecl::new("shape", DeclaredType::Object("Shape".into())))
                .with_member(MemberDecl::new("label", DeclaredType::Value(argbind_core::ValueKind::Str))),
        );
        Binder::new(Rc::new(registry))
    }

    #[test]
    fn test_abstract_type_without_factory_has_no_constructor() {
        let binder = binder();
        let canvas = binder.registry().default_instance("Canvas").unwrap();
        let err = binder
            .instantiate_group(&CmdLineArg::group("shape"), &canvas, None)
            .unwrap_err();
        assert!(matches!(err, InstantiationError::NoConstructor { ref type_name, .. } if type_name == "Shape"));
    }

    #[test]
    fn test_multiple_group_into_scalar_member_is_incompatible() {
        let binder = binder();
        let canvas = binder.registry().default_instance("Canvas").unwrap();
        let err = binder
            .instantiate_group(&CmdLineArg::group("shape").multiple(), &canvas, None)
            .unwrap_err();
        assert!(matches!(err, InstantiationError::Incompatible { .. }));
        assert_eq!(canvas.get("shape"), Some(Value::Null));
    }

    #[test]
    fn test_unparsed_seed_is_ignored() {
        let binder = binder();
        let seed = CmdLineArg::new("label").with_value("x").parsed(false);
        let context = GroupContext::new("shape", "Canvas");
        assert_eq!(binder.seed_value(Some(&seed), &context).unwrap(), None);
    }

    #[test]
    fn test_non_text_seed_uses_display_form() {
        let binder = binder();
        let seed = CmdLineArg::new("size").with_value(12);
        let context = GroupContext::new("shape", "Canvas");
        assert_eq!(
            binder.seed_value(Some(&seed), &context).unwrap(),
            Some("12".to_string())
        );
    }
}
