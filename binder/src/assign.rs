//! The binder: assigns a parsed argument to the matching member of a target.

use std::rc::Rc;

use argbind_core::{
    ArgumentKind, MemberDecl, ObjectRef, ParsedArgument, TypeNotFound, TypeRegistry, Value,
};
use tracing::debug;

use crate::config::BinderConfig;
use crate::convert::{Assignment, ConversionInput, ConversionTable};
use crate::error::{BindContext, BindingError};
use crate::factory::{self, FactoryRef, LookupFailure};
use crate::member::{base_type_name, resolve_member};
use crate::slot::{self, SlotError};

/// Binds parsed arguments into target objects and materializes groups.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
///
/// use argbind::Binder;
/// use argbind_core::*;
///
/// let mut registry = TypeRegistry::new();
/// registry.declare(TypeDecl::class("Options").with_member(MemberDecl::new(
///     "counts",
///     DeclaredType::Array { element: ValueKind::Int, boxed: false },
/// )));
/// let binder = Binder::new(Rc::new(registry));
/// let options = binder.registry().default_instance("Options").unwrap();
///
/// for n in [3, 7, 2] {
///     binder.bind(&CmdLineArg::new("counts").multiple().with_value(n), &options).unwrap();
/// }
/// assert_eq!(
///     options.get("counts"),
///     Some(Value::Array(vec![Value::Int(3), Value::Int(7), Value::Int(2)]))
/// );
/// ```
pub struct Binder {
    registry: Rc<TypeRegistry>,
    config: BinderConfig,
    conversions: &'static ConversionTable,
}

impl Binder {
    /// Creates a binder with the default configuration.
    pub fn new(registry: Rc<TypeRegistry>) -> Self {
        Self::with_config(registry, BinderConfig::default())
    }

    pub fn with_config(registry: Rc<TypeRegistry>, config: BinderConfig) -> Self {
        Self {
            registry,
            config,
            conversions: ConversionTable::global(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Assigns `arg` to the member of `target` it names.
    ///
    /// Does nothing when the argument names no member or its first value is
    /// missing or `null`.
    /// Arguments with a factory reference (other than groups) are assigned
    /// through the factory; everything else goes through the conversion
    /// table for the member's declared type.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingError`] naming the expected type, member and target
    /// type when the member cannot be found, the value cannot be converted,
    /// the factory cannot be resolved or fails, or the member is read-only.
    pub fn bind(&self, arg: &dyn ParsedArgument, target: &ObjectRef) -> Result<(), BindingError> {
        let Some(variable) = arg.variable() else {
            return Ok(());
        };
        let Some(first) = arg.value(0).filter(|v| !v.is_null()) else {
            return Ok(());
        };

        let target_type = target.type_name();
        let mut context = BindContext::new(first.type_name(), variable, &target_type);
        let member = match resolve_member(&self.registry, &target_type, variable) {
            Ok(Some(found)) => found.decl,
            Ok(None) => return Err(BindingError::MemberNotFound { context }),
            Err(TypeNotFound(type_name)) => {
                return Err(BindingError::TypeNotFound { type_name, context });
            }
        };
        context.expected = member.ty.type_name();

        match arg.factory_function() {
            Some(reference) if arg.kind() != ArgumentKind::Group => {
                debug!(member = variable, factory = reference, "factory assignment");
                self.assign_with_factory(arg, target, member, FactoryRef::parse(reference), context)
            }
            _ => {
                debug!(member = variable, shape = ?member.ty.shape(), "standard assignment");
                self.assign_standard(arg, target, member, context)
            }
        }
    }

    fn assign_standard(
        &self,
        arg: &dyn ParsedArgument,
        target: &ObjectRef,
        member: &MemberDecl,
        context: BindContext,
    ) -> Result<(), BindingError> {
        let conversion = self.conversions.lookup(member.ty.shape());
        let input = ConversionInput {
            arg,
            declared: &member.ty,
            registry: &self.registry,
            widening: self.config.numeric_widening,
        };
        let assignment = match conversion(&input) {
            Ok(assignment) => assignment,
            Err(source) => return Err(BindingError::Conversion { context, source }),
        };

        let written = match assignment {
            Assignment::Replace(value) => slot::write(target, member, value),
            Assignment::Elements(items) if arg.is_multiple() => {
                slot::grow_array(target, member, items)
            }
            Assignment::Elements(items) => slot::write(target, member, Value::Array(items)),
            Assignment::Append(items) => slot::ensure_list(target, member).map(|list| {
                for item in items {
                    list.push(item);
                }
            }),
        };
        written.map_err(|e| slot_error(e, context))
    }

    fn assign_with_factory(
        &self,
        arg: &dyn ParsedArgument,
        target: &ObjectRef,
        member: &MemberDecl,
        reference: FactoryRef<'_>,
        context: BindContext,
    ) -> Result<(), BindingError> {
        let Some(first) = arg.value(0).filter(|v| !v.is_null()) else {
            return Ok(());
        };
        let base = base_type_name(&member.ty, arg.instance_type());
        let owner = reference.owner_or(&base);
        let param = first.type_name();
        let params = [param.as_str()];
        let signature = factory::signature(&base, owner, reference.function, &params);

        let found = match factory::lookup(&self.registry, owner, reference.function, &params) {
            Ok(found) => found,
            Err(LookupFailure::TypeNotFound(TypeNotFound(type_name))) => {
                return Err(BindingError::TypeNotFound { type_name, context });
            }
            Err(LookupFailure::NotFound) => {
                return Err(BindingError::FactoryNotFound { signature, context });
            }
            Err(LookupFailure::Inaccessible) => {
                return Err(BindingError::FactoryInaccessible { signature, context });
            }
        };
        let produce = |value: &Value| {
            found
                .invoke(std::slice::from_ref(value))
                .map_err(|source| BindingError::FactoryFailed {
                    signature: signature.clone(),
                    context: context.clone(),
                    source,
                })
        };
        let widening = self.config.numeric_widening;

        if !arg.is_multiple() {
            let produced = produce(first)?;
            let produced = self
                .registry
                .conform(produced, &member.ty, widening)
                .map_err(|source| BindingError::Conversion {
                    context: context.clone(),
                    source,
                })?;
            return slot::write(target, member, produced).map_err(|e| slot_error(e, context));
        }

        if let Some(component) = member.ty.component() {
            for value in arg.values() {
                let produced = self
                    .registry
                    .conform(produce(value)?, &component, widening)
                    .map_err(|source| BindingError::Conversion {
                        context: context.clone(),
                        source,
                    })?;
                slot::grow_array(target, member, vec![produced])
                    .map_err(|e| slot_error(e, context.clone()))?;
            }
            Ok(())
        } else if member.ty.is_list() {
            let list = slot::ensure_list(target, member).map_err(|e| slot_error(e, context.clone()))?;
            for value in arg.values() {
                list.push(produce(value)?);
            }
            Ok(())
        } else {
            Err(BindingError::Incompatible {
                reason: "multiple values need an array or list member".to_string(),
                context,
            })
        }
    }
}

fn slot_error(error: SlotError, context: BindContext) -> BindingError {
    match error {
        SlotError::ReadOnly => BindingError::ReadOnly { context },
        other => BindingError::Incompatible {
            reason: other.reason(),
            context,
        },
    }
}
