//! Assigner seam and the pipeline that drives arguments through it.

use std::mem;

use argbind_core::{ObjectRef, ParsedArgument, Value};
use tracing::debug;

use crate::assign::Binder;
use crate::error::{BindingError, InstantiationError};

/// Binds arguments and materializes groups. [`Binder`] is the standard
/// implementation; callers may inject their own through
/// [`ArgumentPipeline::replace_assigner`].
pub trait VariableAssigner {
    /// Assigns `arg` to the member of `target` it names.
    fn assign(&self, arg: &dyn ParsedArgument, target: &ObjectRef) -> Result<(), BindingError>;

    /// Produces and stores the instance a group binds into.
    fn new_group_variable(
        &self,
        group: &dyn ParsedArgument,
        target: &ObjectRef,
        seed: Option<&dyn ParsedArgument>,
    ) -> Result<Option<Value>, InstantiationError>;
}

impl VariableAssigner for Binder {
    fn assign(&self, arg: &dyn ParsedArgument, target: &ObjectRef) -> Result<(), BindingError> {
        self.bind(arg, target)
    }

    fn new_group_variable(
        &self,
        group: &dyn ParsedArgument,
        target: &ObjectRef,
        seed: Option<&dyn ParsedArgument>,
    ) -> Result<Option<Value>, InstantiationError> {
        self.instantiate_group(group, target, seed)
    }
}

/// Drives parsed arguments into a target through an injected
/// [`VariableAssigner`].
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
///
/// use argbind::{ArgumentPipeline, Binder};
/// use argbind_core::*;
///
/// let mut registry = TypeRegistry::new();
/// registry.declare(TypeDecl::class("Options")
///     .with_member(MemberDecl::new("name", DeclaredType::Value(ValueKind::Str)))
///     .with_member(MemberDecl::new("level", DeclaredType::Value(ValueKind::Int))));
/// let registry = Rc::new(registry);
/// let pipeline = ArgumentPipeline::new(Binder::new(Rc::clone(&registry)));
/// let options = registry.default_instance("Options").unwrap();
///
/// let name = CmdLineArg::new("name").with_value("demo");
/// let level = CmdLineArg::new("level").with_value(3);
/// let applied = pipeline.apply([&name as &dyn ParsedArgument, &level], &options).unwrap();
///
/// assert_eq!(applied, 2);
/// assert_eq!(options.get("level"), Some(Value::Int(3)));
/// ```
pub struct ArgumentPipeline {
    assigner: Box<dyn VariableAssigner>,
}

impl ArgumentPipeline {
    pub fn new(assigner: impl VariableAssigner + 'static) -> Self {
        Self {
            assigner: Box::new(assigner),
        }
    }

    /// The current assigner.
    pub fn assigner(&self) -> &dyn VariableAssigner {
        self.assigner.as_ref()
    }

    /// Installs `assigner` and returns the one it replaces.
    pub fn replace_assigner(&mut self, assigner: Box<dyn VariableAssigner>) -> Box<dyn VariableAssigner> {
        mem::replace(&mut self.assigner, assigner)
    }

    /// Binds one argument; a missing argument or target is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates the assigner's [`BindingError`].
    pub fn bind(&self, arg: Option<&dyn ParsedArgument>, target: Option<&ObjectRef>) -> Result<(), BindingError> {
        match (arg, target) {
            (Some(arg), Some(target)) => self.assigner.assign(arg, target),
            _ => Ok(()),
        }
    }

    /// Instantiates one group; a missing group or target yields `None`.
    ///
    /// # Errors
    ///
    /// Propagates the assigner's [`InstantiationError`].
    pub fn instantiate_group(
        &self,
        group: Option<&dyn ParsedArgument>,
        target: Option<&ObjectRef>,
        seed: Option<&dyn ParsedArgument>,
    ) -> Result<Option<Value>, InstantiationError> {
        match (group, target) {
            (Some(group), Some(target)) => self.assigner.new_group_variable(group, target, seed),
            _ => Ok(None),
        }
    }

    /// Binds every argument in order, stopping at the first failure.
    /// Returns the number of arguments bound.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindingError`]; arguments before it stay bound.
    pub fn apply<'a>(
        &self,
        args: impl IntoIterator<Item = &'a dyn ParsedArgument>,
        target: &ObjectRef,
    ) -> Result<usize, BindingError> {
        let mut applied = 0;
        for arg in args {
            self.assigner.assign(arg, target)?;
            applied += 1;
        }
        debug!(applied, target = %target.type_name(), "applied arguments");
        Ok(applied)
    }

    /// Binds every argument, collecting all failures.
    pub fn apply_all<'a>(
        &self,
        args: impl IntoIterator<Item = &'a dyn ParsedArgument>,
        target: &ObjectRef,
    ) -> Vec<BindingError> {
        args.into_iter()
            .filter_map(|arg| self.assigner.assign(arg, target).err())
            .collect()
    }
}
