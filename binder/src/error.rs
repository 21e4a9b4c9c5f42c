//! Error types for binding and group instantiation.
//!
//! Every failure is normalized into one of two caller-facing kinds:
//! [`BindingError`] while assigning an argument to a member, and
//! [`InstantiationError`] while materializing a group instance. Both carry
//! the member name and target type; lower-level causes are kept as the
//! error source.

use std::fmt;

use argbind_core::{ConversionError, FactoryFault};
use thiserror::Error;

/// Location of a binding failure: the expected type (or factory signature),
/// the member name and the target type.
///
/// # Examples
///
/// ```
/// use argbind::BindContext;
///
/// let context = BindContext::new("int[]", "counts", "Options");
/// assert_eq!(context.to_string(), "expected: int[] counts on Options");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindContext {
    pub expected: String,
    pub member: String,
    pub target: String,
}

impl BindContext {
    pub fn new(expected: impl Into<String>, member: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            member: member.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for BindContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected: {} {} on {}", self.expected, self.member, self.target)
    }
}

/// Errors raised by [`Binder::bind`](crate::Binder::bind).
#[derive(Debug, Error)]
pub enum BindingError {
    /// No member of that name on the target type or any ancestor.
    #[error("member not found ({context})")]
    MemberNotFound { context: BindContext },

    /// A type on the lookup path or named by a factory reference is not registered.
    #[error("type not found: {type_name} ({context})")]
    TypeNotFound { type_name: String, context: BindContext },

    /// The argument's value(s) cannot be converted to the member type.
    #[error("cannot convert value ({context}): {source}")]
    Conversion {
        context: BindContext,
        #[source]
        source: ConversionError,
    },

    /// The member rejects writes.
    #[error("member is read-only ({context})")]
    ReadOnly { context: BindContext },

    /// The member's shape or current value cannot take this argument.
    #[error("{reason} ({context})")]
    Incompatible { reason: String, context: BindContext },

    /// No factory with the required name and parameter list.
    #[error("no factory {signature} ({context})")]
    FactoryNotFound { signature: String, context: BindContext },

    /// The factory exists but is private.
    #[error("factory {signature} is not accessible ({context})")]
    FactoryInaccessible { signature: String, context: BindContext },

    /// The factory raised a fault.
    #[error("factory {signature} failed ({context}): {source}")]
    FactoryFailed {
        signature: String,
        context: BindContext,
        #[source]
        source: FactoryFault,
    },
}

impl BindingError {
    /// Location of the failure.
    pub fn context(&self) -> &BindContext {
        match self {
            BindingError::MemberNotFound { context }
            | BindingError::TypeNotFound { context, .. }
            | BindingError::Conversion { context, .. }
            | BindingError::ReadOnly { context }
            | BindingError::Incompatible { context, .. }
            | BindingError::FactoryNotFound { context, .. }
            | BindingError::FactoryInaccessible { context, .. }
            | BindingError::FactoryFailed { context, .. } => context,
        }
    }
}

/// Location of an instantiation failure: the group's member and the target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupContext {
    pub member: String,
    pub target: String,
}

impl GroupContext {
    pub fn new(member: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for GroupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.member, self.target)
    }
}

/// Errors raised by [`Binder::instantiate_group`](crate::Binder::instantiate_group).
#[derive(Debug, Error)]
pub enum InstantiationError {
    #[error("member not found ({context})")]
    MemberNotFound { context: GroupContext },

    #[error("type not found: {type_name} ({context})")]
    TypeNotFound { type_name: String, context: GroupContext },

    /// The base type is abstract or an enum and no constructor is registered.
    #[error("{type_name} has no zero-argument constructor ({context})")]
    NoConstructor { type_name: String, context: GroupContext },

    #[error("constructor of {type_name} failed ({context}): {source}")]
    ConstructorFailed {
        type_name: String,
        context: GroupContext,
        #[source]
        source: FactoryFault,
    },

    #[error("no factory {signature} ({context})")]
    FactoryNotFound { signature: String, context: GroupContext },

    #[error("factory {signature} is not accessible ({context})")]
    FactoryInaccessible { signature: String, context: GroupContext },

    #[error("factory {signature} failed ({context}): {source}")]
    FactoryFailed {
        signature: String,
        context: GroupContext,
        #[source]
        source: FactoryFault,
    },

    /// The member already holds an instance of a different type.
    #[error("{existing} can not be reassigned to {expected} ({context})")]
    ReuseMismatch {
        existing: String,
        expected: String,
        context: GroupContext,
    },

    /// The enum seed did not resolve and the policy is strict.
    #[error("cannot resolve factory seed ({context}): {source}")]
    SeedResolution {
        context: GroupContext,
        #[source]
        source: ConversionError,
    },

    /// The member's shape or type cannot hold the instance.
    #[error("{reason} ({context})")]
    Incompatible { reason: String, context: GroupContext },

    #[error("member is read-only ({context})")]
    ReadOnly { context: GroupContext },
}

impl InstantiationError {
    /// Location of the failure.
    pub fn context(&self) -> &GroupContext {
        match self {
            InstantiationError::MemberNotFound { context }
            | InstantiationError::TypeNotFound { context, .. }
            | InstantiationError::NoConstructor { context, .. }
            | InstantiationError::ConstructorFailed { context, .. }
            | InstantiationError::FactoryNotFound { context, .. }
            | InstantiationError::FactoryInaccessible { context, .. }
            | InstantiationError::FactoryFailed { context, .. }
            | InstantiationError::ReuseMismatch { context, .. }
            | InstantiationError::SeedResolution { context, .. }
            | InstantiationError::Incompatible { context, .. }
            | InstantiationError::ReadOnly { context } => context,
        }
    }
}
