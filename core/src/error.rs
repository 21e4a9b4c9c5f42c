//! Error types shared by the value model and the type registry.
//!
//! These are the low-level failures the binding engine normalizes into its
//! own caller-facing errors: a type that cannot be resolved by name, a value
//! that cannot be converted to a declared type, and a fault raised by a
//! registered constructor or factory function.

use thiserror::Error;

/// A type name could not be resolved in the [`TypeRegistry`](crate::TypeRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type not found: {0}")]
pub struct TypeNotFound(pub String);

/// A value could not be converted to the requested shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value's runtime type is not assignable to the expected type.
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    /// A `null` was supplied where a primitive is required.
    #[error("null is not allowed for {0}")]
    NullNotAllowed(String),

    /// The argument carries no value at the requested position.
    #[error("no value at index {0}")]
    MissingValue(usize),

    /// No constant of the enum matches the supplied name.
    #[error("\"{value}\" is not a constant of {enum_type}; expected one of: {}", candidates.join(", "))]
    UnknownConstant {
        value: String,
        enum_type: String,
        candidates: Vec<String>,
    },

    /// More than one constant matches the supplied name case-insensitively.
    #[error("\"{value}\" is ambiguous for {enum_type}: matches {}", matches.join(", "))]
    AmbiguousConstant {
        value: String,
        enum_type: String,
        matches: Vec<String>,
    },

    /// The declared enum type is registered but is not an enum.
    #[error("{0} is not an enum type")]
    NotAnEnum(String),

    /// A type referenced by the declared type is not registered.
    #[error(transparent)]
    TypeNotFound(#[from] TypeNotFound),
}

/// Failure raised from inside a registered constructor or factory function.
///
/// # Examples
///
/// ```
/// use argbind_core::FactoryFault;
///
/// let fault = FactoryFault::new("port out of range");
/// assert_eq!(fault.to_string(), "port out of range");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FactoryFault(pub String);

impl FactoryFault {
    /// Creates a fault with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
