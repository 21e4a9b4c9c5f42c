//! Value model, type registry and parsed-argument abstraction for runtime
//! field binding.
//!
//! This crate defines everything the binding engine (the `argbind` crate)
//! operates on:
//!
//! - [`Value`] - closed set of runtime values, including shared
//!   [`ObjectRef`] instances and [`ListRef`] collections.
//! - [`DeclaredType`] - static type of a member, reduced to a hashable
//!   [`Shape`] for dispatch.
//! - [`TypeRegistry`] - name-based type resolution with constructors and
//!   registered [`Factory`] functions.
//! - [`ParsedArgument`] - what a command-line parser hands over per option,
//!   with [`CmdLineArg`] as the concrete implementation.
//! - [`Equation`] and [`DateFormat`] - domain value types.
//!
//! Validation ([`validate_registry`], [`validate_catalog`]) catches structural
//! errors such as inheritance cycles and references to unknown types.
//!
//! # Example
//!
//! ```
//! use argbind_core::*;
//!
//! let mut registry = TypeRegistry::new();
//! registry.declare(TypeDecl::enumeration("Color", &["RED", "GREEN", "BLUE"]));
//! registry.declare(
//!     TypeDecl::class("Options")
//!         .with_member(MemberDecl::new("tag", DeclaredType::Enum("Color".into())))
//!         .with_member(MemberDecl::new(
//!             "counts",
//!             DeclaredType::Array { element: ValueKind::Int, boxed: false },
//!         )),
//! );
//! assert!(validate_registry(&registry).is_empty());
//!
//! let options = registry.default_instance("Options").unwrap();
//! assert_eq!(options.get("counts"), Some(Value::Null));
//!
//! let arg = CmdLineArg::new("tag").with_value("RED");
//! let colors = registry.load_type("Color").unwrap().enum_constants().unwrap();
//! assert_eq!(arg.as_enum(0, &colors).unwrap().name, "RED");
//! ```

mod argument;
mod catalog;
mod date_format;
mod equation;
mod error;
mod registry;
mod types;
mod validate;
mod value;

pub use argument::{ArgumentKind, CmdLineArg, ParsedArgument, resolve_enum};
pub use catalog::TypeCatalog;
pub use date_format::{DateFormat, DateFormatError};
pub use equation::{Equation, EquationError};
pub use error::{ConversionError, FactoryFault, TypeNotFound};
pub use registry::{
    Access, Ancestry, Constructor, Factory, FactoryFn, TypeDescriptor, TypeRegistry,
};
pub use types::{DeclaredType, MemberDecl, Shape, TypeDecl, TypeKind};
pub use validate::{ValidationError, validate_catalog, validate_registry};
pub use value::{EnumConstant, ListRef, Object, ObjectRef, Value, ValueKind};
