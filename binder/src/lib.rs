//! Runtime field binding for parsed command-line arguments.
//!
//! [`Binder`] takes a [`ParsedArgument`](argbind_core::ParsedArgument) and a
//! target [`ObjectRef`](argbind_core::ObjectRef), finds the member the
//! argument names (walking up the target's ancestors), converts the value(s)
//! to the member's declared type and writes them. Arrays grow and lists
//! accumulate across multiple-occurrence arguments; arguments may route
//! through a registered factory function instead of direct conversion.
//!
//! Group arguments are materialized with [`Binder::instantiate_group`]:
//! a constructor or factory call, optional reuse of an instance the member
//! already holds, or an extra slot in an array or list member.
//!
//! [`ArgumentPipeline`] holds the active [`VariableAssigner`] and applies
//! argument sequences to a target.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use argbind::{Binder, BindingError};
//! use argbind_core::*;
//!
//! let mut registry = TypeRegistry::new();
//! registry.declare(TypeDecl::enumeration("Color", &["RED", "GREEN", "BLUE"]));
//! registry.declare(TypeDecl::class("Widget"));
//! registry.declare(
//!     TypeDecl::class("Options")
//!         .with_member(MemberDecl::new("tag", DeclaredType::Enum("Color".into())))
//!         .with_member(MemberDecl::new("widget", DeclaredType::Object("Widget".into()))),
//! );
//! let binder = Binder::new(Rc::new(registry));
//! let options = binder.registry().default_instance("Options").unwrap();
//!
//! binder.bind(&CmdLineArg::new("tag").with_value("RED"), &options).unwrap();
//! assert_eq!(options.get("tag").unwrap().as_enum().unwrap().name, "RED");
//!
//! let err = binder.bind(&CmdLineArg::new("tag").with_value("PURPLE"), &options);
//! assert!(matches!(err, Err(BindingError::Conversion { .. })));
//!
//! let widget = binder
//!     .instantiate_group(&CmdLineArg::group("widget").reusable(false), &options, None)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(widget.type_name(), "Widget");
//! ```

mod assign;
mod config;
mod convert;
mod error;
mod factory;
mod instantiate;
mod member;
mod pipeline;
mod slot;

pub use assign::Binder;
pub use config::{BinderConfig, ConfigError, EnumSeedPolicy};
pub use convert::ConversionTable;
pub use error::{BindContext, BindingError, GroupContext, InstantiationError};
pub use factory::FactoryRef;
pub use member::{ResolvedMember, resolve_member};
pub use pipeline::{ArgumentPipeline, VariableAssigner};
