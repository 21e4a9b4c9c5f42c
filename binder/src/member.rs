//! Member lookup along the inheritance chain.

use std::collections::HashSet;

use argbind_core::{DeclaredType, MemberDecl, TypeNotFound, TypeRegistry};
use tracing::{debug, warn};

/// A member together with the type that declares it.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedMember<'r> {
    pub declaring_type: &'r str,
    pub decl: &'r MemberDecl,
}

/// Finds `member` on `type_name` or its nearest ancestor.
///
/// Returns `Ok(None)` when no type in the chain declares it. A type already
/// visited ends the walk, so a malformed hierarchy cannot loop.
///
/// # Errors
///
/// Returns [`TypeNotFound`] if `type_name` or an ancestor on the path is
/// not registered.
///
/// # Examples
///
/// ```
/// use argbind::resolve_member;
/// use argbind_core::*;
///
/// let mut registry = TypeRegistry::new();
/// registry.declare(TypeDecl::class("Base")
///     .with_member(MemberDecl::new("verbose", DeclaredType::Value(ValueKind::Bool))));
/// registry.declare(TypeDecl::class("Middle").extends("Base"));
/// registry.declare(TypeDecl::class("Options").extends("Middle"));
///
/// let found = resolve_member(&registry, "Options", "verbose").unwrap().unwrap();
/// assert_eq!(found.declaring_type, "Base");
/// assert!(resolve_member(&registry, "Options", "quiet").unwrap().is_none());
/// ```
pub fn resolve_member<'r>(
    registry: &'r TypeRegistry,
    type_name: &str,
    member: &str,
) -> Result<Option<ResolvedMember<'r>>, TypeNotFound> {
    let mut descriptor = registry.load_type(type_name)?;
    let mut visited: HashSet<&str> = HashSet::new();

    loop {
        if !visited.insert(descriptor.name()) {
            warn!(type_name, member, at = descriptor.name(), "inheritance cycle while resolving member");
            return Ok(None);
        }
        if let Some(decl) = descriptor.member(member) {
            debug!(type_name, member, declaring_type = descriptor.name(), "resolved member");
            return Ok(Some(ResolvedMember {
                declaring_type: descriptor.name(),
                decl,
            }));
        }
        let Some(parent) = descriptor.parent() else {
            return Ok(None);
        };
        descriptor = registry.load_type(parent)?;
    }
}

/// Type an argument or group materializes as: the array component type, else
/// the argument's instance type, else the declared type.
pub(crate) fn base_type_name(declared: &DeclaredType, instance_type: Option<&str>) -> String {
    if let Some(component) = declared.component_type_name() {
        return component;
    }
    match instance_type {
        Some(name) => name.to_string(),
        None => declared.type_name(),
    }
}
