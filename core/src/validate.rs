//! Registry and catalog validation.
//!
//! Catches structural errors that would otherwise only surface as binding
//! failures at run time: unknown parents, inheritance cycles, duplicate or
//! shadowed members, references to unregistered types and malformed enums.
//!
//! # Examples
//!
//! ```
//! use argbind_core::*;
//!
//! let mut registry = TypeRegistry::new();
//! registry.declare(TypeDecl::class("Options")
//!     .with_member(MemberDecl::new("mode", DeclaredType::Enum("Mode".into()))));
//! assert_eq!(
//!     validate_registry(&registry),
//!     vec![ValidationError::UnknownType {
//!         type_name: "Options".into(),
//!         member: "mode".into(),
//!         referenced: "Mode".into(),
//!     }]
//! );
//!
//! registry.declare(TypeDecl::enumeration("Mode", &["FAST", "SLOW"]));
//! assert!(validate_registry(&registry).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{DeclaredType, TypeCatalog, TypeDescriptor, TypeKind, TypeRegistry};

/// Registry/catalog validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Catalog version string is empty.
    #[error("catalog version cannot be empty")]
    EmptyCatalogVersion,
    /// Type name is empty or whitespace-only.
    #[error("type name cannot be empty")]
    EmptyTypeName,
    /// Two declarations in the same catalog share a name.
    #[error("duplicate type in catalog: {0}")]
    DuplicateType(String),
    /// Parent type is not registered.
    #[error("{type_name} extends unknown type {parent}")]
    UnknownParent { type_name: String, parent: String },
    /// A type is its own ancestor.
    #[error("inheritance cycle detected at path: {0}")]
    InheritanceCycle(String),
    /// Two members of one type share a name.
    #[error("duplicate member {member} on {type_name}")]
    DuplicateMember { type_name: String, member: String },
    /// A member hides a member of the same name on an ancestor.
    #[error("member {member} on {type_name} shadows the one declared on {ancestor}")]
    ShadowedMember {
        type_name: String,
        member: String,
        ancestor: String,
    },
    /// A member's declared type refers to an unregistered type.
    #[error("member {member} on {type_name} refers to unknown type {referenced}")]
    UnknownType {
        type_name: String,
        member: String,
        referenced: String,
    },
    /// A member is declared as an enum but the referenced type is not one.
    #[error("member {member} on {type_name} expects enum, but {referenced} is not an enum")]
    NotAnEnum {
        type_name: String,
        member: String,
        referenced: String,
    },
    /// An enum declares the same constant twice.
    #[error("duplicate constant {constant} in enum {type_name}")]
    DuplicateConstant { type_name: String, constant: String },
    /// A non-enum type declares constants.
    #[error("{0} declares constants but is not an enum")]
    UnexpectedConstants(String),
}

/// Validates a catalog, then the registry built from it.
///
/// # Examples
///
/// ```
/// use argbind_core::*;
///
/// let mut catalog = TypeCatalog::new("1.0.0");
/// catalog.types.push(TypeDecl::class("Options"));
/// catalog.types.push(TypeDecl::class("Options"));
/// assert_eq!(
///     validate_catalog(&catalog),
///     vec![ValidationError::DuplicateType("Options".into())]
/// );
/// ```
pub fn validate_catalog(catalog: &TypeCatalog) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if catalog.version.trim().is_empty() {
        errors.push(ValidationError::EmptyCatalogVersion);
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for decl in &catalog.types {
        if !seen.insert(decl.name.as_str()) {
            errors.push(ValidationError::DuplicateType(decl.name.clone()));
            return errors;
        }
    }

    validate_registry(&TypeRegistry::from_catalog(catalog))
}

/// Validates every registered type.
///
/// Types are checked in name order so the result is deterministic; all
/// errors are reported.
pub fn validate_registry(registry: &TypeRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for name in registry.type_names() {
        let Some(descriptor) = registry.get(name) else {
            continue;
        };
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyTypeName);
            continue;
        }
        errors.extend(validate_hierarchy(registry, descriptor));
        errors.extend(validate_members(registry, descriptor));
        errors.extend(validate_constants(descriptor));
    }

    errors
}

fn validate_hierarchy(registry: &TypeRegistry, descriptor: &TypeDescriptor) -> Vec<ValidationError> {
    let mut path = vec![descriptor.name()];
    let mut current = descriptor;

    while let Some(parent) = current.parent() {
        if path.contains(&parent) {
            path.push(parent);
            return vec![ValidationError::InheritanceCycle(path.join(" -> "))];
        }
        let Some(next) = registry.get(parent) else {
            return vec![ValidationError::UnknownParent {
                type_name: current.name().to_string(),
                parent: parent.to_string(),
            }];
        };
        path.push(parent);
        current = next;
    }

    Vec::new()
}

fn validate_members(registry: &TypeRegistry, descriptor: &TypeDescriptor) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for member in descriptor.members() {
        if !seen.insert(member.name.as_str()) {
            errors.push(ValidationError::DuplicateMember {
                type_name: descriptor.name().to_string(),
                member: member.name.clone(),
            });
            continue;
        }

        if let Some(ancestor) = registry
            .ancestry(descriptor.name())
            .skip(1)
            .find(|a| a.member(&member.name).is_some())
        {
            errors.push(ValidationError::ShadowedMember {
                type_name: descriptor.name().to_string(),
                member: member.name.clone(),
                ancestor: ancestor.name().to_string(),
            });
        }

        let Some(referenced) = member.ty.referenced_type() else {
            continue;
        };
        match registry.get(referenced) {
            None => errors.push(ValidationError::UnknownType {
                type_name: descriptor.name().to_string(),
                member: member.name.clone(),
                referenced: referenced.to_string(),
            }),
            Some(target)
                if matches!(member.ty, DeclaredType::Enum(_) | DeclaredType::EnumArray(_))
                    && !target.is_enum() =>
            {
                errors.push(ValidationError::NotAnEnum {
                    type_name: descriptor.name().to_string(),
                    member: member.name.clone(),
                    referenced: referenced.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    errors
}

fn validate_constants(descriptor: &TypeDescriptor) -> Vec<ValidationError> {
    let constants = &descriptor.decl().constants;
    if descriptor.kind() != TypeKind::Enum {
        return if constants.is_empty() {
            Vec::new()
        } else {
            vec![ValidationError::UnexpectedConstants(
                descriptor.name().to_string(),
            )]
        };
    }

    let mut seen = HashSet::new();
    constants
        .iter()
        .filter(|c| !seen.insert(c.as_str()))
        .map(|c| ValidationError::DuplicateConstant {
            type_name: descriptor.name().to_string(),
            constant: c.clone(),
        })
        .collect()
}
