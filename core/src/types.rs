//! Declared-type model for target members.
//!
//! A [`DeclaredType`] is the static type of a member, independent of whatever
//! value the member currently holds. The binding engine dispatches on it
//! through its [`Shape`], a hashable key with the type names stripped.
//! [`TypeDecl`] is the serializable declaration of a whole type and can be
//! shipped in a [`TypeCatalog`](crate::TypeCatalog).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Value, ValueKind};

/// Static type of a member.
///
/// # Examples
///
/// ```
/// use argbind_core::{DeclaredType, ValueKind};
///
/// let counts = DeclaredType::Array { element: ValueKind::Int, boxed: false };
/// assert_eq!(counts.to_string(), "int[]");
/// assert!(counts.is_array());
///
/// let boxed = DeclaredType::Array { element: ValueKind::Int, boxed: true };
/// assert_eq!(boxed.to_string(), "Integer[]");
///
/// let widgets = DeclaredType::ObjectArray("Widget".into());
/// assert_eq!(widgets.component_type_name().as_deref(), Some("Widget"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    /// Scalar of a value kind; primitive kinds are unboxed.
    Value(ValueKind),
    /// Array of a value kind; `boxed` arrays may hold `null`.
    Array {
        element: ValueKind,
        #[serde(default)]
        boxed: bool,
    },
    /// Constant of the named enum type.
    Enum(String),
    /// Array of constants of the named enum type.
    EnumArray(String),
    /// Instance of the named type or one of its descendants.
    Object(String),
    /// Array of instances of the named type.
    ObjectArray(String),
    /// Growable, insertion-ordered collection of any values.
    List,
    /// Accepts any value.
    Any,
}

/// Hashable dispatch key of a [`DeclaredType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Value(ValueKind),
    Array { element: ValueKind, boxed: bool },
    Enum,
    EnumArray,
    Object,
    ObjectArray,
    Collection,
    Any,
}

impl DeclaredType {
    /// Display name of the type (`int[]`, `Integer[]`, `Color`, `List`, ...).
    pub fn type_name(&self) -> String {
        match self {
            DeclaredType::Value(kind) => kind.name().to_string(),
            DeclaredType::Array { .. } | DeclaredType::EnumArray(_) | DeclaredType::ObjectArray(_) => {
                format!("{}[]", self.component_type_name().unwrap_or_default())
            }
            DeclaredType::Enum(name) | DeclaredType::Object(name) => name.clone(),
            DeclaredType::List => "List".to_string(),
            DeclaredType::Any => "Object".to_string(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            DeclaredType::Array { .. } | DeclaredType::EnumArray(_) | DeclaredType::ObjectArray(_)
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, DeclaredType::List)
    }

    /// Element type name of an array type, `None` otherwise.
    pub fn component_type_name(&self) -> Option<String> {
        match self {
            DeclaredType::Array { element, boxed } => Some(
                if *boxed {
                    element.boxed_name()
                } else {
                    element.name()
                }
                .to_string(),
            ),
            DeclaredType::EnumArray(name) | DeclaredType::ObjectArray(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Element type of an array type, `None` otherwise.
    ///
    /// Boxing of value arrays is not carried over to the element type; use
    /// [`Value::coerce_element`] on the array shape when `null` matters.
    pub fn component(&self) -> Option<DeclaredType> {
        match self {
            DeclaredType::Array { element, .. } => Some(DeclaredType::Value(*element)),
            DeclaredType::EnumArray(name) => Some(DeclaredType::Enum(name.clone())),
            DeclaredType::ObjectArray(name) => Some(DeclaredType::Object(name.clone())),
            _ => None,
        }
    }

    /// Name of the registered type this declaration refers to, if any.
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            DeclaredType::Enum(name)
            | DeclaredType::EnumArray(name)
            | DeclaredType::Object(name)
            | DeclaredType::ObjectArray(name) => Some(name),
            _ => None,
        }
    }

    /// Value of a freshly constructed member of this type.
    pub fn default_value(&self) -> Value {
        match self {
            DeclaredType::Value(kind) => kind.default_value(),
            _ => Value::Null,
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            DeclaredType::Value(kind) => Shape::Value(*kind),
            DeclaredType::Array { element, boxed } => Shape::Array {
                element: *element,
                // boxing is meaningless for reference kinds
                boxed: *boxed || !element.is_primitive(),
            },
            DeclaredType::Enum(_) => Shape::Enum,
            DeclaredType::EnumArray(_) => Shape::EnumArray,
            DeclaredType::Object(_) => Shape::Object,
            DeclaredType::ObjectArray(_) => Shape::ObjectArray,
            DeclaredType::List => Shape::Collection,
            DeclaredType::Any => Shape::Any,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// A named, typed member slot declared on a type.
///
/// # Examples
///
/// ```
/// use argbind_core::{DeclaredType, MemberDecl, ValueKind};
///
/// let id = MemberDecl::new("id", DeclaredType::Value(ValueKind::Long)).read_only();
/// assert!(id.read_only);
/// assert_eq!(id.ty.to_string(), "long");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDecl {
    /// Member name, matched against an argument's variable name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: DeclaredType,
    /// Read-only members reject writes; an existing list can still be appended to.
    #[serde(default)]
    pub read_only: bool,
}

impl MemberDecl {
    pub fn new(name: &str, ty: DeclaredType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            read_only: false,
        }
    }

    /// Marks the member read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Category of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Concrete type with a default constructor (the default).
    #[default]
    Class,
    /// Type that can only be instantiated through a registered constructor
    /// or factory.
    Abstract,
    /// Enumeration with a fixed constant set.
    Enum,
}

/// Serializable declaration of a type.
///
/// # Examples
///
/// ```
/// use argbind_core::{DeclaredType, MemberDecl, TypeDecl, TypeKind, ValueKind};
///
/// let base = TypeDecl::class("Shape")
///     .with_member(MemberDecl::new("name", DeclaredType::Value(ValueKind::Str)));
/// let circle = TypeDecl::class("Circle")
///     .extends("Shape")
///     .with_member(MemberDecl::new("radius", DeclaredType::Value(ValueKind::Double)));
///
/// assert_eq!(circle.parent.as_deref(), Some("Shape"));
/// assert!(base.member("name").is_some());
/// assert!(circle.member("name").is_none()); // declared on the parent only
///
/// let color = TypeDecl::enumeration("Color", &["RED", "GREEN", "BLUE"]);
/// assert_eq!(color.kind, TypeKind::Enum);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Fully qualified type name.
    pub name: String,
    /// Immediate ancestor, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub kind: TypeKind,
    /// Members declared directly on this type.
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    /// Enum constants in ordinal order (enums only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<String>,
}

impl TypeDecl {
    /// Declares a concrete type.
    pub fn class(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            kind: TypeKind::Class,
            members: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Declares a type without a default constructor.
    pub fn abstract_class(name: &str) -> Self {
        Self {
            kind: TypeKind::Abstract,
            ..Self::class(name)
        }
    }

    /// Declares an enum with the given constants.
    pub fn enumeration(name: &str, constants: &[&str]) -> Self {
        Self {
            kind: TypeKind::Enum,
            constants: constants.iter().map(|c| c.to_string()).collect(),
            ..Self::class(name)
        }
    }

    /// Sets the parent type.
    pub fn extends(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    /// Adds a member.
    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    /// Finds a member declared directly on this type.
    pub fn member(&self, name: &str) -> Option<&MemberDecl> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_ignores_boxing_of_reference_arrays() {
        let strings = DeclaredType::Array {
            element: ValueKind::Str,
            boxed: false,
        };
        assert_eq!(
            strings.shape(),
            Shape::Array {
                element: ValueKind::Str,
                boxed: true
            }
        );
    }

    #[test]
    fn test_primitive_members_default_to_zero() {
        assert_eq!(
            DeclaredType::Value(ValueKind::Int).default_value(),
            Value::Int(0)
        );
        assert_eq!(DeclaredType::List.default_value(), Value::Null);
    }

    #[test]
    fn test_declared_type_json_form() {
        let ty: DeclaredType =
            serde_json::from_str(r#"{"array": {"element": "int", "boxed": true}}"#).unwrap();
        assert_eq!(
            ty,
            DeclaredType::Array {
                element: ValueKind::Int,
                boxed: true
            }
        );
        let ty: DeclaredType = serde_json::from_str(r#"{"enum": "Color"}"#).unwrap();
        assert_eq!(ty, DeclaredType::Enum("Color".into()));
        let ty: DeclaredType = serde_json::from_str(r#""list""#).unwrap();
        assert_eq!(ty, DeclaredType::List);
    }
}
