//! Standard assignment conversions keyed by declared type shape.
//!
//! The table is built once and consulted with the member's [`Shape`]; shapes
//! without an entry fall back to assigning the argument's first
//! delegate-or-value after an assignability check.

use std::collections::HashMap;
use std::sync::LazyLock;

use argbind_core::{
    ConversionError, DeclaredType, EnumConstant, ParsedArgument, Shape, TypeRegistry, Value,
    ValueKind,
};

/// What a conversion asks the binder to do with the member.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Assignment {
    /// Store a single value.
    Replace(Value),
    /// Store an array; multiple-occurrence arguments extend the existing one.
    Elements(Vec<Value>),
    /// Append to the member's list, creating it first if unset.
    Append(Vec<Value>),
}

pub(crate) struct ConversionInput<'a> {
    pub arg: &'a dyn ParsedArgument,
    pub declared: &'a DeclaredType,
    pub registry: &'a TypeRegistry,
    pub widening: bool,
}

pub(crate) type Conversion = fn(&ConversionInput<'_>) -> Result<Assignment, ConversionError>;

static STANDARD: LazyLock<ConversionTable> = LazyLock::new(ConversionTable::standard);

/// Shape-keyed dispatch table for standard assignment.
///
/// # Examples
///
/// ```
/// use argbind::ConversionTable;
/// use argbind_core::{Shape, ValueKind};
///
/// let table = ConversionTable::global();
/// assert!(table.contains(Shape::Array { element: ValueKind::Int, boxed: false }));
/// assert!(table.contains(Shape::Collection));
/// // plain scalars use the fallback
/// assert!(!table.contains(Shape::Value(ValueKind::Int)));
/// ```
pub struct ConversionTable {
    entries: HashMap<Shape, Conversion>,
}

impl ConversionTable {
    fn standard() -> Self {
        let mut entries: HashMap<Shape, Conversion> = HashMap::new();

        for element in ValueKind::ALL {
            entries.insert(
                Shape::Array {
                    element,
                    boxed: true,
                },
                convert_array,
            );
            if element.is_primitive() {
                entries.insert(
                    Shape::Array {
                        element,
                        boxed: false,
                    },
                    convert_array,
                );
            }
        }
        for kind in [ValueKind::Regex, ValueKind::DateFormat, ValueKind::Equation] {
            entries.insert(Shape::Value(kind), convert_scalar);
        }
        entries.insert(Shape::Enum, convert_enum);
        entries.insert(Shape::EnumArray, convert_enum_array);
        entries.insert(Shape::Collection, accumulate_list);

        Self { entries }
    }

    /// The process-wide table.
    pub fn global() -> &'static ConversionTable {
        &STANDARD
    }

    /// Returns `true` if `shape` has a dedicated conversion.
    pub fn contains(&self, shape: Shape) -> bool {
        self.entries.contains_key(&shape)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn lookup(&self, shape: Shape) -> Conversion {
        self.entries.get(&shape).copied().unwrap_or(convert_fallback)
    }
}

/// Constants of the enum named `type_name`.
pub(crate) fn enum_constants(
    registry: &TypeRegistry,
    type_name: &str,
) -> Result<Vec<EnumConstant>, ConversionError> {
    registry
        .load_type(type_name)?
        .enum_constants()
        .ok_or_else(|| ConversionError::NotAnEnum(type_name.to_string()))
}

fn convert_array(input: &ConversionInput<'_>) -> Result<Assignment, ConversionError> {
    let Shape::Array { element, boxed } = input.declared.shape() else {
        return convert_fallback(input);
    };
    input
        .arg
        .values_as_array(element, boxed, input.widening)
        .map(Assignment::Elements)
}

fn convert_scalar(input: &ConversionInput<'_>) -> Result<Assignment, ConversionError> {
    let Shape::Value(kind) = input.declared.shape() else {
        return convert_fallback(input);
    };
    input.arg.value_as(kind, input.widening).map(Assignment::Replace)
}

fn convert_enum(input: &ConversionInput<'_>) -> Result<Assignment, ConversionError> {
    let Some(enum_type) = input.declared.referenced_type() else {
        return convert_fallback(input);
    };
    let constants = enum_constants(input.registry, enum_type)?;
    let constant = input.arg.as_enum(0, &constants)?;
    Ok(Assignment::Replace(Value::Enum(constant)))
}

fn convert_enum_array(input: &ConversionInput<'_>) -> Result<Assignment, ConversionError> {
    let Some(enum_type) = input.declared.referenced_type() else {
        return convert_fallback(input);
    };
    let constants = enum_constants(input.registry, enum_type)?;
    let resolved = input.arg.as_enum_array(&constants)?;
    Ok(Assignment::Elements(
        resolved.into_iter().map(Value::Enum).collect(),
    ))
}

fn accumulate_list(input: &ConversionInput<'_>) -> Result<Assignment, ConversionError> {
    let arg = input.arg;
    Ok(Assignment::Append(
        (0..arg.size()).filter_map(|i| arg.delegate_or_value(i)).collect(),
    ))
}

fn convert_fallback(input: &ConversionInput<'_>) -> Result<Assignment, ConversionError> {
    let value = input
        .arg
        .delegate_or_value(0)
        .ok_or(ConversionError::MissingValue(0))?;
    input
        .registry
        .conform(value, input.declared, input.widening)
        .map(Assignment::Replace)
}

#[cfg(test)]
mod tests {
    use argbind_core::{CmdLineArg, TypeDecl};

    use super::*;

    fn convert(
        registry: &TypeRegistry,
        declared: &DeclaredType,
        arg: &CmdLineArg,
    ) -> Result<Assignment, ConversionError> {
        let input = ConversionInput {
            arg,
            declared,
            registry,
            widening: true,
        };
        (ConversionTable::global().lookup(declared.shape()))(&input)
    }

    #[test]
    fn test_unboxed_array_rejects_null() {
        let registry = TypeRegistry::new();
        let arg = CmdLineArg::new("n").with_values([Value::Int(1), Value::Null]);
        let unboxed = DeclaredType::Array {
            element: ValueKind::Int,
            boxed: false,
        };
        let boxed = DeclaredType::Array {
            element: ValueKind::Int,
            boxed: true,
        };

        assert_eq!(
            convert(&registry, &unboxed, &arg),
            Err(ConversionError::NullNotAllowed("int".to_string()))
        );
        assert_eq!(
            convert(&registry, &boxed, &arg),
            Ok(Assignment::Elements(vec![Value::Int(1), Value::Null]))
        );
    }

    #[test]
    fn test_list_takes_delegates_without_coercion() {
        let registry = TypeRegistry::new();
        let arg = CmdLineArg::new("items")
            .with_values([Value::from("a"), Value::Int(2)])
            .with_delegate(0, Value::Long(10));

        assert_eq!(
            convert(&registry, &DeclaredType::List, &arg),
            Ok(Assignment::Append(vec![Value::Long(10), Value::Int(2)]))
        );
    }

    #[test]
    fn test_enum_against_non_enum_type() {
        let mut registry = TypeRegistry::new();
        registry.declare(TypeDecl::class("Widget"));
        let arg = CmdLineArg::new("w").with_value("RED");

        assert_eq!(
            convert(&registry, &DeclaredType::Enum("Widget".into()), &arg),
            Err(ConversionError::NotAnEnum("Widget".to_string()))
        );
    }

    #[test]
    fn test_fallback_widens_scalars() {
        let registry = TypeRegistry::new();
        let arg = CmdLineArg::new("size").with_value(Value::Short(5));

        assert_eq!(
            convert(&registry, &DeclaredType::Value(ValueKind::Double), &arg),
            Ok(Assignment::Replace(Value::Double(5.0)))
        );
    }
}
