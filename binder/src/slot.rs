//! Writes into a resolved member slot of a target object.

use argbind_core::{ListRef, MemberDecl, ObjectRef, Value};
use tracing::debug;

/// Why a slot could not take a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SlotError {
    ReadOnly,
    /// The slot currently holds a value of the wrong shape.
    Holds { expected: &'static str, found: String },
}

impl SlotError {
    pub(crate) fn reason(&self) -> String {
        match self {
            SlotError::ReadOnly => "member is read-only".to_string(),
            SlotError::Holds { expected, found } => {
                format!("member holds {found} where {expected} was expected")
            }
        }
    }
}

pub(crate) fn write(target: &ObjectRef, member: &MemberDecl, value: Value) -> Result<(), SlotError> {
    if member.read_only {
        return Err(SlotError::ReadOnly);
    }
    target.set(member.name.clone(), value);
    Ok(())
}

/// Stores a copy of the member's array extended by `items`; an unset member
/// starts empty.
pub(crate) fn grow_array(
    target: &ObjectRef,
    member: &MemberDecl,
    items: Vec<Value>,
) -> Result<(), SlotError> {
    let mut grown = match target.get(&member.name).unwrap_or_default() {
        Value::Null => Vec::with_capacity(items.len()),
        Value::Array(existing) => existing,
        other => {
            return Err(SlotError::Holds {
                expected: "array",
                found: other.type_name(),
            });
        }
    };
    let from = grown.len();
    grown.extend(items);
    debug!(member = %member.name, from, to = grown.len(), "grew array member");
    write(target, member, Value::Array(grown))
}

/// The member's list, created and stored first if the member is unset.
pub(crate) fn ensure_list(target: &ObjectRef, member: &MemberDecl) -> Result<ListRef, SlotError> {
    match target.get(&member.name).unwrap_or_default() {
        Value::List(list) => Ok(list),
        Value::Null => {
            let list = ListRef::new();
            write(target, member, Value::List(list.clone()))?;
            debug!(member = %member.name, "created list member");
            Ok(list)
        }
        other => Err(SlotError::Holds {
            expected: "List",
            found: other.type_name(),
        }),
    }
}
