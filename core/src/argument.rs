//! The parsed-argument abstraction consumed by the binding engine.
//!
//! A command-line parser produces one [`ParsedArgument`] per option: the name
//! of the member it binds to, the already-typed values of every occurrence,
//! and the metadata that steers binding (factory function, instance type,
//! multiplicity). [`CmdLineArg`] is the plain implementation used by the
//! surrounding framework and by tests.

use crate::error::ConversionError;
use crate::{EnumConstant, Value, ValueKind};

/// What an argument represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgumentKind {
    /// Plain typed value(s) (the default).
    #[default]
    Value,
    /// Name of an enum constant.
    Enum,
    /// Nested group whose values are objects materialized by the instantiator.
    Group,
}

/// A parsed command-line argument.
///
/// Implementors provide the raw accessors; positional access, delegate
/// resolution and the shape conversions are provided.
pub trait ParsedArgument {
    /// Member the argument binds to; `None` for arguments without one.
    fn variable(&self) -> Option<&str>;

    /// Typed values of all occurrences, in command-line order.
    fn values(&self) -> &[Value];

    /// Processed form of the value at `index`, if the argument keeps one.
    fn delegate(&self, _index: usize) -> Option<&Value> {
        None
    }

    fn kind(&self) -> ArgumentKind;

    /// Factory function reference, bare (`of`) or qualified (`Type.of`).
    fn factory_function(&self) -> Option<&str>;

    /// Concrete type to use instead of the member's declared type.
    fn instance_type(&self) -> Option<&str>;

    /// Whether the argument may occur more than once.
    fn is_multiple(&self) -> bool;

    /// Whether the argument was present on the command line.
    fn is_parsed(&self) -> bool;

    /// Whether an instance already held by the member may be reused
    /// (groups only).
    fn is_reusable(&self) -> bool {
        false
    }

    fn size(&self) -> usize {
        self.values().len()
    }

    fn value(&self, index: usize) -> Option<&Value> {
        self.values().get(index)
    }

    /// Delegate at `index` if present, else the value.
    fn delegate_or_value(&self, index: usize) -> Option<Value> {
        self.delegate(index).or_else(|| self.value(index)).cloned()
    }

    /// First value converted to `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::MissingValue`] when there is no value, or
    /// the conversion failure.
    fn value_as(&self, kind: ValueKind, widening: bool) -> Result<Value, ConversionError> {
        self.value(0)
            .ok_or(ConversionError::MissingValue(0))?
            .coerce_element(kind, false, widening)
    }

    /// All values converted to array elements of `element`.
    ///
    /// # Errors
    ///
    /// Returns the first element that fails to convert.
    fn values_as_array(
        &self,
        element: ValueKind,
        boxed: bool,
        widening: bool,
    ) -> Result<Vec<Value>, ConversionError> {
        self.values()
            .iter()
            .map(|v| v.coerce_element(element, boxed, widening))
            .collect()
    }

    /// Value at `index` resolved against `constants`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::MissingValue`], a mismatch for values that
    /// are neither strings nor enum constants, or the resolution failure.
    fn as_enum(&self, index: usize, constants: &[EnumConstant]) -> Result<EnumConstant, ConversionError> {
        match self.value(index) {
            Some(Value::Str(name)) => resolve_enum(name, constants),
            Some(Value::Enum(constant)) => resolve_enum(&constant.name, constants),
            Some(other) => Err(ConversionError::Mismatch {
                expected: enum_type_name(constants).to_string(),
                found: other.type_name(),
            }),
            None => Err(ConversionError::MissingValue(index)),
        }
    }

    /// Every value resolved against `constants`.
    ///
    /// # Errors
    ///
    /// Returns the first value that fails to resolve.
    fn as_enum_array(&self, constants: &[EnumConstant]) -> Result<Vec<EnumConstant>, ConversionError> {
        (0..self.size()).map(|i| self.as_enum(i, constants)).collect()
    }
}

fn enum_type_name(constants: &[EnumConstant]) -> &str {
    constants
        .first()
        .map(|c| c.type_name.as_str())
        .unwrap_or("enum")
}

/// Resolves `name` to one of `candidates`.
///
/// An exact match wins; otherwise a single case-insensitive match is
/// accepted.
///
/// # Errors
///
/// Returns [`ConversionError::UnknownConstant`] when nothing matches and
/// [`ConversionError::AmbiguousConstant`] when several constants match
/// case-insensitively.
///
/// # Examples
///
/// ```
/// use argbind_core::{resolve_enum, EnumConstant};
///
/// let colors: Vec<EnumConstant> = ["RED", "GREEN", "BLUE"]
///     .iter()
///     .enumerate()
///     .map(|(i, c)| EnumConstant::new("Color", *c, i))
///     .collect();
///
/// assert_eq!(resolve_enum("RED", &colors).unwrap().name, "RED");
/// assert_eq!(resolve_enum("green", &colors).unwrap().ordinal, 1);
/// assert!(resolve_enum("PURPLE", &colors).is_err());
/// ```
pub fn resolve_enum(name: &str, candidates: &[EnumConstant]) -> Result<EnumConstant, ConversionError> {
    if let Some(exact) = candidates.iter().find(|c| c.name == name) {
        return Ok(exact.clone());
    }

    let folded: Vec<&EnumConstant> = candidates
        .iter()
        .filter(|c| c.name.eq_ignore_ascii_case(name))
        .collect();
    match folded.as_slice() {
        [single] => Ok((*single).clone()),
        [] => Err(ConversionError::UnknownConstant {
            value: name.to_string(),
            enum_type: enum_type_name(candidates).to_string(),
            candidates: candidates.iter().map(|c| c.name.clone()).collect(),
        }),
        many => Err(ConversionError::AmbiguousConstant {
            value: name.to_string(),
            enum_type: enum_type_name(candidates).to_string(),
            matches: many.iter().map(|c| c.name.clone()).collect(),
        }),
    }
}

/// Concrete [`ParsedArgument`].
///
/// # Examples
///
/// ```
/// use argbind_core::{ArgumentKind, CmdLineArg, ParsedArgument, Value};
///
/// let arg = CmdLineArg::new("counts")
///     .multiple()
///     .with_value(3)
///     .with_value(7);
/// assert_eq!(arg.variable(), Some("counts"));
/// assert_eq!(arg.size(), 2);
/// assert!(arg.is_parsed());
///
/// let group = CmdLineArg::group("widget");
/// assert_eq!(group.kind(), ArgumentKind::Group);
/// assert!(group.is_reusable());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CmdLineArg {
    variable: Option<String>,
    values: Vec<Value>,
    delegates: Vec<Option<Value>>,
    kind: ArgumentKind,
    factory_function: Option<String>,
    instance_type: Option<String>,
    multiple: bool,
    parsed: bool,
    reusable: bool,
}

impl CmdLineArg {
    /// Value argument bound to `variable`.
    pub fn new(variable: &str) -> Self {
        Self {
            variable: Some(variable.to_string()),
            ..Self::default()
        }
    }

    /// Argument that binds to no member.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Enum argument whose constants come from `enum_type`.
    pub fn enumeration(variable: &str, enum_type: &str) -> Self {
        Self {
            kind: ArgumentKind::Enum,
            instance_type: Some(enum_type.to_string()),
            ..Self::new(variable)
        }
    }

    /// Group argument. Groups reuse an instance already held by the member
    /// unless [`reusable(false)`](CmdLineArg::reusable) is set.
    pub fn group(variable: &str) -> Self {
        Self {
            kind: ArgumentKind::Group,
            reusable: true,
            ..Self::new(variable)
        }
    }

    /// Appends an occurrence value and marks the argument parsed.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.push_value(value);
        self
    }

    pub fn with_values<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        for value in values {
            self.push_value(value);
        }
        self
    }

    /// Sets the processed form of the value at `index`.
    pub fn with_delegate(mut self, index: usize, delegate: impl Into<Value>) -> Self {
        if self.delegates.len() <= index {
            self.delegates.resize(index + 1, None);
        }
        self.delegates[index] = Some(delegate.into());
        self
    }

    pub fn with_factory(mut self, reference: &str) -> Self {
        self.factory_function = Some(reference.to_string());
        self
    }

    pub fn with_instance_type(mut self, type_name: &str) -> Self {
        self.instance_type = Some(type_name.to_string());
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn reusable(mut self, reusable: bool) -> Self {
        self.reusable = reusable;
        self
    }

    pub fn parsed(mut self, parsed: bool) -> Self {
        self.parsed = parsed;
        self
    }

    /// Records one more occurrence.
    pub fn push_value(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
        self.parsed = true;
    }
}

impl ParsedArgument for CmdLineArg {
    fn variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    fn values(&self) -> &[Value] {
        &self.values
    }

    fn delegate(&self, index: usize) -> Option<&Value> {
        self.delegates.get(index).and_then(Option::as_ref)
    }

    fn kind(&self) -> ArgumentKind {
        self.kind
    }

    fn factory_function(&self) -> Option<&str> {
        self.factory_function.as_deref()
    }

    fn instance_type(&self) -> Option<&str> {
        self.instance_type.as_deref()
    }

    fn is_multiple(&self) -> bool {
        self.multiple
    }

    fn is_parsed(&self) -> bool {
        self.parsed
    }

    fn is_reusable(&self) -> bool {
        self.reusable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constants(names: &[&str]) -> Vec<EnumConstant> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| EnumConstant::new("Mode", *n, i))
            .collect()
    }

    #[test]
    fn test_delegate_preferred_over_value() {
        let arg = CmdLineArg::new("x")
            .with_value("raw")
            .with_value("second")
            .with_delegate(1, 42);
        assert_eq!(arg.delegate_or_value(0), Some(Value::from("raw")));
        assert_eq!(arg.delegate_or_value(1), Some(Value::Int(42)));
        assert_eq!(arg.delegate_or_value(2), None);
    }

    #[test]
    fn test_case_insensitive_match_must_be_unique() {
        let modes = constants(&["fast", "FAST", "slow"]);
        assert_eq!(resolve_enum("FAST", &modes).unwrap().ordinal, 1);
        assert!(matches!(
            resolve_enum("Fast", &modes),
            Err(ConversionError::AmbiguousConstant { .. })
        ));
        assert_eq!(resolve_enum("SLOW", &modes).unwrap().ordinal, 2);
    }

    #[test]
    fn test_as_enum_rejects_non_text_values() {
        let arg = CmdLineArg::new("mode").with_value(3);
        assert!(matches!(
            arg.as_enum(0, &constants(&["fast"])),
            Err(ConversionError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_values_as_array_reports_first_failure() {
        let arg = CmdLineArg::new("n").with_values([Value::Int(1), Value::from("x")]);
        assert_eq!(
            arg.values_as_array(ValueKind::Long, false, true),
            Err(ConversionError::Mismatch {
                expected: "long".to_string(),
                found: "String".to_string()
            })
        );
    }
}
