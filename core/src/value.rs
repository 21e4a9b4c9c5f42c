//! Runtime values moved by the binding engine.
//!
//! [`Value`] is the closed set of everything a parsed argument can carry and
//! everything a target member can hold. Objects and lists are shared,
//! interior-mutable handles so that container identity survives binding:
//! appending to a list that a member already holds is visible through every
//! clone of the handle.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::{DateFormat, Equation};

/// Kind of a scalar value.
///
/// The first eight kinds are primitives: they have a zero default and can
/// never be `null` unless they sit in a boxed array.
///
/// # Examples
///
/// ```
/// use argbind_core::ValueKind;
///
/// assert_eq!(ValueKind::Int.name(), "int");
/// assert_eq!(ValueKind::Int.boxed_name(), "Integer");
/// assert!(ValueKind::Int.is_primitive());
/// assert!(!ValueKind::Str.is_primitive());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Str,
    Path,
    Regex,
    DateFormat,
    Timestamp,
    Calendar,
    LocalDate,
    LocalTime,
    LocalDateTime,
    Equation,
}

impl ValueKind {
    /// Every kind, in declaration order.
    pub const ALL: [ValueKind; 18] = [
        ValueKind::Bool,
        ValueKind::Byte,
        ValueKind::Short,
        ValueKind::Int,
        ValueKind::Long,
        ValueKind::Float,
        ValueKind::Double,
        ValueKind::Char,
        ValueKind::Str,
        ValueKind::Path,
        ValueKind::Regex,
        ValueKind::DateFormat,
        ValueKind::Timestamp,
        ValueKind::Calendar,
        ValueKind::LocalDate,
        ValueKind::LocalTime,
        ValueKind::LocalDateTime,
        ValueKind::Equation,
    ];

    /// Type name used in diagnostics and factory signatures.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "boolean",
            ValueKind::Byte => "byte",
            ValueKind::Short => "short",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Char => "char",
            ValueKind::Str => "String",
            ValueKind::Path => "Path",
            ValueKind::Regex => "Regex",
            ValueKind::DateFormat => "DateFormat",
            ValueKind::Timestamp => "Timestamp",
            ValueKind::Calendar => "Calendar",
            ValueKind::LocalDate => "LocalDate",
            ValueKind::LocalTime => "LocalTime",
            ValueKind::LocalDateTime => "LocalDateTime",
            ValueKind::Equation => "Equation",
        }
    }

    /// Name of the nullable (boxed) form. Reference kinds are already boxed.
    pub fn boxed_name(self) -> &'static str {
        match self {
            ValueKind::Bool => "Boolean",
            ValueKind::Byte => "Byte",
            ValueKind::Short => "Short",
            ValueKind::Int => "Integer",
            ValueKind::Long => "Long",
            ValueKind::Float => "Float",
            ValueKind::Double => "Double",
            ValueKind::Char => "Character",
            other => other.name(),
        }
    }

    /// Returns `true` for kinds that cannot hold `null` in unboxed form.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            ValueKind::Bool
                | ValueKind::Byte
                | ValueKind::Short
                | ValueKind::Int
                | ValueKind::Long
                | ValueKind::Float
                | ValueKind::Double
                | ValueKind::Char
        )
    }

    /// Value an unassigned member of this kind starts with.
    pub fn default_value(self) -> Value {
        match self {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Byte => Value::Byte(0),
            ValueKind::Short => Value::Short(0),
            ValueKind::Int => Value::Int(0),
            ValueKind::Long => Value::Long(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::Char => Value::Char('\0'),
            _ => Value::Null,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One constant of a registered enum type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    /// Name of the enum type declaring the constant.
    pub type_name: String,
    /// Constant name (e.g. `"RED"`).
    pub name: String,
    /// Position in the declaration order.
    pub ordinal: usize,
}

impl EnumConstant {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            ordinal,
        }
    }
}

impl fmt::Display for EnumConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Field storage of an instance.
#[derive(Debug, Clone)]
pub struct Object {
    type_name: String,
    fields: HashMap<String, Value>,
}

impl Object {
    /// Creates an instance of `type_name` with no fields set.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: HashMap::new(),
        }
    }

    /// Sets a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Runtime type name of the instance.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Stores `value` in the field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Shared handle to an [`Object`]. Clones refer to the same instance.
///
/// # Examples
///
/// ```
/// use argbind_core::{Object, ObjectRef, Value};
///
/// let widget = ObjectRef::new(Object::new("Widget").with_field("size", 3));
/// let alias = widget.clone();
/// alias.set("size", Value::Int(5));
///
/// assert_eq!(widget.get("size"), Some(Value::Int(5)));
/// assert!(widget.ptr_eq(&alias));
/// ```
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    pub fn new(object: Object) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    /// Runtime type name of the referenced instance.
    pub fn type_name(&self) -> String {
        self.0.borrow().type_name.clone()
    }

    /// Returns a copy of the field value, `None` if the field was never set.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().fields.get(name).cloned()
    }

    /// Stores `value` in the field, returning the previous value.
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.borrow_mut().set(name, value)
    }

    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    /// Returns `true` if both handles point to the same instance.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(object) => f.debug_tuple("ObjectRef").field(&object.type_name).finish(),
            Err(_) => f.write_str("ObjectRef(<borrowed>)"),
        }
    }
}

/// Shared, growable, insertion-ordered list. Clones refer to the same list.
#[derive(Clone, Default)]
pub struct ListRef(Rc<RefCell<Vec<Value>>>);

impl ListRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Snapshot of the current contents.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Returns `true` if both handles point to the same list.
    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(items) => f.debug_tuple("ListRef").field(&*items).finish(),
            Err(_) => f.write_str("ListRef(<borrowed>)"),
        }
    }
}

/// A runtime value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(String),
    Path(PathBuf),
    Regex(Regex),
    DateFormat(DateFormat),
    Timestamp(DateTime<Utc>),
    Calendar(DateTime<FixedOffset>),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
    LocalDateTime(NaiveDateTime),
    Equation(Equation),
    Enum(EnumConstant),
    Object(ObjectRef),
    Array(Vec<Value>),
    List(ListRef),
}

impl Value {
    /// Scalar kind of the value, `None` for null, enums and containers.
    pub fn kind(&self) -> Option<ValueKind> {
        let kind = match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Byte(_) => ValueKind::Byte,
            Value::Short(_) => ValueKind::Short,
            Value::Int(_) => ValueKind::Int,
            Value::Long(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Char(_) => ValueKind::Char,
            Value::Str(_) => ValueKind::Str,
            Value::Path(_) => ValueKind::Path,
            Value::Regex(_) => ValueKind::Regex,
            Value::DateFormat(_) => ValueKind::DateFormat,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Calendar(_) => ValueKind::Calendar,
            Value::LocalDate(_) => ValueKind::LocalDate,
            Value::LocalTime(_) => ValueKind::LocalTime,
            Value::LocalDateTime(_) => ValueKind::LocalDateTime,
            Value::Equation(_) => ValueKind::Equation,
            Value::Null | Value::Enum(_) | Value::Object(_) | Value::Array(_) | Value::List(_) => {
                return None;
            }
        };
        Some(kind)
    }

    /// Runtime type name, as matched against factory parameter types.
    ///
    /// # Examples
    ///
    /// ```
    /// use argbind_core::Value;
    ///
    /// assert_eq!(Value::Int(3).type_name(), "int");
    /// assert_eq!(Value::from("x").type_name(), "String");
    /// assert_eq!(Value::Array(vec![Value::Long(1)]).type_name(), "long[]");
    /// ```
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Enum(constant) => constant.type_name.clone(),
            Value::Object(object) => object.type_name(),
            Value::List(_) => "List".to_string(),
            Value::Array(items) => {
                let element = items
                    .iter()
                    .find(|v| !v.is_null())
                    .map(Value::type_name)
                    .unwrap_or_else(|| "Object".to_string());
                format!("{element}[]")
            }
            scalar => scalar
                .kind()
                .map(|k| k.name().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumConstant> {
        match self {
            Value::Enum(constant) => Some(constant),
            _ => None,
        }
    }

    /// Converts the value to `kind`.
    ///
    /// Identical kinds always succeed. With `widening` enabled the Java-style
    /// primitive widenings (`byte` → `short` → `int` → `long` → `float` →
    /// `double`, `char` → `int`) are applied as well. `int` and `long` to
    /// `float`, and `long` to `double`, may round.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Mismatch`] for any other combination,
    /// including `null`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argbind_core::{Value, ValueKind};
    ///
    /// assert_eq!(Value::Int(7).coerce(ValueKind::Long, true).unwrap(), Value::Long(7));
    /// assert!(Value::Int(7).coerce(ValueKind::Long, false).is_err());
    /// assert!(Value::Long(7).coerce(ValueKind::Int, true).is_err());
    /// ```
    pub fn coerce(&self, kind: ValueKind, widening: bool) -> Result<Value, ConversionError> {
        if self.kind() == Some(kind) {
            return Ok(self.clone());
        }
        if widening {
            if let Some(widened) = self.widen(kind) {
                return Ok(widened);
            }
        }
        Err(ConversionError::Mismatch {
            expected: kind.name().to_string(),
            found: self.type_name(),
        })
    }

    /// Like [`coerce`](Value::coerce), but `null` is kept for boxed slots and
    /// reference kinds.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::NullNotAllowed`] for `null` in an unboxed
    /// primitive slot.
    pub fn coerce_element(
        &self,
        kind: ValueKind,
        boxed: bool,
        widening: bool,
    ) -> Result<Value, ConversionError> {
        if self.is_null() {
            return if boxed || !kind.is_primitive() {
                Ok(Value::Null)
            } else {
                Err(ConversionError::NullNotAllowed(kind.name().to_string()))
            };
        }
        self.coerce(kind, widening)
    }

    fn widen(&self, kind: ValueKind) -> Option<Value> {
        let widened = match (self, kind) {
            (Value::Byte(b), ValueKind::Short) => Value::Short(i16::from(*b)),
            (Value::Byte(b), ValueKind::Int) => Value::Int(i32::from(*b)),
            (Value::Byte(b), ValueKind::Long) => Value::Long(i64::from(*b)),
            (Value::Byte(b), ValueKind::Float) => Value::Float(f32::from(*b)),
            (Value::Byte(b), ValueKind::Double) => Value::Double(f64::from(*b)),
            (Value::Short(s), ValueKind::Int) => Value::Int(i32::from(*s)),
            (Value::Short(s), ValueKind::Long) => Value::Long(i64::from(*s)),
            (Value::Short(s), ValueKind::Float) => Value::Float(f32::from(*s)),
            (Value::Short(s), ValueKind::Double) => Value::Double(f64::from(*s)),
            (Value::Char(c), ValueKind::Int) => Value::Int(u32::from(*c) as i32),
            (Value::Char(c), ValueKind::Long) => Value::Long(i64::from(u32::from(*c))),
            (Value::Char(c), ValueKind::Double) => Value::Double(f64::from(u32::from(*c))),
            (Value::Int(i), ValueKind::Long) => Value::Long(i64::from(*i)),
            (Value::Int(i), ValueKind::Float) => Value::Float(*i as f32),
            (Value::Int(i), ValueKind::Double) => Value::Double(f64::from(*i)),
            (Value::Long(l), ValueKind::Float) => Value::Float(*l as f32),
            (Value::Long(l), ValueKind::Double) => Value::Double(*l as f64),
            (Value::Float(f), ValueKind::Double) => Value::Double(f64::from(*f)),
            _ => return None,
        };
        Some(widened)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a.as_str() == b.as_str(),
            (Value::DateFormat(a), Value::DateFormat(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Calendar(a), Value::Calendar(b)) => a == b,
            (Value::LocalDate(a), Value::LocalDate(b)) => a == b,
            (Value::LocalTime(a), Value::LocalTime(b)) => a == b,
            (Value::LocalDateTime(a), Value::LocalDateTime(b)) => a == b,
            (Value::Equation(a), Value::Equation(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.ptr_eq(b) || a.to_vec() == b.to_vec(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Path(v) => write!(f, "{}", v.display()),
            Value::Regex(v) => f.write_str(v.as_str()),
            Value::DateFormat(v) => write!(f, "{v}"),
            Value::Timestamp(v) => f.write_str(&v.to_rfc3339()),
            Value::Calendar(v) => f.write_str(&v.to_rfc3339()),
            Value::LocalDate(v) => write!(f, "{v}"),
            Value::LocalTime(v) => write!(f, "{v}"),
            Value::LocalDateTime(v) => write!(f, "{v}"),
            Value::Equation(v) => write!(f, "{v}"),
            Value::Enum(v) => write!(f, "{v}"),
            Value::Object(v) => write!(f, "{}", v.type_name()),
            Value::Array(items) => write_items(f, items),
            Value::List(list) => write_items(f, &list.to_vec()),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => Str,
    PathBuf => Path,
    Regex => Regex,
    DateFormat => DateFormat,
    DateTime<Utc> => Timestamp,
    DateTime<FixedOffset> => Calendar,
    NaiveDate => LocalDate,
    NaiveTime => LocalTime,
    NaiveDateTime => LocalDateTime,
    Equation => Equation,
    EnumConstant => Enum,
    ObjectRef => Object,
    ListRef => List,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}
