//! Type registry: name-based type resolution, constructors and factories.
//!
//! [`TypeRegistry`] plays the role of a class loader for the binding engine.
//! Each registered [`TypeDescriptor`] wraps a [`TypeDecl`] and adds the
//! behaviour that cannot be serialized: an optional constructor and the
//! factory functions callable by name.
//!
//! Factories are registered under their name and parameter type names, so a
//! lookup either finds exactly the callable a declaration asks for or fails
//! fast.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::error::{ConversionError, FactoryFault, TypeNotFound};
use crate::{
    DeclaredType, EnumConstant, MemberDecl, Object, ObjectRef, TypeCatalog, TypeDecl, TypeKind,
    Value,
};

/// Constructor closure. Receives the registry so it can start from
/// [`TypeRegistry::default_instance`].
pub type Constructor = Rc<dyn Fn(&TypeRegistry) -> Result<Value, FactoryFault>>;

/// Factory function closure, called with the arguments matching its
/// parameter list.
pub type FactoryFn = Rc<dyn Fn(&[Value]) -> Result<Value, FactoryFault>>;

/// Visibility of a factory function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Public,
    Private,
}

/// A named callable registered on a type.
#[derive(Clone)]
pub struct Factory {
    name: String,
    params: Vec<String>,
    access: Access,
    call: FactoryFn,
}

impl Factory {
    pub fn new(
        name: &str,
        params: &[&str],
        call: impl Fn(&[Value]) -> Result<Value, FactoryFault> + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            access: Access::Public,
            call: Rc::new(call),
        }
    }

    /// Marks the factory private; private factories are never invoked.
    pub fn private(mut self) -> Self {
        self.access = Access::Private;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type names in order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Calls the factory.
    ///
    /// # Errors
    ///
    /// Propagates the [`FactoryFault`] raised by the callable.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, FactoryFault> {
        (self.call)(args)
    }

    fn matches(&self, name: &str, params: &[&str]) -> bool {
        self.name == name
            && self.params.len() == params.len()
            && self.params.iter().zip(params).all(|(a, b)| a == b)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// A registered type.
///
/// # Examples
///
/// ```
/// use argbind_core::{FactoryFault, TypeDecl, TypeDescriptor, Value};
///
/// let port = TypeDescriptor::new(TypeDecl::abstract_class("Port"))
///     .with_factory("parse", &["String"], |args| {
///         let text = args[0].as_str().unwrap_or_default();
///         text.parse::<i32>()
///             .map(Value::Int)
///             .map_err(|e| FactoryFault::new(e.to_string()))
///     });
///
/// let factory = port.factory("parse", &["String"]).unwrap();
/// assert_eq!(factory.invoke(&[Value::from("8080")]).unwrap(), Value::Int(8080));
/// assert!(port.factory("parse", &[]).is_none());
/// ```
#[derive(Clone)]
pub struct TypeDescriptor {
    decl: TypeDecl,
    constructor: Option<Constructor>,
    factories: Vec<Factory>,
}

impl TypeDescriptor {
    pub fn new(decl: TypeDecl) -> Self {
        Self {
            decl,
            constructor: None,
            factories: Vec::new(),
        }
    }

    pub fn decl(&self) -> &TypeDecl {
        &self.decl
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.decl.parent.as_deref()
    }

    pub fn kind(&self) -> TypeKind {
        self.decl.kind
    }

    pub fn is_enum(&self) -> bool {
        self.decl.kind == TypeKind::Enum
    }

    /// Members declared directly on this type.
    pub fn members(&self) -> &[MemberDecl] {
        &self.decl.members
    }

    /// Finds a member declared directly on this type.
    pub fn member(&self, name: &str) -> Option<&MemberDecl> {
        self.decl.member(name)
    }

    /// Constants of an enum type, `None` for other kinds.
    pub fn enum_constants(&self) -> Option<Vec<EnumConstant>> {
        if !self.is_enum() {
            return None;
        }
        Some(
            self.decl
                .constants
                .iter()
                .enumerate()
                .map(|(ordinal, name)| EnumConstant::new(self.name(), name, ordinal))
                .collect(),
        )
    }

    /// Replaces the constructor, builder style.
    pub fn with_constructor(
        mut self,
        constructor: impl Fn(&TypeRegistry) -> Result<Value, FactoryFault> + 'static,
    ) -> Self {
        self.set_constructor(constructor);
        self
    }

    pub fn set_constructor(
        &mut self,
        constructor: impl Fn(&TypeRegistry) -> Result<Value, FactoryFault> + 'static,
    ) {
        self.constructor = Some(Rc::new(constructor));
    }

    /// Registers a public factory, builder style.
    pub fn with_factory(
        mut self,
        name: &str,
        params: &[&str],
        call: impl Fn(&[Value]) -> Result<Value, FactoryFault> + 'static,
    ) -> Self {
        self.add_factory(Factory::new(name, params, call));
        self
    }

    /// Registers a factory, replacing one with the same signature.
    pub fn add_factory(&mut self, factory: Factory) {
        let params: Vec<&str> = factory.params.iter().map(String::as_str).collect();
        let name = factory.name.clone();
        self.factories.retain(|f| !f.matches(&name, &params));
        self.factories.push(factory);
    }

    /// Finds the factory with exactly this name and parameter list.
    pub fn factory(&self, name: &str, params: &[&str]) -> Option<&Factory> {
        self.factories.iter().find(|f| f.matches(name, params))
    }

    pub fn factories(&self) -> &[Factory] {
        &self.factories
    }

    /// Returns `true` if [`construct`](TypeDescriptor::construct) can produce an instance.
    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some() || self.decl.kind == TypeKind::Class
    }

    /// Runs the zero-argument constructor.
    ///
    /// Returns `None` when the type has none: abstract types and enums
    /// without a registered constructor. Concrete types fall back to
    /// [`TypeRegistry::default_instance`].
    pub fn construct(&self, registry: &TypeRegistry) -> Option<Result<Value, FactoryFault>> {
        if let Some(constructor) = &self.constructor {
            return Some(constructor(registry));
        }
        match self.decl.kind {
            TypeKind::Class => Some(
                registry
                    .default_instance(self.name())
                    .map(Value::Object)
                    .map_err(|e| FactoryFault::new(e.to_string())),
            ),
            TypeKind::Abstract | TypeKind::Enum => None,
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("decl", &self.decl)
            .field("constructor", &self.constructor.is_some())
            .field("factories", &self.factories)
            .finish()
    }
}

/// Iterator over a type and its ancestors, most-derived first.
///
/// Stops at the first unregistered name or at a type already visited, so an
/// inheritance cycle ends the walk instead of looping.
pub struct Ancestry<'r> {
    registry: &'r TypeRegistry,
    next: Option<&'r str>,
    visited: HashSet<&'r str>,
}

impl<'r> Iterator for Ancestry<'r> {
    type Item = &'r TypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.next.take()?;
        if !self.visited.insert(name) {
            return None;
        }
        let descriptor = self.registry.get(name)?;
        self.next = descriptor.parent();
        Some(descriptor)
    }
}

/// Name-keyed collection of [`TypeDescriptor`]s.
///
/// # Examples
///
/// ```
/// use argbind_core::*;
///
/// let mut registry = TypeRegistry::new();
/// registry.declare(TypeDecl::class("Base")
///     .with_member(MemberDecl::new("verbose", DeclaredType::Value(ValueKind::Bool))));
/// registry.declare(TypeDecl::class("Options").extends("Base"));
///
/// assert!(registry.is_assignable("Options", "Base"));
/// assert!(!registry.is_assignable("Base", "Options"));
///
/// let options = registry.default_instance("Options").unwrap();
/// assert_eq!(options.get("verbose"), Some(Value::Bool(false)));
/// assert!(registry.load_type("Missing").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every type of a catalog with default behaviour.
    pub fn from_catalog(catalog: &TypeCatalog) -> Self {
        let mut registry = Self::new();
        for decl in &catalog.types {
            registry.declare(decl.clone());
        }
        registry
    }

    /// Registers a descriptor, returning the one it replaces.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.types.insert(descriptor.name().to_string(), descriptor)
    }

    /// Registers a plain declaration and returns its descriptor for further
    /// configuration.
    pub fn declare(&mut self, decl: TypeDecl) -> &mut TypeDescriptor {
        let descriptor = TypeDescriptor::new(decl);
        match self.types.entry(descriptor.name().to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(descriptor);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(descriptor),
        }
    }

    /// Resolves a type by name.
    ///
    /// # Errors
    ///
    /// Returns [`TypeNotFound`] if no type with that name is registered.
    pub fn load_type(&self, name: &str) -> Result<&TypeDescriptor, TypeNotFound> {
        self.types
            .get(name)
            .ok_or_else(|| TypeNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn type_mut(&mut self, name: &str) -> Option<&mut TypeDescriptor> {
        self.types.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Walks `name` and its ancestors.
    pub fn ancestry<'r>(&'r self, name: &'r str) -> Ancestry<'r> {
        Ancestry {
            registry: self,
            next: Some(name),
            visited: HashSet::new(),
        }
    }

    /// Returns `true` if an instance of `runtime_type` may be stored where
    /// `declared_type` is expected.
    pub fn is_assignable(&self, runtime_type: &str, declared_type: &str) -> bool {
        runtime_type == declared_type
            || self
                .ancestry(runtime_type)
                .any(|descriptor| descriptor.name() == declared_type)
    }

    /// Allocates an instance with every member of the type chain set to its
    /// default value.
    ///
    /// # Errors
    ///
    /// Returns [`TypeNotFound`] if `type_name` is not registered.
    pub fn default_instance(&self, type_name: &str) -> Result<ObjectRef, TypeNotFound> {
        self.load_type(type_name)?;
        let mut object = Object::new(type_name);
        for descriptor in self.ancestry(type_name) {
            for member in descriptor.members() {
                if object.get(&member.name).is_none() {
                    object.set(member.name.clone(), member.ty.default_value());
                }
            }
        }
        Ok(ObjectRef::new(object))
    }

    /// Checks that `value` may be stored in a slot of type `declared`,
    /// applying primitive widening when `widening` is set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] describing the first incompatible value.
    ///
    /// # Examples
    ///
    /// ```
    /// use argbind_core::*;
    ///
    /// let registry = TypeRegistry::new();
    /// let long = DeclaredType::Value(ValueKind::Long);
    /// assert_eq!(registry.conform(Value::Int(2), &long, true).unwrap(), Value::Long(2));
    /// assert!(registry.conform(Value::from("2"), &long, true).is_err());
    /// ```
    pub fn conform(
        &self,
        value: Value,
        declared: &DeclaredType,
        widening: bool,
    ) -> Result<Value, ConversionError> {
        let mismatch = |value: &Value| ConversionError::Mismatch {
            expected: declared.type_name(),
            found: value.type_name(),
        };

        match declared {
            DeclaredType::Any => Ok(value),
            DeclaredType::Value(kind) => value.coerce_element(*kind, false, widening),
            DeclaredType::Array { element, boxed } => match value {
                Value::Null => Ok(Value::Null),
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.coerce_element(*element, *boxed, widening))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                other => Err(mismatch(&other)),
            },
            DeclaredType::Enum(name) => {
                let accepted = match &value {
                    Value::Null => true,
                    Value::Enum(constant) => constant.type_name == *name,
                    _ => false,
                };
                if accepted { Ok(value) } else { Err(mismatch(&value)) }
            }
            DeclaredType::Object(name) => {
                let accepted = match &value {
                    Value::Null => true,
                    Value::Object(object) => self.is_assignable(&object.type_name(), name),
                    _ => false,
                };
                if accepted { Ok(value) } else { Err(mismatch(&value)) }
            }
            DeclaredType::EnumArray(_) | DeclaredType::ObjectArray(_) => match value {
                Value::Null => Ok(Value::Null),
                Value::Array(items) => {
                    let component = declared
                        .component()
                        .unwrap_or(DeclaredType::Any);
                    items
                        .into_iter()
                        .map(|item| self.conform(item, &component, widening))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::Array)
                }
                other => Err(mismatch(&other)),
            },
            DeclaredType::List => {
                if matches!(value, Value::Null | Value::List(_)) {
                    Ok(value)
                } else {
                    Err(mismatch(&value))
                }
            }
        }
    }
}
