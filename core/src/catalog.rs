use serde::{Deserialize, Serialize};

use crate::TypeDecl;

/// Serializable bundle of type declarations.
///
/// A catalog lets the target types of a command line be declared in JSON
/// (or any serde format) instead of code. Behaviour that cannot be
/// serialized, such as custom constructors and factory functions, is
/// attached after loading via
/// [`TypeRegistry::type_mut`](crate::TypeRegistry::type_mut).
///
/// # Examples
///
/// ```
/// use argbind_core::*;
///
/// let json = r#"{
///     "version": "1.0.0",
///     "types": [
///         { "name": "Color", "kind": "enum", "constants": ["RED", "GREEN", "BLUE"] },
///         { "name": "Options", "members": [
///             { "name": "tag", "type": { "enum": "Color" } },
///             { "name": "counts", "type": { "array": { "element": "int" } } }
///         ] }
///     ]
/// }"#;
///
/// let catalog = TypeCatalog::from_json(json).unwrap();
/// assert_eq!(catalog.type_count(), 2);
///
/// let registry = TypeRegistry::from_catalog(&catalog);
/// assert!(registry.load_type("Options").unwrap().member("counts").is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCatalog {
    /// Catalog format version (semver string).
    pub version: String,
    /// Optional catalog name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional catalog description.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared types.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            name: None,
            description: None,
            types: Vec::new(),
        }
    }

    /// Returns the number of declared types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Parses a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] describing malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the catalog as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] raised by the serializer.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
