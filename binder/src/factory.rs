//! Factory function references.

use std::fmt;

use argbind_core::{Access, Factory, TypeNotFound, TypeRegistry};

/// A factory reference as written on an argument: bare (`of`) or qualified
/// with its owning type (`net.Port.of`).
///
/// # Examples
///
/// ```
/// use argbind::FactoryRef;
///
/// let bare = FactoryRef::parse("of");
/// assert_eq!(bare.owner, None);
/// assert_eq!(bare.owner_or("Port"), "Port");
///
/// let qualified = FactoryRef::parse("net.Port.of");
/// assert_eq!(qualified.owner, Some("net.Port"));
/// assert_eq!(qualified.function, "of");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryRef<'a> {
    pub owner: Option<&'a str>,
    pub function: &'a str,
}

impl<'a> FactoryRef<'a> {
    /// Splits at the last `.`.
    pub fn parse(reference: &'a str) -> Self {
        match reference.rsplit_once('.') {
            Some((owner, function)) => Self {
                owner: Some(owner),
                function,
            },
            None => Self {
                owner: None,
                function: reference,
            },
        }
    }

    /// Owning type, or `base` for a bare reference.
    pub fn owner_or<'b>(&self, base: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.owner.unwrap_or(base)
    }
}

impl fmt::Display for FactoryRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            Some(owner) => write!(f, "{owner}.{}", self.function),
            None => f.write_str(self.function),
        }
    }
}

/// Human-readable signature used in error messages, e.g.
/// `Port Port.of(String)`.
pub(crate) fn signature(returns: &str, owner: &str, function: &str, params: &[&str]) -> String {
    format!("{returns} {owner}.{function}({})", params.join(", "))
}

pub(crate) enum LookupFailure {
    TypeNotFound(TypeNotFound),
    NotFound,
    Inaccessible,
}

/// Finds the public factory `function(params)` on `owner`.
pub(crate) fn lookup<'r>(
    registry: &'r TypeRegistry,
    owner: &str,
    function: &str,
    params: &[&str],
) -> Result<&'r Factory, LookupFailure> {
    let descriptor = registry
        .load_type(owner)
        .map_err(LookupFailure::TypeNotFound)?;
    let factory = descriptor
        .factory(function, params)
        .ok_or(LookupFailure::NotFound)?;
    match factory.access() {
        Access::Public => Ok(factory),
        Access::Private => Err(LookupFailure::Inaccessible),
    }
}
