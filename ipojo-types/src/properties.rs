use indexmap::IndexMap;
use std::fmt;

/// `service.id`: the immutable, monotonically assigned identity of a
/// reference. Never settable or removable via an overlay.
pub const SERVICE_ID: &str = "service.id";
/// `service.pid`: the persistent identity of the backing component instance.
/// Never settable or removable via an overlay.
pub const SERVICE_PID: &str = "service.pid";
/// `instance.name`: the human-readable instance name. Never settable or
/// removable via an overlay.
pub const INSTANCE_NAME: &str = "instance.name";

/// Property keys a [`crate::Reference`] overlay is forbidden from touching.
///
/// Attempting to `add_property`/`remove_property` one of these from a
/// `TransformedReference` overlay fails with `IllegalPropertyChange` (§4.1).
pub const FORBIDDEN_KEYS: [&str; 3] = [SERVICE_ID, SERVICE_PID, INSTANCE_NAME];

/// The value type stored against a property key.
///
/// Kept deliberately small: service registries in practice only ever carry
/// strings, integers, booleans, and string lists (multi-valued properties
/// such as `objectClass`). LDAP filter matching treats every variant through
/// its string rendering, so no separate "stringify" step is needed at the
/// call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A single string value.
    Str(String),
    /// A signed integer value, e.g. `service.ranking`.
    Int(i64),
    /// A boolean value.
    Bool(bool),
    /// A multi-valued (list) property, e.g. `objectClass`.
    List(Vec<String>),
}

impl PropertyValue {
    /// Render the value the way the LDAP matcher compares it: scalar values
    /// render as themselves, list values render each element and are matched
    /// if *any* element matches (OSGi multi-value semantics).
    #[must_use]
    pub fn string_values(&self) -> Vec<String> {
        match self {
            Self::Str(s) => vec![s.clone()],
            Self::Int(i) => vec![i.to_string()],
            Self::Bool(b) => vec![b.to_string()],
            Self::List(items) => items.clone(),
        }
    }

    /// Numeric view, used by `>=`/`<=` filter comparisons when both sides
    /// parse as integers; falls back to lexicographic string comparison
    /// otherwise.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Str(s) => s.parse().ok(),
            Self::Bool(_) | Self::List(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// An ordered property map: insertion order is preserved so that `keys()`
/// iteration is stable and deterministic across overlay rewrites, mirroring
/// the registry's own `LinkedHashMap`-style property ordering.
pub type Properties = IndexMap<String, PropertyValue>;
