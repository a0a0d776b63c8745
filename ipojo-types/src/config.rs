use serde::Deserialize;
use std::str::FromStr;

use crate::error::TypesError;

/// How a dependency reacts to the set of matching services changing
/// underneath an already-bound instance (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingPolicy {
    /// Rebind to a new best match whenever the selected set changes.
    Dynamic,
    /// Never rebind once bound; losing the bound service breaks the
    /// dependency instead.
    Static,
    /// Rebind only when a strictly higher-ranked match arrives; departures
    /// and lateral changes are handled as under `Dynamic`.
    DynamicPriority,
}

impl Default for BindingPolicy {
    fn default() -> Self {
        Self::Dynamic
    }
}

impl FromStr for BindingPolicy {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dynamic" => Ok(Self::Dynamic),
            "static" => Ok(Self::Static),
            "dynamic-priority" => Ok(Self::DynamicPriority),
            other => Err(TypesError::UnknownPolicy(other.to_string())),
        }
    }
}

/// The configuration fields a dependency is built from (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyConfig {
    /// The fully-qualified service specification the dependency requires.
    pub specification: String,
    /// Whether this dependency tracks the whole selected set rather than a
    /// single bound service.
    #[serde(default)]
    pub aggregate: bool,
    /// Whether an empty selected set leaves the dependency `Resolved`
    /// (optional) or `Unresolved`/`Broken` (mandatory).
    #[serde(default)]
    pub optional: bool,
    /// An LDAP filter narrowing which references may match, in addition to
    /// `specification`.
    #[serde(default)]
    pub filter: Option<String>,
    /// The fully-qualified name of a user-supplied comparator class used in
    /// place of the natural ranking order.
    #[serde(default, rename = "comparator-class")]
    pub comparator_class: Option<String>,
    /// The rebinding policy (§4.5). Defaults to `Dynamic`.
    #[serde(default)]
    pub policy: BindingPolicy,
}
