use thiserror::Error;

use ipojo_core::IpojoError;
use ipojo_types::TypesError;

/// Errors raised while building or reconfiguring a [`crate::DependencyModel`]
/// (§7).
///
/// `BrokenDependency` is deliberately absent: the broken state is not an
/// error propagated from a call, it is the terminal
/// `DependencyState::Broken`, observed through `DependencyModel::state()`
/// and the `invalidate` callback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DependencyError {
    /// A fault raised by the registry abstraction or the transformed-
    /// reference overlay.
    #[error(transparent)]
    Ipojo(#[from] IpojoError),

    /// A fault raised while parsing a filter or binding-policy literal.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Attempted to change the binding policy, or swap the registry/bundle
    /// context, after `start()` (§7). Only `filter`, `comparator`,
    /// `aggregate`, and `optional` may be reconfigured post-start.
    #[error("unsupported reconfiguration after start: {0}")]
    UnsupportedReconfiguration(String),

    /// `DependencyBuilder::build()` was called without a registry (§6:
    /// "The registry this dependency observes. Required."). A builder-time
    /// validation fault, distinct from `UnsupportedReconfiguration`'s
    /// post-`start()` scope.
    #[error("a registry is required to build a dependency")]
    MissingRegistry,
}
