use thiserror::Error;

use ipojo_types::TypesError;

/// Errors raised by the registry abstraction, the tracker, and the
/// transformed-reference overlay (§7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpojoError {
    /// A dependency-model or interceptor configuration fault.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// A comparator class named in configuration could not be resolved.
    #[error("unloadable comparator: {0}")]
    UnloadableComparator(String),

    /// A service specification named in configuration could not be resolved.
    #[error("unloadable specification: {0}")]
    UnloadableSpecification(String),

    /// Attempted to set or remove `service.id`, `service.pid`, or
    /// `instance.name` through a `TransformedReference` overlay.
    #[error("illegal property change: {0}")]
    IllegalPropertyChange(String),

    /// Attempted to change the binding policy or bundle context after
    /// `start()`.
    #[error("unsupported reconfiguration: {0}")]
    UnsupportedReconfiguration(String),
}
