use thiserror::Error;

/// Errors raised while parsing or validating the shared data model.
///
/// These are configuration-time faults (§7): malformed filter syntax or an
/// unrecognised binding policy literal. Both are fatal for the call that
/// produced them and leave any prior state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// The LDAP filter string could not be parsed.
    #[error("invalid filter syntax: {0}")]
    InvalidFilterSyntax(String),

    /// The `policy` configuration literal did not match `dynamic`, `static`,
    /// or `dynamic-priority`.
    #[error("unknown binding policy: {0}")]
    UnknownPolicy(String),
}
