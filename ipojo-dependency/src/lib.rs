//! ipojo-dependency
//!
//! The per-dependency state machine (C5, §4.5): binding policy, the
//! bound/service-object cache, listener dispatch, and the builder that
//! wires a dependency to a registry.
//!
//! - `model`: `DependencyModel`, reconciling `ChangeSet`s from
//!   `ipojo-interceptors`'s `SelectedServicesManager` against a binding
//!   policy.
//! - `listener`: `DependencyListener`, the callback seam a component
//!   lifecycle manager implements.
//! - `builder`: `DependencyBuilder`, the fluent construction facade.
//! - `error`: `DependencyError`.
#![warn(missing_docs)]

mod builder;
mod error;
mod listener;
mod model;

pub use builder::DependencyBuilder;
pub use error::DependencyError;
pub use ipojo_interceptors::Comparator;
pub use listener::{DependencyListener, NullListener};
pub use model::DependencyModel;
