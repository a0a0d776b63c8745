//! ipojo-core
//!
//! Registry abstraction and tracked-reference pipeline shared by the
//! dependency resolver.
//!
//! - `registry`: the external, opaque `Registry` collaborator and the
//!   events it publishes.
//! - `tracker`: `RegistryTracker` (C2), the sole event source feeding a
//!   dependency's selected-services pipeline.
//! - `transformed`: `TransformedReference` (C1), the property-overlay view
//!   interceptors compose over raw references.
//! - `interceptor`: the `TrackingInterceptor` / `RankingInterceptor` trait
//!   interfaces (C3). Concrete implementations live in `ipojo-interceptors`.
//! - `change_set`: `ChangeSet`, the atomic diff the selected-services
//!   manager publishes to the dependency model.
//! - `identity`: the identity properties exposed for interceptor targeting.
//! - `context`: `InterceptableContext` (C6), the intercepting façade over
//!   the registry.
#![warn(missing_docs)]

mod change_set;
mod context;
mod error;
mod identity;
mod interceptor;
mod panic_guard;
mod registry;
mod tracker;
mod transformed;

pub use change_set::ChangeSet;
pub use context::{InterceptableContext, InterceptedEventKind, InterceptedServiceListener};
pub use error::IpojoError;
pub use identity::DependencyIdentity;
pub use interceptor::{RankingInterceptor, TrackingInterceptor};
pub use panic_guard::{catch_accept, catch_decorate};
pub use registry::{ListenerId, Registry, ServiceEvent, ServiceListener, ServiceObject};
pub use tracker::{Customizer, RegistryTracker};
pub use transformed::{ranking_order, strictly_equal, TransformedReference};
