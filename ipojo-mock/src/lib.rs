//! ipojo-mock
//!
//! An in-memory [`Registry`](ipojo_core::Registry) implementation used by
//! tests and doc examples in place of a real OSGi framework.
//!
//! - `registry`: `MockRegistry`, a thread-safe in-memory service registry
//!   supporting `register`/`update_properties`/`unregister` and delivering
//!   the resulting `added`/`modified`/`removed` events to subscribers.
//! - `script`: a background publisher thread that drives a scripted
//!   sequence of registry mutations, so tests can exercise genuinely
//!   concurrent event delivery (§5) instead of single-threaded simulation.
//! - `fixtures`: a handful of deterministic reference sets for examples and
//!   doc tests.
#![warn(missing_docs)]

mod fixtures;
mod registry;
mod script;

pub use fixtures::greeter_providers;
pub use registry::{service_object, MockRegistry};
pub use script::{spawn_script, RegistryOp, ScriptHandle};
