use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use ipojo_core::ServiceObject;
use ipojo_types::{Properties, SERVICE_ID};

use crate::registry::{service_object, MockRegistry};

/// A single scripted mutation against a [`MockRegistry`], run from a
/// background thread (§5: "registry events may arrive on arbitrary
/// threads").
pub enum RegistryOp {
    /// Register a provider for `class` with `properties`, carrying a
    /// placeholder service object.
    Register {
        /// The service interface name.
        class: String,
        /// The provider's published properties (minus `service.id`, which
        /// the registry assigns).
        properties: Properties,
    },
    /// Update an already-registered provider's properties.
    Modify {
        /// The `service.id` of the provider to update.
        service_id: i64,
        /// The replacement property set.
        properties: Properties,
    },
    /// Deregister a provider.
    Unregister {
        /// The `service.id` of the provider to remove.
        service_id: i64,
    },
    /// Pause the script thread, to widen or narrow races deliberately.
    Sleep(Duration),
}

/// A running background script, as returned by [`spawn_script`].
pub struct ScriptHandle {
    join: JoinHandle<Vec<i64>>,
}

impl ScriptHandle {
    /// Block until the script thread finishes, returning the `service.id`
    /// assigned to each `Register` op, in script order.
    pub fn join(self) -> Vec<i64> {
        self.join.join().unwrap_or_default()
    }
}

/// Run `ops` against `registry` on a dedicated OS thread, returning a handle
/// to await completion.
///
/// This is how tests exercise genuinely concurrent `added`/`modified`/
/// `removed` delivery rather than simulating it single-threaded: the
/// resolver's listeners run on whatever thread `MockRegistry::publish` is
/// called from, exactly as an arbitrary OSGi framework thread would.
pub fn spawn_script(registry: Arc<MockRegistry>, ops: Vec<RegistryOp>) -> ScriptHandle {
    let join = std::thread::spawn(move || {
        let mut assigned_ids = Vec::new();
        for op in ops {
            match op {
                RegistryOp::Register { class, mut properties } => {
                    properties.remove(SERVICE_ID);
                    let placeholder: ServiceObject = service_object(());
                    let reference = registry.register(class, properties, placeholder);
                    assigned_ids.push(reference.service_id());
                }
                RegistryOp::Modify { service_id, properties } => {
                    registry.update_properties(service_id, properties);
                }
                RegistryOp::Unregister { service_id } => {
                    registry.unregister(service_id);
                }
                RegistryOp::Sleep(duration) => std::thread::sleep(duration),
            }
        }
        assigned_ids
    });
    ScriptHandle { join }
}
