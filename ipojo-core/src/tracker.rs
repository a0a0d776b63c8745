use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use ipojo_types::Reference;

use crate::registry::{ListenerId, Registry, ServiceEvent, ServiceListener, ServiceObject};

/// Receives tracker events for a single dependency's tracked set (§4.2).
///
/// `adding` is a gate evaluated before the reference is recorded; returning
/// `false` drops the event entirely (the reference never joins `tracked`).
pub trait Customizer: Send + Sync {
    /// Decide whether this reference should be tracked at all.
    fn adding(&self, reference: &Reference) -> bool {
        let _ = reference;
        true
    }

    /// A reference passed `adding` and has been recorded as tracked.
    fn added(&self, reference: &Reference);

    /// A tracked reference's properties changed.
    fn modified(&self, reference: &Reference, service: Option<&ServiceObject>);

    /// A tracked reference departed; `service` is `Some` if it had been
    /// borrowed.
    fn removed(&self, reference: &Reference, service: Option<ServiceObject>);
}

/// Observes a [`Registry`] filtered by interface name, reporting
/// `added`/`modified`/`removed` to a [`Customizer`] (C2, §4.2).
///
/// The tracker is the sole event source in the pipeline: it never inspects
/// dependency filters or interceptors, both of which are the customizer's
/// concern (the `SelectedServicesManager`, in practice).
pub struct RegistryTracker {
    registry: Arc<dyn Registry>,
    interface_name: String,
    customizer: Arc<dyn Customizer>,
    tracked: RwLock<IndexMap<i64, Reference>>,
    borrowed: RwLock<IndexMap<i64, ServiceObject>>,
    listener_id: RwLock<Option<ListenerId>>,
}

impl RegistryTracker {
    /// Build a tracker. Call [`RegistryTracker::open`] to start receiving
    /// events.
    pub fn new(
        registry: Arc<dyn Registry>,
        interface_name: impl Into<String>,
        customizer: Arc<dyn Customizer>,
    ) -> Self {
        Self {
            registry,
            interface_name: interface_name.into(),
            customizer,
            tracked: RwLock::new(IndexMap::new()),
            borrowed: RwLock::new(IndexMap::new()),
            listener_id: RwLock::new(None),
        }
    }

    /// Subscribe to the registry and seed `tracked` with whatever already
    /// matches, in registration order.
    pub fn open(self: &Arc<Self>) {
        let listener: Arc<dyn ServiceListener> = self.clone();
        let id = self
            .registry
            .add_service_listener(&self.interface_name, None, listener);
        *self.listener_id.write() = Some(id);

        for reference in self
            .registry
            .get_service_references(&self.interface_name, None)
        {
            self.handle_added(reference);
        }
    }

    /// Every currently tracked reference, oldest registration first.
    #[must_use]
    pub fn current(&self) -> Vec<Reference> {
        self.tracked.read().values().cloned().collect()
    }

    /// Borrow the service behind `reference` from the underlying registry,
    /// recording it in `borrowed` so a later `unget_service`/`close` releases
    /// it and so `modified`/`removed` can hand the customizer the borrowed
    /// instance.
    #[must_use]
    pub fn get_service(&self, reference: &Reference) -> Option<ServiceObject> {
        let service = self.registry.get_service(reference)?;
        self.borrowed
            .write()
            .insert(reference.service_id(), service.clone());
        Some(service)
    }

    /// Release a borrow obtained through [`RegistryTracker::get_service`].
    pub fn unget_service(&self, reference: &Reference) -> bool {
        self.borrowed.write().shift_remove(&reference.service_id());
        self.registry.unget_service(reference)
    }

    /// Unsubscribe and release every borrowed service object.
    pub fn close(&self) {
        if let Some(id) = self.listener_id.write().take() {
            self.registry.remove_service_listener(id);
        }
        let ids: Vec<i64> = self.borrowed.read().keys().copied().collect();
        for id in ids {
            self.borrowed.write().shift_remove(&id);
            if let Some(reference) = self.tracked.read().get(&id) {
                self.registry.unget_service(reference);
            }
        }
        self.tracked.write().clear();
    }

    fn handle_added(&self, reference: Reference) {
        if !self.customizer.adding(&reference) {
            return;
        }
        self.tracked
            .write()
            .insert(reference.service_id(), reference.clone());
        self.customizer.added(&reference);
    }

    fn handle_modified(&self, reference: Reference) {
        let is_tracked = self.tracked.read().contains_key(&reference.service_id());
        if !is_tracked {
            return;
        }
        self.tracked
            .write()
            .insert(reference.service_id(), reference.clone());
        let service = self.borrowed.read().get(&reference.service_id()).cloned();
        self.customizer.modified(&reference, service.as_ref());
    }

    fn handle_removed(&self, reference: Reference) {
        let removed = self.tracked.write().shift_remove(&reference.service_id());
        if removed.is_none() {
            return;
        }
        let service = self.borrowed.write().shift_remove(&reference.service_id());
        self.customizer.removed(&reference, service);
    }
}

impl ServiceListener for RegistryTracker {
    fn service_changed(&self, event: &ServiceEvent) {
        match event {
            ServiceEvent::Added(reference) => self.handle_added(reference.clone()),
            ServiceEvent::Modified(reference) => self.handle_modified(reference.clone()),
            ServiceEvent::Removed(reference) => self.handle_removed(reference.clone()),
        }
    }
}
