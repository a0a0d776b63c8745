use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use ipojo_core::{ListenerId, Registry, ServiceEvent, ServiceListener, ServiceObject};
use ipojo_types::{natural_order, LdapFilter, Properties, PropertyValue, Reference, SERVICE_ID};

struct Entry {
    class: String,
    reference: Reference,
    service: ServiceObject,
    borrows: usize,
}

struct Subscription {
    id: ListenerId,
    class: String,
    filter: Option<LdapFilter>,
    listener: Arc<dyn ServiceListener>,
}

#[derive(Default)]
struct Inner {
    services: IndexMap<i64, Entry>,
    subscriptions: Vec<Subscription>,
    next_service_id: i64,
    next_listener_id: u64,
}

/// An in-memory, thread-safe [`Registry`] (§6) with no modularity rules: all
/// references are visible to all queries regardless of who registered them.
///
/// Intended for tests and examples standing in for a real OSGi framework.
/// `register`/`update_properties`/`unregister` are the provider-side API;
/// `Registry` methods are the consumer-side API the resolver itself uses.
#[derive(Default)]
pub struct MockRegistry {
    inner: RwLock<Inner>,
}

impl MockRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new service provider for `class`, assigning it a fresh
    /// `service.id`. Publishes `Added` to every matching subscription.
    ///
    /// `properties` should not already carry `service.id`; one is assigned
    /// here and any caller-supplied value is overwritten.
    pub fn register(
        &self,
        class: impl Into<String>,
        mut properties: Properties,
        service: ServiceObject,
    ) -> Reference {
        let class = class.into();
        let reference = {
            let mut inner = self.inner.write();
            let id = inner.next_service_id;
            inner.next_service_id += 1;
            properties.insert(SERVICE_ID.to_string(), PropertyValue::Int(id));
            let reference = Reference::new(properties);
            inner.services.insert(
                id,
                Entry {
                    class: class.clone(),
                    reference: reference.clone(),
                    service,
                    borrows: 0,
                },
            );
            reference
        };
        self.publish(&class, ServiceEvent::Added(reference.clone()));
        reference
    }

    /// Replace a registered reference's properties in place (`service.id` is
    /// preserved). Publishes `Modified` to every matching subscription.
    ///
    /// No-op if `service_id` is not currently registered.
    pub fn update_properties(&self, service_id: i64, mut properties: Properties) {
        let (class, reference) = {
            let mut inner = self.inner.write();
            let Some(entry) = inner.services.get_mut(&service_id) else {
                return;
            };
            properties.insert(SERVICE_ID.to_string(), PropertyValue::Int(service_id));
            entry.reference = Reference::new(properties);
            (entry.class.clone(), entry.reference.clone())
        };
        self.publish(&class, ServiceEvent::Modified(reference));
    }

    /// Deregister a provider. Publishes `Removed` to every matching
    /// subscription. No-op if `service_id` is not currently registered.
    pub fn unregister(&self, service_id: i64) {
        let removed = {
            let mut inner = self.inner.write();
            inner.services.shift_remove(&service_id)
        };
        let Some(entry) = removed else { return };
        self.publish(&entry.class, ServiceEvent::Removed(entry.reference));
    }

    /// Number of outstanding `get_service` borrows for `service_id`, for
    /// tests asserting the unget discipline (P2, I5).
    #[must_use]
    pub fn outstanding_borrows(&self, service_id: i64) -> usize {
        self.inner
            .read()
            .services
            .get(&service_id)
            .map_or(0, |e| e.borrows)
    }

    fn publish(&self, class: &str, event: ServiceEvent) {
        let listeners: Vec<Arc<dyn ServiceListener>> = {
            let inner = self.inner.read();
            inner
                .subscriptions
                .iter()
                .filter(|s| s.class == class)
                .filter(|s| {
                    s.filter.as_ref().is_none_or(|f| match &event {
                        ServiceEvent::Added(r) | ServiceEvent::Modified(r) | ServiceEvent::Removed(r) => {
                            f.matches(r.properties())
                        }
                    })
                })
                .map(|s| s.listener.clone())
                .collect()
        };
        for listener in listeners {
            listener.service_changed(&event);
        }
    }

    fn matches(class: &str, filter: Option<&LdapFilter>, entry: &Entry) -> bool {
        entry.class == class && filter.is_none_or(|f| f.matches(entry.reference.properties()))
    }
}

impl Registry for MockRegistry {
    fn add_service_listener(
        &self,
        class: &str,
        filter: Option<LdapFilter>,
        listener: Arc<dyn ServiceListener>,
    ) -> ListenerId {
        let mut inner = self.inner.write();
        let id = ListenerId(inner.next_listener_id);
        inner.next_listener_id += 1;
        inner.subscriptions.push(Subscription {
            id,
            class: class.to_string(),
            filter,
            listener,
        });
        id
    }

    fn remove_service_listener(&self, id: ListenerId) {
        self.inner.write().subscriptions.retain(|s| s.id != id);
    }

    fn get_service_reference(&self, class: &str, filter: Option<&LdapFilter>) -> Option<Reference> {
        self.get_service_references(class, filter).into_iter().next()
    }

    fn get_service_references(&self, class: &str, filter: Option<&LdapFilter>) -> Vec<Reference> {
        let mut references: Vec<Reference> = self
            .inner
            .read()
            .services
            .values()
            .filter(|e| Self::matches(class, filter, e))
            .map(|e| e.reference.clone())
            .collect();
        references.sort_by(natural_order);
        references
    }

    fn get_all_service_references(&self, class: &str, filter: Option<&LdapFilter>) -> Vec<Reference> {
        self.get_service_references(class, filter)
    }

    fn get_service(&self, reference: &Reference) -> Option<ServiceObject> {
        let mut inner = self.inner.write();
        let entry = inner.services.get_mut(&reference.service_id())?;
        entry.borrows += 1;
        Some(entry.service.clone())
    }

    fn unget_service(&self, reference: &Reference) -> bool {
        let mut inner = self.inner.write();
        let Some(entry) = inner.services.get_mut(&reference.service_id()) else {
            return false;
        };
        if entry.borrows == 0 {
            return false;
        }
        entry.borrows -= 1;
        true
    }
}

/// Wrap any `Send + Sync` value as an opaque [`ServiceObject`] borrow, the
/// way a real registry would hand back a provider instance.
#[must_use]
pub fn service_object<T: Any + Send + Sync>(value: T) -> ServiceObject {
    Arc::new(value)
}
