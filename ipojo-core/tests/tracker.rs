use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use ipojo_core::{
    Customizer, ListenerId, Registry, RegistryTracker, ServiceEvent, ServiceListener,
    ServiceObject,
};
use ipojo_types::{LdapFilter, Properties, PropertyValue, Reference, SERVICE_ID};

struct FakeRegistry {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn ServiceListener>)>>,
    refs: Mutex<Vec<Reference>>,
    next_id: AtomicI64,
    ungets: AtomicI64,
}

impl FakeRegistry {
    fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            refs: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(0),
            ungets: AtomicI64::new(0),
        }
    }

    fn publish(&self, event: ServiceEvent) {
        if let ServiceEvent::Added(r) = &event {
            self.refs.lock().unwrap().push(r.clone());
        }
        for (_, listener) in self.listeners.lock().unwrap().iter() {
            listener.service_changed(&event);
        }
    }
}

impl Registry for FakeRegistry {
    fn add_service_listener(
        &self,
        _class: &str,
        _filter: Option<LdapFilter>,
        listener: Arc<dyn ServiceListener>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, AtomicOrdering::SeqCst) as u64);
        self.listeners.lock().unwrap().push((id, listener));
        id
    }

    fn remove_service_listener(&self, id: ListenerId) {
        self.listeners.lock().unwrap().retain(|(i, _)| *i != id);
    }

    fn get_service_reference(&self, _class: &str, _filter: Option<&LdapFilter>) -> Option<Reference> {
        self.refs.lock().unwrap().first().cloned()
    }

    fn get_service_references(&self, _class: &str, _filter: Option<&LdapFilter>) -> Vec<Reference> {
        self.refs.lock().unwrap().clone()
    }

    fn get_all_service_references(
        &self,
        class: &str,
        filter: Option<&LdapFilter>,
    ) -> Vec<Reference> {
        self.get_service_references(class, filter)
    }

    fn get_service(&self, _reference: &Reference) -> Option<ServiceObject> {
        Some(Arc::new(()))
    }

    fn unget_service(&self, _reference: &Reference) -> bool {
        self.ungets.fetch_add(1, AtomicOrdering::SeqCst);
        true
    }
}

fn reference(id: i64) -> Reference {
    let mut props = Properties::new();
    props.insert(SERVICE_ID.to_string(), PropertyValue::Int(id));
    Reference::new(props)
}

#[derive(Default)]
struct RecordingCustomizer {
    added: Mutex<Vec<i64>>,
    removed: Mutex<Vec<i64>>,
    modified_with_service: Mutex<Vec<bool>>,
    removed_with_service: Mutex<Vec<bool>>,
}

impl Customizer for RecordingCustomizer {
    fn added(&self, reference: &Reference) {
        self.added.lock().unwrap().push(reference.service_id());
    }

    fn modified(&self, _reference: &Reference, service: Option<&ServiceObject>) {
        self.modified_with_service.lock().unwrap().push(service.is_some());
    }

    fn removed(&self, reference: &Reference, service: Option<ServiceObject>) {
        self.removed.lock().unwrap().push(reference.service_id());
        self.removed_with_service.lock().unwrap().push(service.is_some());
    }
}

#[test]
fn tracker_reports_added_then_removed_in_order() {
    let registry = Arc::new(FakeRegistry::new());
    let customizer = Arc::new(RecordingCustomizer::default());
    let tracker = Arc::new(RegistryTracker::new(
        registry.clone(),
        "com.example.Foo",
        customizer.clone(),
    ));
    tracker.open();

    registry.publish(ServiceEvent::Added(reference(1)));
    registry.publish(ServiceEvent::Removed(reference(1)));

    assert_eq!(*customizer.added.lock().unwrap(), vec![1]);
    assert_eq!(*customizer.removed.lock().unwrap(), vec![1]);
    assert!(tracker.current().is_empty());
}

#[test]
fn tracker_current_reflects_tracked_set() {
    let registry = Arc::new(FakeRegistry::new());
    let customizer = Arc::new(RecordingCustomizer::default());
    let tracker = Arc::new(RegistryTracker::new(
        registry.clone(),
        "com.example.Foo",
        customizer,
    ));
    tracker.open();

    registry.publish(ServiceEvent::Added(reference(1)));
    registry.publish(ServiceEvent::Added(reference(2)));

    let ids: Vec<i64> = tracker.current().iter().map(Reference::service_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn close_clears_tracked_set() {
    let registry = Arc::new(FakeRegistry::new());
    let customizer = Arc::new(RecordingCustomizer::default());
    let tracker = Arc::new(RegistryTracker::new(
        registry.clone(),
        "com.example.Foo",
        customizer,
    ));
    tracker.open();
    registry.publish(ServiceEvent::Added(reference(1)));
    tracker.close();
    assert!(tracker.current().is_empty());
}

#[test]
fn get_service_is_visible_to_modified_and_removed_until_ungot() {
    let registry = Arc::new(FakeRegistry::new());
    let customizer = Arc::new(RecordingCustomizer::default());
    let tracker = Arc::new(RegistryTracker::new(
        registry.clone(),
        "com.example.Foo",
        customizer.clone(),
    ));
    tracker.open();
    registry.publish(ServiceEvent::Added(reference(1)));

    assert!(tracker.get_service(&reference(1)).is_some());
    registry.publish(ServiceEvent::Modified(reference(1)));
    assert_eq!(*customizer.modified_with_service.lock().unwrap(), vec![true]);

    assert!(tracker.unget_service(&reference(1)));
    registry.publish(ServiceEvent::Removed(reference(1)));
    assert_eq!(*customizer.removed_with_service.lock().unwrap(), vec![false]);
}

#[test]
fn close_releases_an_outstanding_borrow() {
    let registry = Arc::new(FakeRegistry::new());
    let customizer = Arc::new(RecordingCustomizer::default());
    let tracker = Arc::new(RegistryTracker::new(
        registry.clone(),
        "com.example.Foo",
        customizer,
    ));
    tracker.open();
    registry.publish(ServiceEvent::Added(reference(1)));
    tracker.get_service(&reference(1));

    assert_eq!(registry.ungets.load(AtomicOrdering::SeqCst), 0);
    tracker.close();
    assert_eq!(registry.ungets.load(AtomicOrdering::SeqCst), 1);
}
