use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ipojo_core::{ListenerId, Registry, ServiceEvent, ServiceListener};
use ipojo_mock::{service_object, spawn_script, MockRegistry, RegistryOp};
use ipojo_types::{Properties, PropertyValue};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
    count: AtomicUsize,
}

impl ServiceListener for Recorder {
    fn service_changed(&self, event: &ServiceEvent) {
        self.count.fetch_add(1, Ordering::SeqCst);
        let label = match event {
            ServiceEvent::Added(r) => format!("added:{}", r.service_id()),
            ServiceEvent::Modified(r) => format!("modified:{}", r.service_id()),
            ServiceEvent::Removed(r) => format!("removed:{}", r.service_id()),
        };
        self.events.lock().unwrap().push(label);
    }
}

#[test]
fn register_delivers_added_to_matching_listeners() {
    let registry = MockRegistry::new();
    let recorder = Arc::new(Recorder::default());
    let _id: ListenerId =
        registry.add_service_listener("org.example.Greeter", None, recorder.clone());

    let mut props = Properties::new();
    props.insert("service.ranking".into(), PropertyValue::Int(0));
    registry.register("org.example.Greeter", props, service_object(()));

    assert_eq!(*recorder.events.lock().unwrap(), vec!["added:0"]);
}

#[test]
fn listener_filtered_by_class_does_not_see_other_classes() {
    let registry = MockRegistry::new();
    let recorder = Arc::new(Recorder::default());
    registry.add_service_listener("org.example.Greeter", None, recorder.clone());

    registry.register("org.other.Thing", Properties::new(), service_object(()));

    assert!(recorder.events.lock().unwrap().is_empty());
}

#[test]
fn update_and_unregister_publish_in_order() {
    let registry = MockRegistry::new();
    let recorder = Arc::new(Recorder::default());
    registry.add_service_listener("org.example.Greeter", None, recorder.clone());

    let reference = registry.register("org.example.Greeter", Properties::new(), service_object(()));
    registry.update_properties(reference.service_id(), Properties::new());
    registry.unregister(reference.service_id());

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["added:0", "modified:0", "removed:0"]
    );
}

#[test]
fn get_service_tracks_outstanding_borrows() {
    let registry = MockRegistry::new();
    let reference = registry.register("org.example.Greeter", Properties::new(), service_object(()));

    let borrowed = registry.get_service(&reference);
    assert!(borrowed.is_some());
    assert_eq!(registry.outstanding_borrows(reference.service_id()), 1);

    assert!(registry.unget_service(&reference));
    assert_eq!(registry.outstanding_borrows(reference.service_id()), 0);
    assert!(!registry.unget_service(&reference));
}

#[test]
fn scripted_events_arrive_on_a_background_thread() {
    let registry = MockRegistry::new();
    let recorder = Arc::new(Recorder::default());
    registry.add_service_listener("org.example.Greeter", None, recorder.clone());

    let handle = spawn_script(
        registry.clone(),
        vec![
            RegistryOp::Register {
                class: "org.example.Greeter".into(),
                properties: Properties::new(),
            },
            RegistryOp::Sleep(Duration::from_millis(5)),
            RegistryOp::Register {
                class: "org.example.Greeter".into(),
                properties: Properties::new(),
            },
        ],
    );
    let ids = handle.join();

    assert_eq!(ids.len(), 2);
    assert_eq!(recorder.count.load(Ordering::SeqCst), 2);
}
