use ipojo_types::{natural_order, Properties, PropertyValue, Reference, SERVICE_ID};
use std::cmp::Ordering;

fn reference(id: i64, ranking: i64) -> Reference {
    let mut props: Properties = Properties::new();
    props.insert(SERVICE_ID.to_string(), PropertyValue::Int(id));
    props.insert("service.ranking".to_string(), PropertyValue::Int(ranking));
    Reference::new(props)
}

#[test]
fn equality_and_hash_depend_only_on_service_id() {
    let a = reference(1, 0);
    let mut props: Properties = Properties::new();
    props.insert(SERVICE_ID.to_string(), PropertyValue::Int(1));
    props.insert("color".to_string(), PropertyValue::from("red"));
    let b = Reference::new(props);
    assert_eq!(a, b);
}

#[test]
fn natural_order_prefers_higher_ranking() {
    let high = reference(2, 10);
    let low = reference(1, 0);
    assert_eq!(natural_order(&high, &low), Ordering::Less);
}

#[test]
fn natural_order_breaks_ties_by_lower_service_id() {
    let first = reference(1, 5);
    let second = reference(2, 5);
    assert_eq!(natural_order(&first, &second), Ordering::Less);
}

#[test]
fn ranking_defaults_to_zero_when_absent() {
    let mut props: Properties = Properties::new();
    props.insert(SERVICE_ID.to_string(), PropertyValue::Int(7));
    let r = Reference::new(props);
    assert_eq!(r.ranking(), 0);
}

#[test]
#[should_panic(expected = "service.id")]
fn constructing_without_service_id_panics() {
    let props: Properties = Properties::new();
    let _ = Reference::new(props);
}
