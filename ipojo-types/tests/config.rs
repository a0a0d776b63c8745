use ipojo_types::BindingPolicy;
use std::str::FromStr;

#[test]
fn binding_policy_parses_kebab_case_literals() {
    assert_eq!(BindingPolicy::from_str("dynamic").unwrap(), BindingPolicy::Dynamic);
    assert_eq!(BindingPolicy::from_str("static").unwrap(), BindingPolicy::Static);
    assert_eq!(
        BindingPolicy::from_str("dynamic-priority").unwrap(),
        BindingPolicy::DynamicPriority
    );
}

#[test]
fn binding_policy_rejects_unknown_literal() {
    assert!(BindingPolicy::from_str("eager").is_err());
}

#[test]
fn binding_policy_defaults_to_dynamic() {
    assert_eq!(BindingPolicy::default(), BindingPolicy::Dynamic);
}

#[test]
fn dependency_config_deserializes_from_json_with_defaults() {
    let json = r#"{"specification": "com.example.Foo"}"#;
    let config: ipojo_types::DependencyConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.specification, "com.example.Foo");
    assert!(!config.aggregate);
    assert!(!config.optional);
    assert!(config.filter.is_none());
    assert_eq!(config.policy, BindingPolicy::Dynamic);
}

#[test]
fn dependency_config_reads_comparator_class_kebab_key() {
    let json = r#"{
        "specification": "com.example.Foo",
        "comparator-class": "com.example.FooComparator",
        "policy": "static"
    }"#;
    let config: ipojo_types::DependencyConfig = serde_json::from_str(json).unwrap();
    assert_eq!(
        config.comparator_class.as_deref(),
        Some("com.example.FooComparator")
    );
    assert_eq!(config.policy, BindingPolicy::Static);
}
