use std::sync::Arc;

use proptest::prelude::*;

use ipojo_dependency::{DependencyBuilder, NullListener};
use ipojo_mock::{service_object, MockRegistry};
use ipojo_types::{BindingPolicy, Properties, PropertyValue};

const SPEC: &str = "org.example.Widget";

fn register(registry: &MockRegistry, ranking: i64) -> i64 {
    let mut props = Properties::new();
    props.insert("service.ranking".into(), PropertyValue::Int(ranking));
    registry
        .register(SPEC, props, service_object(42u32))
        .service_id()
}

proptest! {
    /// An aggregate `Dynamic` dependency with nothing ever borrowed always
    /// rebinds freely (§4.5), so after every registration `bound` is exactly
    /// the natural-order sort (ranking desc, `service.id` asc) of everything
    /// currently registered — for any sequence of rankings.
    #[test]
    fn aggregate_dynamic_bound_always_matches_natural_order(
        rankings in proptest::collection::vec(-20i64..20i64, 0..12),
    ) {
        let registry = MockRegistry::new();
        let model = DependencyBuilder::new(SPEC)
            .instance_name("test-instance")
            .dependency_id("dep-0")
            .aggregate(true)
            .optional(true)
            .policy(BindingPolicy::Dynamic)
            .registry(registry.clone())
            .listener(Arc::new(NullListener))
            .build()
            .expect("dependency builds");
        model.start();

        let mut registered: Vec<(i64, i64)> = Vec::new();
        for ranking in rankings {
            let id = register(&registry, ranking);
            registered.push((id, ranking));

            let mut expected = registered.clone();
            expected.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            let expected_ids: Vec<i64> = expected.into_iter().map(|(id, _)| id).collect();

            let bound_ids: Vec<i64> = model.bound().iter().map(|r| r.service_id()).collect();
            prop_assert_eq!(bound_ids, expected_ids);
        }
    }

    /// The same dependency, but optional: `bound.len()` always equals the
    /// number of providers registered so far, since `Dynamic` + aggregate +
    /// optional never drops a reference once it has arrived and nothing is
    /// ever unregistered in this sequence.
    #[test]
    fn aggregate_dynamic_bound_length_tracks_registration_count(
        rankings in proptest::collection::vec(-5i64..5i64, 0..12),
    ) {
        let registry = MockRegistry::new();
        let model = DependencyBuilder::new(SPEC)
            .instance_name("test-instance")
            .dependency_id("dep-0")
            .aggregate(true)
            .optional(true)
            .policy(BindingPolicy::Dynamic)
            .registry(registry.clone())
            .listener(Arc::new(NullListener))
            .build()
            .expect("dependency builds");
        model.start();

        for (count, ranking) in rankings.into_iter().enumerate() {
            register(&registry, ranking);
            prop_assert_eq!(model.bound().len(), count + 1);
        }
    }
}
