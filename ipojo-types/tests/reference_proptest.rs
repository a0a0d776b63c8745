use std::cmp::Ordering;

use proptest::prelude::*;

use ipojo_types::{natural_order, Properties, PropertyValue, Reference, SERVICE_ID};

fn reference(id: i64, ranking: i64) -> Reference {
    let mut props: Properties = Properties::new();
    props.insert(SERVICE_ID.to_string(), PropertyValue::Int(id));
    props.insert("service.ranking".to_string(), PropertyValue::Int(ranking));
    Reference::new(props)
}

proptest! {
    /// `natural_order` is antisymmetric and consistent with `ranking`/
    /// `service_id`: swapping the arguments always produces the reverse
    /// ordering, for any two ids and rankings (§6).
    #[test]
    fn natural_order_is_antisymmetric(
        id_a in any::<i64>(), ranking_a in any::<i64>(),
        id_b in any::<i64>(), ranking_b in any::<i64>(),
    ) {
        prop_assume!(id_a != id_b);
        let a = reference(id_a, ranking_a);
        let b = reference(id_b, ranking_b);
        prop_assert_eq!(natural_order(&a, &b), natural_order(&b, &a).reverse());
    }

    /// Sorting any set of references by `natural_order` always yields
    /// non-increasing ranking, and within equal rankings, non-decreasing
    /// `service.id` (the OSGi tie-break).
    #[test]
    fn sorting_by_natural_order_is_rank_desc_then_id_asc(
        pairs in proptest::collection::vec((any::<i64>(), any::<i64>()), 0..20)
            .prop_filter("distinct service.id", |pairs| {
                let mut ids: Vec<i64> = pairs.iter().map(|&(id, _)| id).collect();
                ids.sort_unstable();
                ids.dedup();
                ids.len() == pairs.len()
            }),
    ) {
        let mut references: Vec<Reference> = pairs
            .iter()
            .map(|&(id, ranking)| reference(id, ranking))
            .collect();
        references.sort_by(natural_order);

        for window in references.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            prop_assert!(
                a.ranking() > b.ranking()
                    || (a.ranking() == b.ranking() && a.service_id() < b.service_id())
            );
        }
    }

    /// A reference always sorts equal to itself under `natural_order`, for
    /// any id and ranking.
    #[test]
    fn natural_order_is_reflexive(id in any::<i64>(), ranking in any::<i64>()) {
        let a = reference(id, ranking);
        let b = reference(id, ranking);
        prop_assert_eq!(natural_order(&a, &b), Ordering::Equal);
    }
}
