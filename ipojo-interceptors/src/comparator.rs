use std::cmp::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;

use ipojo_core::{DependencyIdentity, RankingInterceptor, TransformedReference};

/// A user-supplied ordering over transformed references, named in
/// configuration by `comparator-class` (§6). The literal `"osgi"` selects
/// the standard natural-ranking comparator instead of installing this
/// interceptor at all.
pub trait Comparator: Send + Sync {
    /// Compare two references the way `Ord::cmp` would.
    fn compare(&self, a: &TransformedReference, b: &TransformedReference) -> Ordering;
}

/// Ranks `matching` using a caller-supplied [`Comparator`] instead of the
/// natural ranking order. Auto-installed under `DynamicPriority` when no
/// explicit comparator is configured (the natural comparator is used in
/// that case).
pub struct ComparatorRankingInterceptor {
    comparator: Arc<dyn Comparator>,
}

impl ComparatorRankingInterceptor {
    /// Wrap `comparator` as a ranking interceptor.
    #[must_use]
    pub fn new(comparator: Arc<dyn Comparator>) -> Self {
        Self { comparator }
    }

    fn rank(&self, matching: &IndexMap<i64, TransformedReference>) -> Vec<TransformedReference> {
        let mut selected: Vec<TransformedReference> = matching.values().cloned().collect();
        selected.sort_by(|a, b| self.comparator.compare(a, b));
        selected
    }
}

impl RankingInterceptor for ComparatorRankingInterceptor {
    fn get_service_references(
        &self,
        _dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
    ) -> Vec<TransformedReference> {
        self.rank(matching)
    }

    fn on_service_arrival(
        &self,
        _dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
        _arrival: &TransformedReference,
    ) -> Vec<TransformedReference> {
        self.rank(matching)
    }

    fn on_service_departure(
        &self,
        _dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
        _departure: &TransformedReference,
    ) -> Vec<TransformedReference> {
        self.rank(matching)
    }

    fn on_service_modified(
        &self,
        _dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
        _modified: &TransformedReference,
    ) -> Vec<TransformedReference> {
        self.rank(matching)
    }
}
