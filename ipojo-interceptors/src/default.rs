use indexmap::IndexMap;

use ipojo_core::{ranking_order, DependencyIdentity, RankingInterceptor, TrackingInterceptor, TransformedReference};

/// The identity tracking interceptor: accepts every reference unchanged.
/// Installed implicitly when a dependency has no tracking interceptors of
/// its own and no filter configured.
#[derive(Debug, Default)]
pub struct DefaultTrackingInterceptor;

impl TrackingInterceptor for DefaultTrackingInterceptor {
    fn accept(
        &self,
        _dependency: &DependencyIdentity,
        reference: TransformedReference,
    ) -> Option<TransformedReference> {
        Some(reference)
    }
}

/// The identity ranking interceptor: orders `matching` by the natural
/// ranking comparator (highest `service.ranking` first, ties broken by
/// lowest `service.id`).
#[derive(Debug, Default)]
pub struct DefaultRankingInterceptor;

impl DefaultRankingInterceptor {
    fn rank(matching: &IndexMap<i64, TransformedReference>) -> Vec<TransformedReference> {
        let mut selected: Vec<TransformedReference> = matching.values().cloned().collect();
        selected.sort_by(ranking_order);
        selected
    }
}

impl RankingInterceptor for DefaultRankingInterceptor {
    fn get_service_references(
        &self,
        _dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
    ) -> Vec<TransformedReference> {
        Self::rank(matching)
    }

    fn on_service_arrival(
        &self,
        _dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
        _arrival: &TransformedReference,
    ) -> Vec<TransformedReference> {
        Self::rank(matching)
    }

    fn on_service_departure(
        &self,
        _dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
        _departure: &TransformedReference,
    ) -> Vec<TransformedReference> {
        Self::rank(matching)
    }

    fn on_service_modified(
        &self,
        _dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
        _modified: &TransformedReference,
    ) -> Vec<TransformedReference> {
        Self::rank(matching)
    }
}
