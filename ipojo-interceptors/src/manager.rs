use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use ipojo_core::{strictly_equal, ChangeSet, DependencyIdentity, RankingInterceptor, TrackingInterceptor, TransformedReference};
use ipojo_types::{LdapFilter, Reference};

use crate::chain::TrackingChain;
use crate::default::DefaultRankingInterceptor;

/// Owns the `matching` and `selected` sets for one dependency, applies the
/// tracking and ranking interceptor chains, and emits [`ChangeSet`]s (C4,
/// §4.4).
pub struct SelectedServicesManager {
    dependency: Arc<DependencyIdentity>,
    tracking: TrackingChain,
    ranking: Arc<dyn RankingInterceptor>,
    matching: IndexMap<i64, TransformedReference>,
    selected: Vec<TransformedReference>,
}

impl SelectedServicesManager {
    /// An empty manager for `dependency`, with the identity tracking chain
    /// and natural-order ranking interceptor installed.
    #[must_use]
    pub fn new(dependency: Arc<DependencyIdentity>) -> Self {
        Self {
            dependency,
            tracking: TrackingChain::new(),
            ranking: Arc::new(DefaultRankingInterceptor),
            matching: IndexMap::new(),
            selected: Vec::new(),
        }
    }

    /// The current matching set, keyed by `service.id`, in acceptance
    /// order (I1, I2).
    #[must_use]
    pub fn matching(&self) -> &IndexMap<i64, TransformedReference> {
        &self.matching
    }

    /// The current selected set, in ranking-interceptor order.
    #[must_use]
    pub fn selected(&self) -> &[TransformedReference] {
        &self.selected
    }

    /// The dependency's configured filter, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&LdapFilter> {
        self.tracking.filter()
    }

    /// A snapshot of the tracking-interceptor chain, for running
    /// `get_service`/`unget_service` hooks outside the dependency's lock.
    #[must_use]
    pub fn tracking_interceptors(&self) -> Vec<Arc<dyn TrackingInterceptor>> {
        self.tracking.interceptors()
    }

    /// Reconfigure the filter and rebuild `matching`/`selected` from
    /// `tracked` (§4.4 "interceptor churn").
    pub fn set_filter(
        &mut self,
        filter: Option<LdapFilter>,
        tracked: impl IntoIterator<Item = Reference>,
    ) -> ChangeSet {
        self.tracking.set_filter(filter);
        self.rebuild(tracked)
    }

    /// Install a tracking interceptor and rebuild from `tracked`. The caller
    /// has already checked the interceptor's target and called `open`
    /// outside any lock (§5); this only mutates the chain.
    pub fn push_tracking_interceptor(
        &mut self,
        interceptor: Arc<dyn TrackingInterceptor>,
        tracked: impl IntoIterator<Item = Reference>,
    ) -> ChangeSet {
        self.tracking.push(interceptor);
        self.rebuild(tracked)
    }

    /// The currently installed ranking interceptor, so a caller can `close`
    /// it outside any lock before installing a replacement.
    #[must_use]
    pub fn ranking_interceptor(&self) -> Arc<dyn RankingInterceptor> {
        self.ranking.clone()
    }

    /// Replace the ranking interceptor and re-rank `matching` from scratch.
    /// The caller is responsible for calling the prior interceptor's `close`
    /// and the new one's `open` outside any lock (§5) — this only swaps the
    /// field and recomputes `selected`.
    pub fn set_ranking_interceptor(&mut self, ranking: Arc<dyn RankingInterceptor>) -> ChangeSet {
        self.ranking = ranking;
        let new_selected = self
            .ranking
            .get_service_references(&self.dependency, &self.matching);
        self.apply_new_selected(new_selected)
    }

    /// Re-run the whole accept chain over `tracked`, rebuild `matching`,
    /// re-rank, and diff against the prior `selected` (§4.4).
    pub fn rebuild(&mut self, tracked: impl IntoIterator<Item = Reference>) -> ChangeSet {
        let accepted = self.tracking.accept_all(&self.dependency, tracked);
        self.matching = accepted
            .into_iter()
            .map(|tr| (tr.service_id(), tr))
            .collect();
        let new_selected = self
            .ranking
            .get_service_references(&self.dependency, &self.matching);
        self.apply_new_selected(new_selected)
    }

    /// Handle a tracker `added` event.
    pub fn on_added(&mut self, reference: Reference) -> Option<ChangeSet> {
        let tr = self.tracking.accept(&self.dependency, reference)?;
        self.matching.insert(tr.service_id(), tr.clone());
        let new_selected = self
            .ranking
            .on_service_arrival(&self.dependency, &self.matching, &tr);
        Some(self.apply_new_selected(new_selected))
    }

    /// Handle a tracker `modified` event (§4.4).
    pub fn on_modified(&mut self, reference: Reference) -> Option<ChangeSet> {
        let id = reference.service_id();
        let was_matching = self.matching.contains_key(&id);

        match self.tracking.accept(&self.dependency, reference.clone()) {
            None if was_matching => {
                let departed = self.matching.shift_remove(&id)?;
                let new_selected =
                    self.ranking
                        .on_service_departure(&self.dependency, &self.matching, &departed);
                Some(self.apply_new_selected(new_selected))
            }
            None => None,
            Some(tr) if was_matching => {
                let prior = self.matching.get(&id).cloned()?;
                if strictly_equal(&prior, &tr) {
                    return None;
                }
                self.matching.insert(id, tr.clone());
                let new_selected =
                    self.ranking
                        .on_service_modified(&self.dependency, &self.matching, &tr);
                let mut change_set = self.apply_new_selected(new_selected);
                change_set.service = Some(reference);
                change_set.modified = Some(tr);
                Some(change_set)
            }
            Some(tr) => {
                self.matching.insert(id, tr.clone());
                let new_selected =
                    self.ranking
                        .on_service_arrival(&self.dependency, &self.matching, &tr);
                Some(self.apply_new_selected(new_selected))
            }
        }
    }

    /// Handle a tracker `removed` event.
    pub fn on_removed(&mut self, reference: Reference) -> Option<ChangeSet> {
        let departed = self.matching.shift_remove(&reference.service_id())?;
        let new_selected =
            self.ranking
                .on_service_departure(&self.dependency, &self.matching, &departed);
        Some(self.apply_new_selected(new_selected))
    }

    fn apply_new_selected(&mut self, new_selected: Vec<TransformedReference>) -> ChangeSet {
        let old_first = self.selected.first().cloned();
        let old_selected = std::mem::replace(&mut self.selected, new_selected.clone());
        let (arrivals, departures) = diff(&old_selected, &new_selected);
        let new_first = self.selected.first().cloned();
        ChangeSet {
            selected: new_selected,
            arrivals,
            departures,
            old_first,
            new_first,
            service: None,
            modified: None,
        }
    }
}

fn diff(
    old: &[TransformedReference],
    new: &[TransformedReference],
) -> (Vec<TransformedReference>, Vec<TransformedReference>) {
    let old_ids: HashSet<i64> = old.iter().map(TransformedReference::service_id).collect();
    let new_ids: HashSet<i64> = new.iter().map(TransformedReference::service_id).collect();
    let arrivals = new
        .iter()
        .filter(|r| !old_ids.contains(&r.service_id()))
        .cloned()
        .collect();
    let departures = old
        .iter()
        .filter(|r| !new_ids.contains(&r.service_id()))
        .cloned()
        .collect();
    (arrivals, departures)
}
