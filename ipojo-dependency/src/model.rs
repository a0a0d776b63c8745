use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;

use ipojo_core::{
    catch_decorate, ChangeSet, Customizer, DependencyIdentity, RankingInterceptor, Registry,
    RegistryTracker, ServiceObject, TrackingInterceptor, TransformedReference,
};
use ipojo_interceptors::{Comparator, ComparatorRankingInterceptor, DefaultRankingInterceptor, SelectedServicesManager};
use ipojo_types::{BindingPolicy, DependencyState, LdapFilter, Reference};

use crate::listener::DependencyListener;

struct Inner {
    aggregate: bool,
    optional: bool,
    policy: BindingPolicy,
    filter: Option<LdapFilter>,
    comparator: Option<Arc<dyn Comparator>>,
    tracking_interceptors: Vec<Arc<dyn TrackingInterceptor>>,
    manager: SelectedServicesManager,
    state: DependencyState,
    bound: Vec<TransformedReference>,
    service_objects: IndexMap<i64, ServiceObject>,
}

/// Per-dependency state machine (C5, §4.5).
///
/// Owns the [`SelectedServicesManager`] (C4) and reconciles its
/// [`ChangeSet`]s against a binding policy to maintain `bound`, the
/// dependency's injected references, and `state`, its resolution status.
/// Every mutation of shared state happens under a single re-entrant-free
/// lock; every listener callback fires after the lock is released (§5).
pub struct DependencyModel {
    identity: Arc<DependencyIdentity>,
    registry: Arc<dyn Registry>,
    specification: String,
    listener: Arc<dyn DependencyListener>,
    tracker: RwLock<Option<Arc<RegistryTracker>>>,
    inner: RwLock<Inner>,
}

impl DependencyModel {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        identity: Arc<DependencyIdentity>,
        registry: Arc<dyn Registry>,
        specification: String,
        aggregate: bool,
        optional: bool,
        policy: BindingPolicy,
        filter: Option<LdapFilter>,
        comparator: Option<Arc<dyn Comparator>>,
        listener: Arc<dyn DependencyListener>,
    ) -> Arc<Self> {
        let mut manager = SelectedServicesManager::new(identity.clone());
        if let Some(f) = filter.clone() {
            manager.set_filter(Some(f), std::iter::empty());
        }
        if let Some(c) = comparator.clone() {
            let ranking: Arc<dyn RankingInterceptor> = Arc::new(ComparatorRankingInterceptor::new(c));
            ranking.open(&identity);
            manager.set_ranking_interceptor(ranking);
        }
        Arc::new(Self {
            identity,
            registry,
            specification,
            listener,
            tracker: RwLock::new(None),
            inner: RwLock::new(Inner {
                aggregate,
                optional,
                policy,
                filter,
                comparator,
                tracking_interceptors: Vec::new(),
                manager,
                state: DependencyState::Unresolved,
                bound: Vec::new(),
                service_objects: IndexMap::new(),
            }),
        })
    }

    /// The service specification this dependency queries.
    #[must_use]
    pub fn specification(&self) -> &str {
        &self.specification
    }

    /// The identity properties exposed for interceptor targeting.
    #[must_use]
    pub fn identity(&self) -> &Arc<DependencyIdentity> {
        &self.identity
    }

    /// The current resolution state.
    #[must_use]
    pub fn state(&self) -> DependencyState {
        self.inner.read().state
    }

    /// The references currently injected into the component, in binding
    /// order (I3).
    #[must_use]
    pub fn bound(&self) -> Vec<TransformedReference> {
        self.inner.read().bound.clone()
    }

    /// Whether `bound` is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().bound.is_empty()
    }

    /// `bound.first()`, the scalar-dependency convenience accessor.
    #[must_use]
    pub fn first_service(&self) -> Option<TransformedReference> {
        self.inner.read().bound.first().cloned()
    }

    /// Whether this dependency is bound to more than a single reference.
    #[must_use]
    pub fn aggregate(&self) -> bool {
        self.inner.read().aggregate
    }

    /// Subscribe to the registry and seed `matching`/`selected`/`bound`
    /// from whatever already satisfies the specification (C2 §4.2).
    pub fn start(self: &Arc<Self>) {
        let customizer: Arc<dyn Customizer> = Arc::new(ModelCustomizer {
            model: Arc::downgrade(self),
        });
        let tracker = Arc::new(RegistryTracker::new(
            self.registry.clone(),
            self.specification.clone(),
            customizer,
        ));
        *self.tracker.write() = Some(tracker.clone());
        tracker.open();
    }

    /// Unsubscribe, release every borrowed service object, and return to
    /// `Unresolved` (I5). The only way to recover from `Broken` (§7).
    pub fn stop(&self) {
        if let Some(tracker) = self.tracker.write().take() {
            tracker.close();
        }

        let (bound, borrowed_ids, tracking_interceptors, filter, comparator) = {
            let mut inner = self.inner.write();
            let tracking_interceptors = inner.tracking_interceptors.clone();
            let bound = std::mem::take(&mut inner.bound);
            let borrowed_ids: Vec<i64> = inner.service_objects.keys().copied().collect();
            inner.service_objects.clear();
            inner.state = DependencyState::Unresolved;
            (
                bound,
                borrowed_ids,
                tracking_interceptors,
                inner.filter.clone(),
                inner.comparator.clone(),
            )
        };

        // Every interceptor `close`/`open` below runs with no lock held
        // (§5): a re-entrant call back into this dependency must not
        // deadlock on a write guard we're still holding.
        for interceptor in &tracking_interceptors {
            interceptor.close(&self.identity);
        }
        for interceptor in &tracking_interceptors {
            interceptor.open(&self.identity);
        }
        let ranking: Option<Arc<dyn RankingInterceptor>> = comparator.clone().map(|c| {
            let ranking: Arc<dyn RankingInterceptor> = Arc::new(ComparatorRankingInterceptor::new(c));
            ranking.open(&self.identity);
            ranking
        });

        {
            let mut inner = self.inner.write();
            let mut manager = SelectedServicesManager::new(self.identity.clone());
            if let Some(filter) = filter {
                manager.set_filter(Some(filter), std::iter::empty());
            }
            for interceptor in tracking_interceptors {
                manager.push_tracking_interceptor(interceptor, std::iter::empty());
            }
            if let Some(ranking) = ranking {
                manager.set_ranking_interceptor(ranking);
            }
            inner.manager = manager;
        }

        for id in borrowed_ids {
            if let Some(reference) = bound.iter().find(|r| r.service_id() == id) {
                self.release(reference);
            }
        }
    }

    /// Reconfigure the dependency's filter and rebuild `matching`/`selected`
    /// from the current tracked set (§4.5 "Reconfiguration").
    pub fn set_filter(&self, filter: Option<LdapFilter>) {
        let tracked = self.tracked_snapshot();
        let change_set = {
            let mut inner = self.inner.write();
            inner.filter = filter.clone();
            inner.manager.set_filter(filter, tracked)
        };
        self.reconcile(change_set, true);
    }

    /// Reconfigure the dependency's comparator. `None` restores natural
    /// ranking order.
    pub fn set_comparator(&self, comparator: Option<Arc<dyn Comparator>>) {
        let new_ranking: Arc<dyn RankingInterceptor> = match &comparator {
            Some(c) => Arc::new(ComparatorRankingInterceptor::new(c.clone())),
            None => Arc::new(DefaultRankingInterceptor),
        };
        // §5: no lock held across user interceptor `open`/`close`.
        let old_ranking = self.inner.read().manager.ranking_interceptor();
        old_ranking.close(&self.identity);
        new_ranking.open(&self.identity);

        let change_set = {
            let mut inner = self.inner.write();
            inner.comparator = comparator;
            inner.manager.set_ranking_interceptor(new_ranking)
        };
        self.reconcile(change_set, true);
    }

    /// Reconfigure whether this dependency tracks the whole selected set
    /// rather than a single bound service. Does not itself change `bound`;
    /// the next `ChangeSet` reconciles under the new cardinality.
    pub fn set_aggregate(&self, aggregate: bool) {
        self.inner.write().aggregate = aggregate;
    }

    /// Reconfigure whether an empty selected set leaves this dependency
    /// `Resolved` or `Unresolved`, firing `validate`/`invalidate` if the
    /// state actually changes.
    pub fn set_optionality(&self, optional: bool) {
        let (before, after) = {
            let mut inner = self.inner.write();
            let before = inner.state;
            inner.optional = optional;
            let matching_empty = inner.manager.matching().is_empty();
            inner.state = if inner.optional || !matching_empty {
                DependencyState::Resolved
            } else {
                DependencyState::Unresolved
            };
            (before, inner.state)
        };
        self.fire_state_transition(before, after);
    }

    /// Install a tracking interceptor and rebuild `matching`/`selected`
    /// from the current tracked set (§4.4 "interceptor churn").
    pub fn push_tracking_interceptor(&self, interceptor: Arc<dyn TrackingInterceptor>) {
        if !self.identity.matches_target(interceptor.target()) {
            return;
        }
        // §5: `open` runs before any lock is taken, so a re-entrant `open`
        // that calls back into this dependency cannot deadlock on it.
        interceptor.open(&self.identity);

        let tracked = self.tracked_snapshot();
        let change_set = {
            let mut inner = self.inner.write();
            inner.tracking_interceptors.push(interceptor.clone());
            inner.manager.push_tracking_interceptor(interceptor, tracked)
        };
        self.reconcile(change_set, true);
    }

    /// Borrow the service instance behind `reference`, running the tracking
    /// chain's `get_service` hooks left-to-right first, and caching the
    /// result so `stop()`/a later departure can release it (I5).
    #[must_use]
    pub fn get_service(&self, reference: &TransformedReference) -> Option<ServiceObject> {
        let tracker = self.tracker.read().clone()?;
        let raw = tracker.get_service(reference.initial_reference())?;
        let interceptors = {
            let inner = self.inner.read();
            inner.manager.tracking_interceptors()
        };
        let service = interceptors.iter().enumerate().fold(raw, |svc, (position, interceptor)| {
            let fallback = svc.clone();
            let label = format!("tracking_interceptor[{position}]::get_service");
            catch_decorate(&label, fallback, || interceptor.get_service(&self.identity, svc, reference))
        });
        self.inner
            .write()
            .service_objects
            .insert(reference.service_id(), service.clone());
        Some(service)
    }

    /// Release a borrow obtained through `get_service`: cache first, then
    /// the registry borrow (§4.5).
    pub fn unget_service(&self, reference: &TransformedReference, last_use: bool) -> bool {
        let interceptors = {
            let inner = self.inner.read();
            inner.manager.tracking_interceptors()
        };
        for interceptor in &interceptors {
            interceptor.unget_service(&self.identity, last_use, reference);
        }
        self.inner.write().service_objects.shift_remove(&reference.service_id());
        let Some(tracker) = self.tracker.read().clone() else {
            return false;
        };
        tracker.unget_service(reference.initial_reference())
    }

    fn tracked_snapshot(&self) -> Vec<Reference> {
        self.tracker.read().as_ref().map_or_else(Vec::new, |t| t.current())
    }

    /// Release a borrow on behalf of the manager's arrival/departure
    /// reconciliation (`reconcile`'s `to_release`, and `stop()`'s sweep).
    /// Goes through `self.tracker` when one is still open, so
    /// `RegistryTracker::borrowed` stays in sync with what's actually on
    /// loan; falls back to the registry directly only once `stop()` has
    /// already taken and closed the tracker.
    fn release(&self, reference: &TransformedReference) {
        let interceptors = {
            let inner = self.inner.read();
            inner.manager.tracking_interceptors()
        };
        for interceptor in &interceptors {
            interceptor.unget_service(&self.identity, true, reference);
        }
        if let Some(tracker) = self.tracker.read().clone() {
            tracker.unget_service(reference.initial_reference());
        } else {
            self.registry.unget_service(reference.initial_reference());
        }
    }

    fn fire_state_transition(&self, before: DependencyState, after: DependencyState) {
        match (before, after) {
            (DependencyState::Unresolved, DependencyState::Resolved) => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    target = "ipojo::dependency::model",
                    specification = %self.specification,
                    "dependency resolved"
                );
                self.listener.validate(self);
            }
            (DependencyState::Resolved, DependencyState::Unresolved) => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    target = "ipojo::dependency::model",
                    specification = %self.specification,
                    "dependency unresolved"
                );
                self.listener.invalidate(self);
            }
            _ => {}
        }
    }

    /// Consume one `ChangeSet` from the selected-services manager,
    /// reconcile `bound` against the binding policy, and fire the
    /// resulting callbacks outside the lock (§4.5, §5).
    fn reconcile(&self, change_set: ChangeSet, reconfiguration: bool) {
        let broke = {
            let mut inner = self.inner.write();
            if inner.policy == BindingPolicy::Static
                && inner.state != DependencyState::Broken
                && change_set
                    .departures
                    .iter()
                    .any(|d| inner.bound.iter().any(|b| b.service_id() == d.service_id()))
            {
                inner.state = DependencyState::Broken;
                true
            } else {
                false
            }
        };
        if broke {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                target = "ipojo::dependency::model",
                specification = %self.specification,
                "static dependency broken: bound reference departed"
            );
            self.listener.invalidate(self);
            return;
        }

        let mut departure_events: Vec<TransformedReference> = Vec::new();
        let mut arrival_events: Vec<TransformedReference> = Vec::new();
        let mut modification_event: Option<TransformedReference> = None;
        let mut to_release: Vec<TransformedReference> = Vec::new();
        let state_before;
        let state_after;

        {
            let mut inner = self.inner.write();
            state_before = inner.state;

            for departure in &change_set.departures {
                if let Some(pos) = inner.bound.iter().position(|b| b.service_id() == departure.service_id()) {
                    let removed = inner.bound.remove(pos);
                    if inner.service_objects.shift_remove(&removed.service_id()).is_some() {
                        to_release.push(removed.clone());
                    }
                    departure_events.push(removed);
                }
            }

            if inner.aggregate {
                let currently_in_use = !inner.service_objects.is_empty();
                if !currently_in_use || inner.policy == BindingPolicy::DynamicPriority {
                    inner.bound.clone_from(&change_set.selected);
                }
                for arrival in &change_set.arrivals {
                    if !inner.bound.iter().any(|b| b.service_id() == arrival.service_id()) {
                        inner.bound.push(arrival.clone());
                    }
                    arrival_events.push(arrival.clone());
                }
            } else {
                let best = change_set.selected.first().cloned();
                let current = inner.bound.first().cloned();
                match (current, best) {
                    (None, Some(best)) => {
                        inner.bound = vec![best.clone()];
                        arrival_events.push(best);
                    }
                    (Some(current), Some(best)) if current.service_id() != best.service_id() => {
                        let rebind = match inner.policy {
                            BindingPolicy::DynamicPriority => true,
                            BindingPolicy::Dynamic | BindingPolicy::Static => {
                                !inner.service_objects.contains_key(&current.service_id())
                            }
                        };
                        if rebind {
                            if inner.service_objects.shift_remove(&current.service_id()).is_some() {
                                to_release.push(current.clone());
                            }
                            inner.bound = vec![best.clone()];
                            departure_events.push(current);
                            arrival_events.push(best);
                        }
                    }
                    _ => {}
                }
            }

            if let Some(modified) = &change_set.modified {
                if inner.bound.iter().any(|b| b.service_id() == modified.service_id()) {
                    modification_event = Some(modified.clone());
                }
            }

            let matching_empty = inner.manager.matching().is_empty();
            inner.state = if inner.optional || !matching_empty {
                DependencyState::Resolved
            } else {
                DependencyState::Unresolved
            };
            state_after = inner.state;
        }

        for reference in &to_release {
            self.release(reference);
        }
        for departure in &departure_events {
            self.listener.on_service_departure(self, departure);
        }
        for arrival in &arrival_events {
            self.listener.on_service_arrival(self, arrival);
        }
        if let Some(modified) = &modification_event {
            self.listener.on_service_modification(self, modified);
        }

        self.fire_state_transition(state_before, state_after);

        if reconfiguration {
            self.listener
                .on_dependency_reconfiguration(self, &departure_events, &arrival_events);
        }
    }

    fn handle_added(&self, reference: Reference) {
        let change_set = {
            let mut inner = self.inner.write();
            inner.manager.on_added(reference)
        };
        if let Some(change_set) = change_set {
            self.reconcile(change_set, false);
        }
    }

    fn handle_modified(&self, reference: Reference) {
        let change_set = {
            let mut inner = self.inner.write();
            inner.manager.on_modified(reference)
        };
        if let Some(change_set) = change_set {
            self.reconcile(change_set, false);
        }
    }

    fn handle_removed(&self, reference: Reference) {
        let change_set = {
            let mut inner = self.inner.write();
            inner.manager.on_removed(reference)
        };
        if let Some(change_set) = change_set {
            self.reconcile(change_set, false);
        }
    }
}

struct ModelCustomizer {
    model: Weak<DependencyModel>,
}

impl Customizer for ModelCustomizer {
    fn added(&self, reference: &Reference) {
        if let Some(model) = self.model.upgrade() {
            model.handle_added(reference.clone());
        }
    }

    fn modified(&self, reference: &Reference, _service: Option<&ServiceObject>) {
        if let Some(model) = self.model.upgrade() {
            model.handle_modified(reference.clone());
        }
    }

    fn removed(&self, reference: &Reference, _service: Option<ServiceObject>) {
        if let Some(model) = self.model.upgrade() {
            model.handle_removed(reference.clone());
        }
    }
}
