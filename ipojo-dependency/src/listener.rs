use ipojo_core::TransformedReference;

use crate::model::DependencyModel;

/// The callbacks a `DependencyModel` fires on its consumer, the component
/// lifecycle manager (§6). This crate never implements `ComponentInstance`
/// itself; a `DependencyListener` is the seam where that external
/// collaborator plugs in.
///
/// Every callback is fired outside the dependency's internal lock (§5): a
/// listener is free to call back into `DependencyModel` (e.g. `bound()`)
/// without risking deadlock or re-entrant-lock panics.
pub trait DependencyListener: Send + Sync {
    /// The dependency's cardinality requirement just became satisfied.
    fn validate(&self, dependency: &DependencyModel) {
        let _ = dependency;
    }

    /// The dependency's cardinality requirement just stopped being
    /// satisfied, including the transition into `Broken`.
    fn invalidate(&self, dependency: &DependencyModel) {
        let _ = dependency;
    }

    /// `reference` was just added to `bound`.
    fn on_service_arrival(&self, dependency: &DependencyModel, reference: &TransformedReference) {
        let (_, _) = (dependency, reference);
    }

    /// `reference` was just removed from `bound`.
    fn on_service_departure(&self, dependency: &DependencyModel, reference: &TransformedReference) {
        let (_, _) = (dependency, reference);
    }

    /// A bound reference's transformed view changed (strict inequality,
    /// P7).
    fn on_service_modification(&self, dependency: &DependencyModel, reference: &TransformedReference) {
        let (_, _) = (dependency, reference);
    }

    /// A `set_filter`/`set_comparator` reconfiguration call produced a new
    /// `bound` set; fired once per reconfiguration with the full
    /// departures/arrivals batch, in addition to the individual
    /// `on_service_arrival`/`on_service_departure` calls above.
    fn on_dependency_reconfiguration(
        &self,
        dependency: &DependencyModel,
        departures: &[TransformedReference],
        arrivals: &[TransformedReference],
    ) {
        let (_, _, _) = (dependency, departures, arrivals);
    }
}

/// A [`DependencyListener`] that does nothing, for tests and examples that
/// only care about `bound()`/`state()` polling.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListener;

impl DependencyListener for NullListener {}
