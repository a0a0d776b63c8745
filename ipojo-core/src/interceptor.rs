use indexmap::IndexMap;
use ipojo_types::LdapFilter;

use crate::identity::DependencyIdentity;
use crate::registry::ServiceObject;
use crate::transformed::TransformedReference;

/// Transforms acceptance and property views of references flowing from
/// `tracked` into `matching` (C3, §4.3).
///
/// Returning `None` from `accept` drops the reference for this dependency.
/// A chain composes left to right: each interceptor sees the previous
/// interceptor's output view, not the raw tracked reference.
pub trait TrackingInterceptor: Send + Sync {
    /// Called once when the interceptor attaches to a dependency.
    fn open(&self, _dependency: &DependencyIdentity) {}

    /// Accept or reject a reference, optionally rewriting its properties.
    fn accept(
        &self,
        dependency: &DependencyIdentity,
        reference: TransformedReference,
    ) -> Option<TransformedReference>;

    /// Called once when the interceptor detaches.
    fn close(&self, _dependency: &DependencyIdentity) {}

    /// Proxy or decorate a borrowed service instance. Default: pass through
    /// unchanged.
    fn get_service(
        &self,
        _dependency: &DependencyIdentity,
        service: ServiceObject,
        _reference: &TransformedReference,
    ) -> ServiceObject {
        service
    }

    /// Called when a borrowed instance is released.
    fn unget_service(
        &self,
        _dependency: &DependencyIdentity,
        _last_use: bool,
        _reference: &TransformedReference,
    ) {
    }

    /// The LDAP target expression gating which dependencies this
    /// interceptor attaches to. `None` attaches to every dependency.
    fn target(&self) -> Option<&LdapFilter> {
        None
    }
}

/// Orders (and optionally prunes) the `matching` set into `selected` (C3,
/// §4.3). Exactly one ranking interceptor is active per dependency at a
/// time; it must return a stable permutation, a subset being allowed.
pub trait RankingInterceptor: Send + Sync {
    /// Called once when the interceptor becomes the dependency's ranker.
    fn open(&self, _dependency: &DependencyIdentity) {}

    /// Recompute `selected` from scratch, e.g. after interceptor churn.
    fn get_service_references(
        &self,
        dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
    ) -> Vec<TransformedReference>;

    /// Recompute `selected` after `arrival` joined `matching`.
    fn on_service_arrival(
        &self,
        dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
        arrival: &TransformedReference,
    ) -> Vec<TransformedReference>;

    /// Recompute `selected` after `departure` left `matching`.
    fn on_service_departure(
        &self,
        dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
        departure: &TransformedReference,
    ) -> Vec<TransformedReference>;

    /// Recompute `selected` after `modified` replaced its prior transform in
    /// `matching`.
    fn on_service_modified(
        &self,
        dependency: &DependencyIdentity,
        matching: &IndexMap<i64, TransformedReference>,
        modified: &TransformedReference,
    ) -> Vec<TransformedReference>;

    /// Called once when the interceptor stops being the dependency's
    /// ranker.
    fn close(&self, _dependency: &DependencyIdentity) {}
}
