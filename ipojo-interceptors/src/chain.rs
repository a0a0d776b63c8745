use std::sync::Arc;

use ipojo_core::{catch_accept, DependencyIdentity, TrackingInterceptor, TransformedReference};
use ipojo_types::{LdapFilter, Reference};

use crate::default::DefaultTrackingInterceptor;
use crate::filter_interceptor::FilterInterceptor;

/// The ordered tracking-interceptor chain for one dependency (§3, §4.2).
///
/// User interceptors are kept most-recently-added first; the filter
/// interceptor, when a filter is configured, is always applied last so that
/// user property rewrites are visible to it.
pub struct TrackingChain {
    user_interceptors: Vec<Arc<dyn TrackingInterceptor>>,
    filter: Option<FilterInterceptor>,
}

impl TrackingChain {
    /// An empty chain: every reference is accepted unchanged (the identity
    /// interceptor applies when there is nothing else to run).
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_interceptors: Vec::new(),
            filter: None,
        }
    }

    /// Install `interceptor` at the front of the user chain. The caller has
    /// already checked its target and called `open` (outside any lock).
    pub fn push(&mut self, interceptor: Arc<dyn TrackingInterceptor>) {
        self.user_interceptors.insert(0, interceptor);
    }

    /// Set or clear the terminal filter interceptor.
    pub fn set_filter(&mut self, filter: Option<LdapFilter>) {
        self.filter = filter.map(FilterInterceptor::new);
    }

    /// The configured filter, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&LdapFilter> {
        self.filter.as_ref().map(FilterInterceptor::filter)
    }

    /// A snapshot of the user tracking interceptors, most-recently-added
    /// first, for running `get_service`/`unget_service` hooks outside the
    /// dependency's lock (§5).
    #[must_use]
    pub fn interceptors(&self) -> Vec<Arc<dyn TrackingInterceptor>> {
        self.user_interceptors.clone()
    }

    /// Run the full chain over a raw reference, producing the accepted
    /// transformed view or `None` if any stage rejected it (I2).
    ///
    /// A rejection anywhere in the chain drops the reference outright (§7:
    /// "treated as drop the reference ... and logged"); it never aborts
    /// only part of the chain, since there is nothing left to abort once a
    /// stage has already returned `None`.
    #[must_use]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn accept(&self, dependency: &DependencyIdentity, reference: Reference) -> Option<TransformedReference> {
        let service_id = reference.service_id();
        let mut view = TransformedReference::new(reference);
        if self.user_interceptors.is_empty() && self.filter.is_none() {
            return DefaultTrackingInterceptor.accept(dependency, view);
        }
        for (position, interceptor) in self.user_interceptors.iter().enumerate() {
            let label = format!("tracking_interceptor[{position}]::accept");
            match catch_accept(&label, || interceptor.accept(dependency, view)) {
                Some(next) => view = next,
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        target = "ipojo::interceptors::chain",
                        event = "dropped",
                        service_id,
                        position,
                        "tracking interceptor rejected reference"
                    );
                    return None;
                }
            }
        }
        if let Some(filter) = &self.filter {
            match catch_accept("filter_interceptor::accept", || filter.accept(dependency, view)) {
                Some(next) => view = next,
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        target = "ipojo::interceptors::chain",
                        event = "dropped",
                        service_id,
                        "filter interceptor rejected reference"
                    );
                    return None;
                }
            }
        }
        Some(view)
    }

    /// Re-run `accept` over every currently tracked reference, e.g. after
    /// interceptor churn (§4.4).
    #[must_use]
    pub fn accept_all(
        &self,
        dependency: &DependencyIdentity,
        tracked: impl IntoIterator<Item = Reference>,
    ) -> Vec<TransformedReference> {
        tracked
            .into_iter()
            .filter_map(|r| self.accept(dependency, r))
            .collect()
    }
}

impl Default for TrackingChain {
    fn default() -> Self {
        Self::new()
    }
}
