use ipojo_core::{DependencyIdentity, TrackingInterceptor, TransformedReference};
use ipojo_types::LdapFilter;

/// The terminal tracking interceptor wrapping a dependency's configured
/// LDAP filter (§4.2, §4.3). Always applied last in the chain so that
/// user-supplied property rewrites are visible to the filter.
#[derive(Debug, Clone)]
pub struct FilterInterceptor {
    filter: LdapFilter,
}

impl FilterInterceptor {
    /// Wrap `filter` as a tracking interceptor.
    #[must_use]
    pub fn new(filter: LdapFilter) -> Self {
        Self { filter }
    }

    /// The wrapped filter, e.g. for reconfiguration comparisons.
    #[must_use]
    pub fn filter(&self) -> &LdapFilter {
        &self.filter
    }
}

impl TrackingInterceptor for FilterInterceptor {
    fn accept(
        &self,
        _dependency: &DependencyIdentity,
        reference: TransformedReference,
    ) -> Option<TransformedReference> {
        if self.filter.matches(&reference.properties()) {
            Some(reference)
        } else {
            None
        }
    }
}
