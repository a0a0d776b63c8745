use std::sync::Arc;

use parking_lot::RwLock;

use ipojo_types::{LdapFilter, Reference};

use crate::identity::DependencyIdentity;
use crate::interceptor::TrackingInterceptor;
use crate::panic_guard::{catch_accept, catch_decorate};
use crate::registry::{ListenerId, Registry, ServiceObject};
use crate::transformed::TransformedReference;

/// The kind of event an [`InterceptedServiceListener`] is notified of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptedEventKind {
    /// The reference newly satisfies the interceptor chain.
    Added,
    /// An already-forwarded reference's transformed view changed.
    Modified,
    /// A previously-forwarded reference no longer satisfies the chain, or
    /// was removed from the registry outright.
    Removed,
}

/// Receives registry events that have already passed an
/// [`InterceptableContext`]'s tracking chain.
pub trait InterceptedServiceListener: Send + Sync {
    /// `transformed` is the interceptor-rewritten view;
    /// `original` is the registry-native reference, exposed so a listener
    /// can still call `get_original_service_reference`-equivalent lookups.
    fn service_changed(
        &self,
        transformed: &TransformedReference,
        original: &Reference,
        kind: InterceptedEventKind,
    );
}

/// An intercepting façade over a [`Registry`] (C6, §4.6).
///
/// Every read (`get_service_reference*`) and every listener registered
/// through this façade is filtered and transformed by the same tracking
/// chain a dependency's `SelectedServicesManager` uses, so raw registry
/// queries issued by component code see an interceptor-consistent view.
pub struct InterceptableContext {
    registry: Arc<dyn Registry>,
    identity: Arc<DependencyIdentity>,
    chain: Arc<RwLock<Vec<Arc<dyn TrackingInterceptor>>>>,
}

impl InterceptableContext {
    /// Build a façade over `registry` for the dependency described by
    /// `identity`, initially with an empty tracking chain.
    #[must_use]
    pub fn new(registry: Arc<dyn Registry>, identity: Arc<DependencyIdentity>) -> Self {
        Self {
            registry,
            identity,
            chain: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Install an interceptor at the end of the chain, if its target
    /// expression admits this dependency's identity.
    pub fn push_interceptor(&self, interceptor: Arc<dyn TrackingInterceptor>) {
        if self.identity.matches_target(interceptor.target()) {
            interceptor.open(&self.identity);
            self.chain.write().push(interceptor);
        }
    }

    fn run_chain(&self, reference: Reference) -> Option<TransformedReference> {
        let mut view = TransformedReference::new(reference);
        for (position, interceptor) in self.chain.read().iter().enumerate() {
            let label = format!("tracking_interceptor[{position}]::accept");
            view = catch_accept(&label, || interceptor.accept(&self.identity, view))?;
        }
        Some(view)
    }

    /// As `Registry::get_service_reference`, filtered through the chain.
    #[must_use]
    pub fn get_service_reference(
        &self,
        class: &str,
        filter: Option<&LdapFilter>,
    ) -> Option<TransformedReference> {
        self.get_service_references(class, filter).into_iter().next()
    }

    /// As `Registry::get_service_references`, filtered through the chain.
    #[must_use]
    pub fn get_service_references(
        &self,
        class: &str,
        filter: Option<&LdapFilter>,
    ) -> Vec<TransformedReference> {
        self.registry
            .get_service_references(class, filter)
            .into_iter()
            .filter_map(|r| self.run_chain(r))
            .collect()
    }

    /// As `Registry::get_all_service_references`, filtered through the
    /// chain.
    #[must_use]
    pub fn get_all_service_references(
        &self,
        class: &str,
        filter: Option<&LdapFilter>,
    ) -> Vec<TransformedReference> {
        self.registry
            .get_all_service_references(class, filter)
            .into_iter()
            .filter_map(|r| self.run_chain(r))
            .collect()
    }

    /// Unwrap `reference` to its registry-native form, borrow the service,
    /// then run the chain's `get_service` hooks left-to-right.
    #[must_use]
    pub fn get_service(&self, reference: &TransformedReference) -> Option<ServiceObject> {
        let service = self.registry.get_service(reference.initial_reference())?;
        let service = self
            .chain
            .read()
            .iter()
            .enumerate()
            .fold(service, |svc, (position, interceptor)| {
                let fallback = svc.clone();
                let label = format!("tracking_interceptor[{position}]::get_service");
                catch_decorate(&label, fallback, || interceptor.get_service(&self.identity, svc, reference))
            });
        Some(service)
    }

    /// Release a borrow obtained through `get_service`, running `unget`
    /// hooks in chain order first.
    pub fn unget_service(&self, reference: &TransformedReference, last_use: bool) -> bool {
        for interceptor in self.chain.read().iter() {
            interceptor.unget_service(&self.identity, last_use, reference);
        }
        self.registry.unget_service(reference.initial_reference())
    }

    /// Subscribe `listener` to registry events for `class`, re-running the
    /// chain on each event and forwarding only accepted references.
    pub fn add_service_listener(
        &self,
        class: &str,
        listener: Arc<dyn InterceptedServiceListener>,
    ) -> ListenerId {
        let adapter: Arc<dyn crate::registry::ServiceListener> = Arc::new(InterceptingAdapter {
            identity: self.identity.clone(),
            chain: self.chain.clone(),
            listener,
        });
        self.registry.add_service_listener(class, None, adapter)
    }

    /// Cancel a subscription created by `add_service_listener`.
    pub fn remove_service_listener(&self, id: ListenerId) {
        self.registry.remove_service_listener(id);
    }
}

struct InterceptingAdapter {
    identity: Arc<DependencyIdentity>,
    chain: Arc<RwLock<Vec<Arc<dyn TrackingInterceptor>>>>,
    listener: Arc<dyn InterceptedServiceListener>,
}

impl crate::registry::ServiceListener for InterceptingAdapter {
    fn service_changed(&self, event: &crate::registry::ServiceEvent) {
        use crate::registry::ServiceEvent;
        let (original, kind) = match event {
            ServiceEvent::Added(r) => (r.clone(), InterceptedEventKind::Added),
            ServiceEvent::Modified(r) => (r.clone(), InterceptedEventKind::Modified),
            ServiceEvent::Removed(r) => (r.clone(), InterceptedEventKind::Removed),
        };
        let seed = TransformedReference::new(original.clone());
        let accepted = {
            let chain = self.chain.read();
            chain.iter().enumerate().try_fold(seed, |v, (position, interceptor)| {
                let label = format!("tracking_interceptor[{position}]::accept");
                catch_accept(&label, || interceptor.accept(&self.identity, v))
            })
        };
        let Some(view) = accepted else { return };
        self.listener.service_changed(&view, &original, kind);
    }
}
