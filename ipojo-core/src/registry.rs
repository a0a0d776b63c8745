use std::any::Any;
use std::sync::Arc;

use ipojo_types::{LdapFilter, Reference};

/// A borrowed service instance. Opaque to the resolver: it is handed back to
/// the registry unchanged on `unget_service`.
pub type ServiceObject = Arc<dyn Any + Send + Sync>;

/// Opaque handle returned by [`Registry::add_service_listener`], used to
/// unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A registry event, as reported to a [`ServiceListener`].
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    /// A new reference now satisfies the listener's interface/filter.
    Added(Reference),
    /// An already-tracked reference's properties changed.
    Modified(Reference),
    /// A previously-tracked reference no longer satisfies, or was
    /// unregistered outright.
    Removed(Reference),
}

/// Receives registry events for a subscription.
pub trait ServiceListener: Send + Sync {
    /// Called on the thread that published the underlying event; arbitrary,
    /// not necessarily the subscriber's own thread (§5).
    fn service_changed(&self, event: &ServiceEvent);
}

/// The OSGi-style service registry this resolver consumes (§1, §6).
///
/// This is an external collaborator: the core never implements it, only
/// calls it. `ipojo-mock` provides an in-memory implementation for tests and
/// examples.
pub trait Registry: Send + Sync {
    /// Subscribe to events for `class`, optionally narrowed by an LDAP
    /// filter the registry itself evaluates before delivery.
    fn add_service_listener(
        &self,
        class: &str,
        filter: Option<LdapFilter>,
        listener: Arc<dyn ServiceListener>,
    ) -> ListenerId;

    /// Cancel a subscription created by `add_service_listener`.
    fn remove_service_listener(&self, id: ListenerId);

    /// A single matching reference, or `None`. When several match, the
    /// registry's own natural order picks the first.
    fn get_service_reference(&self, class: &str, filter: Option<&LdapFilter>) -> Option<Reference>;

    /// Every currently registered reference matching `class` and `filter`,
    /// subject to whatever modularity rules the registry enforces.
    fn get_service_references(&self, class: &str, filter: Option<&LdapFilter>) -> Vec<Reference>;

    /// As `get_service_references`, but ignoring modularity/visibility
    /// rules (§6).
    fn get_all_service_references(
        &self,
        class: &str,
        filter: Option<&LdapFilter>,
    ) -> Vec<Reference>;

    /// Borrow the service instance behind `reference`.
    fn get_service(&self, reference: &Reference) -> Option<ServiceObject>;

    /// Release a borrow obtained through `get_service`. Returns `false` if
    /// the reference was not currently borrowed by this caller.
    fn unget_service(&self, reference: &Reference) -> bool;
}
