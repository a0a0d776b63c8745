use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::properties::{Properties, PropertyValue, SERVICE_ID};

/// An opaque handle to a service registered in the registry.
///
/// Identity is carried entirely by `service.id` (§2): two `Reference`s with
/// the same id are the same reference even if their property snapshots
/// differ, which is exactly what happens when a provider's properties are
/// modified in place. `PartialEq`, `Eq` and `Hash` are therefore implemented
/// against `service.id` alone, never against the full property map.
#[derive(Debug, Clone)]
pub struct Reference {
    properties: Properties,
}

impl Reference {
    /// Build a reference from a property snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `properties` does not carry a `service.id` entry: every
    /// reference handed out by a registry carries one by construction, so a
    /// missing id indicates a registry bug, not a recoverable input error.
    #[must_use]
    pub fn new(properties: Properties) -> Self {
        assert!(
            properties.contains_key(SERVICE_ID),
            "a Reference must carry a service.id property"
        );
        Self { properties }
    }

    /// This reference's immutable identity.
    #[must_use]
    pub fn service_id(&self) -> i64 {
        match self.properties.get(SERVICE_ID) {
            Some(PropertyValue::Int(id)) => *id,
            Some(other) => other.as_i64().unwrap_or_default(),
            None => unreachable!("constructor guarantees service.id is present"),
        }
    }

    /// This reference's `service.ranking`, defaulting to `0` when absent
    /// (OSGi's documented default for unranked services).
    #[must_use]
    pub fn ranking(&self) -> i64 {
        self.properties
            .get("service.ranking")
            .and_then(PropertyValue::as_i64)
            .unwrap_or(0)
    }

    /// Look up a single property value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Iterate property keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Borrow the full property snapshot, e.g. for filter matching.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.service_id() == other.service_id()
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.service_id().hash(state);
    }
}

/// The registry's natural ordering (§2): highest `service.ranking` first,
/// ties broken by lowest `service.id` first (the service registered
/// earliest wins).
#[must_use]
pub fn natural_order(a: &Reference, b: &Reference) -> Ordering {
    b.ranking()
        .cmp(&a.ranking())
        .then_with(|| a.service_id().cmp(&b.service_id()))
}
