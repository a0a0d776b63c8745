use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use ipojo_types::{Properties, PropertyValue, Reference, FORBIDDEN_KEYS};

use crate::error::IpojoError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Overlay {
    Set(PropertyValue),
    Tombstone,
}

/// A property-overlay view over an immutable [`Reference`] (C1, §4.1).
///
/// Tracking interceptors consume and produce `TransformedReference`s; each
/// interceptor's overlay composes on top of the previous one's, left to
/// right, without ever mutating the underlying provider-published reference.
#[derive(Debug, Clone)]
pub struct TransformedReference {
    underlying: Reference,
    overlay: IndexMap<String, Overlay>,
}

impl TransformedReference {
    /// Wrap a reference with an empty overlay.
    #[must_use]
    pub fn new(underlying: Reference) -> Self {
        Self {
            underlying,
            overlay: IndexMap::new(),
        }
    }

    /// Property lookup: the overlay wins; a tombstone hides the underlying
    /// value entirely.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        match self.overlay.get(key) {
            Some(Overlay::Set(value)) => Some(value),
            Some(Overlay::Tombstone) => None,
            None => self.underlying.get(key),
        }
    }

    /// Set an overlay property. Rejects [`FORBIDDEN_KEYS`]; otherwise
    /// idempotent.
    pub fn add_property(&mut self, key: &str, value: PropertyValue) -> Result<(), IpojoError> {
        if FORBIDDEN_KEYS.contains(&key) {
            return Err(IpojoError::IllegalPropertyChange(key.to_string()));
        }
        self.overlay.insert(key.to_string(), Overlay::Set(value));
        Ok(())
    }

    /// Hide a property behind a tombstone so `keys()` stops reporting it.
    /// Rejects [`FORBIDDEN_KEYS`].
    pub fn remove_property(&mut self, key: &str) -> Result<(), IpojoError> {
        if FORBIDDEN_KEYS.contains(&key) {
            return Err(IpojoError::IllegalPropertyChange(key.to_string()));
        }
        self.overlay.insert(key.to_string(), Overlay::Tombstone);
        Ok(())
    }

    /// The union of underlying and overlay keys, minus tombstoned ones,
    /// underlying order first followed by overlay-introduced keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .underlying
            .keys()
            .filter(|k| !matches!(self.overlay.get(*k), Some(Overlay::Tombstone)))
            .map(str::to_string)
            .collect();
        for (key, value) in &self.overlay {
            if matches!(value, Overlay::Set(_)) && !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Materialise the full effective property map, for filter matching.
    #[must_use]
    pub fn properties(&self) -> Properties {
        self.keys()
            .into_iter()
            .filter_map(|k| self.get(&k).map(|v| (k, v.clone())))
            .collect()
    }

    /// This reference's immutable identity, unaffected by any overlay.
    #[must_use]
    pub fn service_id(&self) -> i64 {
        self.underlying.service_id()
    }

    /// The effective ranking: the overlay's `service.ranking` if set,
    /// otherwise the underlying reference's.
    #[must_use]
    pub fn ranking(&self) -> i64 {
        self.get("service.ranking")
            .and_then(PropertyValue::as_i64)
            .unwrap_or(0)
    }

    /// Unwrap nested transforms to the registry-native reference, required
    /// before calling `Registry::get_service`.
    #[must_use]
    pub fn initial_reference(&self) -> &Reference {
        &self.underlying
    }
}

impl PartialEq for TransformedReference {
    fn eq(&self, other: &Self) -> bool {
        self.service_id() == other.service_id()
    }
}

impl Eq for TransformedReference {}

impl Hash for TransformedReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.service_id().hash(state);
    }
}

/// Strict equality (§4.4): exactly the same set of property keys with
/// pairwise-equal values. Distinct from `PartialEq`, which only compares
/// `service.id`; this drives whether a `modified` event fires.
#[must_use]
pub fn strictly_equal(a: &TransformedReference, b: &TransformedReference) -> bool {
    let a_props = a.properties();
    let b_props = b.properties();
    a_props.len() == b_props.len() && a_props.iter().all(|(k, v)| b_props.get(k) == Some(v))
}

/// The ranking comparator (§4.1): higher effective ranking first, ties
/// broken by lower `service.id`.
#[must_use]
pub fn ranking_order(a: &TransformedReference, b: &TransformedReference) -> Ordering {
    b.ranking()
        .cmp(&a.ranking())
        .then_with(|| a.service_id().cmp(&b.service_id()))
}
