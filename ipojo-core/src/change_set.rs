use ipojo_types::Reference;

use crate::transformed::TransformedReference;

/// The atomic diff a [`crate::SelectedServicesManager`]-style component
/// publishes to the dependency model on every registry event or interceptor
/// change (§4.4, GLOSSARY).
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// The full selected set after this change, in ranking-interceptor
    /// order.
    pub selected: Vec<TransformedReference>,
    /// References newly present in `selected` relative to the prior
    /// `ChangeSet`.
    pub arrivals: Vec<TransformedReference>,
    /// References no longer present in `selected`.
    pub departures: Vec<TransformedReference>,
    /// `selected.first()` before this change.
    pub old_first: Option<TransformedReference>,
    /// `selected.first()` after this change.
    pub new_first: Option<TransformedReference>,
    /// The raw reference a `modified` event concerned, if this change set
    /// was produced by one.
    pub service: Option<Reference>,
    /// The modified reference's new transformed view, set only when a
    /// `modified` event passed the strict-inequality test (§4.4, P7).
    pub modified: Option<TransformedReference>,
}

impl ChangeSet {
    /// Whether `selected.first()` changed identity across this change.
    #[must_use]
    pub fn first_changed(&self) -> bool {
        match (&self.old_first, &self.new_first) {
            (None, None) => false,
            (Some(a), Some(b)) => a != b,
            _ => true,
        }
    }
}
