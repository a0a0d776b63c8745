/// The three states a `DependencyModel` may occupy (§3).
///
/// `Unresolved -> Resolved` once the selected set satisfies the dependency's
/// cardinality requirement; `Resolved -> Broken` only for mandatory,
/// non-aggregate dependencies under `Static` policy that lose their bound
/// service (§4.5); every other loss of satisfaction returns to `Unresolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    /// No acceptable service is currently bound.
    Unresolved,
    /// The dependency's cardinality requirement is currently satisfied.
    Resolved,
    /// A `Static`-policy mandatory dependency whose bound service departed;
    /// requires instance recreation to recover.
    Broken,
}
