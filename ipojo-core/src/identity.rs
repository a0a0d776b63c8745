use ipojo_types::{DependencyState, LdapFilter, Properties, PropertyValue};

/// The identity properties a dependency exposes for interceptor targeting
/// (§4.3): `instance.name`, `factory.name`, `bundle.symbolic-name`,
/// `bundle.version`, `dependency.specification`, `dependency.id`,
/// `dependency.state`, `instance.state`.
#[derive(Debug, Clone)]
pub struct DependencyIdentity {
    properties: Properties,
}

impl DependencyIdentity {
    /// Build an identity snapshot from the owning dependency's current
    /// configuration and state.
    #[must_use]
    pub fn new(
        instance_name: &str,
        factory_name: &str,
        bundle_symbolic_name: &str,
        bundle_version: &str,
        specification: &str,
        dependency_id: &str,
        state: DependencyState,
        instance_state: &str,
    ) -> Self {
        let mut properties = Properties::new();
        properties.insert("instance.name".into(), PropertyValue::from(instance_name));
        properties.insert("factory.name".into(), PropertyValue::from(factory_name));
        properties.insert(
            "bundle.symbolic-name".into(),
            PropertyValue::from(bundle_symbolic_name),
        );
        properties.insert("bundle.version".into(), PropertyValue::from(bundle_version));
        properties.insert(
            "dependency.specification".into(),
            PropertyValue::from(specification),
        );
        properties.insert("dependency.id".into(), PropertyValue::from(dependency_id));
        properties.insert(
            "dependency.state".into(),
            PropertyValue::from(state_label(state)),
        );
        properties.insert("instance.state".into(), PropertyValue::from(instance_state));
        Self { properties }
    }

    /// Whether an interceptor's `target` expression admits this dependency.
    /// An absent target always matches (§4.3).
    #[must_use]
    pub fn matches_target(&self, target: Option<&LdapFilter>) -> bool {
        target.is_none_or(|filter| filter.matches(&self.properties))
    }
}

fn state_label(state: DependencyState) -> &'static str {
    match state {
        DependencyState::Unresolved => "unresolved",
        DependencyState::Resolved => "resolved",
        DependencyState::Broken => "broken",
    }
}
