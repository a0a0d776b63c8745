use std::sync::Arc;

use ipojo_core::{DependencyIdentity, IpojoError, Registry};
use ipojo_types::{BindingPolicy, DependencyConfig, DependencyState, LdapFilter};

use crate::error::DependencyError;
use crate::listener::{DependencyListener, NullListener};
use crate::model::DependencyModel;
use crate::Comparator;

/// Builds a [`DependencyModel`] from a [`DependencyConfig`] plus the
/// identity and collaborators the embedding component provides (§6).
///
/// Behavior and trade-offs:
/// - `filter` is parsed, and `comparator-class` validated, eagerly (at
///   `build()` time for `filter`, at `from_config()` time for
///   `comparator-class`) rather than surfacing lazily on the first registry
///   event.
/// - Passing no [`DependencyListener`] installs [`NullListener`], useful for
///   tests that only poll `bound()`/`state()`.
/// - `build()` does not call `start()`; the caller controls when the
///   dependency begins observing the registry.
pub struct DependencyBuilder {
    instance_name: String,
    factory_name: String,
    bundle_symbolic_name: String,
    bundle_version: String,
    dependency_id: String,
    specification: String,
    aggregate: bool,
    optional: bool,
    policy: BindingPolicy,
    filter: Option<String>,
    comparator: Option<Arc<dyn Comparator>>,
    registry: Option<Arc<dyn Registry>>,
    listener: Option<Arc<dyn DependencyListener>>,
}

impl DependencyBuilder {
    /// Start a builder for `specification`, the service interface this
    /// dependency requires.
    #[must_use]
    pub fn new(specification: impl Into<String>) -> Self {
        Self {
            instance_name: String::new(),
            factory_name: String::new(),
            bundle_symbolic_name: String::new(),
            bundle_version: String::new(),
            dependency_id: String::new(),
            specification: specification.into(),
            aggregate: false,
            optional: false,
            policy: BindingPolicy::Dynamic,
            filter: None,
            comparator: None,
            registry: None,
            listener: None,
        }
    }

    /// Seed the builder from a parsed [`DependencyConfig`], e.g. component
    /// metadata loaded from a manifest.
    ///
    /// `comparator-class` (§6) names either the literal `"osgi"`, which
    /// selects the standard natural-ranking comparator (equivalent to
    /// leaving no comparator installed), or a user comparator class. This
    /// builder has no class loader to resolve the latter by name, so any
    /// value other than `"osgi"` is rejected with `UnloadableComparator`
    /// rather than silently dropped; call [`DependencyBuilder::comparator`]
    /// to install a concrete `Comparator` instance instead.
    pub fn from_config(config: &DependencyConfig) -> Result<Self, DependencyError> {
        if let Some(class) = &config.comparator_class {
            if class != "osgi" {
                return Err(IpojoError::UnloadableComparator(class.clone()).into());
            }
        }
        Ok(Self::new(config.specification.clone())
            .aggregate(config.aggregate)
            .optional(config.optional)
            .policy(config.policy)
            .filter(config.filter.clone()))
    }

    /// The owning component instance's name, used in interceptor targeting.
    #[must_use]
    pub fn instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = name.into();
        self
    }

    /// The owning component's factory name.
    #[must_use]
    pub fn factory_name(mut self, name: impl Into<String>) -> Self {
        self.factory_name = name.into();
        self
    }

    /// The owning bundle's symbolic name and version.
    #[must_use]
    pub fn bundle(mut self, symbolic_name: impl Into<String>, version: impl Into<String>) -> Self {
        self.bundle_symbolic_name = symbolic_name.into();
        self.bundle_version = version.into();
        self
    }

    /// A stable identifier for this dependency within its component, used in
    /// interceptor targeting.
    #[must_use]
    pub fn dependency_id(mut self, id: impl Into<String>) -> Self {
        self.dependency_id = id.into();
        self
    }

    /// Whether this dependency tracks the whole selected set.
    #[must_use]
    pub const fn aggregate(mut self, yes: bool) -> Self {
        self.aggregate = yes;
        self
    }

    /// Whether an empty selected set still leaves the dependency `Resolved`.
    #[must_use]
    pub const fn optional(mut self, yes: bool) -> Self {
        self.optional = yes;
        self
    }

    /// The rebinding policy (§4.5).
    #[must_use]
    pub const fn policy(mut self, policy: BindingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// An LDAP filter narrowing which references may match, parsed at
    /// `build()` time.
    #[must_use]
    pub fn filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// A user-supplied comparator, installed as the ranking interceptor in
    /// place of natural order.
    #[must_use]
    pub fn comparator(mut self, comparator: Arc<dyn Comparator>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// The registry this dependency observes. Required.
    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The component lifecycle manager's callback sink. Defaults to
    /// [`NullListener`] when omitted.
    #[must_use]
    pub fn listener(mut self, listener: Arc<dyn DependencyListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Validate and construct the dependency, in `Unresolved` state with an
    /// empty `bound` set. Call `start()` to begin observing the registry.
    pub fn build(self) -> Result<Arc<DependencyModel>, DependencyError> {
        let registry = self.registry.ok_or(DependencyError::MissingRegistry)?;

        let filter = self
            .filter
            .as_deref()
            .map(LdapFilter::parse)
            .transpose()?;

        let identity = Arc::new(DependencyIdentity::new(
            &self.instance_name,
            &self.factory_name,
            &self.bundle_symbolic_name,
            &self.bundle_version,
            &self.specification,
            &self.dependency_id,
            DependencyState::Unresolved,
            "unresolved",
        ));

        let listener: Arc<dyn DependencyListener> = self.listener.unwrap_or_else(|| Arc::new(NullListener));

        Ok(DependencyModel::new(
            identity,
            registry,
            self.specification,
            self.aggregate,
            self.optional,
            self.policy,
            filter,
            self.comparator,
            listener,
        ))
    }
}
