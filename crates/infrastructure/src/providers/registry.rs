use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use beacon_dns_application::Provider;
use beacon_dns_domain::{DomainError, ProviderConfig};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::api::ApiProvider;
use super::docker::DockerProvider;
use super::fs::FsProvider;

/// Everything a factory needs besides its own config.
#[derive(Clone)]
pub struct ProviderContext {
    pub shutdown: CancellationToken,
}

pub type ProviderFactory =
    fn(&ProviderContext, &str, &ProviderConfig) -> Result<Arc<dyn Provider>, DomainError>;

/// String-keyed factory map, built explicitly at startup.
pub struct ProviderRegistry {
    factories: HashMap<&'static str, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the three built-in provider kinds.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FsProvider::KIND, FsProvider::factory);
        registry.register(DockerProvider::KIND, DockerProvider::factory);
        registry.register(ApiProvider::KIND, ApiProvider::factory);
        registry
    }

    pub fn register(&mut self, kind: &'static str, factory: ProviderFactory) {
        self.factories.insert(kind, factory);
    }

    pub fn create(
        &self,
        ctx: &ProviderContext,
        id: &str,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn Provider>, DomainError> {
        match self.factories.get(config.kind.as_str()) {
            Some(factory) => factory(ctx, id, config),
            None => Err(DomainError::UnknownProviderType {
                kind: config.kind.clone(),
                id: id.to_string(),
            }),
        }
    }

    /// Instantiates every configured provider; the first failure aborts
    /// startup.
    pub fn create_all(
        &self,
        ctx: &ProviderContext,
        configs: &BTreeMap<String, ProviderConfig>,
    ) -> Result<BTreeMap<String, Arc<dyn Provider>>, DomainError> {
        let mut providers = BTreeMap::new();
        for (id, config) in configs {
            debug!(provider = %id, kind = %config.kind, "creating provider");
            providers.insert(id.clone(), self.create(ctx, id, config)?);
        }
        Ok(providers)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ProviderContext {
        ProviderContext {
            shutdown: CancellationToken::new(),
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let registry = ProviderRegistry::with_defaults();
        let config = ProviderConfig::new("carrier-pigeon");

        let err = registry.create(&ctx(), "pigeons", &config).unwrap_err();

        assert!(matches!(err, DomainError::UnknownProviderType { .. }));
        assert_eq!(
            err.to_string(),
            "provider type 'carrier-pigeon' for pigeons does not exist"
        );
    }

    #[test]
    fn fs_factory_requires_a_path() {
        let registry = ProviderRegistry::with_defaults();
        let config = ProviderConfig::new("fs");

        let err = registry.create(&ctx(), "records", &config).unwrap_err();

        assert!(matches!(err, DomainError::ProviderInit { .. }));
    }

    #[test]
    fn create_all_stops_at_the_first_failure() {
        let registry = ProviderRegistry::with_defaults();
        let mut configs = BTreeMap::new();
        configs.insert("bad".to_string(), ProviderConfig::new("nope"));

        assert!(registry.create_all(&ctx(), &configs).is_err());
    }

    #[test]
    fn api_factory_builds_a_provider() {
        let registry = ProviderRegistry::with_defaults();
        let config = ProviderConfig::new("api");

        let provider = registry.create(&ctx(), "push", &config).unwrap();

        assert_eq!(provider.id(), "push");
        assert_eq!(provider.kind(), "api");
    }
}
