//! Provider factory and registration system.

use crate::{Config, GateError, Provider, Result};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Factory function type for creating providers.
pub type ProviderFactory = fn(Config) -> Result<Box<dyn Provider>>;

static PROVIDER_REGISTRY: OnceLock<RwLock<HashMap<String, ProviderFactory>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, ProviderFactory>> {
    PROVIDER_REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Registers a provider factory function.
///
/// This is typically called from provider modules' `register()` functions
/// during library initialization.
pub fn register_provider(provider_type: &str, factory: ProviderFactory) {
    let mut reg = registry().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    reg.insert(provider_type.to_string(), factory);
}

/// Creates a new provider from configuration.
///
/// The appropriate factory is looked up based on `config.provider`. If the
/// provider is not registered, an error is returned with a hint to check
/// feature flags.
///
/// # Example
///
/// ```
/// use awsgate::{Config, ProviderType, factory};
///
/// awsgate::init();
/// let provider = factory::new_provider(Config::new(ProviderType::Mock)).unwrap();
/// assert_eq!(provider.name(), "mock");
/// ```
pub fn new_provider(config: Config) -> Result<Box<dyn Provider>> {
    let name = config.provider.to_string();
    build(&name, config)
}

fn build(name: &str, config: Config) -> Result<Box<dyn Provider>> {
    let factory = lookup(name).ok_or_else(|| {
        GateError::Config(format!(
            "unknown provider: {} (did you enable the '{}' feature flag?)",
            name, name
        ))
    })?;

    tracing::debug!(provider = name, "constructing provider");
    factory(config)
}

fn lookup(name: &str) -> Option<ProviderFactory> {
    let reg = registry().read().unwrap_or_else(|poisoned| poisoned.into_inner());
    reg.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderType;

    fn failing_factory(_cfg: Config) -> Result<Box<dyn Provider>> {
        Err(GateError::Config("failing factory".to_string()))
    }

    #[test]
    fn test_provider_registration() {
        register_provider("test-provider", failing_factory);

        assert!(lookup("test-provider").is_some());
        assert!(lookup("never-registered").is_none());
    }

    #[test]
    #[cfg(feature = "mock")]
    fn test_registered_mock_provider() {
        crate::init();
        let provider = new_provider(Config::new(ProviderType::Mock)).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn test_unknown_provider_error() {
        let result = build("vault-of-nowhere", Config::new(ProviderType::Mock));

        match result {
            Err(GateError::Config(message)) => {
                assert!(message.contains("unknown provider: vault-of-nowhere"));
                assert!(message.contains("feature flag"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(provider) => panic!("unexpected provider: {}", provider.name()),
        }
    }

    #[test]
    fn test_failing_factory_error_propagates() {
        register_provider("failing-provider", failing_factory);

        let result = build("failing-provider", Config::new(ProviderType::Mock));
        assert!(matches!(result, Err(GateError::Config(m)) if m == "failing factory"));
    }
}
