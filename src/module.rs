//! Container bindings for DiscoveryX clients.
//!
//! [`DiscoveryXWsModule`] binds one shared full client under three keys:
//!
//! * `DiscoveryXWsClient`, built by [`DiscoveryXWsClientProvider`];
//! * `dyn WsClient` qualified with `@Named("discoveryx")`;
//! * `dyn WsClient` qualified with the [`DiscoveryXPlay`] marker.
//!
//! The provider needs a `reqwest::Client` and an [`ActorSystem`] registered
//! in the container.

use crate::client::{DiscoveryXWsClient, WsClient};
use crate::factory;
use discoveryx_config::ConfigManager;
use discoveryx_core::{ActorSystem, Binding, Container, Environment, Error, Module, Provider, Qualifier};
use std::sync::Arc;
use tracing::debug;

/// Name qualifying the DiscoveryX client binding.
pub const DISCOVERYX: &str = "discoveryx";

/// Marker qualifying the DiscoveryX client binding.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryXPlay;

impl DiscoveryXPlay {
    pub fn qualifier() -> Qualifier {
        Qualifier::of::<DiscoveryXPlay>()
    }
}

/// `@Named("discoveryx")`
pub fn discoveryx_qualifier() -> Qualifier {
    Qualifier::named(DISCOVERYX)
}

/// Provides the container's single [`DiscoveryXWsClient`].
///
/// The client is built when the provider is created; every call to
/// [`Provider::get`] returns that same instance.
pub struct DiscoveryXWsClientProvider {
    client: Arc<DiscoveryXWsClient>,
}

impl DiscoveryXWsClientProvider {
    pub fn new(primitive: reqwest::Client, system: &ActorSystem) -> Self {
        debug!(system = system.name(), "Building shared DiscoveryX client");
        Self {
            client: Arc::new(factory::ws_client_from_primitive(primitive, system)),
        }
    }

    /// Build the provider from dependencies registered in `container`.
    pub fn from_container(container: &Container) -> Result<Self, Error> {
        let primitive = container.resolve::<reqwest::Client>()?;
        let system = container.resolve::<ActorSystem>()?;
        Ok(Self::new(reqwest::Client::clone(&primitive), &system))
    }
}

impl Provider<DiscoveryXWsClient> for DiscoveryXWsClientProvider {
    fn get(&self) -> Arc<DiscoveryXWsClient> {
        Arc::clone(&self.client)
    }
}

/// Binds the DiscoveryX client and its aliases.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscoveryXWsModule;

impl Module for DiscoveryXWsModule {
    fn name(&self) -> &'static str {
        "DiscoveryXWsModule"
    }

    fn bindings(&self, _environment: &Environment, _config: &ConfigManager) -> Vec<Binding> {
        vec![
            Binding::bind::<DiscoveryXWsClient>()
                .to_provider(DiscoveryXWsClientProvider::from_container),
            Binding::bind::<dyn WsClient>()
                .qualified_with(discoveryx_qualifier())
                .to::<DiscoveryXWsClient, _>(|client| client as Arc<dyn WsClient>),
            Binding::bind::<dyn WsClient>()
                .qualified_with(DiscoveryXPlay::qualifier())
                .to::<DiscoveryXWsClient, _>(|client| client as Arc<dyn WsClient>),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WsClientKind;

    fn container() -> Container {
        let container = Container::new();
        container.register(reqwest::Client::new());
        container.register(ActorSystem::builder("module-test").build().unwrap());
        container
            .install(&DiscoveryXWsModule, &Environment::simple(), &ConfigManager::new())
            .unwrap();
        container
    }

    #[test]
    fn test_binding_declarations() {
        let bindings = DiscoveryXWsModule.bindings(&Environment::simple(), &ConfigManager::new());
        assert_eq!(bindings.len(), 3);

        assert!(bindings[0].is_provider());
        assert_eq!(
            bindings[0].key().type_name(),
            std::any::type_name::<DiscoveryXWsClient>()
        );
        assert_eq!(bindings[1].key().qualifier(), Some(&discoveryx_qualifier()));
        assert_eq!(bindings[2].key().qualifier(), Some(&DiscoveryXPlay::qualifier()));
        for alias in &bindings[1..] {
            assert_eq!(alias.alias_target(), Some(bindings[0].key()));
        }
    }

    #[test]
    fn test_declarations_are_stable() {
        let first = DiscoveryXWsModule.bindings(&Environment::simple(), &ConfigManager::new());
        let second = DiscoveryXWsModule.bindings(&Environment::simple(), &ConfigManager::new());
        let keys = |b: &[Binding]| b.iter().map(|b| b.key().clone()).collect::<Vec<_>>();
        assert_eq!(keys(&first), keys(&second));
    }

    #[tokio::test]
    async fn test_aliases_resolve_to_one_instance() {
        let container = container();

        let concrete = container.resolve::<DiscoveryXWsClient>().unwrap();
        let named = container
            .resolve_qualified::<dyn WsClient>(&discoveryx_qualifier())
            .unwrap();
        let marked = container
            .resolve_qualified::<dyn WsClient>(&DiscoveryXPlay::qualifier())
            .unwrap();

        assert_eq!(concrete.kind(), WsClientKind::Full);
        assert!(std::ptr::addr_eq(Arc::as_ptr(&named), Arc::as_ptr(&concrete)));
        assert!(std::ptr::addr_eq(Arc::as_ptr(&marked), Arc::as_ptr(&concrete)));
        assert!(std::ptr::eq(named.transport(), marked.transport()));
    }

    #[tokio::test]
    async fn test_provider_returns_same_instance() {
        let system = ActorSystem::builder("provider-test").build().unwrap();
        let provider = DiscoveryXWsClientProvider::new(reqwest::Client::new(), &system);
        assert!(Arc::ptr_eq(&provider.get(), &provider.get()));
        assert!(provider.get().system().ptr_eq(&system));
    }

    #[tokio::test]
    async fn test_install_twice_keeps_one_client() {
        let container = container();
        let before = container.resolve::<DiscoveryXWsClient>().unwrap();

        container
            .install(&DiscoveryXWsModule, &Environment::simple(), &ConfigManager::new())
            .unwrap();
        assert!(container.is_installed::<DiscoveryXWsModule>());

        let after = container.resolve::<DiscoveryXWsClient>().unwrap();
        let named = container
            .resolve_qualified::<dyn WsClient>(&discoveryx_qualifier())
            .unwrap();
        let marked = container
            .resolve_qualified::<dyn WsClient>(&DiscoveryXPlay::qualifier())
            .unwrap();

        assert!(Arc::ptr_eq(&before, &after));
        assert!(Arc::ptr_eq(before.transport(), after.transport()));
        for alias in [&named, &marked] {
            assert!(std::ptr::addr_eq(Arc::as_ptr(alias), Arc::as_ptr(&before)));
            assert!(std::ptr::eq(alias.transport(), before.transport().as_ref()));
        }
    }

    #[test]
    fn test_missing_dependencies_fail_resolution() {
        let container = Container::new();
        container
            .install(&DiscoveryXWsModule, &Environment::simple(), &ConfigManager::new())
            .unwrap();

        let err = container
            .resolve_qualified::<dyn WsClient>(&discoveryx_qualifier())
            .unwrap_err();
        assert!(matches!(err, Error::Construction { .. }));
    }
}
