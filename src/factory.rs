//! Direct construction of DiscoveryX clients.
//!
//! Each call builds a new client; nothing is cached. Functions that build
//! their own transport read the `discoveryx.http-client` settings of the
//! actor system and fail on malformed settings. Functions given a transport
//! or a reqwest client never look at configuration.

use crate::client::{DiscoveryXWsClient, WsClientKind};
use discoveryx_core::ActorSystem;
use discoveryx_http_client::{CookieJar, HttpClient, HttpClientConfig, Result};
use std::sync::Arc;
use tracing::debug;

/// Build a standalone client with a transport configured from `system`.
pub fn standalone_ws_client(system: &ActorSystem) -> Result<DiscoveryXWsClient> {
    let config = HttpClientConfig::from_config(system.config(), system.environment())?;
    let transport = HttpClient::new(config, system.executor().clone())?;

    debug!(system = system.name(), "Created standalone DiscoveryX client");
    Ok(DiscoveryXWsClient::new(
        WsClientKind::Standalone,
        Arc::new(transport),
        system,
    ))
}

/// Wrap a caller-owned transport as a standalone client.
pub fn standalone_ws_client_with(client: Arc<HttpClient>, system: &ActorSystem) -> DiscoveryXWsClient {
    DiscoveryXWsClient::new(WsClientKind::Standalone, client, system)
}

/// Adapt a reqwest client into a standalone client bound to the system
/// executor.
pub fn standalone_ws_client_from_primitive(
    primitive: reqwest::Client,
    system: &ActorSystem,
) -> DiscoveryXWsClient {
    let transport = HttpClient::from_reqwest(primitive, system.executor().clone());
    standalone_ws_client_with(Arc::new(transport), system)
}

/// Build a full client configured from `system`, with a fresh cookie store.
pub fn ws_client(system: &ActorSystem) -> Result<DiscoveryXWsClient> {
    let config = HttpClientConfig::from_config(system.config(), system.environment())?;
    let jar = Arc::new(CookieJar::default());
    let primitive = config
        .reqwest_builder()?
        .cookie_provider(Arc::clone(&jar))
        .build()?;
    let transport = HttpClient::from_parts(primitive, config, Some(jar), system.executor().clone());

    debug!(system = system.name(), "Created DiscoveryX client");
    Ok(DiscoveryXWsClient::new(
        WsClientKind::Full,
        Arc::new(transport),
        system,
    ))
}

/// Wrap a caller-owned transport as a full client.
pub fn ws_client_with(client: Arc<HttpClient>, system: &ActorSystem) -> DiscoveryXWsClient {
    DiscoveryXWsClient::new(WsClientKind::Full, client, system)
}

/// Adapt a reqwest client into a full client bound to the system executor.
pub fn ws_client_from_primitive(primitive: reqwest::Client, system: &ActorSystem) -> DiscoveryXWsClient {
    let transport = HttpClient::from_reqwest(primitive, system.executor().clone());
    ws_client_with(Arc::new(transport), system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use discoveryx_config::{ConfigError, ConfigManager};
    use discoveryx_http_client::HttpClientError;
    use serde_json::json;
    use std::time::Duration;

    fn system_with(settings: serde_json::Value) -> ActorSystem {
        let config = ConfigManager::new();
        config.set("discoveryx.http-client", settings).unwrap();
        ActorSystem::builder("factory-test")
            .config(config)
            .build()
            .unwrap()
    }

    fn settings() -> serde_json::Value {
        json!({
            "base-url": "http://discoveryx.local:8099",
            "connect-timeout-ms": 1000,
            "request-timeout-ms": 7000,
            "pool-idle-timeout-ms": 20000,
            "max-idle-connections-per-host": 2,
            "follow-redirects": true,
            "max-redirects": 3,
            "compression": true
        })
    }

    #[tokio::test]
    async fn test_standalone_reflects_configuration() {
        let system = system_with(settings());
        let client = standalone_ws_client(&system).unwrap();

        assert_eq!(client.kind(), WsClientKind::Standalone);
        let config = client.transport().config();
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.base_url.as_deref(), Some("http://discoveryx.local:8099"));
        assert!(client.system().ptr_eq(&system));
    }

    #[tokio::test]
    async fn test_full_client_has_cookie_store() {
        let system = system_with(settings());
        let client = ws_client(&system).unwrap();

        assert!(client.is_full());
        assert!(client.cookie_jar().is_ok());
        assert_eq!(client.transport().config().max_redirects, 3);
    }

    #[tokio::test]
    async fn test_without_settings_uses_defaults() {
        let system = ActorSystem::builder("defaults").build().unwrap();
        let client = standalone_ws_client(&system).unwrap();
        assert_eq!(
            client.transport().config().timeout,
            HttpClientConfig::default().timeout
        );
    }

    #[tokio::test]
    async fn test_supplied_transport_is_used_as_is() {
        let system = system_with(settings());
        let transport = Arc::new(HttpClient::from_reqwest(
            reqwest::Client::new(),
            system.executor().clone(),
        ));

        let standalone = standalone_ws_client_with(transport.clone(), &system);
        let full = ws_client_with(transport.clone(), &system);

        assert!(Arc::ptr_eq(standalone.transport(), &transport));
        assert!(Arc::ptr_eq(full.transport(), &transport));
        assert!(full.is_full());
    }

    #[tokio::test]
    async fn test_supplied_transport_skips_configuration() {
        let mut broken = settings();
        broken.as_object_mut().unwrap().remove("compression");
        let system = system_with(broken);

        let transport = Arc::new(HttpClient::from_reqwest(
            reqwest::Client::new(),
            system.executor().clone(),
        ));
        let client = ws_client_with(transport, &system);
        assert!(client.transport().config().base_url.is_none());

        let client = standalone_ws_client_from_primitive(reqwest::Client::new(), &system);
        assert_eq!(client.kind(), WsClientKind::Standalone);
    }

    #[tokio::test]
    async fn test_missing_required_setting_fails() {
        let mut broken = settings();
        broken.as_object_mut().unwrap().remove("connect-timeout-ms");
        let system = system_with(broken);

        let err = standalone_ws_client(&system).unwrap_err();
        assert!(matches!(err, HttpClientError::Config(ConfigError::InvalidValue { .. })));
        assert!(err.is_construction());
        assert!(ws_client(&system).is_err());
    }

    #[tokio::test]
    async fn test_unparsable_base_url_fails_construction() {
        let mut bad_url = settings();
        bad_url["base-url"] = json!("http://exa mple.com:99999");
        let system = system_with(bad_url);

        for result in [ws_client(&system), standalone_ws_client(&system)] {
            let err = result.unwrap_err();
            assert!(matches!(
                err,
                HttpClientError::Config(ConfigError::ValidationError(_))
            ));
            assert!(err.is_construction());
        }
    }

    #[tokio::test]
    async fn test_unreadable_trust_store_fails() {
        let mut with_store = settings();
        with_store["trust-store"] = json!("missing/ca.pem");
        let system = system_with(with_store);

        assert!(matches!(
            ws_client(&system),
            Err(HttpClientError::TrustStore { .. })
        ));
    }

    #[tokio::test]
    async fn test_each_call_builds_a_new_transport() {
        let system = system_with(settings());
        let first = standalone_ws_client(&system).unwrap();
        let second = standalone_ws_client(&system).unwrap();
        assert!(!Arc::ptr_eq(first.transport(), second.transport()));

        let first = ws_client(&system).unwrap();
        let second = ws_client(&system).unwrap();
        assert!(!Arc::ptr_eq(first.transport(), second.transport()));
        assert!(!Arc::ptr_eq(
            first.cookie_jar().unwrap(),
            second.cookie_jar().unwrap()
        ));
    }
}
