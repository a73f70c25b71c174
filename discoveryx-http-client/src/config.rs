//! HTTP client configuration.

use crate::{HttpClientError, Result};
use discoveryx_config::{ConfigManager, ConfigValidator, Validate};
use discoveryx_core::Environment;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Where HTTP client settings live in the configuration tree.
pub const HTTP_CLIENT_CONFIG_PATH: &str = "discoveryx.http-client";

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL relative request paths are joined onto.
    pub base_url: Option<String>,
    /// Default request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// How long idle pooled connections are kept.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Default headers for all requests.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip and brotli response decompression.
    pub compression: bool,
    /// Follow redirects.
    pub follow_redirects: bool,
    /// Maximum redirects to follow.
    pub max_redirects: usize,
    /// PEM file with additional trusted root certificates.
    pub trust_store: Option<PathBuf>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 32,
            default_headers: Vec::new(),
            user_agent: format!("discoveryx-http-client/{}", env!("CARGO_PKG_VERSION")),
            compression: true,
            follow_redirects: true,
            max_redirects: 10,
            trust_store: None,
        }
    }
}

impl HttpClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Resolve settings from the `discoveryx.http-client` subtree.
    ///
    /// An absent subtree yields the defaults. A present subtree must be
    /// complete: every required key set, no unknown keys, values valid.
    /// Relative trust-store paths are resolved against `environment`.
    pub fn from_config(config: &ConfigManager, environment: &Environment) -> Result<Self> {
        if !config.has(HTTP_CLIENT_CONFIG_PATH) {
            debug!(
                path = HTTP_CLIENT_CONFIG_PATH,
                "No HTTP client settings configured, using defaults"
            );
            return Ok(Self::default());
        }

        let settings: HttpClientSettings = config.get_validated(HTTP_CLIENT_CONFIG_PATH)?;
        debug!(
            path = HTTP_CLIENT_CONFIG_PATH,
            base_url = settings.base_url.as_deref().unwrap_or("<none>"),
            "Resolved HTTP client settings"
        );
        Ok(settings.into_config(environment))
    }

    /// Start a reqwest client builder carrying these settings.
    ///
    /// Reads the trust store, if one is configured.
    pub fn reqwest_builder(&self) -> Result<reqwest::ClientBuilder> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .user_agent(self.user_agent.as_str())
            .gzip(self.compression)
            .brotli(self.compression)
            .default_headers(self.header_map()?);

        builder = if self.follow_redirects {
            builder.redirect(reqwest::redirect::Policy::limited(self.max_redirects))
        } else {
            builder.redirect(reqwest::redirect::Policy::none())
        };

        if let Some(path) = &self.trust_store {
            let pem = std::fs::read(path).map_err(|source| HttpClientError::TrustStore {
                path: path.clone(),
                source,
            })?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }

        Ok(builder)
    }

    fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.default_headers.len());
        for (name, value) in &self.default_headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| HttpClientError::InvalidHeader(format!("{}: {}", name, e)))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| HttpClientError::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}

/// Shape of the `discoveryx.http-client` subtree.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct HttpClientSettings {
    #[serde(default)]
    base_url: Option<String>,
    connect_timeout_ms: u64,
    request_timeout_ms: u64,
    pool_idle_timeout_ms: u64,
    max_idle_connections_per_host: usize,
    follow_redirects: bool,
    max_redirects: usize,
    compression: bool,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    trust_store: Option<String>,
    #[serde(default)]
    default_headers: BTreeMap<String, String>,
}

impl Validate for HttpClientSettings {
    fn validate(&self) -> discoveryx_config::Result<()> {
        ConfigValidator::positive(self.connect_timeout_ms, "connect-timeout-ms")?;
        ConfigValidator::positive(self.request_timeout_ms, "request-timeout-ms")?;
        if let Some(base_url) = &self.base_url {
            ConfigValidator::is_url(base_url, "base-url")?;
        }
        if let Some(user_agent) = &self.user_agent {
            ConfigValidator::not_empty(user_agent, "user-agent")?;
        }
        if let Some(trust_store) = &self.trust_store {
            ConfigValidator::not_empty(trust_store, "trust-store")?;
        }
        if self.follow_redirects {
            ConfigValidator::in_range(self.max_redirects, 1, 64, "max-redirects")?;
        }
        Ok(())
    }
}

impl HttpClientSettings {
    fn into_config(self, environment: &Environment) -> HttpClientConfig {
        let defaults = HttpClientConfig::default();
        HttpClientConfig {
            base_url: self.base_url,
            timeout: Duration::from_millis(self.request_timeout_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            pool_idle_timeout: Duration::from_millis(self.pool_idle_timeout_ms),
            pool_max_idle_per_host: self.max_idle_connections_per_host,
            default_headers: self.default_headers.into_iter().collect(),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            compression: self.compression,
            follow_redirects: self.follow_redirects,
            max_redirects: self.max_redirects,
            trust_store: self.trust_store.map(|path| environment.resolve(path)),
        }
    }
}

/// Builder for HTTP client configuration.
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL for all requests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the connection pool idle timeout.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Add a default header for all requests.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable response decompression.
    pub fn compression(mut self, enable: bool) -> Self {
        self.config.compression = enable;
        self
    }

    /// Enable or disable following redirects.
    pub fn follow_redirects(mut self, enable: bool) -> Self {
        self.config.follow_redirects = enable;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Trust the root certificates in a PEM file.
    pub fn trust_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.trust_store = Some(path.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}
