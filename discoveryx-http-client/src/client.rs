//! HTTP client implementation.

use http::Method;
use reqwest::Request;
use reqwest::cookie::Jar;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::{HttpClientConfig, HttpClientError, RequestBuilder, Response, Result};

/// Asynchronous HTTP client bound to an executor.
///
/// Requests are spawned onto the executor handle the client was created
/// with, so a client built for one runtime keeps running there no matter
/// which task awaits the response.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<HttpClientConfig>,
    cookie_jar: Option<Arc<Jar>>,
    executor: Handle,
}

impl HttpClient {
    /// Build a client from configuration.
    ///
    /// Fails if the trust store cannot be read or reqwest rejects the
    /// settings.
    pub fn new(config: HttpClientConfig, executor: Handle) -> Result<Self> {
        let inner = config.reqwest_builder()?.build()?;
        debug!(
            base_url = config.base_url.as_deref().unwrap_or("<none>"),
            timeout_ms = config.timeout.as_millis() as u64,
            "Created HTTP client"
        );
        Ok(Self::from_parts(inner, config, None, executor))
    }

    /// Adapt an existing reqwest client.
    ///
    /// The primitive keeps its own settings; the recorded configuration is
    /// the default one, so relative URLs are not resolved.
    pub fn from_reqwest(client: reqwest::Client, executor: Handle) -> Self {
        Self::from_parts(client, HttpClientConfig::default(), None, executor)
    }

    /// Assemble a client from a reqwest client and the configuration it was
    /// built from. Pass the jar given to `cookie_provider`, if any.
    pub fn from_parts(
        inner: reqwest::Client,
        config: HttpClientConfig,
        cookie_jar: Option<Arc<Jar>>,
        executor: Handle,
    ) -> Self {
        Self {
            inner,
            config: Arc::new(config),
            cookie_jar,
            executor,
        }
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Cookie jar shared with the underlying client, if one was attached.
    pub fn cookie_jar(&self) -> Option<&Arc<Jar>> {
        self.cookie_jar.as_ref()
    }

    /// Executor requests run on.
    pub fn executor(&self) -> &Handle {
        &self.executor
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::GET, url.into())
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::POST, url.into())
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PUT, url.into())
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PATCH, url.into())
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::DELETE, url.into())
    }

    /// Create a HEAD request builder.
    pub fn head(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::HEAD, url.into())
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, url.into())
    }

    /// Execute a request on the client's executor.
    pub(crate) async fn execute(&self, request: Request) -> Result<Response> {
        trace!(method = %request.method(), url = %request.url(), "Dispatching request");

        let client = self.inner.clone();
        let task = self.executor.spawn(async move {
            let response = client.execute(request).await?;
            Response::from_reqwest(response).await
        });

        task.await
            .map_err(|e| HttpClientError::Executor(e.to_string()))?
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("cookies", &self.cookie_jar.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new(HttpClientConfig::default(), Handle::current()).unwrap();
        assert!(client.config().compression);
        assert!(client.cookie_jar().is_none());
    }

    #[tokio::test]
    async fn test_client_with_config() {
        let config = HttpClientConfig::builder()
            .timeout(Duration::from_secs(60))
            .base_url("https://discoveryx.example.com")
            .build();

        let client = HttpClient::new(config, Handle::current()).unwrap();
        assert_eq!(client.config().timeout, Duration::from_secs(60));
        assert_eq!(
            client.config().base_url.as_deref(),
            Some("https://discoveryx.example.com")
        );
    }

    #[tokio::test]
    async fn test_from_reqwest_uses_default_config() {
        let client = HttpClient::from_reqwest(reqwest::Client::new(), Handle::current());
        assert!(client.config().base_url.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_cookie_jar() {
        let jar = Arc::new(Jar::default());
        let client = HttpClient::from_parts(
            reqwest::Client::new(),
            HttpClientConfig::default(),
            Some(jar.clone()),
            Handle::current(),
        );
        let clone = client.clone();
        assert!(Arc::ptr_eq(clone.cookie_jar().unwrap(), &jar));
    }
}
