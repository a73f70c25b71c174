//! The DiscoveryX client handle.

use discoveryx_core::ActorSystem;
use discoveryx_http_client::{CookieJar, HttpClient, HttpClientError, RequestBuilder, Result};
use reqwest::Method;
use reqwest::cookie::CookieStore;
use std::fmt;
use std::sync::Arc;

/// Which flavour of client a [`DiscoveryXWsClient`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WsClientKind {
    /// Plain request/response client.
    Standalone,
    /// Client with a session cookie store.
    Full,
}

/// Generic HTTP client interface, as seen by consumers that only need to
/// issue requests.
pub trait WsClient: Send + Sync + fmt::Debug {
    /// The transport requests go through.
    fn transport(&self) -> &HttpClient;

    fn kind(&self) -> WsClientKind;

    /// The low-level reqwest client.
    fn underlying(&self) -> &reqwest::Client {
        self.transport().inner()
    }

    /// Start a request with an arbitrary method.
    fn request(&self, method: Method, url: &str) -> RequestBuilder<'_> {
        self.transport().request(method, url)
    }

    /// Start a GET request.
    fn url(&self, url: &str) -> RequestBuilder<'_> {
        self.transport().get(url)
    }
}

/// HTTP client handle pre-configured for the DiscoveryX server.
///
/// Built by the functions in [`factory`](crate::factory) or resolved from a
/// container the [`DiscoveryXWsModule`](crate::DiscoveryXWsModule) was
/// installed into. The handle is immutable; the transport is released when
/// the last reference to it is dropped.
pub struct DiscoveryXWsClient {
    kind: WsClientKind,
    transport: Arc<HttpClient>,
    system: ActorSystem,
}

impl DiscoveryXWsClient {
    pub(crate) fn new(kind: WsClientKind, transport: Arc<HttpClient>, system: &ActorSystem) -> Self {
        Self {
            kind,
            transport,
            system: system.clone(),
        }
    }

    pub fn kind(&self) -> WsClientKind {
        self.kind
    }

    pub fn is_full(&self) -> bool {
        self.kind == WsClientKind::Full
    }

    /// The shared transport.
    pub fn transport(&self) -> &Arc<HttpClient> {
        &self.transport
    }

    /// The actor system this client was created for.
    pub fn system(&self) -> &ActorSystem {
        &self.system
    }

    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.transport.get(url)
    }

    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.transport.post(url)
    }

    pub fn put(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.transport.put(url)
    }

    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.transport.patch(url)
    }

    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.transport.delete(url)
    }

    pub fn head(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        self.transport.head(url)
    }

    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_> {
        self.transport.request(method, url)
    }

    /// The session cookie store.
    ///
    /// Only full clients built from configuration have one.
    pub fn cookie_jar(&self) -> Result<&Arc<CookieJar>> {
        if !self.is_full() {
            return Err(HttpClientError::Unsupported(
                "cookies require a full DiscoveryX client".to_string(),
            ));
        }
        self.transport.cookie_jar().ok_or_else(|| {
            HttpClientError::Unsupported(
                "the supplied transport does not expose its cookie store".to_string(),
            )
        })
    }

    /// Store a `Set-Cookie` style value for `url`.
    pub fn add_cookie(&self, cookie: &str, url: &str) -> Result<()> {
        let jar = self.cookie_jar()?;
        let url = url::Url::parse(url)?;
        jar.add_cookie_str(cookie, &url);
        Ok(())
    }

    /// The `Cookie` header that would be sent to `url`, if any.
    pub fn cookies(&self, url: &str) -> Result<Option<String>> {
        let jar = self.cookie_jar()?;
        let url = url::Url::parse(url)?;
        Ok(jar
            .cookies(&url)
            .and_then(|value| value.to_str().ok().map(str::to_string)))
    }
}

impl WsClient for DiscoveryXWsClient {
    fn transport(&self) -> &HttpClient {
        &self.transport
    }

    fn kind(&self) -> WsClientKind {
        self.kind
    }
}

impl fmt::Debug for DiscoveryXWsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryXWsClient")
            .field("kind", &self.kind)
            .field("system", &self.system.name())
            .field("transport", &self.transport)
            .finish()
    }
}
