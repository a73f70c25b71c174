//! Request builder.

use crate::{HttpClient, HttpClientError, Response, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::time::Duration;

/// HTTP request builder.
///
/// Invalid headers and unserializable bodies are remembered and reported
/// by [`send`](Self::send).
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
    error: Option<HttpClientError>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(client: &'a HttpClient, method: Method, url: String) -> Self {
        Self {
            client,
            method,
            url,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
            error: None,
        }
    }

    fn fail(mut self, error: HttpClientError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    /// Add a header to the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        let parsed = HeaderName::try_from(name.as_str())
            .map_err(|e| e.to_string())
            .and_then(|n| {
                HeaderValue::try_from(value.as_str())
                    .map(|v| (n, v))
                    .map_err(|e| e.to_string())
            });

        match parsed {
            Ok((name, value)) => {
                self.headers.insert(name, value);
                self
            }
            Err(e) => self.fail(HttpClientError::InvalidHeader(format!("{}: {}", name, e))),
        }
    }

    /// Add multiple headers to the request.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn queries<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.query.push((k.into(), v.into()));
        }
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.body = Some(text.into().into_bytes());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize>(mut self, json: &T) -> Self {
        match serde_json::to_vec(json) {
            Ok(bytes) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.body = Some(bytes);
                self
            }
            Err(e) => self.fail(HttpClientError::Json(e.to_string())),
        }
    }

    /// Set the request body as form data.
    pub fn form<T: Serialize>(mut self, form: &T) -> Self {
        match serde_urlencoded::to_string(form) {
            Ok(encoded) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                self.body = Some(encoded.into_bytes());
                self
            }
            Err(e) => self.fail(HttpClientError::RequestBuild(e.to_string())),
        }
    }

    /// Override the client timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    pub fn basic_auth(
        self,
        username: impl Into<String>,
        password: Option<impl Into<String>>,
    ) -> Self {
        use base64::Engine;
        let credentials = match password {
            Some(p) => format!("{}:{}", username.into(), p.into()),
            None => format!("{}:", username.into()),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.header("Authorization", format!("Basic {}", encoded))
    }

    /// Resolve the target URL against the configured base and append the
    /// query parameters.
    fn build_url(&self) -> Result<url::Url> {
        let mut url = match &self.client.config().base_url {
            Some(base) => url::Url::parse(base)?.join(&self.url)?,
            None => url::Url::parse(&self.url)
                .map_err(|e| HttpClientError::InvalidUrl(format!("{}: {}", self.url, e)))?,
        };

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Send the request.
    pub async fn send(mut self) -> Result<Response> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        let url = self.build_url()?;

        let mut request = self
            .client
            .inner()
            .request(self.method, url)
            .headers(self.headers);
        if let Some(body) = self.body {
            request = request.body(body);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        self.client.execute(request.build()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpClientConfig;
    use tokio::runtime::Handle;

    #[tokio::test]
    async fn test_relative_url_joins_base() {
        let config = HttpClientConfig::builder()
            .base_url("http://discoveryx.local:8099/api/")
            .build();
        let client = HttpClient::new(config, Handle::current()).unwrap();

        let url = client
            .get("services/orders")
            .query("zone", "eu-1")
            .build_url()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://discoveryx.local:8099/api/services/orders?zone=eu-1"
        );
    }

    #[tokio::test]
    async fn test_queries_are_appended_in_order() {
        let client = HttpClient::from_reqwest(reqwest::Client::new(), Handle::current());

        let url = client
            .get("http://discoveryx.local/v1/instances")
            .queries([("service", "orders"), ("zone", "eu 1")])
            .query("healthy", "true")
            .build_url()
            .unwrap();
        assert_eq!(url.query(), Some("service=orders&zone=eu+1&healthy=true"));
    }

    #[tokio::test]
    async fn test_relative_url_without_base_fails() {
        let client = HttpClient::from_reqwest(reqwest::Client::new(), Handle::current());
        let err = client.get("services").send().await.unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_invalid_header_reported_on_send() {
        let client = HttpClient::from_reqwest(reqwest::Client::new(), Handle::current());
        let err = client
            .get("http://127.0.0.1:1/")
            .header("bad header", "x")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidHeader(_)));
    }
}
