//! Buffered HTTP response.

use crate::{HttpClientError, Result};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// HTTP response with its body fully read.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: url::Url,
}

impl Response {
    /// Read a reqwest response to completion.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
            url,
        })
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the response was a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Check if the response was a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value, if present and valid UTF-8.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Final URL, after redirects.
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Get the response body as bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and return the body as bytes.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// Get the response body as UTF-8 text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| HttpClientError::Decode(e.to_string()))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| HttpClientError::Json(e.to_string()))
    }

    /// Get the content type if available.
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }

    /// Turn 4xx and 5xx responses into [`HttpClientError::Response`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_client_error() || self.status.is_server_error() {
            let message = self.text().unwrap_or_else(|_| "Unknown error".to_string());
            Err(HttpClientError::Response {
                status: self.status.as_u16(),
                message,
            })
        } else {
            Ok(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn response(status: u16, content_type: &str, body: Vec<u8>) -> Response {
        let raw = http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, content_type)
            .body(body)
            .unwrap();
        Response::from_reqwest(reqwest::Response::from(raw))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_body() {
        let response = response(200, "application/json", br#"{"healthy":true}"#.to_vec()).await;

        assert!(response.is_success());
        assert_eq!(response.content_type(), Some("application/json"));
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["healthy"], true);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_a_decode_error() {
        let response = response(200, "text/plain", vec![0xff, 0xfe, 0xfd]).await;

        assert!(matches!(response.text(), Err(HttpClientError::Decode(_))));
        assert!(matches!(
            response.json::<serde_json::Value>(),
            Err(HttpClientError::Json(_))
        ));
        assert_eq!(response.into_bytes().len(), 3);
    }

    #[tokio::test]
    async fn test_error_for_status() {
        let missing = response(404, "text/plain", b"no such service".to_vec()).await;
        assert!(missing.is_client_error());
        let err = missing.error_for_status().unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert!(err.to_string().contains("no such service"));

        let ok = response(200, "text/plain", b"ok".to_vec()).await;
        assert!(ok.error_for_status().is_ok());
    }
}
