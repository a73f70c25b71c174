//! # DiscoveryX HTTP Client
//!
//! The asynchronous HTTP transport behind DiscoveryX clients. Settings are
//! read from the `discoveryx.http-client` section of the configuration tree,
//! and every request runs on the executor the client was bound to.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use discoveryx_http_client::{HttpClient, HttpClientConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HttpClientConfig::builder()
//!         .base_url("http://discoveryx.local:8099")
//!         .timeout(Duration::from_secs(10))
//!         .build();
//!     let client = HttpClient::new(config, tokio::runtime::Handle::current())?;
//!
//!     let response = client.get("/v1/services").send().await?;
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! ## From Configuration
//!
//! ```rust,no_run
//! use discoveryx_config::ConfigManager;
//! use discoveryx_core::Environment;
//! use discoveryx_http_client::HttpClientConfig;
//!
//! let config = ConfigManager::new();
//! config.load_file("conf/application.toml", discoveryx_config::FileFormat::Toml)?;
//! let settings = HttpClientConfig::from_config(&config, &Environment::simple())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::HttpClient;
pub use config::{HTTP_CLIENT_CONFIG_PATH, HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use request::RequestBuilder;
pub use response::Response;

pub use reqwest::cookie::Jar as CookieJar;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{HttpClient, HttpClientConfig, HttpClientError, RequestBuilder, Response};
}
