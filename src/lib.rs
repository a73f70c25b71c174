//! # DiscoveryX WS Client
//!
//! HTTP client handles pre-configured for the DiscoveryX service-discovery
//! server, for applications running an [`ActorSystem`].
//!
//! Two ways to get one:
//!
//! - **Direct**: the functions in [`factory`] build a new client per call.
//! - **Injected**: install [`DiscoveryXWsModule`] into a [`Container`] and
//!   resolve `DiscoveryXWsClient`, or `dyn WsClient` qualified with
//!   `@Named("discoveryx")` or [`DiscoveryXPlay`]. All three keys share one
//!   client per container.
//!
//! ## Direct construction
//!
//! ```rust,no_run
//! use discoveryx_client_ws::factory;
//! use discoveryx_core::ActorSystem;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = ActorSystem::builder("orders")
//!         .config_file("conf/application.toml")
//!         .build()?;
//!
//!     let client = factory::ws_client(&system)?;
//!     let services = client.get("/v1/services").send().await?;
//!     println!("{}", services.text()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Container injection
//!
//! ```rust,no_run
//! use discoveryx_client_ws::{DiscoveryXWsModule, WsClient, discoveryx_qualifier};
//! use discoveryx_core::{ActorSystem, Container};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = ActorSystem::builder("orders").build()?;
//!
//!     let container = Container::new();
//!     container.register(reqwest::Client::new());
//!     container.register(system.clone());
//!     container.install(&DiscoveryXWsModule, system.environment(), system.config())?;
//!
//!     let client = container.resolve_qualified::<dyn WsClient>(&discoveryx_qualifier())?;
//!     client.url("http://discoveryx.local:8099/v1/services").send().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod factory;
pub mod module;

pub use client::{DiscoveryXWsClient, WsClient, WsClientKind};
pub use factory::{
    standalone_ws_client, standalone_ws_client_from_primitive, standalone_ws_client_with,
    ws_client, ws_client_from_primitive, ws_client_with,
};
pub use module::{
    DISCOVERYX, DiscoveryXPlay, DiscoveryXWsClientProvider, DiscoveryXWsModule,
    discoveryx_qualifier,
};

pub use discoveryx_core::{ActorSystem, Container};
pub use discoveryx_http_client::{HttpClient, HttpClientConfig, HttpClientError};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::client::{DiscoveryXWsClient, WsClient, WsClientKind};
    pub use crate::factory::*;
    pub use crate::module::{DiscoveryXPlay, DiscoveryXWsModule, discoveryx_qualifier};
    pub use discoveryx_core::{ActorSystem, Container};
}
