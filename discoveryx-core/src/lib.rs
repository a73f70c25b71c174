// DiscoveryX core: actor system handle, environment and dependency injection

pub mod container;
pub mod environment;
pub mod error;
pub mod logging;
pub mod module;
pub mod runtime;
pub mod traits;

pub use container::Container;
pub use environment::{Environment, Mode};
pub use error::{BoxError, Error};
pub use module::{Binding, BindingBuilder, BindingKey, Module, Qualifier};
pub use runtime::{ActorSystem, ActorSystemBuilder};
pub use traits::Provider;

pub use discoveryx_config as config;
