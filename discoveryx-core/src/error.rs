// Error types for the DiscoveryX core

use discoveryx_config::ConfigError;
use thiserror::Error;

/// Boxed error raised by a provider while constructing its instance.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dependency injection error: {0}")]
    DependencyInjection(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Binding already registered: {0}")]
    DuplicateBinding(String),

    #[error("Failed to construct {binding}: {source}")]
    Construction { binding: String, source: BoxError },

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a construction failure for the named binding.
    pub fn construction(binding: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Construction {
            binding: binding.into(),
            source: source.into(),
        }
    }
}
