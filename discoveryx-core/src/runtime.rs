//! Handle to the host application's actor system.
//!
//! The actor runtime itself is owned by the host; this handle only exposes the
//! pieces clients need: the configuration tree, the executor work should run
//! on, and the application [`Environment`].

use crate::logging::debug;
use crate::{Environment, Error};
use discoveryx_config::{ConfigLoader, ConfigManager};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Cheaply cloneable handle to a running actor system
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<SystemInner>,
}

struct SystemInner {
    name: String,
    config: ConfigManager,
    executor: Handle,
    environment: Environment,
}

impl ActorSystem {
    /// Start building a handle for the system called `name`
    pub fn builder(name: impl Into<String>) -> ActorSystemBuilder {
        ActorSystemBuilder {
            name: name.into(),
            config: None,
            config_files: Vec::new(),
            environment: None,
            executor: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The system's configuration tree
    pub fn config(&self) -> &ConfigManager {
        &self.inner.config
    }

    /// The executor the system's work runs on
    pub fn executor(&self) -> &Handle {
        &self.inner.executor
    }

    pub fn environment(&self) -> &Environment {
        &self.inner.environment
    }

    /// Run a future on the system's executor
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.inner.executor.spawn(future)
    }

    /// Whether two handles point at the same system
    pub fn ptr_eq(&self, other: &ActorSystem) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSystem")
            .field("name", &self.inner.name)
            .field("mode", &self.inner.environment.mode())
            .finish()
    }
}

/// Builder for [`ActorSystem`]
pub struct ActorSystemBuilder {
    name: String,
    config: Option<ConfigManager>,
    config_files: Vec<PathBuf>,
    environment: Option<Environment>,
    executor: Option<Handle>,
}

impl ActorSystemBuilder {
    /// Use an existing configuration tree
    pub fn config(mut self, config: ConfigManager) -> Self {
        self.config = Some(config);
        self
    }

    /// Merge a configuration file into the tree. Relative paths resolve
    /// against the environment root; the format follows the extension.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Run work on `executor` instead of the ambient tokio runtime
    pub fn executor(mut self, executor: Handle) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Build the handle.
    ///
    /// Without an explicit executor this must be called from inside a tokio
    /// runtime.
    pub fn build(self) -> Result<ActorSystem, Error> {
        let executor = match self.executor {
            Some(executor) => executor,
            None => Handle::try_current().map_err(|e| {
                Error::Runtime(format!(
                    "actor system '{}' needs an executor: {}",
                    self.name, e
                ))
            })?,
        };
        let environment = self.environment.unwrap_or_default();
        let config = self.config.unwrap_or_default();

        for file in &self.config_files {
            let path = environment.resolve(file);
            let data = ConfigLoader::auto(&path)?.load_file(&path)?;
            config.merge(&ConfigManager::from_value(data)?)?;
        }

        debug!(
            system = %self.name,
            mode = %environment.mode(),
            config_files = self.config_files.len(),
            "Actor system handle created"
        );

        Ok(ActorSystem {
            inner: Arc::new(SystemInner {
                name: self.name,
                config,
                executor,
                environment,
            }),
        })
    }
}
