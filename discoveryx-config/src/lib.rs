// Configuration tree for DiscoveryX clients

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// Main configuration manager.
///
/// Holds a tree of JSON values. Keys are dotted paths
/// (`discoveryx.http-client.request-timeout-ms`); a key that exists verbatim at
/// the top level (as environment variables do) wins over path traversal.
#[derive(Clone)]
pub struct ConfigManager {
    root: Arc<RwLock<Value>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a new, empty configuration manager
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Object(Map::new()))),
            env_prefix: None,
        }
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: String) -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Object(Map::new()))),
            env_prefix: Some(prefix),
        }
    }

    /// Create a manager seeded with an existing tree. The value must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ConfigError::ParseError(
                "configuration root must be an object".to_string(),
            ));
        }
        Ok(Self {
            root: Arc::new(RwLock::new(value)),
            env_prefix: None,
        })
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        let env_vars = loader.load()?;

        let mut root = self.root.write();
        if let Value::Object(map) = &mut *root {
            for (key, value) in env_vars {
                if matches!(map.get(&key), Some(Value::Object(_))) {
                    debug!(key = %key, "Environment variable would replace a configuration section, skipping");
                    continue;
                }
                map.insert(key, Value::String(value));
            }
        }

        Ok(())
    }

    /// Load configuration from .env file
    pub fn load_dotenv(&self, path: Option<&str>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else {
            dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
        }
        self.load_env()
    }

    /// Load configuration from file, deep-merging it over the current tree
    pub fn load_file(&self, path: &str, format: FileFormat) -> Result<()> {
        let loader = ConfigLoader::new(format);
        let data = loader.load_file(path)?;
        debug!(path, ?format, "Loaded configuration file");
        self.merge_value(data)
    }

    /// Parse configuration text and deep-merge it over the current tree
    pub fn load_str(&self, content: &str, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).parse(content)?;
        self.merge_value(data)
    }

    fn merge_value(&self, data: Value) -> Result<()> {
        if !data.is_object() {
            return Err(ConfigError::ParseError(
                "configuration document must be a table/object".to_string(),
            ));
        }
        merge_values(&mut self.root.write(), data);
        Ok(())
    }

    /// Set a configuration value, replacing whatever subtree was at `key`
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let segments = split_key(key)?;
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        trace!(key, "Setting configuration value");
        insert_path(&mut self.root.write(), &segments, json_value);

        Ok(())
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .get_value(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Get the raw value (or subtree) at `key`
    pub fn get_value(&self, key: &str) -> Option<Value> {
        let root = self.root.read();
        lookup(&root, key).cloned()
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    /// Get an integer value
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get(key)
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    /// Get a float value
    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.get(key)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        let root = self.root.read();
        lookup(&root, key).is_some()
    }

    /// Get all top-level configuration keys
    pub fn keys(&self) -> Vec<String> {
        let root = self.root.read();
        root.as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Deep-merge configuration from another manager; `other` wins on conflicts
    pub fn merge(&self, other: &ConfigManager) -> Result<()> {
        if Arc::ptr_eq(&self.root, &other.root) {
            return Ok(());
        }
        let snapshot = other.root.read().clone();
        self.merge_value(snapshot)
    }

    /// Load and validate the subtree at `key`
    pub fn get_validated<T: DeserializeOwned + Validate>(&self, key: &str) -> Result<T> {
        let validated: T = self.get(key)?;
        validated.validate()?;
        Ok(validated)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("keys", &self.keys())
            .field("env_prefix", &self.env_prefix)
            .finish()
    }
}

fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "empty path segment".to_string(),
        });
    }
    Ok(segments)
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(value) = root.get(key) {
        return Some(value);
    }
    key.split('.').try_fold(root, |node, segment| node.get(segment))
}

fn insert_path(node: &mut Value, segments: &[&str], value: Value) {
    match segments {
        [] => *node = value,
        [head, rest @ ..] => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            if let Value::Object(map) = node {
                let child = map.entry((*head).to_string()).or_insert(Value::Null);
                insert_path(child, rest, value);
            }
        }
    }
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}
