//! Application environment: where the application lives on disk and which mode
//! it runs in. Relative resource paths found in configuration (trust stores,
//! extra config files) are resolved against the environment root.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Dev,
    #[default]
    Test,
    Prod,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Dev => "dev",
            Mode::Test => "test",
            Mode::Prod => "prod",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Mode::Dev),
            "test" => Ok(Mode::Test),
            "prod" | "production" => Ok(Mode::Prod),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The environment an application runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    root_path: PathBuf,
    mode: Mode,
}

impl Environment {
    pub fn new(root_path: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            root_path: root_path.into(),
            mode,
        }
    }

    /// Current directory, test mode
    pub fn simple() -> Self {
        Self::new(".", Mode::Test)
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_prod(&self) -> bool {
        self.mode == Mode::Prod
    }

    /// Resolve a resource path. Absolute paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_path.join(path)
        }
    }

    /// Read a resource relative to the root
    pub fn read_resource(&self, path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::simple()
    }
}
