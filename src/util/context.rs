//! Global context for cowtools operations.
//!
//! Captures the working directory, the user's home, and the environment
//! variables cowtools depends on (`USER`, `VIRTUAL_ENV`) once, so that
//! everything downstream reads them from one place and tests can replace
//! them without touching the process environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;

/// Name of the per-user and per-project cowtools directory.
pub const COWTOOLS_DIR: &str = ".cowtools";

/// Global context containing paths and captured environment.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// The user's home directory
    home: PathBuf,

    /// Login name from `USER`
    user: Option<String>,

    /// Active virtual environment from `VIRTUAL_ENV`
    virtual_env: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a context from the current process.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .context("failed to determine home directory")?;

        Ok(GlobalContext {
            cwd,
            home,
            user: std::env::var("USER").ok().filter(|u| !u.is_empty()),
            virtual_env: std::env::var_os("VIRTUAL_ENV").map(PathBuf::from),
        })
    }

    /// Create a context with explicit paths and no captured environment.
    pub fn with_paths(cwd: PathBuf, home: PathBuf) -> Self {
        GlobalContext {
            cwd,
            home,
            user: None,
            virtual_env: None,
        }
    }

    /// Override the login name.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Override the active virtual environment.
    pub fn with_virtual_env(mut self, env: impl Into<PathBuf>) -> Self {
        self.virtual_env = Some(env.into());
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the user's home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Login name, if `USER` was set.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Active virtual environment, if any.
    pub fn virtual_env(&self) -> Option<&Path> {
        self.virtual_env.as_deref()
    }

    /// Get the global cowtools directory (~/.cowtools).
    pub fn global_dir(&self) -> PathBuf {
        self.home.join(COWTOOLS_DIR)
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.global_dir().join("config.toml")
    }

    /// Get the project-local cowtools directory.
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.join(COWTOOLS_DIR)
    }

    /// Get the project-local configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
