//! Questions cowtools asks the host system.
//!
//! Pool construction needs a handful of facts only external programs can
//! answer. They sit behind [`HostProbe`] so pool construction can be tested
//! without a grid proxy or a Python installation.

use std::path::PathBuf;

use anyhow::Result;

use crate::util::process::{find_executable, ProcessBuilder};

/// Prints `sys.path`, one entry per line, skipping the empty entry.
const PRINT_SYS_PATH: &str = "import sys; print('\\n'.join(p for p in sys.path if p))";

/// Source of host facts used while building a worker pool.
pub trait HostProbe {
    /// Output of `voms-proxy-info`.
    fn proxy_info(&self) -> Result<String>;

    /// Module search path of the local Python interpreter.
    fn python_search_path(&self) -> Result<Vec<PathBuf>>;

    /// Path of the local Python interpreter as found on PATH.
    fn python_executable(&self) -> Option<PathBuf>;
}

/// Probe backed by real subprocesses.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    python: String,
}

impl SystemProbe {
    /// Probe using `python3` from PATH.
    pub fn new() -> Self {
        SystemProbe {
            python: "python3".to_string(),
        }
    }

    /// Probe using a specific interpreter.
    pub fn with_python(python: impl Into<String>) -> Self {
        SystemProbe {
            python: python.into(),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbe for SystemProbe {
    fn proxy_info(&self) -> Result<String> {
        ProcessBuilder::new("voms-proxy-info").exec_stdout()
    }

    fn python_search_path(&self) -> Result<Vec<PathBuf>> {
        let stdout = ProcessBuilder::new(&self.python)
            .args(["-c", PRINT_SYS_PATH])
            .exec_stdout()?;

        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    fn python_executable(&self) -> Option<PathBuf> {
        // Not canonicalized: a venv interpreter is a symlink out of the venv.
        find_executable(&self.python)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_python() {
        let probe = SystemProbe::with_python("definitely-not-python-cowtools");
        assert!(probe.python_executable().is_none());
        assert!(probe.python_search_path().is_err());
    }
}
