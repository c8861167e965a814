//! Test utilities and mocks for cowtools unit tests.
//!
//! [`StubProbe`] answers [`HostProbe`] questions from canned values so pool
//! construction can be tested without `voms-proxy-info` or a Python
//! installation.
//!
//! # Example
//!
//! ```rust,ignore
//! use cowtools::test_support::{facility_layout, StubProbe};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let probe = StubProbe::new().with_proxy_info("path : /tmp/x509up_u1000\n");
//!     let spec = build_cluster_spec(&options, &facility_layout(tmp.path()), &probe);
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::jobqueue::probe::HostProbe;

pub use fixtures::*;

/// Canned answers for [`HostProbe`].
///
/// A fresh stub has no proxy, an empty search path and no local
/// interpreter. A failing stub errors on every subprocess question.
#[derive(Debug, Default)]
pub struct StubProbe {
    proxy_info: Option<String>,
    search_path: Vec<PathBuf>,
    python: Option<PathBuf>,
    fail: bool,
    calls: RefCell<Vec<&'static str>>,
}

impl StubProbe {
    pub fn new() -> Self {
        StubProbe::default()
    }

    /// A probe whose subprocesses all fail.
    pub fn failing() -> Self {
        StubProbe {
            fail: true,
            ..Default::default()
        }
    }

    /// Set the `voms-proxy-info` output.
    pub fn with_proxy_info(mut self, output: impl Into<String>) -> Self {
        self.proxy_info = Some(output.into());
        self
    }

    pub fn with_search_path(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_path = paths;
        self
    }

    pub fn with_python_executable(mut self, python: impl Into<PathBuf>) -> Self {
        self.python = Some(python.into());
        self
    }

    /// Questions asked so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }
}

impl HostProbe for StubProbe {
    fn proxy_info(&self) -> Result<String> {
        self.record("proxy_info");
        match (&self.proxy_info, self.fail) {
            (_, true) => bail!("`voms-proxy-info` failed with exit code Some(1)"),
            (Some(output), false) => Ok(output.clone()),
            (None, false) => bail!("Proxy not found: /tmp/x509up_u1000 (No such file or directory)"),
        }
    }

    fn python_search_path(&self) -> Result<Vec<PathBuf>> {
        self.record("python_search_path");
        if self.fail {
            bail!("failed to run `python3`");
        }
        Ok(self.search_path.clone())
    }

    fn python_executable(&self) -> Option<PathBuf> {
        self.record("python_executable");
        self.python.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_probe() {
        let probe = StubProbe::new().with_proxy_info("path : /tmp/x509up_u1000\n");
        assert!(probe.proxy_info().unwrap().contains("x509up_u1000"));
        assert!(probe.python_search_path().unwrap().is_empty());
        assert!(probe.python_executable().is_none());
        assert_eq!(
            probe.calls(),
            vec!["proxy_info", "python_search_path", "python_executable"]
        );

        let failing = StubProbe::failing().with_proxy_info("path : /tmp/x\n");
        assert!(failing.proxy_info().is_err());
        assert!(failing.python_search_path().is_err());
        assert!(StubProbe::new().proxy_info().is_err());
    }
}
