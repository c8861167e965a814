//! Locating the grid proxy shipped to workers for XRootD access.

use std::path::{Path, PathBuf};

use crate::jobqueue::errors::JobQueueError;
use crate::jobqueue::probe::HostProbe;
use crate::util::fs::copy_into;

/// Extract the proxy path from `voms-proxy-info` output.
///
/// The relevant line looks like `path      : /tmp/x509up_u12345`.
pub fn parse_proxy_path(output: &str) -> Option<String> {
    let line = output.lines().find(|line| line.starts_with("path"))?;
    let path = line.rsplit(':').next()?.trim();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// Find the proxy to ship to workers.
///
/// A missing proxy is not fatal: workers still start, but remote reads will
/// most likely fail, so the user is warned.
pub fn find_x509(explicit: Option<&Path>, probe: &dyn HostProbe) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(
            "Could not find voms proxy at {}, but continuing anyway.",
            path.display()
        );
        tracing::warn!("Xrootd transfers will most likely fail.");
        return None;
    }

    match probe.proxy_info().map(|out| parse_proxy_path(&out)) {
        Ok(Some(path)) => Some(PathBuf::from(path)),
        Ok(None) | Err(_) => {
            tracing::warn!("Could not find voms proxy, but continuing anyway.");
            tracing::warn!("Xrootd transfers will most likely fail.");
            None
        }
    }
}

/// Copy the current proxy into `scratch_dir` and return its file name.
///
/// Worker jobs start in the scratch directory, so the bare file name is
/// what `X509_USER_PROXY` should be set to on the worker.
pub fn stage_x509(probe: &dyn HostProbe, scratch_dir: &Path) -> Result<String, JobQueueError> {
    let output = probe
        .proxy_info()
        .map_err(|e| JobQueueError::ProxyNotFound {
            reason: format!("{:#}", e),
        })?;

    let local = parse_proxy_path(&output).ok_or_else(|| JobQueueError::ProxyNotFound {
        reason: "`voms-proxy-info` printed no `path` line".to_string(),
    })?;

    let staged = copy_into(Path::new(&local), scratch_dir).map_err(|e| {
        JobQueueError::ProxyNotFound {
            reason: format!("{:#}", e),
        }
    })?;
    tracing::info!("staged proxy {} to {}", local, staged.display());

    Ok(staged
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or(local))
}
