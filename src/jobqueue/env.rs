//! Shipping the local virtual environment to workers.

use std::path::{Path, PathBuf};

use crate::jobqueue::errors::JobQueueError;
use crate::jobqueue::facility::FacilityLayout;

/// Locate the virtual environment, following symlinks.
pub fn find_env(layout: &FacilityLayout) -> Result<PathBuf, JobQueueError> {
    let resolved = layout
        .env_dir
        .canonicalize()
        .unwrap_or_else(|_| layout.env_dir.clone());

    if resolved.is_dir() {
        Ok(resolved)
    } else {
        Err(JobQueueError::EnvNotFound { path: resolved })
    }
}

/// Package directories to ship from `env`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvPackages {
    /// Paths as seen by the scheduler, listed in `transfer_input_files`
    pub scheduler_paths: Vec<String>,

    /// Names of the transferred directories inside the worker's start directory
    pub worker_paths: Vec<String>,
}

/// Select the search path entries that live strictly inside `env`.
///
/// HTCondor transfers each directory into the job's start directory under its
/// own name, so the worker side only needs the final component.
pub fn env_packages(env: &Path, search_path: &[PathBuf]) -> EnvPackages {
    let mut packages = EnvPackages::default();

    for entry in search_path {
        let resolved = entry.canonicalize().unwrap_or_else(|_| entry.clone());
        if resolved == env || !resolved.starts_with(env) {
            continue;
        }
        let Some(name) = resolved.file_name() else {
            continue;
        };

        packages
            .scheduler_paths
            .push(entry.to_string_lossy().into_owned());
        packages
            .worker_paths
            .push(name.to_string_lossy().into_owned());
    }

    packages
}

/// Whether `python` runs from inside `env`.
pub fn python_in_env(python: &Path, env: &Path) -> bool {
    python != env && python.starts_with(env)
}
