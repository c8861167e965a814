//! Choosing the container image worker jobs run in.
//!
//! Resolution order:
//! 1. A custom image at `<scratch>/notebook.sif`
//! 2. The notebook image named in the facility's container metadata file,
//!    preferring an unpacked copy on CVMFS when one exists
//! 3. Otherwise the user must name the image

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::jobqueue::errors::JobQueueError;
use crate::jobqueue::facility::FacilityLayout;
use crate::util::fs::{basename, read_to_string};

/// Registry directory for Docker Hub images on unpacked CVMFS.
const DOCKER_HUB_DIR: &str = "registry.hub.docker.com";

/// Organization directory for coffea images.
const COFFEATEAM_DIR: &str = "coffeateam";

#[derive(Debug, Deserialize)]
struct ContainerInfo {
    container_source: Option<serde_yaml::Value>,
}

/// Find the image for worker jobs.
pub fn find_image(layout: &FacilityLayout) -> Result<String, JobQueueError> {
    let custom_sif = layout.custom_sif();
    if custom_sif.is_file() {
        tracing::debug!("using custom image {}", custom_sif.display());
        return Ok(custom_sif.to_string_lossy().into_owned());
    }

    if layout.container_info.is_file() {
        let source = read_container_source(&layout.container_info)?;
        tracing::debug!("container source from metadata: {}", source);
        return Ok(docker_reference(best_location(&source, &layout.cvmfs_dirs)));
    }

    Err(JobQueueError::NoImageFound {
        container_info: layout.container_info.clone(),
    })
}

/// Read `container_source` from the metadata file.
fn read_container_source(path: &Path) -> Result<String, JobQueueError> {
    let contents = read_to_string(path).map_err(|e| JobQueueError::ContainerInfo {
        path: path.to_path_buf(),
        reason: format!("{:#}", e),
    })?;

    let info: ContainerInfo =
        serde_yaml::from_str(&contents).map_err(|e| JobQueueError::ContainerInfo {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    match info.container_source {
        Some(serde_yaml::Value::String(source)) => Ok(source),
        _ => Err(JobQueueError::MissingContainerSource {
            path: path.to_path_buf(),
        }),
    }
}

/// Prefer an unpacked copy of `source` on CVMFS; the first existing one wins.
fn best_location(source: &str, cvmfs_dirs: &[PathBuf]) -> String {
    for dir in cvmfs_dirs {
        if !dir.is_dir() {
            tracing::debug!("directory {} does not exist, keeping {}", dir.display(), source);
            continue;
        }

        let candidate = cvmfs_candidate(dir, source);
        tracing::debug!("verifying existence of {}", candidate.display());
        if candidate.exists() {
            return candidate.to_string_lossy().into_owned();
        }
        tracing::debug!("{} does not exist, keeping {}", candidate.display(), source);
    }

    source.to_string()
}

/// Where `source` would be unpacked under `dir`.
fn cvmfs_candidate(dir: &Path, source: &str) -> PathBuf {
    let mut path = dir.to_path_buf();
    if source.contains("docker") {
        path.push(DOCKER_HUB_DIR);
    }
    if source.contains(COFFEATEAM_DIR) {
        path.push(COFFEATEAM_DIR);
    }
    path.push(basename(source));
    path
}

/// Metadata follows Dockerfile `FROM` syntax, which omits the scheme.
fn docker_reference(location: String) -> String {
    if location.starts_with("docker.io") {
        format!("docker://{}", location)
    } else {
        location
    }
}

/// Whether HTCondor must transfer the image: only local files outside CVMFS.
pub fn needs_transfer(image: &str) -> bool {
    Path::new(image).is_file() && !image.contains("cvmfs")
}
