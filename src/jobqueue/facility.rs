//! Where things live on the analysis facility.
//!
//! Every path cowtools consults on the facility is collected here, with the
//! facility defaults overridable from `[facility]` in the config file.

use std::path::{Path, PathBuf};

use crate::jobqueue::errors::JobQueueError;
use crate::util::config::Config;
use crate::util::context::GlobalContext;

pub const DEFAULT_SCRATCH_ROOT: &str = "/scratch";
pub const DEFAULT_CONTAINER_INFO: &str = "/container_info.yml";
pub const DEFAULT_CVMFS_DIR: &str = "/cvmfs/unpacked.cern.ch/";
pub const DEFAULT_CONDOR_CONFIG: &str = "/etc/condor/condor_config";
pub const DEFAULT_WORKER_PYTHON: &str = "/usr/local/bin/python3";
pub const DEFAULT_JOB_FLAVOUR: &str = "tomorrow";
pub const DEFAULT_ENV_DIR: &str = ".af-env";

/// Name of a user-provided image in the scratch directory.
pub const CUSTOM_SIF_NAME: &str = "notebook.sif";

/// Resolved facility paths for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityLayout {
    /// Facility login
    pub user: String,

    /// Per-user scratch directory, shared with worker nodes
    pub scratch_dir: PathBuf,

    /// Metadata describing the notebook image
    pub container_info: PathBuf,

    /// CVMFS directories holding unpacked images
    pub cvmfs_dirs: Vec<PathBuf>,

    /// Virtual environment candidate for `--ship-env`
    pub env_dir: PathBuf,

    /// Value of CONDOR_CONFIG for HTCondor tools
    pub condor_config: PathBuf,

    /// Interpreter on worker nodes
    pub worker_python: String,

    /// `+JobFlavour` for worker jobs
    pub job_flavour: String,
}

impl FacilityLayout {
    /// Build the layout for the current user.
    pub fn from_context(ctx: &GlobalContext, config: &Config) -> Result<Self, JobQueueError> {
        let user = ctx.user().ok_or(JobQueueError::MissingUser)?;
        let facility = &config.facility;

        let scratch_root = facility
            .scratch_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRATCH_ROOT));

        let cvmfs_dirs = if facility.cvmfs_dirs.is_empty() {
            vec![PathBuf::from(DEFAULT_CVMFS_DIR)]
        } else {
            facility.cvmfs_dirs.clone()
        };

        // An explicit config entry wins over the active environment, which
        // wins over the facility's conventional location.
        let env_dir = facility
            .env_dir
            .clone()
            .or_else(|| ctx.virtual_env().map(Path::to_path_buf))
            .unwrap_or_else(|| ctx.home().join(DEFAULT_ENV_DIR));

        Ok(FacilityLayout {
            user: user.to_string(),
            scratch_dir: scratch_root.join(user),
            container_info: facility
                .container_info
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTAINER_INFO)),
            cvmfs_dirs,
            env_dir,
            condor_config: facility
                .condor_config
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONDOR_CONFIG)),
            worker_python: facility
                .worker_python
                .clone()
                .unwrap_or_else(|| DEFAULT_WORKER_PYTHON.to_string()),
            job_flavour: config
                .cluster
                .job_flavour
                .clone()
                .unwrap_or_else(|| DEFAULT_JOB_FLAVOUR.to_string()),
        })
    }

    /// Directory worker jobs start in; logs and outputs land here.
    pub fn initial_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Location of a user-provided image overriding discovery.
    pub fn custom_sif(&self) -> PathBuf {
        self.scratch_dir.join(CUSTOM_SIF_NAME)
    }
}
