//! Configuration file support for cowtools.
//!
//! cowtools reads two configuration files:
//! - Global: `~/.cowtools/config.toml` - User-wide defaults
//! - Project: `.cowtools/config.toml` - Per-analysis overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::datatools::grouping::GroupingMap;

/// cowtools configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker job defaults
    pub cluster: ClusterConfig,

    /// Facility layout overrides
    pub facility: FacilityConfig,

    /// Dataset grouping rules
    pub grouping: GroupingConfig,
}

/// Defaults for worker jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Maximum number of worker jobs
    pub max_workers: Option<u32>,

    /// Memory per worker (e.g. "4 GB")
    pub memory: Option<String>,

    /// Disk per worker (e.g. "2 GB")
    pub disk: Option<String>,

    /// HTCondor Requirements expression
    pub requirements: Option<String>,

    /// Container image reference handed to HTCondor
    pub container_image: Option<String>,

    /// Value of the `+JobFlavour` directive
    pub job_flavour: Option<String>,

    /// Seconds a worker survives without a scheduler
    pub death_timeout: Option<u64>,
}

/// Facility paths. Unset values use the facility defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Parent of per-user scratch directories (default `/scratch`)
    pub scratch_root: Option<PathBuf>,

    /// Container metadata file (default `/container_info.yml`)
    pub container_info: Option<PathBuf>,

    /// CVMFS directories searched for unpacked images
    pub cvmfs_dirs: Vec<PathBuf>,

    /// HTCondor configuration file (default `/etc/condor/condor_config`)
    pub condor_config: Option<PathBuf>,

    /// Interpreter on worker nodes (default `/usr/local/bin/python3`)
    pub worker_python: Option<String>,

    /// Virtual environment shipped with `--ship-env`
    pub env_dir: Option<PathBuf>,
}

/// Dataset grouping rules: group name to dataset-name prefixes, in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Rules for simulated samples. Empty means the built-in defaults.
    pub mc: IndexMap<String, Vec<String>>,

    /// Rules for collision data. Empty means no grouping.
    pub data: IndexMap<String, Vec<String>>,
}

impl GroupingConfig {
    /// Grouping map for simulated samples.
    pub fn mc_map(&self) -> GroupingMap {
        if self.mc.is_empty() {
            GroupingMap::default_mc()
        } else {
            GroupingMap::from_rules(self.mc.clone())
        }
    }

    /// Grouping map for data samples.
    pub fn data_map(&self) -> GroupingMap {
        GroupingMap::from_rules(self.data.clone())
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let cluster = other.cluster;
        if cluster.max_workers.is_some() {
            self.cluster.max_workers = cluster.max_workers;
        }
        if cluster.memory.is_some() {
            self.cluster.memory = cluster.memory;
        }
        if cluster.disk.is_some() {
            self.cluster.disk = cluster.disk;
        }
        if cluster.requirements.is_some() {
            self.cluster.requirements = cluster.requirements;
        }
        if cluster.container_image.is_some() {
            self.cluster.container_image = cluster.container_image;
        }
        if cluster.job_flavour.is_some() {
            self.cluster.job_flavour = cluster.job_flavour;
        }
        if cluster.death_timeout.is_some() {
            self.cluster.death_timeout = cluster.death_timeout;
        }

        let facility = other.facility;
        if facility.scratch_root.is_some() {
            self.facility.scratch_root = facility.scratch_root;
        }
        if facility.container_info.is_some() {
            self.facility.container_info = facility.container_info;
        }
        if !facility.cvmfs_dirs.is_empty() {
            self.facility.cvmfs_dirs = facility.cvmfs_dirs;
        }
        if facility.condor_config.is_some() {
            self.facility.condor_config = facility.condor_config;
        }
        if facility.worker_python.is_some() {
            self.facility.worker_python = facility.worker_python;
        }
        if facility.env_dir.is_some() {
            self.facility.env_dir = facility.env_dir;
        }

        // Grouping tables replace wholesale; mixing rules from two files
        // would make overlapping prefixes ambiguous.
        if !other.grouping.mc.is_empty() {
            self.grouping.mc = other.grouping.mc;
        }
        if !other.grouping.data.is_empty() {
            self.grouping.data = other.grouping.data;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cowtools/config.toml)
/// 2. Global config (~/.cowtools/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
