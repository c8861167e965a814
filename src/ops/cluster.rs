//! Planning and submitting a worker pool.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::cluster::ClusterSpec;
use crate::jobqueue::builder::build_cluster_spec;
use crate::jobqueue::condor::{remove_clusters, CondorCluster, JobFiles, SubmitResult};
use crate::jobqueue::facility::FacilityLayout;
use crate::jobqueue::options::{CondorClientOptions, DEFAULT_DISK, DEFAULT_MEMORY};
use crate::jobqueue::probe::HostProbe;
use crate::util::config::{ClusterConfig, Config};
use crate::util::GlobalContext;

/// Command-line choices for a pool. Unset values fall back to the config
/// file, then to the facility defaults.
#[derive(Debug, Clone, Default)]
pub struct ClusterOptions {
    pub x509_path: Option<PathBuf>,
    pub container_image: Option<String>,
    pub maximum: Option<u32>,
    pub max_workers: Option<u32>,
    pub memory: Option<String>,
    pub disk: Option<String>,
    pub requirements: Option<String>,
    pub ship_env: bool,
    pub transfer_input_files: Vec<String>,
    pub request_gpus: Option<u32>,
    pub death_timeout: Option<u64>,
}

impl ClusterOptions {
    /// Merge with `[cluster]` from the config file.
    pub fn client_options(&self, config: &ClusterConfig, ctx: &GlobalContext) -> CondorClientOptions {
        // The config limit only applies when neither flag was given, so a
        // config value never conflicts with a flag.
        let max_workers = match (self.maximum, self.max_workers) {
            (None, None) => config.max_workers,
            (_, max_workers) => max_workers,
        };

        CondorClientOptions {
            x509_path: self.x509_path.as_deref().map(|p| ctx.resolve(p)),
            container_image: self
                .container_image
                .clone()
                .or_else(|| config.container_image.clone()),
            maximum: self.maximum,
            max_workers,
            memory: self
                .memory
                .clone()
                .or_else(|| config.memory.clone())
                .unwrap_or_else(|| DEFAULT_MEMORY.to_string()),
            disk: self
                .disk
                .clone()
                .or_else(|| config.disk.clone())
                .unwrap_or_else(|| DEFAULT_DISK.to_string()),
            requirements: self
                .requirements
                .clone()
                .or_else(|| config.requirements.clone()),
            ship_env: self.ship_env,
            transfer_input_files: self.transfer_input_files.clone(),
            request_gpus: self.request_gpus,
        }
    }
}

/// A fully resolved pool, ready to write or submit.
#[derive(Debug, Clone)]
pub struct ClusterPlan {
    pub layout: FacilityLayout,
    pub spec: ClusterSpec,
}

impl ClusterPlan {
    /// The cluster handle for `scheduler`.
    pub fn cluster(&self, scheduler: &str) -> CondorCluster {
        CondorCluster::new(self.spec.clone(), &self.layout, scheduler)
    }
}

/// Resolve the facility layout and build the pool spec.
pub fn plan_cluster(
    opts: &ClusterOptions,
    ctx: &GlobalContext,
    config: &Config,
    probe: &dyn HostProbe,
) -> Result<ClusterPlan> {
    let layout = FacilityLayout::from_context(ctx, config)?;
    let client = opts.client_options(&config.cluster, ctx);

    let mut spec = build_cluster_spec(&client, &layout, probe)?;
    if let Some(timeout) = opts.death_timeout.or(config.cluster.death_timeout) {
        spec.death_timeout = timeout;
    }

    Ok(ClusterPlan { layout, spec })
}

/// Write job files for `workers` jobs without submitting them.
pub fn write_plan(plan: &ClusterPlan, scheduler: &str, workers: u32) -> Result<JobFiles> {
    let cluster = plan.cluster(scheduler);
    let count = plan.spec.target_workers(workers);
    cluster
        .write_job_files(count)
        .with_context(|| format!("failed to write job files to {}", cluster.work_dir().display()))
}

/// Submit `workers` jobs connecting to `scheduler`.
pub fn launch(
    plan: &ClusterPlan,
    scheduler: &str,
    workers: u32,
) -> Result<(CondorCluster, Option<SubmitResult>)> {
    let mut cluster = plan.cluster(scheduler);
    let result = cluster.scale(workers)?;
    Ok((cluster, result))
}

/// Remove worker clusters submitted earlier.
pub fn remove(ctx: &GlobalContext, config: &Config, clusters: &[u64]) -> Result<()> {
    let layout = FacilityLayout::from_context(ctx, config)?;
    remove_clusters(&layout, clusters)
}
