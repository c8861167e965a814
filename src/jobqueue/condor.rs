//! Handle on the HTCondor jobs backing one worker pool.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::core::cluster::ClusterSpec;
use crate::jobqueue::errors::JobQueueError;
use crate::jobqueue::facility::FacilityLayout;
use crate::util::fs::{ensure_dir, set_executable, write_string};
use crate::util::process::ProcessBuilder;

/// Job script written next to the submit file.
pub const JOB_SCRIPT_NAME: &str = "dask-worker.sh";

/// Submit file handed to `condor_submit`.
pub const SUBMIT_FILE_NAME: &str = "dask-worker.sub";

/// Outcome of one `condor_submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitResult {
    pub jobs: u32,
    pub cluster: u64,
}

/// Files written for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFiles {
    pub script: PathBuf,
    pub submit: PathBuf,
}

/// Parse the summary line printed by `condor_submit`.
pub fn parse_submit_output(output: &str) -> Result<SubmitResult, JobQueueError> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"(\d+) job\(s\) submitted to cluster (\d+)").ok())
        .as_ref();

    let unexpected = || JobQueueError::UnexpectedSubmitOutput {
        output: output.to_string(),
    };

    let caps = pattern.and_then(|re| re.captures(output)).ok_or_else(unexpected)?;
    let jobs = caps[1].parse().map_err(|_| unexpected())?;
    let cluster = caps[2].parse().map_err(|_| unexpected())?;

    Ok(SubmitResult { jobs, cluster })
}

/// A worker pool submitted to HTCondor.
#[derive(Debug)]
pub struct CondorCluster {
    spec: ClusterSpec,
    work_dir: PathBuf,
    condor_config: PathBuf,
    scheduler: String,
    submit_program: String,
    rm_program: String,
    submitted: Vec<SubmitResult>,
}

impl CondorCluster {
    /// Prepare a pool whose job files live in the layout's initial dir.
    pub fn new(spec: ClusterSpec, layout: &FacilityLayout, scheduler: impl Into<String>) -> Self {
        CondorCluster {
            spec,
            work_dir: layout.initial_dir().to_path_buf(),
            condor_config: layout.condor_config.clone(),
            scheduler: scheduler.into(),
            submit_program: "condor_submit".to_string(),
            rm_program: "condor_rm".to_string(),
            submitted: Vec::new(),
        }
    }

    /// Use other HTCondor client programs.
    pub fn with_programs(mut self, submit: impl Into<String>, rm: impl Into<String>) -> Self {
        self.submit_program = submit.into();
        self.rm_program = rm.into();
        self
    }

    pub fn spec(&self) -> &ClusterSpec {
        &self.spec
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn scheduler(&self) -> &str {
        &self.scheduler
    }

    /// HTCondor cluster ids submitted and not yet removed.
    pub fn clusters(&self) -> Vec<u64> {
        self.submitted.iter().map(|s| s.cluster).collect()
    }

    /// Jobs submitted and not yet removed.
    pub fn submitted_jobs(&self) -> u32 {
        self.submitted.iter().map(|s| s.jobs).sum()
    }

    /// Write the job script and a submit file queueing `count` jobs.
    pub fn write_job_files(&self, count: u32) -> Result<JobFiles> {
        ensure_dir(&self.work_dir)?;

        let script = self.work_dir.join(JOB_SCRIPT_NAME);
        write_string(&script, &self.spec.job_script(&self.scheduler))?;
        set_executable(&script)?;

        let submit = self.work_dir.join(SUBMIT_FILE_NAME);
        let description = self.spec.submit_description(JOB_SCRIPT_NAME);
        write_string(&submit, &description.render(count))?;

        Ok(JobFiles { script, submit })
    }

    /// Submit enough workers to reach `requested`, clamped to the pool bounds.
    ///
    /// Jobs already submitted count towards the target. Returns `None` when
    /// nothing needs submitting.
    pub fn scale(&mut self, requested: u32) -> Result<Option<SubmitResult>> {
        let target = self.spec.target_workers(requested);
        if target != requested {
            tracing::info!(
                "requested {} workers, targeting {} (bounds {}..={})",
                requested,
                target,
                self.spec.minimum,
                self.spec.maximum
            );
        }

        let count = target.saturating_sub(self.submitted_jobs());
        if count == 0 {
            tracing::debug!("{} job(s) already submitted", self.submitted_jobs());
            return Ok(None);
        }

        let files = self.write_job_files(count)?;
        let stdout = ProcessBuilder::new(&self.submit_program)
            .arg(&files.submit)
            .cwd(&self.work_dir)
            .env("CONDOR_CONFIG", self.condor_config.to_string_lossy())
            .exec_stdout()
            .context("failed to submit worker jobs")?;

        let result = parse_submit_output(&stdout)?;
        tracing::info!("submitted {} job(s) to cluster {}", result.jobs, result.cluster);
        self.submitted.push(result);
        Ok(Some(result))
    }

    /// Remove every submitted cluster.
    ///
    /// A cluster is forgotten only once its removal succeeded, so a failed
    /// close can be retried.
    pub fn close(&mut self) -> Result<()> {
        while let Some(first) = self.submitted.first() {
            condor_rm(&self.rm_program, &self.condor_config, first.cluster)?;
            self.submitted.remove(0);
        }
        Ok(())
    }
}

/// Remove clusters by id, e.g. ones submitted by an earlier invocation.
///
/// Stops at the first failure; the ids removed before it are returned in the
/// error context.
pub fn remove_clusters(layout: &FacilityLayout, clusters: &[u64]) -> Result<()> {
    for (i, cluster) in clusters.iter().enumerate() {
        condor_rm("condor_rm", &layout.condor_config, *cluster)
            .with_context(|| format!("removed {:?} before failing", &clusters[..i]))?;
    }
    Ok(())
}

fn condor_rm(program: &str, condor_config: &Path, cluster: u64) -> Result<()> {
    ProcessBuilder::new(program)
        .arg(cluster.to_string())
        .env("CONDOR_CONFIG", condor_config.to_string_lossy())
        .exec_and_check()
        .with_context(|| format!("failed to remove cluster {}", cluster))?;
    tracing::info!("removed cluster {}", cluster);
    Ok(())
}
