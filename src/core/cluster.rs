//! Worker pool specification for an HTCondor-backed dask cluster.
//!
//! Each HTCondor job runs exactly one dask worker. The spec describes what
//! one job requests and runs, plus the adaptive bounds on how many jobs the
//! pool may hold.

use std::fmt::Write;

use crate::core::quantity::ByteSize;
use crate::core::submit::SubmitDescription;

/// Default seconds a worker waits for its scheduler before exiting.
pub const DEFAULT_DEATH_TIMEOUT: u64 = 60;

/// Interpreter used for the worker when none is configured.
pub const DEFAULT_WORKER_PYTHON: &str = "python3";

/// Batch name shared by all worker jobs.
pub const WORKER_BATCH_NAME: &str = "dask-worker";

/// Everything needed to render worker jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSpec {
    /// Cores per worker job
    pub cores: u32,

    /// Memory per worker job
    pub memory: ByteSize,

    /// Scratch disk per worker job
    pub disk: ByteSize,

    /// Seconds a worker survives without a scheduler
    pub death_timeout: u64,

    /// Interpreter the worker is started with
    pub python: Option<String>,

    /// Submit commands appended after the standard header
    pub job_extra_directives: SubmitDescription,

    /// Shell lines run before the worker starts
    pub job_script_prologue: Vec<String>,

    /// Lower adaptive bound
    pub minimum: u32,

    /// Upper adaptive bound
    pub maximum: u32,
}

impl ClusterSpec {
    /// Create a single-core spec with no extra directives.
    pub fn new(memory: ByteSize, disk: ByteSize) -> Self {
        ClusterSpec {
            cores: 1,
            memory,
            disk,
            death_timeout: DEFAULT_DEATH_TIMEOUT,
            python: None,
            job_extra_directives: SubmitDescription::new(),
            job_script_prologue: Vec::new(),
            minimum: 0,
            maximum: 1,
        }
    }

    /// Set the adaptive bounds. `minimum` never exceeds `maximum`.
    pub fn adapt(&mut self, minimum: u32, maximum: u32) {
        self.maximum = maximum;
        self.minimum = minimum.min(maximum);
    }

    /// Clamp a requested worker count into the adaptive bounds.
    pub fn target_workers(&self, requested: u32) -> u32 {
        requested.clamp(self.minimum, self.maximum)
    }

    /// The interpreter workers are launched with.
    pub fn worker_python(&self) -> &str {
        self.python.as_deref().unwrap_or(DEFAULT_WORKER_PYTHON)
    }

    /// Render the worker job script for a scheduler address.
    pub fn job_script(&self, scheduler: &str) -> String {
        let mut script = String::from("#!/usr/bin/env bash\n\n");

        for line in &self.job_script_prologue {
            let _ = writeln!(script, "{}", line);
        }

        let _ = writeln!(
            script,
            "{} -m distributed.cli.dask_worker {} --nthreads {} --memory-limit {} \
             --name dummy-name --nanny --death-timeout {}",
            self.worker_python(),
            scheduler,
            self.cores,
            self.memory.bytes(),
            self.death_timeout
        );

        script
    }

    /// Build the full submit description for `executable`.
    ///
    /// Extra directives are applied last and override header commands of the
    /// same name.
    pub fn submit_description(&self, executable: &str) -> SubmitDescription {
        let mut desc = SubmitDescription::new()
            .with("universe", "vanilla")
            .with("executable", executable)
            .with("batch_name", WORKER_BATCH_NAME)
            .with("MY.DaskWorkerName", "\"htcondor--$F(MY.JobId)--\"")
            .with("RequestCpus", "MY.DaskWorkerCores")
            .with("RequestMemory", "floor(MY.DaskWorkerMemory / 1048576)")
            .with("RequestDisk", "floor(MY.DaskWorkerDisk / 1024)")
            .with("MY.JobId", "\"$(ClusterId).$(ProcId)\"")
            .with("MY.DaskWorkerCores", self.cores.to_string())
            .with("MY.DaskWorkerMemory", self.memory.bytes().to_string())
            .with("MY.DaskWorkerDisk", self.disk.bytes().to_string());

        desc.extend_from(&self.job_extra_directives);
        desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ClusterSpec {
        ClusterSpec::new(
            ByteSize::parse("2 GB").unwrap(),
            ByteSize::parse("1 GB").unwrap(),
        )
    }

    #[test]
    fn test_adapt_and_target() {
        let mut spec = spec();
        spec.adapt(1, 50);
        assert_eq!(spec.target_workers(0), 1);
        assert_eq!(spec.target_workers(10), 10);
        assert_eq!(spec.target_workers(500), 50);

        spec.adapt(10, 5);
        assert_eq!(spec.minimum, 5);
        assert_eq!(spec.maximum, 5);
    }

    #[test]
    fn test_job_script() {
        let mut spec = spec();
        spec.job_script_prologue = vec![
            "export XRD_RUNFORKHANDLER=1".to_string(),
            "export X509_USER_PROXY=x509up_u1000".to_string(),
        ];
        spec.python = Some("/usr/local/bin/python3".to_string());

        let script = spec.job_script("tcp://10.0.0.1:8786");
        let lines: Vec<_> = script.lines().collect();

        assert_eq!(lines[0], "#!/usr/bin/env bash");
        assert_eq!(lines[2], "export XRD_RUNFORKHANDLER=1");
        assert_eq!(lines[3], "export X509_USER_PROXY=x509up_u1000");
        assert!(lines[4].starts_with(
            "/usr/local/bin/python3 -m distributed.cli.dask_worker tcp://10.0.0.1:8786"
        ));
        assert!(lines[4].contains("--memory-limit 2000000000"));
        assert!(lines[4].ends_with("--death-timeout 60"));
    }

    #[test]
    fn test_default_python() {
        let script = spec().job_script("tcp://sched:8786");
        assert!(script.contains("\npython3 -m distributed.cli.dask_worker"));
    }

    #[test]
    fn test_submit_description_header_and_overrides() {
        let mut spec = spec();
        spec.job_extra_directives.insert("InitialDir", "/scratch/alice");
        spec.job_extra_directives.insert("batch_name", "my-analysis");

        let desc = spec.submit_description("dask-worker.sh");

        assert_eq!(desc.get("universe"), Some("vanilla"));
        assert_eq!(desc.get("executable"), Some("dask-worker.sh"));
        assert_eq!(desc.get("MY.DaskWorkerMemory"), Some("2000000000"));
        assert_eq!(desc.get("MY.DaskWorkerDisk"), Some("1000000000"));
        assert_eq!(desc.get("batch_name"), Some("my-analysis"));
        assert_eq!(desc.get("InitialDir"), Some("/scratch/alice"));
    }
}
