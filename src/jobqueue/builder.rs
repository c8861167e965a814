//! Translating facility conventions into a worker pool spec.

use crate::core::cluster::ClusterSpec;
use crate::core::submit::SubmitDescription;
use crate::jobqueue::env::{env_packages, find_env, python_in_env};
use crate::jobqueue::errors::JobQueueError;
use crate::jobqueue::facility::FacilityLayout;
use crate::jobqueue::image::{find_image, needs_transfer};
use crate::jobqueue::options::CondorClientOptions;
use crate::jobqueue::probe::HostProbe;
use crate::jobqueue::x509::find_x509;

/// Lower adaptive bound for facility pools.
pub const MINIMUM_WORKERS: u32 = 1;

/// Build the worker pool spec for `options` on the facility.
pub fn build_cluster_spec(
    options: &CondorClientOptions,
    layout: &FacilityLayout,
    probe: &dyn HostProbe,
) -> Result<ClusterSpec, JobQueueError> {
    let maximum = options.resolve_maximum()?;
    let memory = options.memory_size()?;
    let disk = options.disk_size()?;
    let initial_dir = layout.initial_dir().to_string_lossy().into_owned();

    let container_image = match options.container_image.as_deref() {
        Some(image) if !image.is_empty() => image.to_string(),
        _ => find_image(layout)?,
    };

    let x509_path = find_x509(options.x509_path.as_deref(), probe);

    let mut directives = SubmitDescription::new()
        .with("container_image", container_image.as_str())
        .with("+JobFlavour", format!("\"{}\"", layout.job_flavour))
        .with("log", "dask_job_output.$(PROCESS).$(CLUSTER).log")
        .with("output", "dask_job_output.$(PROCESS).$(CLUSTER).out")
        .with("error", "dask_job_output.$(PROCESS).$(CLUSTER).err")
        .with("when_to_transfer_output", "ON_EXIT_OR_EVICT")
        .with("InitialDir", initial_dir.as_str());

    let mut prologue = vec!["export XRD_RUNFORKHANDLER=1".to_string()];
    let mut transfers = options.transfer_input_files.clone();
    let mut python = None;

    if needs_transfer(&container_image) {
        transfers.push(container_image.clone());
    }

    if let Some(ref proxy) = x509_path {
        transfers.push(proxy.to_string_lossy().into_owned());
        let name = proxy
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| proxy.to_string_lossy().into_owned());
        prologue.push(format!("export X509_USER_PROXY={}", name));
    }

    if options.ship_env {
        let env = find_env(layout)?;
        let search_path = probe
            .python_search_path()
            .map_err(|e| JobQueueError::PythonSearchPath {
                reason: format!("{:#}", e),
            })?;
        let packages = env_packages(&env, &search_path);
        transfers.extend(packages.scheduler_paths);
        prologue.push(format!(
            "export PYTHONPATH=$PYTHONPATH:{}",
            packages.worker_paths.join(":")
        ));
        python = Some(layout.worker_python.clone());
    } else if local_python_in_env(layout, probe) {
        python = Some(layout.worker_python.clone());
    }

    if !transfers.is_empty() {
        directives.insert("transfer_input_files", transfers.join(","));
    }
    if let Some(gpus) = options.gpus() {
        directives.insert("request_GPUs", gpus.to_string());
    }
    if directives.contains("transfer_input_files") {
        directives.insert("should_transfer_files", "YES");
    }
    if let Some(requirements) = options.requirements.as_deref().filter(|r| !r.is_empty()) {
        directives.insert("Requirements", requirements);
    }

    tracing::debug!("job_extra_directives: {:?}", directives);
    tracing::info!("dask workers will run in {}", container_image);
    tracing::info!("Condor logs, output files, error files in {}", initial_dir);

    let mut spec = ClusterSpec::new(memory, disk);
    spec.python = python;
    spec.job_extra_directives = directives;
    spec.job_script_prologue = prologue;
    spec.adapt(MINIMUM_WORKERS, maximum);
    Ok(spec)
}

/// A local venv interpreter does not exist on workers.
///
/// A missing environment counts as "not inside it".
fn local_python_in_env(layout: &FacilityLayout, probe: &dyn HostProbe) -> bool {
    let Ok(env) = find_env(layout) else {
        return false;
    };
    probe
        .python_executable()
        .map(|python| python_in_env(&python, &env) || python_in_env(&python, &layout.env_dir))
        .unwrap_or(false)
}
