//! `cowtools cluster` command

use std::fs;

use anyhow::{Context, Result};
use serde_json::json;

use super::load_context;
use crate::cli::ClusterArgs;
use cowtools::jobqueue::SystemProbe;
use cowtools::ops::cluster::{launch, plan_cluster, write_plan, ClusterOptions};
use cowtools::util::shell::Status;
use cowtools::util::Shell;

pub fn execute(args: ClusterArgs, shell: &Shell) -> Result<()> {
    let (ctx, config) = load_context()?;

    let opts = ClusterOptions {
        x509_path: args.x509,
        container_image: args.image,
        maximum: args.maximum,
        max_workers: args.max_workers,
        memory: args.memory,
        disk: args.disk,
        requirements: args.requirements,
        ship_env: args.ship_env,
        transfer_input_files: args.transfer_input_files,
        request_gpus: args.gpus,
        death_timeout: args.death_timeout,
    };

    shell.status(Status::Resolving, "worker pool");
    let plan = plan_cluster(&opts, &ctx, &config, &SystemProbe::new())?;
    let workers = args.workers.unwrap_or(plan.spec.minimum);

    if args.dry_run {
        let files = write_plan(&plan, &args.scheduler, workers)?;
        let submit = fs::read_to_string(&files.submit)
            .with_context(|| format!("failed to read {}", files.submit.display()))?;
        let script = fs::read_to_string(&files.script)
            .with_context(|| format!("failed to read {}", files.script.display()))?;

        if shell.is_json() {
            shell.json_event(&json!({
                "reason": "cluster-plan",
                "submit_file": files.submit,
                "job_script": files.script,
                "submit": submit,
                "script": script,
                "minimum": plan.spec.minimum,
                "maximum": plan.spec.maximum,
            }));
        } else {
            shell.status(Status::Created, files.submit.display());
            shell.status(Status::Created, files.script.display());
            print!("{}\n{}", submit, script);
        }
        return Ok(());
    }

    let (cluster, result) = launch(&plan, &args.scheduler, workers)?;
    match result {
        Some(result) => {
            shell.status(
                Status::Submitted,
                format!("{} worker(s) to cluster {}", result.jobs, result.cluster),
            );
            shell.note(format!("remove them with `cowtools remove {}`", result.cluster));
            shell.json_event(&json!({
                "reason": "cluster-submitted",
                "jobs": result.jobs,
                "cluster": result.cluster,
                "work_dir": cluster.work_dir(),
            }));
        }
        None => shell.warn("pool maximum is 0, nothing submitted"),
    }

    Ok(())
}
