//! `cowtools scale` command

use anyhow::Result;
use serde_json::json;

use super::load_context;
use crate::cli::ScaleArgs;
use cowtools::ops::results::{scale_files, ScaleOptions};
use cowtools::util::shell::Status;
use cowtools::util::Shell;

pub fn execute(args: ScaleArgs, shell: &Shell) -> Result<()> {
    let (ctx, config) = load_context()?;

    let opts = ScaleOptions {
        data: ctx.resolve(&args.data),
        mc: ctx.resolve(&args.mc),
        fs_data: args.fs_data.map(|p| ctx.resolve(&p)),
        fs_mc: ctx.resolve(&args.fs_mc),
        output_mc: ctx.resolve(&args.output),
        output_data: args.data_output.map(|p| ctx.resolve(&p)),
        combine: !args.no_combine,
    };

    shell.status(Status::Scaling, opts.mc.display());
    let summary = scale_files(
        &opts,
        config.grouping.mc_map(),
        config.grouping.data_map(),
        shell,
    )?;

    shell.status(
        Status::Finished,
        format!(
            "{} dataset(s) scaled to {} fb^-1 in {}",
            summary.mc_datasets,
            summary.lumi / 1000.0,
            opts.output_mc.display()
        ),
    );
    if let (Some(path), Some(count)) = (&opts.output_data, summary.data_datasets) {
        shell.status(
            Status::Finished,
            format!("{} data dataset(s) in {}", count, path.display()),
        );
    }
    shell.json_event(&json!({
        "reason": "scaled",
        "lumi_pb": summary.lumi,
        "mc_output": opts.output_mc,
        "mc_datasets": summary.mc_datasets,
        "data_output": opts.output_data,
        "data_datasets": summary.data_datasets,
    }));
    Ok(())
}
