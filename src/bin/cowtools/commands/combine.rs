//! `cowtools combine` command

use anyhow::Result;
use serde_json::json;

use super::load_context;
use crate::cli::CombineArgs;
use cowtools::ops::results::combine_file;
use cowtools::util::shell::Status;
use cowtools::util::Shell;

pub fn execute(args: CombineArgs, shell: &Shell) -> Result<()> {
    let (ctx, config) = load_context()?;

    let grouping = if args.data {
        config.grouping.data_map()
    } else {
        config.grouping.mc_map()
    };
    let input = ctx.resolve(&args.input);
    let output = ctx.resolve(&args.output);
    let fileset = args.fileset.map(|p| ctx.resolve(&p));

    shell.status(Status::Combining, input.display());
    let combined = combine_file(&input, &output, &grouping, fileset.as_deref())?;

    shell.status(
        Status::Finished,
        format!("{} dataset(s) written to {}", combined.len(), output.display()),
    );
    shell.json_event(&json!({
        "reason": "combined",
        "output": output,
        "datasets": combined.keys().collect::<Vec<_>>(),
    }));
    Ok(())
}
