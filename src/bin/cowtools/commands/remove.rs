//! `cowtools remove` command

use anyhow::Result;
use serde_json::json;

use super::load_context;
use crate::cli::RemoveArgs;
use cowtools::ops::cluster::remove;
use cowtools::util::shell::Status;
use cowtools::util::Shell;

pub fn execute(args: RemoveArgs, shell: &Shell) -> Result<()> {
    let (ctx, config) = load_context()?;

    remove(&ctx, &config, &args.clusters)?;

    for cluster in &args.clusters {
        shell.status(Status::Removed, format!("cluster {}", cluster));
    }
    shell.json_event(&json!({"reason": "clusters-removed", "clusters": args.clusters}));
    Ok(())
}
