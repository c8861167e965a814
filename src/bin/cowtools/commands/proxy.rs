//! `cowtools proxy` command

use anyhow::{bail, Result};
use serde_json::json;

use super::load_context;
use crate::cli::ProxyArgs;
use cowtools::jobqueue::x509::{find_x509, stage_x509};
use cowtools::jobqueue::{FacilityLayout, SystemProbe};
use cowtools::util::diagnostic::suggestions;
use cowtools::util::shell::Status;
use cowtools::util::Shell;

pub fn execute(args: ProxyArgs, shell: &Shell) -> Result<()> {
    let probe = SystemProbe::new();

    if args.stage {
        let (ctx, config) = load_context()?;
        let layout = FacilityLayout::from_context(&ctx, &config)?;
        let name = stage_x509(&probe, &layout.scratch_dir)?;
        let staged = layout.scratch_dir.join(&name);

        shell.status(Status::Created, staged.display());
        shell.json_event(&json!({"reason": "proxy-staged", "path": staged, "name": name}));
        return Ok(());
    }

    let Some(path) = find_x509(None, &probe) else {
        bail!("no x509 proxy found\n\n{}", suggestions::CREATE_PROXY);
    };

    if shell.is_json() {
        shell.json_event(&json!({"reason": "proxy", "path": path}));
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
