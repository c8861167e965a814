//! Command implementations

pub mod cluster;
pub mod combine;
pub mod completions;
pub mod doctor;
pub mod image;
pub mod proxy;
pub mod remove;
pub mod scale;

use anyhow::Result;

use cowtools::util::config::{load_config, Config};
use cowtools::util::GlobalContext;

/// Context and merged configuration for the current directory.
pub fn load_context() -> Result<(GlobalContext, Config)> {
    let ctx = GlobalContext::new()?;
    let config = load_config(&ctx.config_path(), &ctx.project_config_path());
    Ok((ctx, config))
}
