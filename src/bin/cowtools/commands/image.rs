//! `cowtools image` command

use anyhow::Result;
use serde_json::json;

use super::load_context;
use cowtools::jobqueue::image::{find_image, needs_transfer};
use cowtools::jobqueue::FacilityLayout;
use cowtools::util::Shell;

pub fn execute(shell: &Shell) -> Result<()> {
    let (ctx, config) = load_context()?;

    let image = match config.cluster.container_image {
        Some(ref image) => image.clone(),
        None => find_image(&FacilityLayout::from_context(&ctx, &config)?)?,
    };
    let transfer = needs_transfer(&image);

    if shell.is_json() {
        shell.json_event(&json!({
            "reason": "image",
            "image": image,
            "transferred": transfer,
        }));
    } else {
        println!("{}", image);
        if transfer {
            shell.note("the image is a local file and will be transferred to every worker");
        }
    }

    Ok(())
}
