//! `cowtools doctor` command

use anyhow::{bail, Result};
use serde_json::json;

use super::load_context;
use cowtools::ops::doctor::{doctor, format_report};
use cowtools::util::Shell;

pub fn execute(shell: &Shell) -> Result<()> {
    let (ctx, config) = load_context()?;
    let report = doctor(&ctx, &config)?;

    if shell.is_json() {
        let checks: Vec<_> = report
            .checks
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "passed": c.passed,
                    "required": c.required,
                    "message": c.message,
                    "path": c.path,
                    "version": c.version,
                })
            })
            .collect();
        shell.json_event(&json!({"reason": "doctor", "checks": checks}));
    } else {
        print!("{}", format_report(&report, shell.is_verbose()));
    }

    if !report.all_required_passed() {
        bail!(
            "{} required check(s) failed",
            report.required_failed_count()
        );
    }
    Ok(())
}
