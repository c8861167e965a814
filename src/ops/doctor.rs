//! Facility health checks.
//!
//! The `doctor` command verifies that the tools and paths worker pools
//! depend on are present before anything is submitted.
//!
//! ## Checks Performed
//!
//! - HTCondor client tools (condor_submit, condor_q)
//! - Grid proxy tooling (voms-proxy-info)
//! - Container runtime (apptainer, singularity)
//! - Python interpreter
//! - Scratch directory and HTCondor configuration
//! - Worker image discovery

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::jobqueue::facility::FacilityLayout;
use crate::jobqueue::image::find_image;
use crate::util::config::Config;
use crate::util::process::{find_container_runtime, find_executable, ProcessBuilder};
use crate::util::GlobalContext;

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool or file (if applicable)
    pub path: Option<PathBuf>,

    /// Version string (if applicable)
    pub version: Option<String>,

    /// How long the check took
    pub duration: Duration,

    /// Whether this check is required or optional
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    /// Create a failing check result.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,

    /// Total time taken
    pub total_duration: Duration,

    /// Environment information
    pub environment: BTreeMap<String, String>,
}

impl DoctorReport {
    pub fn new() -> Self {
        DoctorReport::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Check if all required checks passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }
}

/// Run every check against the current facility layout.
pub fn doctor(ctx: &GlobalContext, config: &Config) -> Result<DoctorReport> {
    let start = Instant::now();
    let mut report = DoctorReport::new();

    report
        .environment
        .insert("os".to_string(), std::env::consts::OS.to_string());
    report
        .environment
        .insert("arch".to_string(), std::env::consts::ARCH.to_string());

    report.add(check_tool("condor_submit", "needed to submit workers", true));
    report.add(check_tool("condor_q", "used to inspect submitted workers", false));
    report.add(check_tool(
        "voms-proxy-info",
        "used to find the grid proxy for XRootD",
        false,
    ));
    report.add(check_container_runtime());
    report.add(check_tool("python3", "needed to run the scheduler", true));

    match FacilityLayout::from_context(ctx, config) {
        Ok(layout) => {
            report
                .environment
                .insert("user".to_string(), layout.user.clone());
            report.add(check_scratch(&layout));
            report.add(check_condor_config(&layout));
            report.add(check_image(&layout));
        }
        Err(e) => report.add(CheckResult::fail("Facility layout", e.to_string())),
    }

    report.total_duration = start.elapsed();
    Ok(report)
}

/// Check that `tool` is on PATH, recording the first line of `--version`.
fn check_tool(tool: &str, purpose: &str, required: bool) -> CheckResult {
    let start = Instant::now();

    let result = match find_executable(tool) {
        Some(path) => {
            let mut result = CheckResult::pass(tool, format!("{} is available", tool));
            if let Some(version) = tool_version(tool) {
                result = result.with_version(version);
            }
            result.with_path(path)
        }
        None => CheckResult::fail(tool, format!("{} not found ({})", tool, purpose)),
    };

    let result = result.with_duration(start.elapsed());
    if required {
        result
    } else {
        result.optional()
    }
}

fn tool_version(tool: &str) -> Option<String> {
    let stdout = ProcessBuilder::new(tool).arg("--version").exec_stdout().ok()?;
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

fn check_container_runtime() -> CheckResult {
    let start = Instant::now();

    let result = match find_container_runtime() {
        Some((name, path)) => {
            CheckResult::pass("Container runtime", format!("Found {}", name)).with_path(path)
        }
        None => CheckResult::fail(
            "Container runtime",
            "Neither apptainer nor singularity found (needed to test images locally)",
        ),
    };

    result.with_duration(start.elapsed()).optional()
}

fn check_scratch(layout: &FacilityLayout) -> CheckResult {
    let dir = &layout.scratch_dir;
    if dir.is_dir() {
        CheckResult::pass("Scratch directory", "Worker logs will be written here")
            .with_path(dir.clone())
    } else {
        CheckResult::fail(
            "Scratch directory",
            format!("{} does not exist; workers start there", dir.display()),
        )
        .with_path(dir.clone())
    }
}

fn check_condor_config(layout: &FacilityLayout) -> CheckResult {
    let path = &layout.condor_config;
    if path.is_file() {
        CheckResult::pass("HTCondor config", "CONDOR_CONFIG is readable").with_path(path.clone())
    } else {
        CheckResult::fail(
            "HTCondor config",
            format!("{} not found; set [facility] condor_config", path.display()),
        )
        .with_path(path.clone())
    }
}

fn check_image(layout: &FacilityLayout) -> CheckResult {
    let start = Instant::now();

    let result = match find_image(layout) {
        Ok(image) => CheckResult::pass("Worker image", format!("Workers will run in {}", image)),
        Err(e) => CheckResult::fail(
            "Worker image",
            format!("{} (pass `--image` to `cowtools cluster`)", e),
        ),
    };

    result.with_duration(start.elapsed()).optional()
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    let _ = writeln!(output, "cowtools doctor");
    let _ = writeln!(output, "===============\n");

    if verbose {
        let unknown = "unknown".to_string();
        let _ = writeln!(output, "Environment:");
        let _ = writeln!(
            output,
            "  OS: {} ({})",
            report.environment.get("os").unwrap_or(&unknown),
            report.environment.get("arch").unwrap_or(&unknown)
        );
        if let Some(user) = report.environment.get("user") {
            let _ = writeln!(output, "  User: {}", user);
        }
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "Checks:");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };

        let _ = writeln!(output, "  {} {}{}", status, check.name, required);

        if verbose || !check.passed {
            let _ = writeln!(output, "      {}", check.message);
        }
        if verbose {
            if let Some(path) = &check.path {
                let _ = writeln!(output, "      Path: {}", path.display());
            }
            if let Some(version) = &check.version {
                let _ = writeln!(output, "      Version: {}", version);
            }
        }
    }

    let _ = writeln!(output);

    let passed = report.passed_count();
    let failed = report.failed_count();
    let required_failed = report.required_failed_count();

    let _ = writeln!(output, "Summary: {} passed, {} failed", passed, failed);

    if required_failed > 0 {
        let _ = writeln!(
            output,
            "\nWarning: {} required check(s) failed. Workers may not start.",
            required_failed
        );
    } else if failed > 0 {
        let _ = writeln!(
            output,
            "\nAll required checks passed. {} optional check(s) failed.",
            failed
        );
    } else {
        let _ = writeln!(output, "\nAll checks passed. Ready to submit workers.");
    }

    output
}
