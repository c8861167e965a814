//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use cowtools::util::shell::ColorChoice;

/// cowtools - dask worker pools and result post-processing on the analysis facility
#[derive(Parser)]
#[command(name = "cowtools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = parse_color)]
    pub color: ColorChoice,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

fn parse_color(s: &str) -> Result<ColorChoice, String> {
    s.parse()
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit dask workers to HTCondor
    Cluster(ClusterArgs),

    /// Remove worker clusters with condor_rm
    Remove(RemoveArgs),

    /// Show the container image workers would run in
    Image,

    /// Find or stage the x509 proxy shipped to workers
    Proxy(ProxyArgs),

    /// Group and rename the datasets in a results file
    Combine(CombineArgs),

    /// Scale simulated results to the luminosity of data results
    Scale(ScaleArgs),

    /// Check that the facility tools workers depend on are available
    Doctor,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ClusterArgs {
    /// Address of the dask scheduler workers connect to
    #[arg(long, env = "DASK_SCHEDULER_ADDRESS")]
    pub scheduler: String,

    /// Number of workers to submit (defaults to the pool minimum)
    #[arg(short = 'n', long)]
    pub workers: Option<u32>,

    /// Container image for workers (discovered when omitted)
    #[arg(long)]
    pub image: Option<String>,

    /// x509 proxy to ship to workers (discovered when omitted)
    #[arg(long)]
    pub x509: Option<PathBuf>,

    /// Upper bound on worker jobs
    #[arg(long)]
    pub maximum: Option<u32>,

    /// Synonym for --maximum
    #[arg(long)]
    pub max_workers: Option<u32>,

    /// Memory per worker (e.g. "4 GB")
    #[arg(long)]
    pub memory: Option<String>,

    /// Disk per worker (e.g. "2 GB")
    #[arg(long)]
    pub disk: Option<String>,

    /// HTCondor Requirements expression
    #[arg(long)]
    pub requirements: Option<String>,

    /// Ship the active virtual environment's packages to workers
    #[arg(long)]
    pub ship_env: bool,

    /// Extra file to transfer to every worker (repeatable)
    #[arg(long = "transfer-input-file", value_name = "PATH")]
    pub transfer_input_files: Vec<String>,

    /// GPUs per worker
    #[arg(long)]
    pub gpus: Option<u32>,

    /// Seconds a worker survives without its scheduler
    #[arg(long)]
    pub death_timeout: Option<u64>,

    /// Write the job files and print them without submitting
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// HTCondor cluster ids printed by `cowtools cluster`
    #[arg(required = true, value_name = "CLUSTER")]
    pub clusters: Vec<u64>,
}

#[derive(Args)]
pub struct ProxyArgs {
    /// Copy the proxy into the scratch directory
    #[arg(long)]
    pub stage: bool,
}

#[derive(Args)]
pub struct CombineArgs {
    /// Results file (JSON, optionally .gz)
    pub input: PathBuf,

    /// Where to write the combined results
    #[arg(short, long)]
    pub output: PathBuf,

    /// Fileset providing short names
    #[arg(long)]
    pub fileset: Option<PathBuf>,

    /// Use the data grouping rules instead of the simulation rules
    #[arg(long)]
    pub data: bool,
}

#[derive(Args)]
pub struct ScaleArgs {
    /// Data results carrying `Luminosity`
    #[arg(long)]
    pub data: PathBuf,

    /// Simulated results carrying `RawEventCount`
    #[arg(long)]
    pub mc: PathBuf,

    /// Simulation fileset carrying cross sections
    #[arg(long)]
    pub fs_mc: PathBuf,

    /// Data fileset providing short names
    #[arg(long)]
    pub fs_data: Option<PathBuf>,

    /// Where to write the scaled simulation
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also write the combined data here
    #[arg(long)]
    pub data_output: Option<PathBuf>,

    /// Keep datasets separate instead of grouping and renaming them
    #[arg(long)]
    pub no_combine: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
