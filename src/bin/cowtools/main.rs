//! cowtools CLI - dask worker pools on the analysis facility

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use cowtools::datatools::DataToolsError;
use cowtools::jobqueue::JobQueueError;
use cowtools::util::diagnostic::emit;
use cowtools::util::Shell;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("cowtools=debug")
    } else if cli.quiet {
        EnvFilter::new("cowtools=error")
    } else {
        EnvFilter::new("cowtools=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    if let Err(e) = run(cli.command, &shell) {
        report(&e, &shell);
        std::process::exit(1);
    }
}

fn run(command: Commands, shell: &Shell) -> Result<()> {
    match command {
        Commands::Cluster(args) => commands::cluster::execute(args, shell),
        Commands::Remove(args) => commands::remove::execute(args, shell),
        Commands::Image => commands::image::execute(shell),
        Commands::Proxy(args) => commands::proxy::execute(args, shell),
        Commands::Combine(args) => commands::combine::execute(args, shell),
        Commands::Scale(args) => commands::scale::execute(args, shell),
        Commands::Doctor => commands::doctor::execute(shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print typed library errors with their suggestions.
fn report(e: &anyhow::Error, shell: &Shell) {
    let diagnostic = if let Some(err) = e.downcast_ref::<JobQueueError>() {
        Some(err.to_diagnostic())
    } else {
        e.downcast_ref::<DataToolsError>()
            .map(DataToolsError::to_diagnostic)
    };

    match diagnostic {
        Some(diagnostic) if !shell.is_json() => emit(&diagnostic, shell.use_color()),
        _ => shell.error(format!("{:#}", e)),
    }
}
