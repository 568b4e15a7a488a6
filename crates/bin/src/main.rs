use clap::Parser;
use tracing_subscriber::EnvFilter;
use waypost::{AppConfig, AppContext};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, DirArgs};
use output::OutputFormat;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("waypost=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let context = AppContext::open(app_config(&cli.dirs))?;
    if context.install_crash_handler() {
        tracing::debug!(report = %context.config().crash_report_path().display(), "Crash handler installed");
    }

    match cli.command.unwrap_or(Commands::Info) {
        Commands::Info => commands::info::run(&context, format),
        Commands::Uid(args) => commands::uid::run(&context, &args, format),
        Commands::Crash(args) => commands::crash::run(&context, &args, format),
        Commands::Index => commands::index::run(&context, format),
    }
}

/// Resolve the directory layout, defaulting cache and assets under the data directory.
fn app_config(dirs: &DirArgs) -> AppConfig {
    let cache_dir = dirs
        .cache_dir
        .clone()
        .unwrap_or_else(|| dirs.data_dir.join("cache"));
    let assets_dir = dirs
        .assets_dir
        .clone()
        .unwrap_or_else(|| dirs.data_dir.join("assets"));
    AppConfig::new(&dirs.data_dir, cache_dir, assets_dir)
}
