//! bazel-xcodeproj CLI - Xcode project models from Bazel build graphs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("bazel_xcodeproj=debug")
    } else {
        EnvFilter::new("bazel_xcodeproj=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, !cli.no_color),
        Commands::Targets(args) => commands::targets::execute(args, !cli.no_color),
        Commands::Files(args) => commands::files::execute(args),
    }
}
