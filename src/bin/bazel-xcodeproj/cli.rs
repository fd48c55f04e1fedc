//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// bazel-xcodeproj - Generate Xcode project models from Bazel build graphs
#[derive(Parser)]
#[command(name = "bazel-xcodeproj")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the project model
    Generate(GenerateArgs),

    /// List the Xcode targets and the variants behind them
    Targets(InputArgs),

    /// Display the file tree
    Files(FilesArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Build graph JSON exported from Bazel
    #[arg(short, long)]
    pub input: PathBuf,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the model here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (overrides global and project config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Workspace directory (overrides the build graph)
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Bazel execution root (overrides the build graph)
    #[arg(long)]
    pub execution_root: Option<PathBuf>,
}

#[derive(Args)]
pub struct FilesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Maximum depth to display
    #[arg(long)]
    pub depth: Option<usize>,
}
