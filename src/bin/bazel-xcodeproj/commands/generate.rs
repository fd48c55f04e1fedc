//! `bazel-xcodeproj generate` command

use anyhow::{Context, Result};

use crate::cli::GenerateArgs;
use bazel_xcodeproj::ops::generate::{generate, load_graph_spec, GenerateOptions};
use bazel_xcodeproj::util::config::{global_config_path, load_config, project_config_path};
use bazel_xcodeproj::util::diagnostic::emit;
use bazel_xcodeproj::util::fs::write_string;

pub fn execute(args: GenerateArgs, color: bool) -> Result<()> {
    let mut spec = load_graph_spec(&args.input.input)?;

    // Flags override the build graph
    if let Some(workspace) = args.workspace {
        spec.workspace = workspace;
    }
    if let Some(execution_root) = args.execution_root {
        spec.execution_root = execution_root;
    }

    let config = load_config(
        global_config_path().as_deref(),
        &project_config_path(&spec.workspace),
        args.config.as_deref(),
    )?;
    let opts = GenerateOptions::from_config(&config).with_jobs(args.jobs);

    let model = generate(spec, &opts)?;

    for warning in &model.warnings {
        emit(warning, color);
    }

    let json = serde_json::to_string_pretty(&model).context("failed to serialize project model")?;
    match args.output {
        Some(path) => {
            write_string(&path, &json)?;
            eprintln!(
                "     Generated {} ({} targets, {} objects)",
                path.display(),
                model.targets.len(),
                model.objects.len()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
