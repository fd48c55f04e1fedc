//! `bazel-xcodeproj targets` command

use anyhow::Result;

use crate::cli::InputArgs;
use bazel_xcodeproj::ops::generate::{load_graph_spec, name_targets};
use bazel_xcodeproj::util::config::{global_config_path, load_config, project_config_path};
use bazel_xcodeproj::util::diagnostic::emit;

pub fn execute(args: InputArgs, color: bool) -> Result<()> {
    let mut spec = load_graph_spec(&args.input)?;

    let config = load_config(
        global_config_path().as_deref(),
        &project_config_path(&spec.workspace),
        None,
    )?;

    let mut warnings = Vec::new();
    let targets = name_targets(&mut spec, config.default_xcode_configuration(), &mut warnings)?;
    for warning in &warnings {
        emit(warning, color);
    }

    for target in targets {
        println!("{} ({})", target.name, target.target.label());
        for (id, variant) in &target.target.targets {
            println!("    {} [{}]", id, variant.platform);
        }
    }

    Ok(())
}
