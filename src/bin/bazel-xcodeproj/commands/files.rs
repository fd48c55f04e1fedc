//! `bazel-xcodeproj files` command

use anyhow::{Context, Result};

use crate::cli::FilesArgs;
use bazel_xcodeproj::core::path_tree::{build_path_tree, PathTreeNode};
use bazel_xcodeproj::ops::generate::load_graph_spec;

pub fn execute(args: FilesArgs) -> Result<()> {
    let spec = load_graph_spec(&args.input.input)?;
    let tree = build_path_tree(&spec.files).context("failed to build path tree")?;

    let max_depth = args.depth.unwrap_or(usize::MAX);
    for child in &tree.children {
        print_tree(child, 0, max_depth);
    }

    Ok(())
}

fn print_tree(node: &PathTreeNode, depth: usize, max_depth: usize) {
    if depth > max_depth {
        return;
    }

    let prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}├── ", "│   ".repeat(depth - 1))
    };
    let suffix = if node.is_directory() { "/" } else { "" };
    println!("{}{}{}", prefix, node.name, suffix);

    for child in &node.children {
        print_tree(child, depth + 1, max_depth);
    }
}
