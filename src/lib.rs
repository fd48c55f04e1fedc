//! bazel-xcodeproj - Xcode project model generation for Bazel workspaces
//!
//! This crate turns an exported Bazel build graph into the objects of an
//! Xcode project: the file tree shown in the project navigator and one
//! native target per consolidated group of target variants.

pub mod core;
pub mod files;
pub mod ops;
pub mod pbxproj;
pub mod targets;
pub mod util;

/// Test utilities and fakes for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory symlink resolver and fixtures for
/// platforms and target variants.
#[cfg(test)]
pub mod test_support;

pub use core::{BazelPath, FilePath, PreconditionError, Target, TargetId, Targets};
pub use files::{create_file_tree, FileTree};
pub use ops::{generate, GenerateOptions, GraphSpec, ProjectModel};
pub use targets::{consolidate_targets, disambiguate_targets};
pub use util::config::Config;
