//! Core data structures.
//!
//! This module contains the foundational types used throughout the generator:
//! - Project-relative paths and their regimes
//! - The path tree built from the file set
//! - Platforms, products and target variants
//! - Precondition errors

pub mod bazel_path;
pub mod error;
pub mod path_tree;
pub mod platform;
pub mod product;
pub mod target;

pub use bazel_path::{BazelPath, PathRegime};
pub use error::PreconditionError;
pub use path_tree::{build_path_tree, FilePath, PathTreeNode};
pub use platform::{Environment, Os, Platform};
pub use product::{Product, ProductType};
pub use target::{BazelLabel, BuildSetting, BuildSettings, Inputs, Target, TargetId, Targets};
