//! High-level operations.
//!
//! This module contains the implementation of the generator's commands.

pub mod generate;

pub use generate::{
    generate, generate_with_resolver, load_graph_spec, name_targets, GenerateOptions, GraphSpec, ProjectModel,
    ProjectTarget,
};
