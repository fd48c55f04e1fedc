//! Element attribute calculation.
//!
//! Decides how an element's path is written: relative to its group in the
//! common case, or as an absolute, fully-resolved path when the file on disk
//! is reached through a symlink. Xcode indexes symlinked paths slowly and
//! sometimes incorrectly, so symlinked repositories are additionally recorded
//! as resolved repositories for later path substitution.

use std::path::{Path, PathBuf};

use crate::core::bazel_path::{BazelPath, PathRegime};
use crate::core::error::PreconditionError;
use crate::files::element::{ElementAttributes, ResolvedRepository, SourceTree};

/// Capability to resolve symlinks.
pub trait SymlinkResolver: Sync {
    /// Fully resolve `path` if it is a symlink, or return `None` if it is not.
    fn resolve(&self, path: &Path) -> Option<PathBuf>;
}

/// The absolute roots paths are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    /// Primary workspace root
    pub workspace: PathBuf,

    /// Bazel execution root (`<output_base>/execroot/<workspace_name>`)
    pub execution_root: PathBuf,

    /// Legacy external repositories (`<output_base>/external`)
    pub external_dir: PathBuf,
}

impl Directories {
    /// Create the directories, deriving the external directory from the
    /// execution root.
    pub fn new(
        workspace: impl Into<PathBuf>,
        execution_root: impl Into<PathBuf>,
    ) -> Result<Self, PreconditionError> {
        let execution_root = execution_root.into();
        let output_base = execution_root
            .ancestors()
            .nth(2)
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| PreconditionError::ExecutionRootTooShort {
                path: execution_root.display().to_string(),
            })?;
        let external_dir = output_base.join("external");

        Ok(Directories {
            workspace: workspace.into(),
            execution_root,
            external_dir,
        })
    }

    /// Root of sibling repositories (`<output_base>/execroot`).
    pub fn sibling_root(&self) -> PathBuf {
        self.execution_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.execution_root.clone())
    }

    /// Build output root (`<execution_root>/bazel-out`).
    pub fn bazel_out(&self) -> PathBuf {
        self.execution_root.join("bazel-out")
    }

    /// The absolute on-disk path of a project path.
    pub fn absolute_path(&self, bazel_path: &BazelPath) -> PathBuf {
        let relative = bazel_path.regime_relative();
        match bazel_path.regime() {
            PathRegime::Plain => self.workspace.join(relative),
            PathRegime::LegacyExternal => self.external_dir.join(relative),
            PathRegime::SiblingExternal => self.sibling_root().join(relative),
            PathRegime::BazelGenerated => self.execution_root.join(relative),
        }
    }
}

/// Calculates element attributes for tree nodes.
pub struct AttributeCalculator<'a> {
    directories: &'a Directories,
    resolver: &'a dyn SymlinkResolver,
}

impl<'a> AttributeCalculator<'a> {
    /// Create a calculator.
    pub fn new(directories: &'a Directories, resolver: &'a dyn SymlinkResolver) -> Self {
        AttributeCalculator {
            directories,
            resolver,
        }
    }

    /// The directories paths are resolved against.
    pub fn directories(&self) -> &Directories {
        self.directories
    }

    /// Calculate the attributes of the node `name` at `bazel_path`.
    pub fn attributes(
        &self,
        name: &str,
        bazel_path: &BazelPath,
        is_group: bool,
    ) -> (ElementAttributes, Option<ResolvedRepository>) {
        let absolute_path = self.directories.absolute_path(bazel_path);

        let Some(destination) = self.resolver.resolve(&absolute_path) else {
            return (
                ElementAttributes {
                    source_tree: SourceTree::Group,
                    name: None,
                    path: name.to_string(),
                },
                None,
            );
        };

        let destination = destination.to_string_lossy().into_owned();
        let resolved_repository = if is_group {
            bazel_path
                .regime()
                .resolved_repository_prefix()
                .map(|prefix| {
                    ResolvedRepository::new(
                        format!("{}{}", prefix, bazel_path.regime_relative()),
                        destination.clone(),
                    )
                })
        } else {
            None
        };

        tracing::debug!("{} resolves to {}", bazel_path, destination);

        (
            ElementAttributes {
                source_tree: SourceTree::Absolute,
                name: Some(name.to_string()),
                path: destination,
            },
            resolved_repository,
        )
    }
}
