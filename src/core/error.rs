//! Precondition violations.
//!
//! These indicate malformed input from the build graph exporter. Generation
//! aborts on them instead of writing a corrupt project.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::target::TargetId;

/// A fatal, non-recoverable input error.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PreconditionError {
    #[error("no file paths were provided to build the project file tree")]
    #[diagnostic(
        code(xcodeproj::files::empty_file_set),
        help("The build graph must reference at least one file")
    )]
    EmptyFileSet,

    #[error("execution root `{path}` has too few path components")]
    #[diagnostic(
        code(xcodeproj::files::execution_root_too_short),
        help("The execution root must look like `<output_base>/execroot/<workspace>`")
    )]
    ExecutionRootTooShort { path: String },

    #[error("target `{id}` was referenced but is not part of the build graph")]
    #[diagnostic(code(xcodeproj::targets::missing_target))]
    MissingTarget { id: TargetId },

    #[error("a consolidated target must contain at least one target")]
    #[diagnostic(code(xcodeproj::targets::empty_consolidation_key))]
    EmptyConsolidationKey,
}
