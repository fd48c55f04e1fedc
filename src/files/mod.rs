//! The project file tree.
//!
//! Turns the flat list of files referenced by the build graph into the
//! group hierarchy shown in Xcode's project navigator.

pub mod attributes;
pub mod creator;
pub mod element;
pub mod file_types;
pub mod localization;
pub mod root;

pub use attributes::{AttributeCalculator, Directories, SymlinkResolver};
pub use creator::{ElementCreator, NodeKind};
pub use element::{Element, ElementAndChildren, ResolvedRepository, SortOrder, SourceTree};
pub use root::{create_file_tree, FileTree, FileTreeContext};
