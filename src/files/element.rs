//! File-tree element types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::bazel_path::BazelPath;
use crate::pbxproj::writer::Object;
use crate::util::diagnostic::Diagnostic;

/// Sibling ordering tier.
///
/// Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    GroupLike,
    FileLike,
    BazelExternalRepositories,
    BazelGenerated,
    InternalTooling,
}

/// How an element's path is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTree {
    /// Relative to the parent group
    Group,
    /// Absolute path
    Absolute,
    /// Relative to the project's source root
    SourceRoot,
}

impl SourceTree {
    /// The value written into records.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTree::Group => "<group>",
            SourceTree::Absolute => "<absolute>",
            SourceTree::SourceRoot => "SOURCE_ROOT",
        }
    }
}

/// Where an element points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementAttributes {
    /// Path interpretation
    pub source_tree: SourceTree,

    /// Display name, when it differs from the last path component
    pub name: Option<String>,

    /// Path relative to `source_tree`
    pub path: String,
}

/// A fetched repository reached through a symlink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolvedRepository {
    /// Path as Xcode sees it (e.g. `./external/Foo`)
    pub source_path: String,

    /// Resolved symlink destination
    pub mapped_path: String,
}

impl ResolvedRepository {
    /// Create a resolved repository.
    pub fn new(source_path: impl Into<String>, mapped_path: impl Into<String>) -> Self {
        ResolvedRepository {
            source_path: source_path.into(),
            mapped_path: mapped_path.into(),
        }
    }
}

/// Order resolved repositories so subdirectory mappings come before their parents.
pub fn sort_resolved_repositories(repositories: &mut Vec<ResolvedRepository>) {
    repositories.sort_by(|a, b| {
        b.mapped_path
            .len()
            .cmp(&a.mapped_path.len())
            .then_with(|| a.cmp(b))
    });
    repositories.dedup();
}

/// Render resolved repositories as the value of the `RESOLVED_REPOSITORIES` setting.
pub fn resolved_repositories_setting(repositories: &[ResolvedRepository]) -> String {
    repositories
        .iter()
        .map(|r| format!("\"{}\" \"{}\"", r.source_path, r.mapped_path))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A created element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Name used for sorting among siblings
    pub name: String,

    /// The serialized object
    pub object: Object,

    /// Sibling ordering tier
    pub sort_order: SortOrder,
}

impl Element {
    /// The element's identifier.
    pub fn identifier(&self) -> &str {
        &self.object.identifier
    }
}

/// An element plus everything created while creating it.
#[derive(Debug, Clone, Default)]
pub struct ElementAndChildren {
    /// The elements created at this level (usually one)
    pub elements: Vec<Element>,

    /// Objects of all descendants, not including `elements`
    pub transitive_objects: Vec<Object>,

    /// Path to identifier mappings for the subtree
    pub bazel_path_and_identifiers: Vec<(BazelPath, String)>,

    /// Localization regions seen in the subtree
    pub known_regions: BTreeSet<String>,

    /// Symlinked repositories seen in the subtree
    pub resolved_repositories: Vec<ResolvedRepository>,

    /// Problems found in the subtree
    pub warnings: Vec<Diagnostic>,
}

impl ElementAndChildren {
    /// Wrap a single element.
    pub fn single(element: Element) -> Self {
        ElementAndChildren {
            elements: vec![element],
            ..Default::default()
        }
    }

    /// Merge a sibling's results, keeping its elements at this level.
    pub fn merge(&mut self, sibling: ElementAndChildren) {
        self.elements.extend(sibling.elements);
        self.transitive_objects.extend(sibling.transitive_objects);
        self.bazel_path_and_identifiers
            .extend(sibling.bazel_path_and_identifiers);
        self.known_regions.extend(sibling.known_regions);
        self.resolved_repositories
            .extend(sibling.resolved_repositories);
        self.warnings.extend(sibling.warnings);
    }

    /// Identifiers of the elements at this level, in order.
    pub fn identifiers(&self) -> Vec<String> {
        self.elements
            .iter()
            .map(|e| e.identifier().to_string())
            .collect()
    }

    /// Absorb a child's results.
    ///
    /// The child's own elements become transitive objects of `self` and are
    /// returned so the caller can reference them.
    pub fn absorb(&mut self, child: ElementAndChildren) -> Vec<Element> {
        self.transitive_objects
            .extend(child.elements.iter().map(|e| e.object.clone()));
        self.transitive_objects.extend(child.transitive_objects);
        self.bazel_path_and_identifiers
            .extend(child.bazel_path_and_identifiers);
        self.known_regions.extend(child.known_regions);
        self.resolved_repositories
            .extend(child.resolved_repositories);
        self.warnings.extend(child.warnings);
        child.elements
    }
}

/// Sort sibling elements for display.
pub fn sort_elements(elements: &mut [Element]) {
    elements.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}
