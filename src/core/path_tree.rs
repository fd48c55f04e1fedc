//! Path tree construction.
//!
//! Turns the flat set of file paths reported by the build graph into a tree of
//! named nodes. The tree is built bottom-up: paths are bucketed by component
//! count and the deepest bucket is folded into its parents first, so every
//! directory node is created exactly once with all of its children.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::bazel_path::BazelPath;
use crate::core::error::PreconditionError;

/// A file path as reported by the build graph exporter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilePath {
    /// Project-relative path
    pub path: BazelPath,

    /// Whether the path is a bundle-like directory that must stay opaque
    #[serde(default)]
    pub is_folder: bool,
}

impl FilePath {
    /// Create a regular file path.
    pub fn file(path: impl Into<BazelPath>) -> Self {
        FilePath {
            path: path.into(),
            is_folder: false,
        }
    }

    /// Create a folder-type path.
    pub fn folder(path: impl Into<BazelPath>) -> Self {
        FilePath {
            path: path.into(),
            is_folder: true,
        }
    }
}

/// A node in the path tree.
///
/// Nodes without children are files (or opaque folders); nodes with children
/// are directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTreeNode {
    /// Single path component (empty for the root)
    pub name: String,

    /// Whether a leaf node is an opaque folder
    pub is_folder: bool,

    /// Children, sorted by name
    pub children: Vec<PathTreeNode>,
}

impl PathTreeNode {
    /// Create a leaf node.
    pub fn leaf(name: impl Into<String>, is_folder: bool) -> Self {
        PathTreeNode {
            name: name.into(),
            is_folder,
            children: Vec::new(),
        }
    }

    /// Create a directory node.
    pub fn directory(name: impl Into<String>, children: Vec<PathTreeNode>) -> Self {
        PathTreeNode {
            name: name.into(),
            is_folder: false,
            children,
        }
    }

    /// Check if this node has children.
    pub fn is_directory(&self) -> bool {
        !self.children.is_empty()
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&PathTreeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Number of leaf nodes under (and including) this node.
    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(PathTreeNode::leaf_count).sum()
        }
    }

    /// Files sort before folders, folders before directories.
    fn kind_rank(&self) -> u8 {
        if self.is_directory() {
            2
        } else if self.is_folder {
            1
        } else {
            0
        }
    }
}

struct Entry {
    components: Vec<String>,
    node: PathTreeNode,
}

/// Build the path tree for a set of paths.
///
/// The result does not depend on the order of `paths`.
pub fn build_path_tree(paths: &[FilePath]) -> Result<PathTreeNode, PreconditionError> {
    let mut buckets: BTreeMap<usize, Vec<Entry>> = BTreeMap::new();

    for file_path in paths {
        let components: Vec<String> = file_path.path.components().map(str::to_string).collect();
        let Some(name) = components.last().cloned() else {
            continue;
        };
        buckets.entry(components.len()).or_default().push(Entry {
            components,
            node: PathTreeNode::leaf(name, file_path.is_folder),
        });
    }

    let Some(max_depth) = buckets.keys().next_back().copied() else {
        return Err(PreconditionError::EmptyFileSet);
    };

    for depth in (2..=max_depth).rev() {
        let mut entries = buckets.remove(&depth).unwrap_or_default();
        sort_entries(&mut entries);

        let mut iter = entries.into_iter().peekable();
        while let Some(first) = iter.next() {
            let parent = first.components[..depth - 1].to_vec();
            let mut children = vec![first.node];
            while let Some(next) = iter.next_if(|e| e.components[..depth - 1] == parent[..]) {
                children.push(next.node);
            }

            let name = parent.last().cloned().unwrap_or_default();
            buckets.entry(depth - 1).or_default().push(Entry {
                components: parent,
                node: PathTreeNode::directory(name, children),
            });
        }
    }

    let mut top = buckets.remove(&1).unwrap_or_default();
    sort_entries(&mut top);

    Ok(PathTreeNode::directory(
        "",
        top.into_iter().map(|e| e.node).collect(),
    ))
}

fn sort_entries(entries: &mut Vec<Entry>) {
    entries.sort_by(|a, b| {
        a.components
            .cmp(&b.components)
            .then_with(|| a.node.kind_rank().cmp(&b.node.kind_rank()))
    });
    // Duplicate input paths collapse into one node
    entries.dedup_by(|a, b| a.components == b.components && a.node == b.node);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(node: &PathTreeNode) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(
            build_path_tree(&[]),
            Err(PreconditionError::EmptyFileSet)
        ));
    }

    #[test]
    fn test_nested_tree() {
        let tree = build_path_tree(&[
            FilePath::file("App/main.swift"),
            FilePath::file("App/Views/List.swift"),
            FilePath::file("README.md"),
            FilePath::folder("App/Assets.xcassets"),
        ])
        .unwrap();

        assert_eq!(tree.name, "");
        assert_eq!(names(&tree), vec!["App", "README.md"]);

        let app = tree.child("App").unwrap();
        assert_eq!(names(app), vec!["Assets.xcassets", "Views", "main.swift"]);
        assert!(app.child("Assets.xcassets").unwrap().is_folder);
        assert!(app.child("Views").unwrap().is_directory());
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn test_order_independent() {
        let paths = vec![
            FilePath::file("b/z.m"),
            FilePath::file("a/y.h"),
            FilePath::file("a/x/w.c"),
            FilePath::folder("b/R.bundle"),
            FilePath::file("c"),
        ];
        let expected = build_path_tree(&paths).unwrap();

        let mut reversed = paths.clone();
        reversed.reverse();
        assert_eq!(build_path_tree(&reversed).unwrap(), expected);

        let rotated: Vec<_> = paths[2..].iter().chain(&paths[..2]).cloned().collect();
        assert_eq!(build_path_tree(&rotated).unwrap(), expected);
    }

    #[test]
    fn test_file_sorts_before_folder_and_directory() {
        let tree = build_path_tree(&[
            FilePath::file("a/b/c"),
            FilePath::folder("a/b"),
            FilePath::file("a/b"),
        ])
        .unwrap();

        let a = tree.child("a").unwrap();
        assert_eq!(a.children.len(), 3);
        assert!(!a.children[0].is_folder && !a.children[0].is_directory());
        assert!(a.children[1].is_folder);
        assert!(a.children[2].is_directory());
    }

    #[test]
    fn test_duplicates_collapse() {
        let tree = build_path_tree(&[
            FilePath::file("a/x.swift"),
            FilePath::file("./a/x.swift"),
        ])
        .unwrap();
        assert_eq!(tree.child("a").unwrap().children.len(), 1);
    }
}
