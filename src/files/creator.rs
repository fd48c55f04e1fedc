//! Element creation.
//!
//! A single recursive walk over the path tree. Every node is classified once
//! into a [`NodeKind`] and dispatched to the matching constructor; groups
//! recurse back into [`ElementCreator::create_children`].

use std::collections::BTreeMap;

use crate::core::bazel_path::BazelPath;
use crate::core::path_tree::PathTreeNode;
use crate::files::attributes::AttributeCalculator;
use crate::files::element::{sort_elements, Element, ElementAndChildren, SortOrder};
use crate::files::file_types::{
    explicit_file_type, extension, is_folder_type_extension, last_known_file_type,
};
use crate::files::localization::{create_variant_groups, lproj_region, LocalizedFile};
use crate::pbxproj::identifiers::IdentifierCache;
use crate::pbxproj::writer::{Object, Record};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Extension of versioned Core Data model bundles.
pub const VERSIONED_MODEL_EXTENSION: &str = "xcdatamodeld";

/// Extension of a single Core Data model version.
pub const MODEL_VERSION_EXTENSION: &str = "xcdatamodel";

/// How a tree node turns into project elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A file or an opaque folder
    File,
    /// A plain directory
    Group,
    /// An lproj directory, folded into variant groups by its parent
    LocalizedGroup,
    /// An `.xcdatamodeld` bundle
    VersionedGroup,
}

impl NodeKind {
    /// Classify a node.
    pub fn of(node: &PathTreeNode) -> NodeKind {
        if !node.is_directory() {
            return NodeKind::File;
        }

        let ext = extension(&node.name);
        if lproj_region(&node.name).is_some() {
            NodeKind::LocalizedGroup
        } else if ext == Some(VERSIONED_MODEL_EXTENSION) {
            NodeKind::VersionedGroup
        } else if is_folder_type_extension(ext) {
            NodeKind::File
        } else {
            NodeKind::Group
        }
    }
}

/// Creates elements for path tree nodes.
pub struct ElementCreator<'a> {
    calculator: AttributeCalculator<'a>,
    selected_model_versions: &'a BTreeMap<BazelPath, String>,
    ids: &'a mut IdentifierCache,
}

impl<'a> ElementCreator<'a> {
    /// Create an element creator.
    pub fn new(
        calculator: AttributeCalculator<'a>,
        selected_model_versions: &'a BTreeMap<BazelPath, String>,
        ids: &'a mut IdentifierCache,
    ) -> Self {
        ElementCreator {
            calculator,
            selected_model_versions,
            ids,
        }
    }

    /// The attribute calculator used for every node.
    pub fn calculator(&self) -> &AttributeCalculator<'a> {
        &self.calculator
    }

    /// Create the elements for the children of the directory at `parent_path`.
    ///
    /// The returned elements are sorted for display.
    pub fn create_children<'n>(
        &mut self,
        parent_path: &BazelPath,
        nodes: impl IntoIterator<Item = &'n PathTreeNode>,
    ) -> ElementAndChildren {
        let mut result = ElementAndChildren::default();
        let mut localized_files = Vec::new();

        for node in nodes {
            let path = parent_path.join(&node.name);
            match NodeKind::of(node) {
                NodeKind::File => result.merge(self.create_file(&path, node)),
                NodeKind::Group => result.merge(self.create_group(&path, node)),
                NodeKind::VersionedGroup => result.merge(self.create_version_group(&path, node)),
                NodeKind::LocalizedGroup => {
                    localized_files.extend(self.create_localized_files(&path, node))
                }
            }
        }

        if !localized_files.is_empty() {
            result.merge(create_variant_groups(parent_path, localized_files, self.ids));
        }

        sort_elements(&mut result.elements);
        result
    }

    /// Create a file reference.
    pub fn create_file(&mut self, path: &BazelPath, node: &PathTreeNode) -> ElementAndChildren {
        let (attributes, resolved_repository) =
            self.calculator.attributes(&node.name, path, false);

        let is_folder = node.is_folder || node.is_directory();
        let folder_type = is_folder || is_folder_type_extension(extension(&node.name));
        let identifier = self.ids.element(path.as_str());

        let record = Record::new("PBXFileReference");
        let record = match explicit_file_type(&node.name) {
            Some(file_type) => record.field("explicitFileType", file_type),
            None => record.field(
                "lastKnownFileType",
                last_known_file_type(&node.name, is_folder),
            ),
        };
        let content = record
            .field_opt("name", attributes.name.as_deref())
            .field("path", &attributes.path)
            .field("sourceTree", attributes.source_tree.as_str())
            .finish();

        let mut result = ElementAndChildren::single(Element {
            name: node.name.clone(),
            object: Object::new(identifier.clone(), content),
            sort_order: if folder_type {
                SortOrder::GroupLike
            } else {
                SortOrder::FileLike
            },
        });

        // Files inside an opaque folder resolve to the folder
        let mut paths = Vec::new();
        collect_paths(path, node, &mut paths);
        result
            .bazel_path_and_identifiers
            .extend(paths.into_iter().map(|p| (p, identifier.clone())));
        result.resolved_repositories.extend(resolved_repository);

        result
    }

    /// Create a plain group and everything below it.
    pub fn create_group(&mut self, path: &BazelPath, node: &PathTreeNode) -> ElementAndChildren {
        let (attributes, resolved_repository) =
            self.calculator.attributes(&node.name, path, true);
        let identifier = self.ids.element(path.as_str());

        let mut result = ElementAndChildren::default();
        let children = self.create_children(path, &node.children);
        let child_ids = children.identifiers();
        result.absorb(children);

        let content = Record::new("PBXGroup")
            .list("children", &child_ids)
            .field_opt("name", attributes.name.as_deref())
            .field("path", &attributes.path)
            .field("sourceTree", attributes.source_tree.as_str())
            .finish();

        result.elements.push(Element {
            name: node.name.clone(),
            object: Object::new(identifier.clone(), content),
            sort_order: SortOrder::GroupLike,
        });
        result
            .bazel_path_and_identifiers
            .push((path.clone(), identifier));
        result.resolved_repositories.extend(resolved_repository);

        result
    }

    /// Create a version group for an `.xcdatamodeld` bundle.
    pub fn create_version_group(
        &mut self,
        path: &BazelPath,
        node: &PathTreeNode,
    ) -> ElementAndChildren {
        let (attributes, resolved_repository) =
            self.calculator.attributes(&node.name, path, true);
        let identifier = self.ids.element(path.as_str());

        let mut result = ElementAndChildren::default();
        let mut versions = Vec::new();
        for child in &node.children {
            if extension(&child.name) != Some(MODEL_VERSION_EXTENSION) {
                continue;
            }
            let child_path = path.join(&child.name);
            versions.extend(result.absorb(self.create_file(&child_path, child)));
        }

        let current_version = match self.selected_model_versions.get(path) {
            Some(selected) => {
                let found = versions.iter().find(|v| &v.name == selected);
                if found.is_none() {
                    tracing::warn!("selected model version {} not found in {}", selected, path);
                    let location = self.calculator.directories().absolute_path(path);
                    result.warnings.push(
                        Diagnostic::warning(format!(
                            "selected model version `{}` is not part of `{}`",
                            selected, path
                        ))
                        .with_suggestion(suggestions::MISSING_MODEL_VERSION)
                        .with_location(location),
                    );
                }
                found.map(|v| v.identifier().to_string())
            }
            None => None,
        };

        let child_ids: Vec<String> = versions
            .iter()
            .map(|v| v.identifier().to_string())
            .collect();
        let content = Record::new("XCVersionGroup")
            .list("children", &child_ids)
            .field_opt("currentVersion", current_version.as_deref())
            .field_opt("name", attributes.name.as_deref())
            .field("path", &attributes.path)
            .field("sourceTree", attributes.source_tree.as_str())
            .field("versionGroupType", "wrapper.xcdatamodel")
            .finish();

        result.elements.push(Element {
            name: node.name.clone(),
            object: Object::new(identifier.clone(), content),
            sort_order: SortOrder::FileLike,
        });
        result
            .bazel_path_and_identifiers
            .push((path.clone(), identifier));
        result.resolved_repositories.extend(resolved_repository);

        result
    }

    /// Create the localized file references inside an lproj directory.
    fn create_localized_files(
        &mut self,
        lproj_path: &BazelPath,
        node: &PathTreeNode,
    ) -> Vec<LocalizedFile> {
        let region = lproj_region(&node.name).unwrap_or_default().to_string();

        let mut files = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let child_path = lproj_path.join(&child.name);
            let (attributes, _) = self.calculator.attributes(&child.name, &child_path, false);
            let path = match attributes.name {
                Some(_) => attributes.path,
                None => format!("{}/{}", node.name, child.name),
            };

            let is_folder = child.is_folder || child.is_directory();
            let identifier = self.ids.element(child_path.as_str());
            let record = Record::new("PBXFileReference");
            let record = match explicit_file_type(&child.name) {
                Some(file_type) => record.field("explicitFileType", file_type),
                None => record.field(
                    "lastKnownFileType",
                    last_known_file_type(&child.name, is_folder),
                ),
            };
            let content = record
                .field("name", &region)
                .field("path", &path)
                .field("sourceTree", attributes.source_tree.as_str())
                .finish();

            let mut bazel_paths = Vec::new();
            collect_paths(&child_path, child, &mut bazel_paths);

            files.push(LocalizedFile {
                element: Element {
                    name: region.clone(),
                    object: Object::new(identifier, content),
                    sort_order: SortOrder::FileLike,
                },
                region: region.clone(),
                name: child.name.clone(),
                bazel_paths,
            });
        }
        files
    }
}

/// Collect `path` and every path below it.
fn collect_paths(path: &BazelPath, node: &PathTreeNode, out: &mut Vec<BazelPath>) {
    out.push(path.clone());
    for child in &node.children {
        collect_paths(&path.join(&child.name), child, out);
    }
}
