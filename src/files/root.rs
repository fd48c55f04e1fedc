//! Root element assembly.
//!
//! Walks the top level of the path tree. `external`, `..` and `bazel-out`
//! become special root groups anchored at their real location on disk;
//! everything else goes through the regular element creator. The special
//! groups and the internal tooling group are appended after the regular
//! children, in that order.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::bazel_path::{BazelPath, PathRegime};
use crate::core::error::PreconditionError;
use crate::core::path_tree::{build_path_tree, FilePath, PathTreeNode};
use crate::files::attributes::{AttributeCalculator, Directories, SymlinkResolver};
use crate::files::creator::ElementCreator;
use crate::files::element::{
    sort_resolved_repositories, Element, ElementAndChildren, ResolvedRepository, SortOrder,
    SourceTree,
};
use crate::pbxproj::identifiers::{
    IdentifierCache, BAZEL_EXTERNAL_REPOSITORIES, BAZEL_GENERATED, BAZEL_SIBLING_REPOSITORIES,
    COMPILE_STUB, INTERNAL_GROUP, MAIN_GROUP,
};
use crate::pbxproj::writer::{Object, Record};
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::relative_path;

/// Display name of both external repositories groups.
pub const EXTERNAL_REPOSITORIES_GROUP_NAME: &str = "Bazel External Repositories";

/// Display name of the generated files group.
pub const GENERATED_GROUP_NAME: &str = "Bazel Generated";

/// File name of the compile stub in the internal group.
pub const COMPILE_STUB_NAME: &str = "_CompileStub_.m";

/// Everything the file tree is computed from, besides the paths.
pub struct FileTreeContext<'a> {
    /// Absolute roots
    pub directories: &'a Directories,

    /// Symlink capability
    pub resolver: &'a dyn SymlinkResolver,

    /// Current version of each `.xcdatamodeld` bundle
    pub selected_model_versions: &'a BTreeMap<BazelPath, String>,

    /// Project-relative path of the internal tooling group
    pub internal_directory: &'a str,
}

/// The computed file tree.
#[derive(Debug, Clone)]
pub struct FileTree {
    /// The main group object
    pub main_group: Object,

    /// Identifiers of the main group's children, in display order
    pub main_group_children: Vec<String>,

    /// Every element object below the main group
    pub objects: Vec<Object>,

    /// Path to identifier lookup
    pub path_identifiers: BTreeMap<BazelPath, String>,

    /// Localization regions in use
    pub known_regions: BTreeSet<String>,

    /// Symlinked repositories, subdirectories first
    pub resolved_repositories: Vec<ResolvedRepository>,

    /// Problems found while creating the tree
    pub warnings: Vec<Diagnostic>,
}

impl FileTree {
    /// The identifier of the element for a path.
    pub fn identifier(&self, path: &str) -> Option<&str> {
        self.path_identifiers
            .get(&BazelPath::new(path))
            .map(String::as_str)
    }

    /// Look up an object's content by identifier.
    pub fn content(&self, identifier: &str) -> Option<&str> {
        if identifier == self.main_group.identifier {
            return Some(&self.main_group.content);
        }
        self.objects
            .iter()
            .find(|o| o.identifier == identifier)
            .map(|o| o.content.as_str())
    }
}

/// Create the project's file tree.
pub fn create_file_tree(
    paths: &[FilePath],
    ctx: &FileTreeContext<'_>,
    ids: &mut IdentifierCache,
) -> Result<FileTree, PreconditionError> {
    let tree = build_path_tree(paths)?;
    tracing::debug!("path tree has {} leaves", tree.leaf_count());

    let calculator = AttributeCalculator::new(ctx.directories, ctx.resolver);
    let mut creator = ElementCreator::new(calculator, ctx.selected_model_versions, ids);

    let (special, ordinary): (Vec<&PathTreeNode>, Vec<&PathTreeNode>) =
        tree.children.iter().partition(|node| {
            node.is_directory() && PathRegime::for_root_name(&node.name) != PathRegime::Plain
        });

    let mut root = creator.create_children(&BazelPath::new(""), ordinary);

    let mut specials = ElementAndChildren::default();
    for node in special {
        let group = match PathRegime::for_root_name(&node.name) {
            PathRegime::BazelGenerated => generated_group(&mut creator, node),
            regime => external_group(&mut creator, node, regime),
        };
        specials.merge(group);
    }
    specials.elements.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.identifier().cmp(b.identifier()))
    });
    root.merge(specials);
    root.merge(internal_group(ctx.internal_directory));

    let main_group_children = root.identifiers();
    let main_group = Object::new(
        MAIN_GROUP,
        Record::new("PBXGroup")
            .list("children", &main_group_children)
            .field("sourceTree", SourceTree::Group.as_str())
            .finish(),
    );

    let ElementAndChildren {
        elements,
        transitive_objects,
        bazel_path_and_identifiers,
        known_regions,
        mut resolved_repositories,
        warnings,
    } = root;

    let mut objects: Vec<Object> = elements.into_iter().map(|e| e.object).collect();
    objects.extend(transitive_objects);
    sort_resolved_repositories(&mut resolved_repositories);

    tracing::debug!(
        "created {} file tree objects, {} resolved repositories",
        objects.len(),
        resolved_repositories.len()
    );

    Ok(FileTree {
        main_group,
        main_group_children,
        objects,
        path_identifiers: bazel_path_and_identifiers.into_iter().collect(),
        known_regions,
        resolved_repositories,
        warnings,
    })
}

/// The `external` or `..` root group.
fn external_group(
    creator: &mut ElementCreator<'_>,
    node: &PathTreeNode,
    regime: PathRegime,
) -> ElementAndChildren {
    let directories = creator.calculator().directories();
    let (identifier, root_dir) = match regime {
        PathRegime::SiblingExternal => (BAZEL_SIBLING_REPOSITORIES, directories.sibling_root()),
        _ => (BAZEL_EXTERNAL_REPOSITORIES, directories.external_dir.clone()),
    };
    let path = relative_path(&directories.workspace, &root_dir);

    let bazel_path = BazelPath::new(&node.name);
    let children = creator.create_children(&bazel_path, &node.children);
    special_group(
        identifier,
        EXTERNAL_REPOSITORIES_GROUP_NAME,
        &path.to_string_lossy(),
        SortOrder::BazelExternalRepositories,
        vec![bazel_path],
        children,
    )
}

/// The `bazel-out` root group.
///
/// With a single configuration directory the group points at it directly and
/// its contents are shown flat. With several, each configuration becomes a
/// subgroup.
fn generated_group(creator: &mut ElementCreator<'_>, node: &PathTreeNode) -> ElementAndChildren {
    let directories = creator.calculator().directories();
    let bazel_out = directories.bazel_out();
    let workspace = directories.workspace.clone();
    let bazel_path = BazelPath::new(&node.name);

    match node.children.as_slice() {
        [config] if config.is_directory() => {
            tracing::debug!("single build configuration: {}", config.name);
            let config_path = bazel_path.join(&config.name);
            let path = relative_path(&workspace, &bazel_out.join(&config.name));
            let children = creator.create_children(&config_path, &config.children);
            special_group(
                BAZEL_GENERATED,
                GENERATED_GROUP_NAME,
                &path.to_string_lossy(),
                SortOrder::BazelGenerated,
                vec![bazel_path, config_path],
                children,
            )
        }
        _ => {
            let path = relative_path(&workspace, &bazel_out);
            let children = creator.create_children(&bazel_path, &node.children);
            special_group(
                BAZEL_GENERATED,
                GENERATED_GROUP_NAME,
                &path.to_string_lossy(),
                SortOrder::BazelGenerated,
                vec![bazel_path],
                children,
            )
        }
    }
}

fn special_group(
    identifier: &str,
    name: &str,
    path: &str,
    sort_order: SortOrder,
    bazel_paths: Vec<BazelPath>,
    children: ElementAndChildren,
) -> ElementAndChildren {
    let child_ids = children.identifiers();
    let mut result = ElementAndChildren::default();
    result.absorb(children);

    let content = Record::new("PBXGroup")
        .list("children", &child_ids)
        .field("name", name)
        .field("path", path)
        .field("sourceTree", SourceTree::SourceRoot.as_str())
        .finish();

    result.elements.push(Element {
        name: name.to_string(),
        object: Object::new(identifier, content),
        sort_order,
    });
    result.bazel_path_and_identifiers.extend(
        bazel_paths
            .into_iter()
            .map(|path| (path, identifier.to_string())),
    );
    result
}

/// The internal tooling group with its compile stub.
fn internal_group(internal_directory: &str) -> ElementAndChildren {
    let stub = Object::new(
        COMPILE_STUB,
        Record::new("PBXFileReference")
            .field("lastKnownFileType", "sourcecode.c.objc")
            .field("path", COMPILE_STUB_NAME)
            .field("sourceTree", SourceTree::Group.as_str())
            .finish(),
    );

    let content = Record::new("PBXGroup")
        .list("children", &[COMPILE_STUB.to_string()])
        .field("path", internal_directory)
        .field("sourceTree", SourceTree::SourceRoot.as_str())
        .finish();

    let mut result = ElementAndChildren::single(Element {
        name: internal_directory.to_string(),
        object: Object::new(INTERNAL_GROUP, content),
        sort_order: SortOrder::InternalTooling,
    });
    result.transitive_objects.push(stub);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeSymlinkResolver;

    struct Fixture {
        directories: Directories,
        resolver: FakeSymlinkResolver,
        selected: BTreeMap<BazelPath, String>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                directories: Directories::new("/ws", "/ob/execroot/_main").unwrap(),
                resolver: FakeSymlinkResolver::new(),
                selected: BTreeMap::new(),
            }
        }

        fn create(&self, paths: &[&str]) -> FileTree {
            let paths: Vec<FilePath> = paths.iter().map(|p| FilePath::file(*p)).collect();
            let ctx = FileTreeContext {
                directories: &self.directories,
                resolver: &self.resolver,
                selected_model_versions: &self.selected,
                internal_directory: "bazel_xcodeproj",
            };
            create_file_tree(&paths, &ctx, &mut IdentifierCache::new()).unwrap()
        }
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let fixture = Fixture::new();
        let ctx = FileTreeContext {
            directories: &fixture.directories,
            resolver: &fixture.resolver,
            selected_model_versions: &fixture.selected,
            internal_directory: "bazel_xcodeproj",
        };
        let result = create_file_tree(&[], &ctx, &mut IdentifierCache::new());
        assert!(matches!(result, Err(PreconditionError::EmptyFileSet)));
    }

    #[test]
    fn test_symlinked_external_repository() {
        let mut fixture = Fixture::new();
        fixture.resolver.add_symlink("/ob/external/Foo", "/real/Foo");
        let tree = fixture.create(&["external/Foo/a.swift", "external/Foo/b.swift"]);

        let external = tree.content(BAZEL_EXTERNAL_REPOSITORIES).unwrap();
        assert!(external.contains("name = \"Bazel External Repositories\";"));
        assert!(external.contains("path = ../ob/external;"));
        assert!(external.contains("sourceTree = SOURCE_ROOT;"));

        let foo_id = tree.identifier("external/Foo").unwrap();
        assert!(external.contains(foo_id));
        let foo = tree.content(foo_id).unwrap();
        assert!(foo.contains("name = Foo;"));
        assert!(foo.contains("path = /real/Foo;"));
        assert!(foo.contains("sourceTree = \"<absolute>\";"));

        assert_eq!(
            tree.resolved_repositories,
            vec![ResolvedRepository::new("./external/Foo", "/real/Foo")]
        );
        assert!(tree.identifier("external/Foo/a.swift").is_some());
        assert_eq!(tree.identifier("external"), Some(BAZEL_EXTERNAL_REPOSITORIES));
    }

    #[test]
    fn test_special_groups_come_last() {
        let tree = Fixture::new().create(&[
            "Zeta/a.swift",
            "external/Foo/a.swift",
            "bazel-out/cfg/bin/g.swift",
            "../Bar/b.swift",
            "App/b.swift",
            "README.md",
        ]);

        let expected = vec![
            tree.identifier("App").unwrap(),
            tree.identifier("Zeta").unwrap(),
            tree.identifier("README.md").unwrap(),
            BAZEL_EXTERNAL_REPOSITORIES,
            BAZEL_SIBLING_REPOSITORIES,
            BAZEL_GENERATED,
            INTERNAL_GROUP,
        ];
        assert_eq!(tree.main_group_children, expected);
        assert_eq!(tree.main_group.identifier, MAIN_GROUP);

        let sibling = tree.content(BAZEL_SIBLING_REPOSITORIES).unwrap();
        assert!(sibling.contains("path = ../ob/execroot;"));
    }

    #[test]
    fn test_single_build_configuration_is_flat() {
        let tree = Fixture::new().create(&[
            "bazel-out/ios-dbg/bin/App/gen.swift",
            "bazel-out/ios-dbg/bin/App/other.swift",
        ]);

        let generated = tree.content(BAZEL_GENERATED).unwrap();
        assert!(generated.contains("name = \"Bazel Generated\";"));
        assert!(generated.contains("path = ../ob/execroot/_main/bazel-out/ios-dbg;"));

        let bin = tree.identifier("bazel-out/ios-dbg/bin").unwrap();
        assert!(generated.contains(bin));
        assert_eq!(tree.identifier("bazel-out/ios-dbg"), Some(BAZEL_GENERATED));
    }

    #[test]
    fn test_multiple_build_configurations_are_nested() {
        let tree = Fixture::new().create(&[
            "bazel-out/ios-dbg/bin/gen.swift",
            "bazel-out/sim-dbg/bin/gen.swift",
        ]);

        let generated = tree.content(BAZEL_GENERATED).unwrap();
        assert!(generated.contains("path = ../ob/execroot/_main/bazel-out;"));

        let ios = tree.identifier("bazel-out/ios-dbg").unwrap();
        let sim = tree.identifier("bazel-out/sim-dbg").unwrap();
        assert_ne!(ios, sim);
        assert!(generated.contains(ios));
        assert!(generated.contains(sim));
        assert!(tree
            .content(ios)
            .unwrap()
            .contains("path = ios-dbg;"));
    }

    #[test]
    fn test_internal_group_is_always_present() {
        let tree = Fixture::new().create(&["main.swift"]);
        assert_eq!(tree.main_group_children.last().map(String::as_str), Some(INTERNAL_GROUP));

        let internal = tree.content(INTERNAL_GROUP).unwrap();
        assert!(internal.contains("path = bazel_xcodeproj;"));
        assert!(internal.contains(COMPILE_STUB));
        assert!(tree
            .content(COMPILE_STUB)
            .unwrap()
            .contains("path = _CompileStub_.m;"));
    }

    #[test]
    fn test_root_level_file_named_external_is_ordinary() {
        let tree = Fixture::new().create(&["external", "main.swift"]);
        assert!(tree.content(BAZEL_EXTERNAL_REPOSITORIES).is_none());
        assert!(tree.identifier("external").is_some());
    }

    #[test]
    fn test_known_regions_are_collected() {
        let tree = Fixture::new().create(&[
            "App/Base.lproj/Main.storyboard",
            "App/fr.lproj/Main.strings",
            "external/Lib/de.lproj/L.strings",
        ]);
        let regions: Vec<&str> = tree.known_regions.iter().map(String::as_str).collect();
        assert_eq!(regions, vec!["Base", "de", "fr"]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let paths = [
            "App/a.swift",
            "App/en.lproj/Main.strings",
            "external/Foo/x.c",
            "bazel-out/cfg/bin/y.swift",
        ];
        let first = Fixture::new().create(&paths);
        let second = Fixture::new().create(&paths);
        assert_eq!(first.path_identifiers, second.path_identifiers);
        assert_eq!(first.objects, second.objects);
        assert_eq!(first.main_group, second.main_group);
    }
}
