//! Localized files and variant groups.
//!
//! Files inside `<region>.lproj` directories are not shown in their lproj
//! directory. Instead, each logical file becomes one variant group in the
//! directory containing the lproj directories, with one child per region.
//! `.strings` files join the variant group of an Interface Builder file with
//! the same base name when one exists.

use std::collections::{BTreeSet, HashMap};

use crate::core::bazel_path::BazelPath;
use crate::files::element::{Element, ElementAndChildren, SortOrder};
use crate::files::file_types::{extension, localized_extension_priority, stem, IB_EXTENSIONS};
use crate::pbxproj::identifiers::IdentifierCache;
use crate::pbxproj::writer::{Object, Record};

/// The region that is always listed last.
pub const BASE_REGION: &str = "Base";

/// Extension of localization directories.
pub const LPROJ_EXTENSION: &str = "lproj";

/// A file inside an lproj directory.
#[derive(Debug, Clone)]
pub struct LocalizedFile {
    /// The file element, named after its region
    pub element: Element,

    /// Region (the lproj directory name without extension)
    pub region: String,

    /// File name (e.g. `Main.storyboard`)
    pub name: String,

    /// Paths that map to the variant group
    pub bazel_paths: Vec<BazelPath>,
}

impl LocalizedFile {
    fn ext(&self) -> Option<&str> {
        extension(&self.name)
    }
}

/// The region of an lproj directory name, if it is one.
pub fn lproj_region(directory_name: &str) -> Option<&str> {
    match extension(directory_name) {
        Some(LPROJ_EXTENSION) => Some(stem(directory_name)),
        _ => None,
    }
}

/// Group localized files into variant groups.
pub fn create_variant_groups(
    parent_bazel_path: &BazelPath,
    mut files: Vec<LocalizedFile>,
    ids: &mut IdentifierCache,
) -> ElementAndChildren {
    files.sort_by(|a, b| {
        localized_extension_priority(b.ext())
            .cmp(&localized_extension_priority(a.ext()))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.region.cmp(&b.region))
    });

    let mut groupings: Vec<(String, Vec<LocalizedFile>)> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for file in files {
        let key = if file.ext() == Some("strings") {
            let base = stem(&file.name);
            IB_EXTENSIONS
                .iter()
                .map(|ext| format!("{}.{}", base, ext))
                .find(|candidate| index_by_key.contains_key(candidate))
                .unwrap_or_else(|| file.name.clone())
        } else {
            file.name.clone()
        };

        match index_by_key.get(&key) {
            Some(&idx) => groupings[idx].1.push(file),
            None => {
                index_by_key.insert(key.clone(), groupings.len());
                groupings.push((key, vec![file]));
            }
        }
    }

    let mut result = ElementAndChildren::default();
    for (name, files) in groupings {
        let identifier = ids.element(&format!("variant-group:{}", parent_bazel_path.join(&name)));

        let children: Vec<String> = files
            .iter()
            .map(|f| f.element.identifier().to_string())
            .collect();
        let content = Record::new("PBXVariantGroup")
            .list("children", &children)
            .field("name", &name)
            .field("sourceTree", "<group>")
            .finish();

        for file in files {
            result.known_regions.insert(file.region);
            result.transitive_objects.push(file.element.object);
            result.bazel_path_and_identifiers.extend(
                file.bazel_paths
                    .into_iter()
                    .map(|path| (path, identifier.clone())),
            );
        }

        result.elements.push(Element {
            name,
            object: Object::new(identifier, content),
            sort_order: SortOrder::FileLike,
        });
    }

    result
}

/// Order known regions for the project: alphabetical, with `Base` last.
pub fn ordered_regions(regions: &BTreeSet<String>) -> Vec<String> {
    let mut ordered: Vec<String> = regions
        .iter()
        .filter(|r| r.as_str() != BASE_REGION)
        .cloned()
        .collect();
    if regions.contains(BASE_REGION) {
        ordered.push(BASE_REGION.to_string());
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localized(region: &str, name: &str) -> LocalizedFile {
        let path = BazelPath::new(format!("App/{}.lproj/{}", region, name));
        LocalizedFile {
            element: Element {
                name: region.to_string(),
                object: Object::new(format!("ID-{}", path), ""),
                sort_order: SortOrder::FileLike,
            },
            region: region.to_string(),
            name: name.to_string(),
            bazel_paths: vec![path],
        }
    }

    fn children_of(group: &Element) -> Vec<String> {
        group
            .object
            .content
            .lines()
            .filter_map(|l| l.trim().strip_prefix("ID-"))
            .map(|l| l.trim_end_matches(',').to_string())
            .collect()
    }

    #[test]
    fn test_lproj_region() {
        assert_eq!(lproj_region("en.lproj"), Some("en"));
        assert_eq!(lproj_region("Base.lproj"), Some("Base"));
        assert_eq!(lproj_region("Views"), None);
    }

    #[test]
    fn test_strings_attach_to_storyboard() {
        let mut ids = IdentifierCache::new();
        let result = create_variant_groups(
            &BazelPath::new("App"),
            vec![
                localized("en", "Foo.strings"),
                localized("Base", "Foo.storyboard"),
            ],
            &mut ids,
        );

        assert_eq!(result.elements.len(), 1);
        let group = &result.elements[0];
        assert_eq!(group.name, "Foo.storyboard");
        assert_eq!(
            children_of(group),
            vec!["App/Base.lproj/Foo.storyboard", "App/en.lproj/Foo.strings"]
        );
        assert_eq!(ordered_regions(&result.known_regions), vec!["en", "Base"]);

        // Both localized paths map to the variant group
        assert_eq!(result.bazel_path_and_identifiers.len(), 2);
        assert!(result
            .bazel_path_and_identifiers
            .iter()
            .all(|(_, id)| id == group.identifier()));
        assert_eq!(result.transitive_objects.len(), 2);
    }

    #[test]
    fn test_strings_lookup_checks_all_ib_types() {
        let mut ids = IdentifierCache::new();
        let result = create_variant_groups(
            &BazelPath::new("App"),
            vec![
                localized("fr", "Intents.strings"),
                localized("Base", "Intents.intentdefinition"),
                localized("fr", "View.strings"),
                localized("Base", "View.xib"),
                localized("fr", "Other.strings"),
                localized("de", "Other.strings"),
            ],
            &mut ids,
        );

        let names: Vec<_> = result.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Intents.intentdefinition", "View.xib", "Other.strings"]
        );
        assert_eq!(
            children_of(&result.elements[2]),
            vec!["App/de.lproj/Other.strings", "App/fr.lproj/Other.strings"]
        );
        assert_eq!(
            ordered_regions(&result.known_regions),
            vec!["de", "fr", "Base"]
        );
    }

    #[test]
    fn test_unrelated_files_group_by_name() {
        let mut ids = IdentifierCache::new();
        let result = create_variant_groups(
            &BazelPath::new(""),
            vec![localized("en", "image.png"), localized("ja", "image.png")],
            &mut ids,
        );
        assert_eq!(result.elements.len(), 1);
        assert_eq!(result.elements[0].name, "image.png");
    }

    #[test]
    fn test_base_only_regions() {
        let regions: BTreeSet<String> = ["Base".to_string()].into_iter().collect();
        assert_eq!(ordered_regions(&regions), vec!["Base"]);
    }
}
