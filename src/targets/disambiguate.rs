//! Target name disambiguation.
//!
//! Every consolidated target gets a display name that is unique in the
//! project. Names are chosen from the most readable tier that is unique for
//! the target's label: module name, then target name (both paired with the
//! product type), then the full label. Targets that still share a name get a
//! parenthesized suffix made of only the details that tell them apart.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::platform::{Environment, Os};
use crate::core::product::ProductType;
use crate::core::target::BazelLabel;
use crate::targets::consolidate::{ConsolidatedTarget, ConsolidationKey};
use crate::util::hash::configurations_hash;

/// A consolidated target with its final name.
#[derive(Debug, Clone)]
pub struct DisambiguatedTarget {
    pub name: String,
    pub target: ConsolidatedTarget,
}

/// The naming tier a target's base name came from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameTier {
    ModuleName(String, ProductType),
    TargetName(String, ProductType),
    Label(BazelLabel),
}

impl NameTier {
    /// The base name for this tier.
    pub fn base_name(&self) -> &str {
        match self {
            NameTier::ModuleName(name, _) | NameTier::TargetName(name, _) => name,
            NameTier::Label(label) => label.as_str(),
        }
    }
}

/// Name every consolidated target.
///
/// The result is in key order.
pub fn disambiguate_targets(
    targets: BTreeMap<ConsolidationKey, ConsolidatedTarget>,
) -> Vec<DisambiguatedTarget> {
    let mut module_labels: BTreeMap<(&str, ProductType), BTreeSet<&BazelLabel>> = BTreeMap::new();
    let mut name_labels: BTreeMap<(&str, ProductType), BTreeSet<&BazelLabel>> = BTreeMap::new();
    for target in targets.values() {
        if let Some(module_name) = target.module_name() {
            module_labels
                .entry((module_name, target.product_type()))
                .or_default()
                .insert(target.label());
        }
        name_labels
            .entry((target.name(), target.product_type()))
            .or_default()
            .insert(target.label());
    }

    let consolidated: Vec<&ConsolidatedTarget> = targets.values().collect();
    let mut tiers: Vec<NameTier> = consolidated
        .iter()
        .map(|target| {
            let product_type = target.product_type();
            if let Some(module_name) = target.module_name() {
                if module_labels[&(module_name, product_type)].len() == 1 {
                    return NameTier::ModuleName(module_name.to_string(), product_type);
                }
            }
            target_name_tier(target, &name_labels)
        })
        .collect();

    // A module name can equal another target's name. Those targets share a
    // display name across tiers, so the more readable tier gives way.
    loop {
        let groups = name_groups(&tiers, &consolidated);
        let mut demoted = false;
        for members in groups.values() {
            let labels: BTreeSet<&BazelLabel> =
                members.iter().map(|&i| consolidated[i].label()).collect();
            if labels.len() < 2 {
                continue;
            }
            let Some(first) = members.iter().map(|&i| tier_rank(&tiers[i])).min() else {
                continue;
            };
            for &idx in members {
                if tier_rank(&tiers[idx]) != first {
                    continue;
                }
                let next = match tiers[idx] {
                    NameTier::ModuleName(..) => target_name_tier(consolidated[idx], &name_labels),
                    _ => NameTier::Label(consolidated[idx].label().clone()),
                };
                if next != tiers[idx] {
                    tiers[idx] = next;
                    demoted = true;
                }
            }
        }
        if !demoted {
            break;
        }
    }

    let mut names: Vec<String> = tiers.iter().map(|t| t.base_name().to_string()).collect();
    for ((base_name, _), members) in &name_groups(&tiers, &consolidated) {
        if members.len() < 2 {
            continue;
        }
        let colliding: Vec<&ConsolidatedTarget> = members.iter().map(|&i| consolidated[i]).collect();
        tracing::debug!("{} targets share the name `{}`", colliding.len(), base_name);
        for (&idx, suffix) in members.iter().zip(distinguishers(&colliding)) {
            names[idx] = format!("{} ({})", base_name, suffix);
        }
    }

    names
        .into_iter()
        .zip(targets.into_values())
        .map(|(name, target)| DisambiguatedTarget { name, target })
        .collect()
}

fn target_name_tier(
    target: &ConsolidatedTarget,
    name_labels: &BTreeMap<(&str, ProductType), BTreeSet<&BazelLabel>>,
) -> NameTier {
    let product_type = target.product_type();
    if name_labels[&(target.name(), product_type)].len() == 1 {
        NameTier::TargetName(target.name().to_string(), product_type)
    } else {
        NameTier::Label(target.label().clone())
    }
}

fn tier_rank(tier: &NameTier) -> u8 {
    match tier {
        NameTier::ModuleName(..) => 0,
        NameTier::TargetName(..) => 1,
        NameTier::Label(_) => 2,
    }
}

/// Target indices by display name and product type.
fn name_groups(
    tiers: &[NameTier],
    targets: &[&ConsolidatedTarget],
) -> BTreeMap<(String, ProductType), Vec<usize>> {
    let mut groups: BTreeMap<(String, ProductType), Vec<usize>> = BTreeMap::new();
    for (idx, (tier, target)) in tiers.iter().zip(targets).enumerate() {
        groups
            .entry((tier.base_name().to_string(), target.product_type()))
            .or_default()
            .push(idx);
    }
    groups
}

/// Compute a suffix for each of the colliding targets.
///
/// Details are added one kind at a time, and only kinds that differ within the
/// set are used. Adding stops as soon as every suffix is unique.
fn distinguishers(targets: &[&ConsolidatedTarget]) -> Vec<String> {
    let mut parts: Vec<Vec<String>> = vec![Vec::new(); targets.len()];

    let steps: [fn(&[&ConsolidatedTarget]) -> Option<Vec<String>>; 5] = [
        product_type_parts,
        os_parts,
        environment_parts,
        arch_parts,
        xcode_configuration_parts,
    ];
    for step in steps {
        if all_unique(&parts) {
            break;
        }
        if let Some(step_parts) = step(targets) {
            for (target_parts, part) in parts.iter_mut().zip(step_parts) {
                if !part.is_empty() {
                    target_parts.push(part);
                }
            }
        }
    }

    if !all_unique(&parts) {
        let counts = counts(&parts);
        for (target_parts, target) in parts.iter_mut().zip(targets) {
            if counts[&*target_parts] > 1 {
                target_parts.push(configurations_hash(target.configurations()));
            }
        }
    }

    parts.into_iter().map(|p| p.join(", ")).collect()
}

fn counts(parts: &[Vec<String>]) -> BTreeMap<Vec<String>, usize> {
    let mut counts = BTreeMap::new();
    for p in parts {
        *counts.entry(p.clone()).or_insert(0) += 1;
    }
    counts
}

fn all_unique(parts: &[Vec<String>]) -> bool {
    counts(parts).values().all(|&c| c == 1)
}

/// Use `describe` for every target if the descriptions differ.
fn parts_if_varying<T: Ord>(
    targets: &[&ConsolidatedTarget],
    describe: impl Fn(&ConsolidatedTarget) -> T,
    render: impl Fn(&T) -> String,
) -> Option<Vec<String>> {
    let described: Vec<T> = targets.iter().map(|t| describe(t)).collect();
    let distinct: BTreeSet<&T> = described.iter().collect();
    if distinct.len() < 2 {
        return None;
    }
    Some(described.iter().map(render).collect())
}

fn product_type_parts(targets: &[&ConsolidatedTarget]) -> Option<Vec<String>> {
    parts_if_varying(
        targets,
        |t| t.product_type(),
        |product_type| product_type.pretty_name().to_string(),
    )
}

/// OS names, each with its minimum versions when that OS is built for more
/// than one minimum version within the set.
fn os_parts(targets: &[&ConsolidatedTarget]) -> Option<Vec<String>> {
    let mut versions: BTreeMap<Os, BTreeSet<&str>> = BTreeMap::new();
    for target in targets {
        for platform in target.platforms() {
            versions
                .entry(platform.os)
                .or_default()
                .insert(platform.minimum_os_version.as_str());
        }
    }

    let describe = |target: &ConsolidatedTarget| -> BTreeMap<Os, BTreeSet<String>> {
        let mut described: BTreeMap<Os, BTreeSet<String>> = BTreeMap::new();
        for platform in target.platforms() {
            let entry = described.entry(platform.os).or_default();
            if versions[&platform.os].len() > 1 {
                entry.insert(platform.minimum_os_version.clone());
            }
        }
        described
    };

    parts_if_varying(targets, describe, |described| {
        described
            .iter()
            .map(|(os, versions)| {
                if versions.is_empty() {
                    os.display_name().to_string()
                } else {
                    let versions: Vec<&str> = versions.iter().map(String::as_str).collect();
                    format!("{} {}", os.display_name(), versions.join("/"))
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    })
}

fn environment_parts(targets: &[&ConsolidatedTarget]) -> Option<Vec<String>> {
    parts_if_varying(
        targets,
        |t| {
            t.platforms()
                .filter(|p| p.has_environment())
                .map(|p| p.environment)
                .collect::<BTreeSet<Environment>>()
        },
        |environments| {
            environments
                .iter()
                .map(|e| e.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        },
    )
}

fn arch_parts(targets: &[&ConsolidatedTarget]) -> Option<Vec<String>> {
    parts_if_varying(
        targets,
        |t| {
            t.platforms()
                .map(|p| p.arch.clone())
                .collect::<BTreeSet<String>>()
        },
        |archs| archs.iter().cloned().collect::<Vec<_>>().join(", "),
    )
}

fn xcode_configuration_parts(targets: &[&ConsolidatedTarget]) -> Option<Vec<String>> {
    parts_if_varying(
        targets,
        |t| t.xcode_configurations.clone(),
        |configurations| configurations.iter().cloned().collect::<Vec<_>>().join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bazel_path::BazelPath;
    use crate::core::platform::Environment;
    use crate::core::target::{TargetId, Targets};
    use crate::targets::consolidate::consolidate_targets;
    use crate::test_support::fixtures::{app, ios_device, ios_simulator, library, macos, platform, target};

    fn names(targets: Targets) -> Vec<String> {
        let consolidation = consolidate_targets(&targets, &BTreeMap::<BazelPath, String>::new()).unwrap();
        let mut names: Vec<String> = disambiguate_targets(consolidation.targets)
            .into_iter()
            .map(|t| t.name)
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_unique_names_have_no_suffix() {
        let targets = Targets::from([
            (TargetId::new("a"), app("//app:App", "a", ios_simulator())),
            (TargetId::new("b"), library("//lib:Lib", "b", ios_simulator())),
        ]);
        assert_eq!(names(targets), vec!["App", "Lib"]);
    }

    #[test]
    fn test_module_name_with_distinct_product_types() {
        let targets = Targets::from([
            (
                TargetId::new("a"),
                target("//a:Core", "a", ios_simulator(), ProductType::StaticLibrary)
                    .with_module_name("Core"),
            ),
            (
                TargetId::new("b"),
                target("//b:CoreFramework", "b", ios_simulator(), ProductType::Framework)
                    .with_module_name("Core"),
            ),
            (
                TargetId::new("c"),
                target("//c:CoreTests", "c", ios_simulator(), ProductType::UnitTestBundle)
                    .with_module_name("Core"),
            ),
        ]);
        assert_eq!(names(targets), vec!["Core", "Core", "Core"]);
    }

    #[test]
    fn test_module_name_collision_falls_back_to_target_name() {
        let targets = Targets::from([
            (
                TargetId::new("a"),
                library("//a:Utils", "a", ios_simulator()).with_module_name("Shared"),
            ),
            (
                TargetId::new("b"),
                library("//b:Helpers", "b", ios_simulator()).with_module_name("Shared"),
            ),
        ]);
        assert_eq!(names(targets), vec!["Helpers", "Utils"]);
    }

    #[test]
    fn test_name_collision_falls_back_to_label() {
        let targets = Targets::from([
            (TargetId::new("a"), app("//a:App", "a", ios_simulator())),
            (TargetId::new("b"), app("//b:App", "b", ios_simulator())),
        ]);
        assert_eq!(names(targets), vec!["//a:App", "//b:App"]);
    }

    #[test]
    fn test_split_variants_get_environment_suffix() {
        let targets = Targets::from([
            (
                TargetId::new("sim"),
                app("//app:App", "sim", ios_simulator()).with_dependencies(["x"]),
            ),
            (
                TargetId::new("dev"),
                app("//app:App", "dev", ios_device()).with_dependencies(["y"]),
            ),
        ]);
        assert_eq!(names(targets), vec!["App (Device)", "App (Simulator)"]);
    }

    #[test]
    fn test_os_suffix_only_when_needed() {
        let targets = Targets::from([
            (
                TargetId::new("ios"),
                app("//app:App", "ios", ios_simulator()).with_dependencies(["x"]),
            ),
            (
                TargetId::new("mac"),
                app("//app:App", "mac", macos()).with_dependencies(["y"]),
            ),
        ]);
        assert_eq!(names(targets), vec!["App (iOS)", "App (macOS)"]);
    }

    #[test]
    fn test_minimum_version_suffix() {
        let targets = Targets::from([
            (
                TargetId::new("old"),
                app("//app:App", "old", platform(Os::Ios, Environment::Simulator, "arm64", "14.0")),
            ),
            (
                TargetId::new("new"),
                app("//app:App", "new", platform(Os::Ios, Environment::Simulator, "arm64", "16.0")),
            ),
        ]);
        assert_eq!(names(targets), vec!["App (iOS 14.0)", "App (iOS 16.0)"]);
    }

    #[test]
    fn test_module_name_equal_to_other_target_name() {
        let targets = Targets::from([
            (
                TargetId::new("a"),
                library("//a:Core", "a", ios_simulator()).with_module_name("Lib"),
            ),
            (
                TargetId::new("b"),
                target("//b:Lib", "b", ios_simulator(), ProductType::StaticLibrary),
            ),
        ]);
        assert_eq!(names(targets), vec!["Core", "Lib"]);
    }

    #[test]
    fn test_empty_environment_adds_no_part() {
        let targets = Targets::from([
            (
                TargetId::new("dev"),
                app("//app:App", "dev", ios_device()).with_dependencies(["x"]),
            ),
            (
                TargetId::new("sim"),
                app("//app:App", "sim", ios_simulator()).with_dependencies(["y"]),
            ),
            (
                TargetId::new("mac"),
                app("//app:App", "mac", macos()).with_dependencies(["z"]),
            ),
        ]);
        assert_eq!(
            names(targets),
            vec!["App (iOS, Device)", "App (iOS, Simulator)", "App (macOS)"]
        );
    }

    #[test]
    fn test_identical_variants_fall_back_to_hash() {
        let targets = Targets::from([
            (
                TargetId::new("one"),
                app("//app:App", "config-one", ios_simulator()).with_dependencies(["x"]),
            ),
            (
                TargetId::new("two"),
                app("//app:App", "config-two", ios_simulator())
                    .with_dependencies(["y"])
                    .with_xcode_configurations(["Release"]),
            ),
            (
                TargetId::new("three"),
                app("//app:App", "config-three", ios_simulator()).with_dependencies(["z"]),
            ),
        ]);

        let names = names(targets);
        assert!(names.contains(&"App (Release)".to_string()));
        let hashed: Vec<&String> = names.iter().filter(|n| n.starts_with("App (Debug, ")).collect();
        assert_eq!(hashed.len(), 2);
        assert_ne!(hashed[0], hashed[1]);
        assert!(hashed.iter().all(|n| n.len() == "App (Debug, 12345)".len()));
    }
}
