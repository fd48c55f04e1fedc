//! Target consolidation.
//!
//! A Bazel label is usually built for several platforms. Variants of the same
//! label and product type become one Xcode target when Xcode can tell them
//! apart through build setting conditions alone, and when they agree on every
//! target they depend on. Xcode has no per-configuration dependency edges, so
//! variants with divergent dependencies must stay separate targets.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::core::bazel_path::BazelPath;
use crate::core::error::PreconditionError;
use crate::core::platform::Platform;
use crate::core::product::{Product, ProductType};
use crate::core::target::{BazelLabel, Relation, Target, TargetId, Targets};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// The set of target variants merged into one Xcode target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConsolidationKey(BTreeSet<TargetId>);

impl ConsolidationKey {
    /// Create a key.
    pub fn new(ids: impl IntoIterator<Item = TargetId>) -> Self {
        ConsolidationKey(ids.into_iter().collect())
    }

    /// The variant ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &TargetId> {
        self.0.iter()
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the key has no variants.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if a variant is part of this key.
    pub fn contains(&self, id: &TargetId) -> bool {
        self.0.contains(id)
    }
}

impl fmt::Display for ConsolidationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.0.iter().map(TargetId::as_str).collect();
        write!(f, "[{}]", ids.join(", "))
    }
}

/// Files of all variants, merged.
///
/// Files every variant has come first, in the order the first variant lists
/// them, followed by the remaining files of each variant in platform order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidatedInputs {
    pub srcs: Vec<String>,
    pub non_arc_srcs: Vec<String>,
    pub hdrs: Vec<String>,
    pub resources: Vec<String>,
}

/// One Xcode target and the variants behind it.
#[derive(Debug, Clone)]
pub struct ConsolidatedTarget {
    /// Variant ids
    pub key: ConsolidationKey,

    /// Variants, sorted by platform
    pub targets: Vec<(TargetId, Target)>,

    /// Merged inputs
    pub inputs: ConsolidatedInputs,

    /// Compiled files only some variants have, per variant
    pub unique_files: BTreeMap<TargetId, BTreeSet<String>>,

    /// Union of the variants' Xcode configurations
    pub xcode_configurations: BTreeSet<String>,
}

impl ConsolidatedTarget {
    /// Gather the variants of `key` from `all`.
    ///
    /// Files listed in `xcode_generated_files` are never unique to a variant.
    pub fn new(
        key: ConsolidationKey,
        all: &Targets,
        xcode_generated_files: &BTreeMap<BazelPath, String>,
    ) -> Result<Self, PreconditionError> {
        if key.is_empty() {
            return Err(PreconditionError::EmptyConsolidationKey);
        }

        let mut targets = Vec::with_capacity(key.len());
        for id in key.ids() {
            let target = all
                .get(id)
                .ok_or_else(|| PreconditionError::MissingTarget { id: id.clone() })?;
            targets.push((id.clone(), target.clone()));
        }
        targets.sort_by(|a, b| a.1.platform.cmp(&b.1.platform).then_with(|| a.0.cmp(&b.0)));

        let inputs = ConsolidatedInputs {
            srcs: merge_files(targets.iter().map(|(_, t)| t.inputs.srcs.as_slice())),
            non_arc_srcs: merge_files(targets.iter().map(|(_, t)| t.inputs.non_arc_srcs.as_slice())),
            hdrs: merge_files(targets.iter().map(|(_, t)| t.inputs.hdrs.as_slice())),
            resources: merge_files(targets.iter().map(|(_, t)| t.inputs.resources.as_slice())),
        };

        let compiled: Vec<BTreeSet<&str>> = targets
            .iter()
            .map(|(_, t)| t.inputs.compiled().map(String::as_str).collect())
            .collect();
        let common = intersection(&compiled);
        let unique_files: BTreeMap<TargetId, BTreeSet<String>> = targets
            .iter()
            .zip(&compiled)
            .map(|((id, _), files)| {
                let unique: BTreeSet<String> = files
                    .iter()
                    .filter(|f| !common.contains(*f))
                    .filter(|f| !xcode_generated_files.contains_key(&BazelPath::new(f)))
                    .map(|f| f.to_string())
                    .collect();
                (id.clone(), unique)
            })
            .collect();

        let xcode_configurations = targets
            .iter()
            .flat_map(|(_, t)| t.xcode_configurations.iter().cloned())
            .collect();

        Ok(ConsolidatedTarget {
            key,
            targets,
            inputs,
            unique_files,
            xcode_configurations,
        })
    }

    fn first(&self) -> &Target {
        // `new` rejects empty keys
        &self.targets[0].1
    }

    /// The shared label.
    pub fn label(&self) -> &BazelLabel {
        &self.first().label
    }

    /// The target name (name part of the label).
    pub fn name(&self) -> &str {
        self.first().name()
    }

    /// The module name of the first variant.
    pub fn module_name(&self) -> Option<&str> {
        self.first().module_name.as_deref()
    }

    /// The product of the first variant.
    pub fn product(&self) -> &Product {
        &self.first().product
    }

    /// The shared product type.
    pub fn product_type(&self) -> ProductType {
        self.first().product_type()
    }

    /// Platforms of all variants, in order.
    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.targets.iter().map(|(_, t)| &t.platform)
    }

    /// Bazel configuration names of all variants, sorted and deduplicated.
    pub fn configurations(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .targets
            .iter()
            .map(|(_, t)| t.configuration.as_str())
            .collect();
        set.into_iter().collect()
    }
}

/// Result of consolidating all targets.
#[derive(Debug, Clone, Default)]
pub struct Consolidation {
    /// Consolidated targets by key
    pub targets: BTreeMap<ConsolidationKey, ConsolidatedTarget>,

    /// Key of each variant
    pub keys: BTreeMap<TargetId, ConsolidationKey>,

    /// Recoverable problems found while consolidating
    pub warnings: Vec<Diagnostic>,
}

/// Consolidate target variants into Xcode targets.
pub fn consolidate_targets(
    targets: &Targets,
    xcode_generated_files: &BTreeMap<BazelPath, String>,
) -> Result<Consolidation, PreconditionError> {
    let mut candidates = Candidates::new(candidate_groups(targets));
    let rejected = candidates.reject_divergent(targets);

    let mut warnings = Vec::new();
    if !rejected.is_empty() {
        let mut diagnostic = Diagnostic::warning(format!(
            "{} target{} could not be consolidated because {} variants have different dependencies",
            rejected.len(),
            if rejected.len() == 1 { "" } else { "s" },
            if rejected.len() == 1 { "its" } else { "their" },
        ));
        for group in &rejected {
            let label = group
                .iter()
                .next()
                .and_then(|id| targets.get(id))
                .map(|t| t.label.to_string())
                .unwrap_or_default();
            let singletons: Vec<String> = group.iter().map(|id| format!("[{}]", id)).collect();
            diagnostic = diagnostic.with_context(format!("{}: {}", label, singletons.join(", ")));
        }
        diagnostic = diagnostic.with_suggestion(suggestions::DIVERGENT_DEPENDENCIES);
        tracing::warn!("{}", diagnostic.message);
        warnings.push(diagnostic);
    }

    let mut consolidation = Consolidation {
        warnings,
        ..Default::default()
    };
    for group in candidates.into_groups() {
        let key = ConsolidationKey(group);
        for id in key.ids() {
            consolidation.keys.insert(id.clone(), key.clone());
        }
        let target = ConsolidatedTarget::new(key.clone(), targets, xcode_generated_files)?;
        consolidation.targets.insert(key, target);
    }

    tracing::debug!(
        "consolidated {} targets into {}",
        targets.len(),
        consolidation.targets.len()
    );

    Ok(consolidation)
}

/// Group variants by label and product type, then split each group so no two
/// members could be selected by the same build setting condition.
fn candidate_groups(targets: &Targets) -> Vec<BTreeSet<TargetId>> {
    let mut by_label: BTreeMap<(&BazelLabel, ProductType), Vec<(&TargetId, &Target)>> =
        BTreeMap::new();
    for (id, target) in targets {
        by_label
            .entry((&target.label, target.product_type()))
            .or_default()
            .push((id, target));
    }

    let mut groups = Vec::new();
    for (_, mut members) in by_label {
        members.sort_by(|a, b| a.1.platform.cmp(&b.1.platform).then_with(|| a.0.cmp(b.0)));

        let mut buckets: Vec<Vec<(&TargetId, &Target)>> = Vec::new();
        for member in members {
            let slot = buckets
                .iter()
                .position(|bucket| bucket.iter().all(|other| can_share(member.1, other.1)));
            match slot {
                Some(idx) => buckets[idx].push(member),
                None => buckets.push(vec![member]),
            }
        }

        groups.extend(
            buckets
                .into_iter()
                .map(|bucket| bucket.into_iter().map(|(id, _)| id.clone()).collect()),
        );
    }
    groups
}

/// Whether two variants can be part of the same Xcode target.
///
/// Conditions select on SDK and architecture, so variants sharing both need
/// disjoint Xcode configurations. An empty configuration set means "all".
fn can_share(a: &Target, b: &Target) -> bool {
    let same_platform = a.platform.os == b.platform.os
        && a.platform.environment == b.platform.environment
        && a.platform.arch == b.platform.arch;
    let configurations_overlap = a.xcode_configurations.is_empty()
        || b.xcode_configurations.is_empty()
        || !a.xcode_configurations.is_disjoint(&b.xcode_configurations);
    !(same_platform && configurations_overlap)
}

/// Where a dependency edge points, in terms of candidates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum DependencyKey<'a> {
    Candidate(usize),
    Unknown(&'a TargetId),
}

/// Candidate groups plus a reverse-dependency graph for cascading rejections.
struct Candidates {
    groups: Vec<BTreeSet<TargetId>>,
    owner: HashMap<TargetId, usize>,
}

impl Candidates {
    fn new(groups: Vec<BTreeSet<TargetId>>) -> Self {
        let mut owner = HashMap::new();
        for (idx, group) in groups.iter().enumerate() {
            for id in group {
                owner.insert(id.clone(), idx);
            }
        }
        Candidates { groups, owner }
    }

    /// Split every multi-variant candidate whose variants disagree on their
    /// dependencies, cascading to candidates that depend on split ones.
    ///
    /// Returns the rejected groupings in the order they were rejected.
    fn reject_divergent(&mut self, targets: &Targets) -> Vec<BTreeSet<TargetId>> {
        let mut graph: DiGraph<&TargetId, Relation> = DiGraph::new();
        let mut nodes: HashMap<&TargetId, NodeIndex> = HashMap::new();
        for id in targets.keys() {
            nodes.insert(id, graph.add_node(id));
        }
        for (id, target) in targets {
            for (relation, dep) in target.related_targets() {
                if let Some(&to) = nodes.get(dep) {
                    graph.add_edge(nodes[id], to, relation);
                }
            }
        }

        let mut queue: VecDeque<usize> = (0..self.groups.len())
            .filter(|&idx| self.groups[idx].len() > 1)
            .collect();
        let mut queued: HashSet<usize> = queue.iter().copied().collect();
        let mut rejected = Vec::new();

        while let Some(idx) = queue.pop_front() {
            queued.remove(&idx);
            if self.groups[idx].len() < 2 || self.dependencies_agree(idx, targets) {
                continue;
            }

            let members = std::mem::take(&mut self.groups[idx]);
            let label = members
                .iter()
                .next()
                .and_then(|id| targets.get(id))
                .map(|t| t.label.to_string())
                .unwrap_or_default();
            tracing::debug!("splitting {} variants of {}", members.len(), label);
            for id in &members {
                self.owner.insert(id.clone(), self.groups.len());
                self.groups.push(BTreeSet::from([id.clone()]));
            }

            for id in &members {
                for dependent in graph.neighbors_directed(nodes[id], petgraph::Direction::Incoming) {
                    let owner = self.owner[graph[dependent]];
                    if self.groups[owner].len() > 1 && queued.insert(owner) {
                        queue.push_back(owner);
                    }
                }
            }

            rejected.push(members);
        }

        rejected
    }

    fn dependencies_agree(&self, idx: usize, targets: &Targets) -> bool {
        let mut signatures = self.groups[idx].iter().filter_map(|id| targets.get(id)).map(|target| {
            target
                .related_targets()
                .map(|(relation, dep)| {
                    let key = match self.owner.get(dep) {
                        Some(&owner) => DependencyKey::Candidate(owner),
                        None => DependencyKey::Unknown(dep),
                    };
                    (relation, key)
                })
                .collect::<BTreeSet<_>>()
        });

        match signatures.next() {
            Some(first) => signatures.all(|signature| signature == first),
            None => true,
        }
    }

    fn into_groups(self) -> impl Iterator<Item = BTreeSet<TargetId>> {
        self.groups.into_iter().filter(|g| !g.is_empty())
    }
}

fn merge_files<'a>(lists: impl Iterator<Item = &'a [String]>) -> Vec<String> {
    let lists: Vec<&[String]> = lists.collect();
    let sets: Vec<BTreeSet<&str>> = lists
        .iter()
        .map(|list| list.iter().map(String::as_str).collect())
        .collect();
    let common = intersection(&sets);

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    if let Some(first) = lists.first() {
        for file in first.iter() {
            if common.contains(file.as_str()) && seen.insert(file.as_str()) {
                merged.push(file.clone());
            }
        }
    }
    for list in &lists {
        for file in list.iter() {
            if seen.insert(file.as_str()) {
                merged.push(file.clone());
            }
        }
    }
    merged
}

fn intersection<'a>(sets: &[BTreeSet<&'a str>]) -> BTreeSet<&'a str> {
    let mut iter = sets.iter();
    let Some(first) = iter.next() else {
        return BTreeSet::new();
    };
    iter.fold(first.clone(), |acc, set| acc.intersection(set).copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::{Environment, Os};
    use crate::test_support::fixtures::{app, ios_device, ios_simulator, library, platform};

    fn no_generated() -> BTreeMap<BazelPath, String> {
        BTreeMap::new()
    }

    fn keys(consolidation: &Consolidation) -> Vec<Vec<&str>> {
        consolidation
            .targets
            .keys()
            .map(|k| k.ids().map(TargetId::as_str).collect())
            .collect()
    }

    #[test]
    fn test_simulator_and_device_consolidate() {
        let targets = Targets::from([
            (
                TargetId::new("app-sim"),
                app("//app:App", "sim", ios_simulator()).with_srcs(["app/a.swift", "app/b.swift"]),
            ),
            (
                TargetId::new("app-dev"),
                app("//app:App", "dev", ios_device()).with_srcs(["app/a.swift", "app/b.swift"]),
            ),
        ]);

        let consolidation = consolidate_targets(&targets, &no_generated()).unwrap();
        assert!(consolidation.warnings.is_empty());
        assert_eq!(keys(&consolidation), vec![vec!["app-dev", "app-sim"]]);

        let target = consolidation.targets.values().next().unwrap();
        assert_eq!(target.unique_files.len(), 2);
        assert!(target.unique_files.values().all(BTreeSet::is_empty));
        assert_eq!(target.inputs.srcs, vec!["app/a.swift", "app/b.swift"]);
        // Device sorts before simulator
        assert_eq!(target.targets[0].0.as_str(), "app-dev");
    }

    #[test]
    fn test_divergent_dependencies_split_with_one_warning() {
        let targets = Targets::from([
            (
                TargetId::new("app-sim"),
                app("//app:App", "sim", ios_simulator()).with_dependencies(["lib-a"]),
            ),
            (
                TargetId::new("app-dev"),
                app("//app:App", "dev", ios_device()).with_dependencies(["lib-b"]),
            ),
        ]);

        let consolidation = consolidate_targets(&targets, &no_generated()).unwrap();
        assert_eq!(keys(&consolidation), vec![vec!["app-dev"], vec!["app-sim"]]);
        assert_eq!(consolidation.warnings.len(), 1);

        let warning = &consolidation.warnings[0];
        assert_eq!(warning.context.len(), 1);
        assert!(warning.context[0].contains("//app:App"));
        assert!(warning.context[0].contains("[app-dev]"));
        assert!(warning.context[0].contains("[app-sim]"));
    }

    #[test]
    fn test_split_dependency_cascades_to_dependents() {
        let targets = Targets::from([
            (
                TargetId::new("lib-sim"),
                library("//lib:Lib", "sim", ios_simulator()).with_dependencies(["x"]),
            ),
            (
                TargetId::new("lib-dev"),
                library("//lib:Lib", "dev", ios_device()).with_dependencies(["y"]),
            ),
            (
                TargetId::new("app-sim"),
                app("//app:App", "sim", ios_simulator()).with_dependencies(["lib-sim"]),
            ),
            (
                TargetId::new("app-dev"),
                app("//app:App", "dev", ios_device()).with_dependencies(["lib-dev"]),
            ),
        ]);

        let consolidation = consolidate_targets(&targets, &no_generated()).unwrap();
        assert_eq!(consolidation.targets.len(), 4);
        assert_eq!(consolidation.warnings.len(), 1);
        assert_eq!(consolidation.warnings[0].context.len(), 2);
    }

    #[test]
    fn test_consolidated_dependencies_keep_dependents_together() {
        let targets = Targets::from([
            (TargetId::new("lib-sim"), library("//lib:Lib", "sim", ios_simulator())),
            (TargetId::new("lib-dev"), library("//lib:Lib", "dev", ios_device())),
            (
                TargetId::new("app-sim"),
                app("//app:App", "sim", ios_simulator()).with_dependencies(["lib-sim"]),
            ),
            (
                TargetId::new("app-dev"),
                app("//app:App", "dev", ios_device()).with_dependencies(["lib-dev"]),
            ),
        ]);

        let consolidation = consolidate_targets(&targets, &no_generated()).unwrap();
        assert_eq!(consolidation.targets.len(), 2);
        assert!(consolidation.warnings.is_empty());
        assert_eq!(
            consolidation.keys[&TargetId::new("app-sim")],
            consolidation.keys[&TargetId::new("app-dev")]
        );
    }

    #[test]
    fn test_same_platform_overlapping_configurations_stay_apart() {
        let older = platform(Os::Ios, Environment::Simulator, "arm64", "14.0");
        let newer = platform(Os::Ios, Environment::Simulator, "arm64", "16.0");
        let targets = Targets::from([
            (TargetId::new("a"), app("//app:App", "a", older.clone())),
            (TargetId::new("b"), app("//app:App", "b", newer.clone())),
            (
                TargetId::new("c"),
                app("//app:App", "c", newer).with_xcode_configurations(["Release"]),
            ),
        ]);

        let consolidation = consolidate_targets(&targets, &no_generated()).unwrap();
        // a and b both build Debug; c only builds Release and joins a
        assert_eq!(keys(&consolidation), vec![vec!["a", "c"], vec!["b"]]);
        assert!(consolidation.warnings.is_empty());
    }

    #[test]
    fn test_different_product_types_never_merge() {
        let mut bundle = app("//app:App", "b", ios_device());
        bundle.product.product_type = ProductType::Bundle;
        let targets = Targets::from([
            (TargetId::new("a"), app("//app:App", "a", ios_simulator())),
            (TargetId::new("b"), bundle),
        ]);
        let consolidation = consolidate_targets(&targets, &no_generated()).unwrap();
        assert_eq!(consolidation.targets.len(), 2);
    }

    #[test]
    fn test_unique_files_and_merged_order() {
        let targets = Targets::from([
            (
                TargetId::new("sim"),
                app("//app:App", "sim", ios_simulator())
                    .with_srcs(["common.swift", "sim_only.swift", "gen.swift"]),
            ),
            (
                TargetId::new("dev"),
                app("//app:App", "dev", ios_device()).with_srcs(["dev_only.swift", "common.swift"]),
            ),
        ]);
        let generated = BTreeMap::from([(BazelPath::new("gen.swift"), "$(BUILD_DIR)/gen.swift".to_string())]);

        let consolidation = consolidate_targets(&targets, &generated).unwrap();
        let target = consolidation.targets.values().next().unwrap();
        assert_eq!(
            target.inputs.srcs,
            vec!["common.swift", "dev_only.swift", "sim_only.swift", "gen.swift"]
        );
        assert_eq!(
            target.unique_files[&TargetId::new("dev")],
            BTreeSet::from(["dev_only.swift".to_string()])
        );
        assert_eq!(
            target.unique_files[&TargetId::new("sim")],
            BTreeSet::from(["sim_only.swift".to_string()])
        );
    }

    #[test]
    fn test_missing_target_is_a_precondition_error() {
        let targets = Targets::new();
        let result = ConsolidatedTarget::new(
            ConsolidationKey::new([TargetId::new("nope")]),
            &targets,
            &no_generated(),
        );
        assert!(matches!(result, Err(PreconditionError::MissingTarget { .. })));

        let result = ConsolidatedTarget::new(ConsolidationKey::new([]), &targets, &no_generated());
        assert!(matches!(result, Err(PreconditionError::EmptyConsolidationKey)));
    }

    #[test]
    fn test_consolidation_is_idempotent() {
        let targets = Targets::from([
            (TargetId::new("lib-sim"), library("//lib:Lib", "sim", ios_simulator())),
            (TargetId::new("lib-dev"), library("//lib:Lib", "dev", ios_device())),
            (
                TargetId::new("app-sim"),
                app("//app:App", "sim", ios_simulator()).with_dependencies(["lib-sim"]),
            ),
            (
                TargetId::new("app-dev"),
                app("//app:App", "dev", ios_device()).with_dependencies(["other"]),
            ),
        ]);

        let first = consolidate_targets(&targets, &no_generated()).unwrap();
        for (key, _) in &first.targets {
            let subset: Targets = key
                .ids()
                .map(|id| (id.clone(), targets[id].clone()))
                .collect();
            let again = consolidate_targets(&subset, &no_generated()).unwrap();
            assert_eq!(again.targets.keys().collect::<Vec<_>>(), vec![key]);
        }
    }
}
