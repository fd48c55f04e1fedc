//! Implementation of `bazel-xcodeproj generate`.
//!
//! Runs every phase over one build-graph document: file tree, target
//! consolidation, disambiguation, the parallel build-setting computation and
//! the sequential write into the object table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::bazel_path::BazelPath;
use crate::core::path_tree::FilePath;
use crate::core::product::ProductType;
use crate::core::target::{BazelLabel, Targets};
use crate::files::attributes::{Directories, SymlinkResolver};
use crate::files::element::{resolved_repositories_setting, ResolvedRepository};
use crate::files::localization::ordered_regions;
use crate::files::root::{create_file_tree, FileTreeContext};
use crate::pbxproj::identifiers::IdentifierCache;
use crate::pbxproj::writer::ObjectTable;
use crate::targets::consolidate::consolidate_targets;
use crate::targets::disambiguate::{disambiguate_targets, DisambiguatedTarget};
use crate::targets::settings::{
    apply_target_settings, compute_target_settings, TargetConfiguration, TargetSettings,
};
use crate::util::config::Config;
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::{read_to_string, FsSymlinkResolver};

/// The build graph exported from Bazel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSpec {
    /// Absolute path of the workspace
    pub workspace: PathBuf,

    /// Absolute path of Bazel's execution root
    pub execution_root: PathBuf,

    /// Target variants by id
    #[serde(default)]
    pub targets: Targets,

    /// Every file and folder shown in the project
    #[serde(default)]
    pub files: Vec<FilePath>,

    /// Current version of each `.xcdatamodeld` bundle
    #[serde(default)]
    pub selected_model_versions: BTreeMap<BazelPath, String>,

    /// Files generated by the IDE host, mapped to their host path
    #[serde(default)]
    pub xcode_generated_files: BTreeMap<BazelPath, String>,
}

/// Load a build graph document.
pub fn load_graph_spec(path: &Path) -> Result<GraphSpec> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse build graph: {}", path.display()))
}

/// Options for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Project name
    pub project_name: String,

    /// Development region, always part of the known regions
    pub development_region: String,

    /// Xcode configuration for targets that list none
    pub default_xcode_configuration: String,

    /// Path of the internal tooling group
    pub internal_directory: String,

    /// Number of parallel jobs
    pub jobs: Option<usize>,
}

impl GenerateOptions {
    /// Options from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        GenerateOptions {
            project_name: config.project_name().to_string(),
            development_region: config.development_region().to_string(),
            default_xcode_configuration: config.default_xcode_configuration().to_string(),
            internal_directory: config.internal_directory().to_string(),
            jobs: config.generate.jobs,
        }
    }

    /// Override the number of jobs.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        if jobs.is_some() {
            self.jobs = jobs;
        }
        self
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions::from_config(&Config::default())
    }
}

/// A generated native target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTarget {
    /// Unique display name
    pub name: String,

    /// Bazel label
    pub label: BazelLabel,

    /// Xcode product type identifier
    pub product_type: String,

    /// Variant ids behind the target
    pub key: Vec<String>,

    /// Native target identifier
    pub identifier: String,

    /// Configuration list identifier
    pub configuration_list: String,

    /// Merged build settings per Xcode configuration
    pub configurations: Vec<TargetConfiguration>,
}

/// The generated project model.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectModel {
    /// Project name
    pub name: String,

    /// Development region
    pub development_region: String,

    /// Main group identifier
    pub main_group: String,

    /// Identifier to serialized record
    pub objects: ObjectTable,

    /// Path to element identifier
    pub path_identifiers: BTreeMap<BazelPath, String>,

    /// Known regions, `Base` last
    pub known_regions: Vec<String>,

    /// Symlinked repositories, subdirectories first
    pub resolved_repositories: Vec<ResolvedRepository>,

    /// Value of the `RESOLVED_REPOSITORIES` build setting
    pub resolved_repositories_setting: String,

    /// Native targets, in consolidation order
    pub targets: Vec<ProjectTarget>,

    /// Recoverable problems found while generating
    pub warnings: Vec<Diagnostic>,
}

/// Generate a project model, resolving symlinks on the real filesystem.
pub fn generate(spec: GraphSpec, opts: &GenerateOptions) -> Result<ProjectModel> {
    generate_with_resolver(spec, opts, &FsSymlinkResolver)
}

/// Generate a project model.
pub fn generate_with_resolver(
    mut spec: GraphSpec,
    opts: &GenerateOptions,
    resolver: &dyn SymlinkResolver,
) -> Result<ProjectModel> {
    if let Some(j) = opts.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(j)
            .build_global()
            .ok(); // Ignore if already set
    }

    let directories = Directories::new(&spec.workspace, &spec.execution_root)
        .context("invalid execution root")?;
    let mut ids = IdentifierCache::new();

    tracing::info!("Creating file tree for {} paths", spec.files.len());
    let ctx = FileTreeContext {
        directories: &directories,
        resolver,
        selected_model_versions: &spec.selected_model_versions,
        internal_directory: &opts.internal_directory,
    };
    let mut tree = create_file_tree(&spec.files, &ctx, &mut ids).context("failed to create file tree")?;
    let mut warnings = std::mem::take(&mut tree.warnings);

    let disambiguated = name_targets(&mut spec, &opts.default_xcode_configuration, &mut warnings)?;

    tracing::info!("Computing build settings for {} targets", disambiguated.len());
    let settings: Vec<TargetSettings> = disambiguated
        .par_iter()
        .map(|target| compute_target_settings(target, &opts.default_xcode_configuration))
        .collect();

    let mut objects = ObjectTable::new();
    objects.insert(tree.main_group.clone());
    objects.extend(tree.objects);

    let resolved_setting = resolved_repositories_setting(&tree.resolved_repositories);
    let applied = apply_target_settings(&settings, &resolved_setting, &mut objects, &mut ids);
    tracing::debug!("issued {} identifiers", ids.len());

    let targets = settings
        .into_iter()
        .zip(applied)
        .map(|(settings, applied)| ProjectTarget {
            key: settings.key.ids().map(|id| id.to_string()).collect(),
            name: settings.name,
            label: settings.label,
            product_type: product_type_identifier(settings.product_type),
            identifier: applied.identifier,
            configuration_list: applied.configuration_list,
            configurations: settings.configurations,
        })
        .collect::<Vec<_>>();

    let mut regions = tree.known_regions;
    regions.insert(opts.development_region.clone());

    tracing::info!(
        "Generated {} objects and {} targets",
        objects.len(),
        targets.len()
    );

    Ok(ProjectModel {
        name: opts.project_name.clone(),
        development_region: opts.development_region.clone(),
        main_group: tree.main_group.identifier,
        objects,
        path_identifiers: tree.path_identifiers,
        known_regions: ordered_regions(&regions),
        resolved_repositories: tree.resolved_repositories,
        resolved_repositories_setting: resolved_setting,
        targets,
        warnings,
    })
}

fn product_type_identifier(product_type: ProductType) -> String {
    product_type.identifier().to_string()
}

/// Consolidate the build graph's target variants and name the results.
///
/// Variants without Xcode configurations are first given
/// `default_configuration`. Consolidation warnings are appended to `warnings`.
pub fn name_targets(
    spec: &mut GraphSpec,
    default_configuration: &str,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Vec<DisambiguatedTarget>> {
    assign_default_configuration(&mut spec.targets, default_configuration);

    tracing::info!("Consolidating {} target variants", spec.targets.len());
    let consolidation = consolidate_targets(&spec.targets, &spec.xcode_generated_files)
        .context("failed to consolidate targets")?;
    warnings.extend(consolidation.warnings);

    Ok(disambiguate_targets(consolidation.targets))
}

/// Give targets without Xcode configurations the default one.
fn assign_default_configuration(targets: &mut Targets, default_configuration: &str) {
    for target in targets.values_mut() {
        if target.xcode_configurations.is_empty() {
            target
                .xcode_configurations
                .insert(default_configuration.to_string());
        }
    }
}
