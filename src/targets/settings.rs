//! Per-target build settings.
//!
//! Computing the settings of one target is independent of every other target
//! and runs in parallel. Writing the results into the object table issues
//! identifiers and happens sequentially, in target order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::core::platform::{Environment, Platform};
use crate::core::product::ProductType;
use crate::core::target::{BazelLabel, BuildSetting, BuildSettings, Target, TargetId};
use crate::pbxproj::identifiers::{IdentifierCache, Namespace, COMPILE_STUB};
use crate::pbxproj::writer::{Object, ObjectTable, Record};
use crate::targets::consolidate::ConsolidationKey;
use crate::targets::disambiguate::DisambiguatedTarget;

/// Build setting holding the resolved repository substitution pairs.
pub const RESOLVED_REPOSITORIES_KEY: &str = "RESOLVED_REPOSITORIES";

/// Merged build settings for one Xcode configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetConfiguration {
    /// Xcode configuration name
    pub name: String,

    /// Merged settings, with conditional keys for differing variants
    pub build_settings: BuildSettings,
}

/// Everything needed to write one native target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSettings {
    pub key: ConsolidationKey,
    pub name: String,
    pub label: BazelLabel,
    pub product_type: ProductType,
    pub product_name: String,
    pub has_sources: bool,
    pub configurations: Vec<TargetConfiguration>,
}

/// Identifiers of a written native target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedTarget {
    pub identifier: String,
    pub configuration_list: String,
    pub build_configurations: Vec<String>,
}

/// Compute the merged settings of a target for each of its Xcode configurations.
///
/// Variants without Xcode configurations take part in every configuration;
/// a target without any is built for `default_configuration` only.
pub fn compute_target_settings(
    disambiguated: &DisambiguatedTarget,
    default_configuration: &str,
) -> TargetSettings {
    let target = &disambiguated.target;

    let mut configuration_names: Vec<&str> = target
        .xcode_configurations
        .iter()
        .map(String::as_str)
        .collect();
    if configuration_names.is_empty() {
        configuration_names.push(default_configuration);
    }

    let configurations = configuration_names
        .into_iter()
        .map(|name| {
            let variants: Vec<&(TargetId, Target)> = target
                .targets
                .iter()
                .filter(|(_, t)| {
                    t.xcode_configurations.is_empty() || t.xcode_configurations.contains(name)
                })
                .collect();

            let mut build_settings = merge_variant_settings(&variants, &target.unique_files);
            insert_target_settings(&mut build_settings, disambiguated, &variants);

            TargetConfiguration {
                name: name.to_string(),
                build_settings,
            }
        })
        .collect();

    TargetSettings {
        key: target.key.clone(),
        name: disambiguated.name.clone(),
        label: target.label().clone(),
        product_type: target.product_type(),
        product_name: target.product().name.clone(),
        has_sources: !target.inputs.srcs.is_empty() || !target.inputs.non_arc_srcs.is_empty(),
        configurations,
    }
}

/// The setting condition for each variant.
///
/// A lone variant needs no condition. Otherwise the SDK selects the variant,
/// plus the architecture when several variants share the SDK.
pub fn conditions(platforms: &[&Platform]) -> Vec<Option<String>> {
    if platforms.len() == 1 {
        return vec![None];
    }

    let mut sdk_counts: HashMap<&str, usize> = HashMap::new();
    for platform in platforms {
        *sdk_counts.entry(platform.sdk()).or_insert(0) += 1;
    }

    platforms
        .iter()
        .map(|platform| {
            let sdk = platform.sdk();
            if sdk_counts[sdk] > 1 {
                Some(format!("[sdk={}*][arch={}]", sdk, platform.arch))
            } else {
                Some(format!("[sdk={}*]", sdk))
            }
        })
        .collect()
}

/// Merge settings of variants into one table.
///
/// A key with one value across all variants is written plainly. Otherwise the
/// first variant's value is the base and each differing variant gets a
/// conditional key.
pub fn merge_settings(variants: &[(Option<String>, BuildSettings)]) -> BuildSettings {
    let keys: BTreeSet<&String> = variants.iter().flat_map(|(_, s)| s.keys()).collect();

    let mut merged = BuildSettings::new();
    for key in keys {
        let values: Vec<Option<&BuildSetting>> = variants.iter().map(|(_, s)| s.get(key)).collect();
        let Some(present) = values.iter().flatten().next() else {
            continue;
        };
        let base = match values[0] {
            Some(value) => value.clone(),
            None => present.empty_like(),
        };

        for ((condition, _), value) in variants.iter().zip(&values) {
            let value = value.cloned().unwrap_or_else(|| base.empty_like());
            if value == base {
                continue;
            }
            if let Some(condition) = condition {
                merged.insert(format!("{}{}", key, condition), value);
            }
        }
        merged.insert(key.clone(), base);
    }
    merged
}

fn merge_variant_settings(
    variants: &[&(TargetId, Target)],
    unique_files: &BTreeMap<TargetId, BTreeSet<String>>,
) -> BuildSettings {
    let platforms: Vec<&Platform> = variants.iter().map(|(_, t)| &t.platform).collect();
    let conditions = conditions(&platforms);

    let per_variant: Vec<(Option<String>, BuildSettings)> = variants
        .iter()
        .zip(&conditions)
        .map(|((id, target), condition)| {
            let mut settings = target.build_settings.clone();
            settings.insert("BAZEL_TARGET_ID".to_string(), id.as_str().into());
            settings.insert("ARCHS".to_string(), target.platform.arch.as_str().into());
            settings.insert(
                target.platform.os.deployment_target_key().to_string(),
                target.platform.minimum_os_version.as_str().into(),
            );
            (condition.clone(), settings)
        })
        .collect();

    let mut merged = merge_settings(&per_variant);

    if variants.len() > 1 {
        let mut excluded = BTreeSet::new();
        for ((id, _), condition) in variants.iter().zip(&conditions) {
            let Some(files) = unique_files.get(id).filter(|f| !f.is_empty()) else {
                continue;
            };
            excluded.extend(files.iter().cloned());
            if let Some(condition) = condition {
                merged.insert(
                    format!("INCLUDED_SOURCE_FILE_NAMES{}", condition),
                    BuildSetting::Array(files.iter().cloned().collect()),
                );
            }
        }
        if !excluded.is_empty() {
            merged.insert(
                "EXCLUDED_SOURCE_FILE_NAMES".to_string(),
                BuildSetting::Array(excluded.into_iter().collect()),
            );
        }
    }

    merged
}

fn insert_target_settings(
    settings: &mut BuildSettings,
    disambiguated: &DisambiguatedTarget,
    variants: &[&(TargetId, Target)],
) {
    let target = &disambiguated.target;
    settings.insert("BAZEL_LABEL".to_string(), target.label().as_str().into());
    settings.insert("PRODUCT_NAME".to_string(), target.product().name.as_str().into());
    settings.insert("TARGET_NAME".to_string(), disambiguated.name.as_str().into());
    if let Some(module_name) = target.module_name() {
        settings.insert("PRODUCT_MODULE_NAME".to_string(), module_name.into());
    }

    if let Some((_, first)) = variants.first() {
        let device = Platform {
            environment: Environment::Device,
            ..first.platform.clone()
        };
        settings.insert("SDKROOT".to_string(), device.sdk().into());
    }

    let mut sdks: Vec<&str> = Vec::new();
    for (_, variant) in variants {
        let sdk = variant.platform.sdk();
        if !sdks.contains(&sdk) {
            sdks.push(sdk);
        }
    }
    settings.insert("SUPPORTED_PLATFORMS".to_string(), sdks.join(" ").into());
}

/// Write native targets, configuration lists and build configurations.
///
/// Must run sequentially, in the same target order every time, so identifiers
/// stay stable.
pub fn apply_target_settings(
    all: &[TargetSettings],
    resolved_repositories: &str,
    objects: &mut ObjectTable,
    ids: &mut IdentifierCache,
) -> Vec<AppliedTarget> {
    let mut applied = Vec::with_capacity(all.len());

    for settings in all {
        let key = settings.key.to_string();
        let identifier = ids.issue(Namespace::Target, &key);
        let configuration_list = ids.issue(Namespace::ConfigurationList, &key);

        let mut build_configurations = Vec::with_capacity(settings.configurations.len());
        for configuration in &settings.configurations {
            let id = ids.issue(
                Namespace::BuildConfiguration,
                &format!("{} {}", key, configuration.name),
            );
            let mut build_settings = configuration.build_settings.clone();
            if !resolved_repositories.is_empty() {
                build_settings.insert(
                    RESOLVED_REPOSITORIES_KEY.to_string(),
                    resolved_repositories.into(),
                );
            }
            objects.insert(Object::new(
                id.clone(),
                Record::new("XCBuildConfiguration")
                    .settings("buildSettings", &build_settings)
                    .field("name", &configuration.name)
                    .finish(),
            ));
            build_configurations.push(id);
        }

        objects.insert(Object::new(
            configuration_list.clone(),
            Record::new("XCConfigurationList")
                .list("buildConfigurations", &build_configurations)
                .field("defaultConfigurationIsVisible", "0")
                .field_opt(
                    "defaultConfigurationName",
                    settings.configurations.first().map(|c| c.name.as_str()),
                )
                .finish(),
        ));

        let mut build_phases = Vec::new();
        if !settings.has_sources {
            // Targets without sources compile the stub so Xcode can build them
            let build_file = ids.issue(Namespace::Element, &format!("compile-stub {}", key));
            let phase = ids.issue(Namespace::Element, &format!("sources {}", key));
            objects.insert(Object::new(
                build_file.clone(),
                Record::new("PBXBuildFile")
                    .reference("fileRef", COMPILE_STUB)
                    .finish(),
            ));
            objects.insert(Object::new(
                phase.clone(),
                Record::new("PBXSourcesBuildPhase")
                    .list("files", &[build_file])
                    .finish(),
            ));
            build_phases.push(phase);
        }

        objects.insert(Object::new(
            identifier.clone(),
            Record::new("PBXNativeTarget")
                .reference("buildConfigurationList", &configuration_list)
                .list("buildPhases", &build_phases)
                .field("name", &settings.name)
                .field("productName", &settings.product_name)
                .field("productType", settings.product_type.identifier())
                .finish(),
        ));

        tracing::debug!("wrote target {} ({})", settings.name, settings.label);
        applied.push(AppliedTarget {
            identifier,
            configuration_list,
            build_configurations,
        });
    }

    applied
}
