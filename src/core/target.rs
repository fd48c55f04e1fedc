//! Target definitions - one platform/configuration-specific build unit.
//!
//! A Target is read from the build graph and never mutated afterwards. The
//! same Bazel label usually produces several targets (one per platform and
//! build configuration); those are later consolidated into Xcode targets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::platform::Platform;
use crate::core::product::{Product, ProductType};

/// Identifier of a single target variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Create a target id.
    pub fn new(id: impl Into<String>) -> Self {
        TargetId(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        TargetId::new(s)
    }
}

/// A Bazel label (`@repo//package:name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BazelLabel(String);

impl BazelLabel {
    /// Create a label.
    pub fn new(label: impl Into<String>) -> Self {
        BazelLabel(label.into())
    }

    /// Get the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The target name part of the label.
    ///
    /// `//app:App` and `//app/App` both have the name `App`.
    pub fn name(&self) -> &str {
        match self.0.rsplit_once(':') {
            Some((_, name)) => name,
            None => self.0.rsplit('/').next().unwrap_or(&self.0),
        }
    }
}

impl fmt::Display for BazelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for BazelLabel {
    fn from(s: &str) -> Self {
        BazelLabel::new(s)
    }
}

/// A build setting value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildSetting {
    Bool(bool),
    String(String),
    Array(Vec<String>),
}

impl BuildSetting {
    /// The empty value of the same kind.
    pub fn empty_like(&self) -> BuildSetting {
        match self {
            BuildSetting::Bool(_) => BuildSetting::Bool(false),
            BuildSetting::String(_) => BuildSetting::String(String::new()),
            BuildSetting::Array(_) => BuildSetting::Array(Vec::new()),
        }
    }
}

impl From<&str> for BuildSetting {
    fn from(s: &str) -> Self {
        BuildSetting::String(s.to_string())
    }
}

impl From<String> for BuildSetting {
    fn from(s: String) -> Self {
        BuildSetting::String(s)
    }
}

impl From<bool> for BuildSetting {
    fn from(b: bool) -> Self {
        BuildSetting::Bool(b)
    }
}

impl From<Vec<String>> for BuildSetting {
    fn from(v: Vec<String>) -> Self {
        BuildSetting::Array(v)
    }
}

/// Build settings, sorted by key.
pub type BuildSettings = BTreeMap<String, BuildSetting>;

/// Files a target variant consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inputs {
    /// Sources compiled with ARC
    pub srcs: Vec<String>,

    /// Sources compiled without ARC
    pub non_arc_srcs: Vec<String>,

    /// Headers
    pub hdrs: Vec<String>,

    /// Resources
    pub resources: Vec<String>,
}

impl Inputs {
    /// All compiled sources.
    pub fn compiled(&self) -> impl Iterator<Item = &String> {
        self.srcs.iter().chain(self.non_arc_srcs.iter())
    }
}

/// How one target refers to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    Dependency,
    TestHost,
    WatchApplication,
    Extension,
    AppClip,
}

/// A single target variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Bazel label that produced this variant
    pub label: BazelLabel,

    /// Bazel configuration name (e.g. `ios-arm64-min15.0-applebin_ios-ST-1b2c`)
    pub configuration: String,

    /// Xcode configurations this variant is built for
    #[serde(default)]
    pub xcode_configurations: BTreeSet<String>,

    /// Platform the variant is built for
    pub platform: Platform,

    /// Product the variant produces
    pub product: Product,

    /// Swift/Clang module name, if the target defines a module
    #[serde(default)]
    pub module_name: Option<String>,

    /// Consumed files
    #[serde(default)]
    pub inputs: Inputs,

    /// Direct dependencies
    #[serde(default)]
    pub dependencies: BTreeSet<TargetId>,

    /// Host application of a test bundle
    #[serde(default)]
    pub test_host: Option<TargetId>,

    /// Companion watch application
    #[serde(default)]
    pub watch_application: Option<TargetId>,

    /// Embedded extensions
    #[serde(default)]
    pub extensions: BTreeSet<TargetId>,

    /// Embedded app clips
    #[serde(default)]
    pub app_clips: BTreeSet<TargetId>,

    /// Raw build settings
    #[serde(default)]
    pub build_settings: BuildSettings,
}

impl Target {
    /// Create a target with no inputs or dependencies.
    pub fn new(
        label: impl Into<BazelLabel>,
        configuration: impl Into<String>,
        platform: Platform,
        product: Product,
    ) -> Self {
        Target {
            label: label.into(),
            configuration: configuration.into(),
            xcode_configurations: BTreeSet::new(),
            platform,
            product,
            module_name: None,
            inputs: Inputs::default(),
            dependencies: BTreeSet::new(),
            test_host: None,
            watch_application: None,
            extensions: BTreeSet::new(),
            app_clips: BTreeSet::new(),
            build_settings: BuildSettings::new(),
        }
    }

    /// Set the module name.
    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    /// Set the direct dependencies.
    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = impl Into<TargetId>>) -> Self {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sources.
    pub fn with_srcs(mut self, srcs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.inputs.srcs = srcs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the Xcode configurations.
    pub fn with_xcode_configurations(
        mut self,
        configs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.xcode_configurations = configs.into_iter().map(Into::into).collect();
        self
    }

    /// Add a build setting.
    pub fn with_build_setting(
        mut self,
        key: impl Into<String>,
        value: impl Into<BuildSetting>,
    ) -> Self {
        self.build_settings.insert(key.into(), value.into());
        self
    }

    /// Target name (the name part of the label).
    pub fn name(&self) -> &str {
        self.label.name()
    }

    /// Product type shorthand.
    pub fn product_type(&self) -> ProductType {
        self.product.product_type
    }

    /// Every target this one refers to, tagged with the relation.
    pub fn related_targets(&self) -> impl Iterator<Item = (Relation, &TargetId)> {
        self.dependencies
            .iter()
            .map(|id| (Relation::Dependency, id))
            .chain(self.test_host.iter().map(|id| (Relation::TestHost, id)))
            .chain(
                self.watch_application
                    .iter()
                    .map(|id| (Relation::WatchApplication, id)),
            )
            .chain(self.extensions.iter().map(|id| (Relation::Extension, id)))
            .chain(self.app_clips.iter().map(|id| (Relation::AppClip, id)))
    }
}

/// The complete set of target variants, keyed by id.
pub type Targets = BTreeMap<TargetId, Target>;
