//! Project-relative paths as Bazel reports them.
//!
//! A `BazelPath` is the identity of a file inside the generated project. It is
//! always slash-delimited and relative to the execution root, which means it
//! can point into the main workspace, into fetched external repositories, or
//! into the build output tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Directory name of legacy external repositories (`external/<repo>`).
pub const EXTERNAL_DIR_NAME: &str = "external";

/// Directory name of sibling repositories (`../<repo>`).
pub const SIBLING_DIR_NAME: &str = "..";

/// Directory name of the build output tree.
pub const BAZEL_OUT_DIR_NAME: &str = "bazel-out";

/// Which absolute root a path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRegime {
    /// Directly under the primary workspace root
    Plain,
    /// Under `external/`
    LegacyExternal,
    /// Under `../`
    SiblingExternal,
    /// Under `bazel-out/`
    BazelGenerated,
}

impl PathRegime {
    /// Number of leading characters that make up the regime's path prefix.
    pub fn prefix_len(self) -> usize {
        match self {
            PathRegime::Plain | PathRegime::BazelGenerated => 0,
            PathRegime::LegacyExternal => "external/".len(),
            PathRegime::SiblingExternal => "../".len(),
        }
    }

    /// Prefix used when recording a resolved repository, if the regime has one.
    pub fn resolved_repository_prefix(self) -> Option<&'static str> {
        match self {
            PathRegime::LegacyExternal => Some("./external/"),
            PathRegime::SiblingExternal => Some("../"),
            PathRegime::Plain | PathRegime::BazelGenerated => None,
        }
    }

    /// Classify a top-level directory name.
    pub fn for_root_name(name: &str) -> PathRegime {
        match name {
            EXTERNAL_DIR_NAME => PathRegime::LegacyExternal,
            SIBLING_DIR_NAME => PathRegime::SiblingExternal,
            BAZEL_OUT_DIR_NAME => PathRegime::BazelGenerated,
            _ => PathRegime::Plain,
        }
    }
}

/// A normalized, slash-delimited project path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BazelPath(String);

impl BazelPath {
    /// Create a path, normalizing separators and stripping `./` and trailing slashes.
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path.as_ref().replace('\\', "/");
        let mut path = path.as_str();
        while let Some(rest) = path.strip_prefix("./") {
            path = rest;
        }
        let path = path.trim_end_matches('/');
        BazelPath(path.to_string())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the (empty) project root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append one or more components.
    pub fn join(&self, component: &str) -> BazelPath {
        if self.0.is_empty() {
            BazelPath(component.to_string())
        } else {
            BazelPath(format!("{}/{}", self.0, component))
        }
    }

    /// Iterate over the path's components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|c| !c.is_empty())
    }

    /// The final component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Classify the path into its regime.
    pub fn regime(&self) -> PathRegime {
        match self.components().next() {
            Some(first) => PathRegime::for_root_name(first),
            None => PathRegime::Plain,
        }
    }

    /// The path with the regime's prefix removed.
    pub fn regime_relative(&self) -> &str {
        let len = self.regime().prefix_len();
        self.0.get(len..).unwrap_or("")
    }
}

impl fmt::Display for BazelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for BazelPath {
    fn from(s: &str) -> Self {
        BazelPath::new(s)
    }
}

impl From<String> for BazelPath {
    fn from(s: String) -> Self {
        BazelPath::new(s)
    }
}

impl AsRef<str> for BazelPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
