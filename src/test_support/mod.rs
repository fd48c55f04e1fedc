//! Test utilities and fakes for unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use bazel_xcodeproj::test_support::FakeSymlinkResolver;
//!
//! #[test]
//! fn test_example() {
//!     let mut resolver = FakeSymlinkResolver::new();
//!     resolver.add_symlink("/ob/external/Foo", "/real/Foo");
//!
//!     // Hand the resolver to an AttributeCalculator...
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use fixtures::*;

/// In-memory symlink table.
///
/// Only exact paths resolve; paths below a registered symlink do not, the
/// same as for the real resolver.
#[derive(Debug, Clone, Default)]
pub struct FakeSymlinkResolver {
    links: HashMap<PathBuf, PathBuf>,
}

impl FakeSymlinkResolver {
    /// Create a resolver with no symlinks.
    pub fn new() -> Self {
        FakeSymlinkResolver::default()
    }

    /// Register a symlink and its fully resolved destination.
    pub fn add_symlink(&mut self, from: impl AsRef<Path>, to: impl AsRef<Path>) {
        self.links
            .insert(from.as_ref().to_path_buf(), to.as_ref().to_path_buf());
    }
}

impl crate::files::attributes::SymlinkResolver for FakeSymlinkResolver {
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        self.links.get(path).cloned()
    }
}

/// Assertion helpers.
pub mod assertions {
    /// Assert that a record contains `key = value;`.
    pub fn assert_field(content: &str, key: &str, value: &str) {
        let needle = format!("{} = {};", key, value);
        assert!(
            content.contains(&needle),
            "expected `{}` in record:\n{}",
            needle,
            content
        );
    }
}
