//! Generated object identifiers.
//!
//! Identifiers are 24 upper-case hex characters: a two-character namespace
//! followed by 22 characters of a SHA-256 over the namespaced input. The same
//! input always produces the same identifier within one generation pass, as
//! long as identifiers are requested in the same order.

use std::collections::HashSet;

use crate::util::hash::Fingerprint;

/// Identifier of the project's main group.
pub const MAIN_GROUP: &str = "FF0000000000000000000001";

/// Identifier of the legacy external repositories group (`external/`).
pub const BAZEL_EXTERNAL_REPOSITORIES: &str = "FF0000000000000000000002";

/// Identifier of the sibling external repositories group (`../`).
pub const BAZEL_SIBLING_REPOSITORIES: &str = "FF0000000000000000000003";

/// Identifier of the generated files group (`bazel-out/`).
pub const BAZEL_GENERATED: &str = "FF0000000000000000000004";

/// Identifier of the internal tooling group.
pub const INTERNAL_GROUP: &str = "FF0000000000000000000005";

/// Identifier of the compile stub file in the internal group.
pub const COMPILE_STUB: &str = "FF0000000000000000000006";

/// What kind of object an identifier is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Files, groups, variant groups and version groups
    Element,
    /// Native targets
    Target,
    /// Configuration lists
    ConfigurationList,
    /// Build configurations
    BuildConfiguration,
}

impl Namespace {
    fn prefix(self) -> &'static str {
        match self {
            Namespace::Element => "FE",
            Namespace::Target => "FD",
            Namespace::ConfigurationList => "FC",
            Namespace::BuildConfiguration => "FB",
        }
    }
}

/// Issues unique identifiers.
///
/// Owned by whichever phase creates objects; never shared across threads.
#[derive(Debug, Default)]
pub struct IdentifierCache {
    issued: HashSet<String>,
}

impl IdentifierCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        IdentifierCache::default()
    }

    /// Issue an identifier for `input` in `namespace`.
    ///
    /// Collisions with already-issued identifiers are resolved by re-hashing
    /// with an increasing salt.
    pub fn issue(&mut self, namespace: Namespace, input: &str) -> String {
        let mut salt = 0u64;
        loop {
            let mut fp = Fingerprint::new();
            fp.update_str(namespace.prefix()).update_str(input);
            if salt > 0 {
                fp.update_u64(salt);
            }
            let identifier = format!(
                "{}{}",
                namespace.prefix(),
                fp.finish_prefix(22).to_ascii_uppercase()
            );
            if self.issued.insert(identifier.clone()) {
                return identifier;
            }
            salt += 1;
        }
    }

    /// Issue an identifier for a file-tree element.
    pub fn element(&mut self, input: &str) -> String {
        self.issue(Namespace::Element, input)
    }

    /// Number of identifiers issued so far.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    /// Check if no identifier was issued yet.
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
