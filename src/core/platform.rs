//! Apple platform descriptions.
//!
//! Every target variant is built for exactly one platform: an operating
//! system, a device or simulator environment, an architecture and a minimum
//! OS version.

use std::cmp::Ordering;
use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    #[serde(alias = "macosx")]
    MacOs,
    Ios,
    Tvos,
    Watchos,
    #[serde(alias = "xros")]
    Visionos,
}

impl Os {
    /// Human-readable name, as used in target names.
    pub fn display_name(self) -> &'static str {
        match self {
            Os::MacOs => "macOS",
            Os::Ios => "iOS",
            Os::Tvos => "tvOS",
            Os::Watchos => "watchOS",
            Os::Visionos => "visionOS",
        }
    }

    /// Build setting holding the deployment target for this OS.
    pub fn deployment_target_key(self) -> &'static str {
        match self {
            Os::MacOs => "MACOSX_DEPLOYMENT_TARGET",
            Os::Ios => "IPHONEOS_DEPLOYMENT_TARGET",
            Os::Tvos => "TVOS_DEPLOYMENT_TARGET",
            Os::Watchos => "WATCHOS_DEPLOYMENT_TARGET",
            Os::Visionos => "XROS_DEPLOYMENT_TARGET",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Device or simulator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Device,
    Simulator,
}

impl Environment {
    /// Human-readable name, as used in target names.
    pub fn display_name(self) -> &'static str {
        match self {
            Environment::Device => "Device",
            Environment::Simulator => "Simulator",
        }
    }
}

/// The platform a target variant is built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system
    pub os: Os,

    /// Device or simulator
    #[serde(default)]
    pub environment: Environment,

    /// CPU architecture (e.g. `arm64`)
    pub arch: String,

    /// Minimum OS version (e.g. `15.0`)
    pub minimum_os_version: String,
}

impl Platform {
    /// Create a platform.
    pub fn new(
        os: Os,
        environment: Environment,
        arch: impl Into<String>,
        minimum_os_version: impl Into<String>,
    ) -> Self {
        Platform {
            os,
            environment,
            arch: arch.into(),
            minimum_os_version: minimum_os_version.into(),
        }
    }

    /// The SDK this platform builds against.
    pub fn sdk(&self) -> &'static str {
        match (self.os, self.environment) {
            (Os::MacOs, _) => "macosx",
            (Os::Ios, Environment::Device) => "iphoneos",
            (Os::Ios, Environment::Simulator) => "iphonesimulator",
            (Os::Tvos, Environment::Device) => "appletvos",
            (Os::Tvos, Environment::Simulator) => "appletvsimulator",
            (Os::Watchos, Environment::Device) => "watchos",
            (Os::Watchos, Environment::Simulator) => "watchsimulator",
            (Os::Visionos, Environment::Device) => "xros",
            (Os::Visionos, Environment::Simulator) => "xrsimulator",
        }
    }

    /// Whether the environment is meaningful for naming (macOS has no simulator).
    pub fn has_environment(&self) -> bool {
        self.os != Os::MacOs
    }

    /// The minimum OS version as a comparable version.
    pub fn minimum_version(&self) -> Option<Version> {
        parse_os_version(&self.minimum_os_version)
    }

    /// Compare only the minimum OS versions.
    pub fn cmp_minimum_version(&self, other: &Platform) -> Ordering {
        match (self.minimum_version(), other.minimum_version()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.minimum_os_version.cmp(&other.minimum_os_version),
        }
    }
}

impl PartialOrd for Platform {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Platform {
    fn cmp(&self, other: &Self) -> Ordering {
        self.os
            .cmp(&other.os)
            .then_with(|| self.environment.cmp(&other.environment))
            .then_with(|| self.arch.cmp(&other.arch))
            .then_with(|| self.cmp_minimum_version(other))
            .then_with(|| self.minimum_os_version.cmp(&other.minimum_os_version))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.os, self.minimum_os_version)?;
        if self.has_environment() {
            write!(f, " {}", self.environment.display_name())?;
        }
        write!(f, " {}", self.arch)
    }
}

/// Parse an OS version like `15` or `15.2` into a full version.
pub fn parse_os_version(version: &str) -> Option<Version> {
    let mut parts: Vec<&str> = version.trim().split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }
    Version::parse(&parts.join(".")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_names() {
        let sim = Platform::new(Os::Ios, Environment::Simulator, "arm64", "15.0");
        let device = Platform::new(Os::Ios, Environment::Device, "arm64", "15.0");
        let mac = Platform::new(Os::MacOs, Environment::Device, "x86_64", "12.0");
        assert_eq!(sim.sdk(), "iphonesimulator");
        assert_eq!(device.sdk(), "iphoneos");
        assert_eq!(mac.sdk(), "macosx");
    }

    #[test]
    fn test_version_ordering_is_numeric() {
        let old = Platform::new(Os::Ios, Environment::Device, "arm64", "9.0");
        let new = Platform::new(Os::Ios, Environment::Device, "arm64", "15.0");
        assert!(old < new);
        assert_eq!(parse_os_version("15"), Version::parse("15.0.0").ok());
        assert_eq!(parse_os_version("15.2.1"), Version::parse("15.2.1").ok());
        assert_eq!(parse_os_version("a.b"), None);
    }

    #[test]
    fn test_platform_ordering() {
        let mut platforms = vec![
            Platform::new(Os::Watchos, Environment::Device, "arm64_32", "8.0"),
            Platform::new(Os::Ios, Environment::Simulator, "x86_64", "15.0"),
            Platform::new(Os::Ios, Environment::Device, "arm64", "15.0"),
            Platform::new(Os::MacOs, Environment::Device, "arm64", "12.0"),
        ];
        platforms.sort();
        let sdks: Vec<_> = platforms.iter().map(Platform::sdk).collect();
        assert_eq!(sdks, vec!["macosx", "iphoneos", "iphonesimulator", "watchos"]);
    }

    #[test]
    fn test_deserialize() {
        let platform: Platform = serde_json::from_str(
            r#"{"os": "ios", "environment": "simulator", "arch": "arm64", "minimum_os_version": "16.0"}"#,
        )
        .unwrap();
        assert_eq!(platform.os, Os::Ios);
        assert_eq!(platform.environment, Environment::Simulator);
    }
}
