//! Test fixtures for common test scenarios.
//!
//! Platforms and target variants shaped like the ones the build graph
//! exporter reports.

use crate::core::platform::{Environment, Os, Platform};
use crate::core::product::{Product, ProductType};
use crate::core::target::Target;

/// A platform.
pub fn platform(os: Os, environment: Environment, arch: &str, minimum_os_version: &str) -> Platform {
    Platform::new(os, environment, arch, minimum_os_version)
}

/// iOS 15.0 simulator on arm64.
pub fn ios_simulator() -> Platform {
    platform(Os::Ios, Environment::Simulator, "arm64", "15.0")
}

/// iOS 15.0 device on arm64.
pub fn ios_device() -> Platform {
    platform(Os::Ios, Environment::Device, "arm64", "15.0")
}

/// macOS 12.0 on arm64.
pub fn macos() -> Platform {
    platform(Os::MacOs, Environment::Device, "arm64", "12.0")
}

/// A target variant built for the `Debug` Xcode configuration.
pub fn target(label: &str, configuration: &str, platform: Platform, product_type: ProductType) -> Target {
    let name = label.rsplit(':').next().unwrap_or(label).to_string();
    Target::new(
        label,
        configuration,
        platform,
        Product::new(product_type, name),
    )
    .with_xcode_configurations(["Debug"])
}

/// An application variant.
pub fn app(label: &str, configuration: &str, platform: Platform) -> Target {
    target(label, configuration, platform, ProductType::Application)
}

/// A static library variant with a module named after the label.
pub fn library(label: &str, configuration: &str, platform: Platform) -> Target {
    let module = label.rsplit(':').next().unwrap_or(label).to_string();
    target(label, configuration, platform, ProductType::StaticLibrary).with_module_name(module)
}
