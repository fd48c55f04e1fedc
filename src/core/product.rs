//! Product types - what a target produces.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The Xcode product type of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "com.apple.product-type.application")]
    Application,
    #[serde(rename = "com.apple.product-type.application.on-demand-install-capable")]
    OnDemandInstallCapableApplication,
    #[serde(rename = "com.apple.product-type.application.watchapp2")]
    WatchApp,
    #[serde(rename = "com.apple.product-type.app-extension")]
    AppExtension,
    #[serde(rename = "com.apple.product-type.watchkit2-extension")]
    WatchKitExtension,
    #[serde(rename = "com.apple.product-type.bundle")]
    Bundle,
    #[serde(rename = "com.apple.product-type.bundle.unit-test")]
    UnitTestBundle,
    #[serde(rename = "com.apple.product-type.bundle.ui-testing")]
    UiTestBundle,
    #[serde(rename = "com.apple.product-type.framework")]
    Framework,
    #[serde(rename = "com.apple.product-type.framework.static")]
    StaticFramework,
    #[serde(rename = "com.apple.product-type.library.static")]
    StaticLibrary,
    #[serde(rename = "com.apple.product-type.library.dynamic")]
    DynamicLibrary,
    #[serde(rename = "com.apple.product-type.tool")]
    CommandLineTool,
}

impl ProductType {
    /// The UTI Xcode uses for this product type.
    pub fn identifier(self) -> &'static str {
        match self {
            ProductType::Application => "com.apple.product-type.application",
            ProductType::OnDemandInstallCapableApplication => {
                "com.apple.product-type.application.on-demand-install-capable"
            }
            ProductType::WatchApp => "com.apple.product-type.application.watchapp2",
            ProductType::AppExtension => "com.apple.product-type.app-extension",
            ProductType::WatchKitExtension => "com.apple.product-type.watchkit2-extension",
            ProductType::Bundle => "com.apple.product-type.bundle",
            ProductType::UnitTestBundle => "com.apple.product-type.bundle.unit-test",
            ProductType::UiTestBundle => "com.apple.product-type.bundle.ui-testing",
            ProductType::Framework => "com.apple.product-type.framework",
            ProductType::StaticFramework => "com.apple.product-type.framework.static",
            ProductType::StaticLibrary => "com.apple.product-type.library.static",
            ProductType::DynamicLibrary => "com.apple.product-type.library.dynamic",
            ProductType::CommandLineTool => "com.apple.product-type.tool",
        }
    }

    /// Human-readable name, as used in target names.
    pub fn pretty_name(self) -> &'static str {
        match self {
            ProductType::Application => "App",
            ProductType::OnDemandInstallCapableApplication => "App Clip",
            ProductType::WatchApp => "Watch App",
            ProductType::AppExtension => "App Extension",
            ProductType::WatchKitExtension => "WatchKit Extension",
            ProductType::Bundle => "Bundle",
            ProductType::UnitTestBundle => "Unit Tests",
            ProductType::UiTestBundle => "UI Tests",
            ProductType::Framework => "Framework",
            ProductType::StaticFramework => "Static Framework",
            ProductType::StaticLibrary => "Library",
            ProductType::DynamicLibrary => "Dynamic Library",
            ProductType::CommandLineTool => "Tool",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// The product a target variant produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    /// Product type
    #[serde(rename = "type")]
    pub product_type: ProductType,

    /// Product name (`PRODUCT_NAME`)
    pub name: String,

    /// Output path of the product
    #[serde(default)]
    pub path: Option<String>,
}

impl Product {
    /// Create a product without an output path.
    pub fn new(product_type: ProductType, name: impl Into<String>) -> Self {
        Product {
            product_type,
            name: name.into(),
            path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_matches_serde() {
        for product_type in [
            ProductType::Application,
            ProductType::StaticLibrary,
            ProductType::UnitTestBundle,
            ProductType::WatchApp,
        ] {
            let json = serde_json::to_string(&product_type).unwrap();
            assert_eq!(json, format!("\"{}\"", product_type.identifier()));
        }
    }

    #[test]
    fn test_product_deserialize() {
        let product: Product = serde_json::from_str(
            r#"{"type": "com.apple.product-type.framework", "name": "Core"}"#,
        )
        .unwrap();
        assert_eq!(product.product_type, ProductType::Framework);
        assert_eq!(product.path, None);
    }
}
