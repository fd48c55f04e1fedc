//! Xcode targets.
//!
//! Target variants are consolidated into Xcode targets, given unique display
//! names and then turned into native targets with merged build settings.

pub mod consolidate;
pub mod disambiguate;
pub mod settings;

pub use consolidate::{consolidate_targets, Consolidation, ConsolidatedTarget, ConsolidationKey};
pub use disambiguate::{disambiguate_targets, DisambiguatedTarget};
pub use settings::{apply_target_settings, compute_target_settings, AppliedTarget, TargetSettings};
