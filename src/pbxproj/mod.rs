//! Project file primitives.
//!
//! The generator decides what goes into each object; this module owns how
//! identifiers are issued and how records are laid out.

pub mod identifiers;
pub mod writer;

pub use identifiers::{IdentifierCache, Namespace};
pub use writer::{quote, Object, ObjectTable, Record};
