//! Record serialization primitives.
//!
//! Project objects are written in the old-style property list dialect used by
//! `project.pbxproj`. This module only knows how to quote values and lay out a
//! single record; which attributes go into a record is decided by callers.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::target::BuildSetting;

/// Values made only of these characters are written unquoted.
static BARE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_$/:.-]+$").expect("valid regex"));

/// Quote a value if the format requires it.
pub fn quote(value: &str) -> String {
    if BARE_VALUE.is_match(value) && !value.contains("//") && !value.contains("___") {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Render a build setting value.
pub fn setting_value(setting: &BuildSetting) -> String {
    match setting {
        BuildSetting::Bool(true) => "YES".to_string(),
        BuildSetting::Bool(false) => "NO".to_string(),
        BuildSetting::String(s) => quote(s),
        BuildSetting::Array(values) => {
            let mut out = String::from("(\n");
            for value in values {
                out.push_str(&format!("\t\t\t\t\t{},\n", quote(value)));
            }
            out.push_str("\t\t\t\t)");
            out
        }
    }
}

/// Builder for a single record.
///
/// ```rust,ignore
/// let content = Record::new("PBXGroup")
///     .list("children", &ids)
///     .field("path", "App")
///     .field("sourceTree", "<group>")
///     .finish();
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Start a record of the given class.
    pub fn new(isa: &str) -> Self {
        Record {
            fields: vec![("isa".to_string(), quote(isa))],
        }
    }

    /// Add a scalar field.
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.push((key.to_string(), quote(value)));
        self
    }

    /// Add a scalar field if the value is present.
    pub fn field_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    /// Add a field holding an identifier reference.
    pub fn reference(mut self, key: &str, identifier: &str) -> Self {
        self.fields.push((key.to_string(), identifier.to_string()));
        self
    }

    /// Add a list of identifier references.
    pub fn list(mut self, key: &str, identifiers: &[String]) -> Self {
        let mut value = String::from("(\n");
        for identifier in identifiers {
            value.push_str(&format!("\t\t\t\t{},\n", identifier));
        }
        value.push_str("\t\t\t)");
        self.fields.push((key.to_string(), value));
        self
    }

    /// Add a nested dictionary of build settings.
    pub fn settings(mut self, key: &str, settings: &BTreeMap<String, BuildSetting>) -> Self {
        let mut value = String::from("{\n");
        for (name, setting) in settings {
            value.push_str(&format!(
                "\t\t\t\t{} = {};\n",
                quote(name),
                setting_value(setting)
            ));
        }
        value.push_str("\t\t\t}");
        self.fields.push((key.to_string(), value));
        self
    }

    /// Serialize the record.
    pub fn finish(self) -> String {
        let multiline = self.fields.iter().any(|(_, v)| v.contains('\n'));
        let mut out = String::from("{");
        for (key, value) in &self.fields {
            if multiline {
                out.push_str(&format!("\n\t\t\t{} = {};", key, value));
            } else {
                out.push_str(&format!("{} = {}; ", key, value));
            }
        }
        if multiline {
            out.push_str("\n\t\t}");
        } else {
            out.push('}');
        }
        out
    }
}

/// A serialized project object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// Generated identifier
    pub identifier: String,

    /// Serialized record
    pub content: String,
}

impl Object {
    /// Create an object.
    pub fn new(identifier: impl Into<String>, content: impl Into<String>) -> Self {
        Object {
            identifier: identifier.into(),
            content: content.into(),
        }
    }
}

/// The project's object table.
///
/// Mutated sequentially only; parallel phases hand their results back to the
/// caller, which inserts them here in a fixed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectTable {
    objects: BTreeMap<String, String>,
}

impl ObjectTable {
    /// Create an empty table.
    pub fn new() -> Self {
        ObjectTable::default()
    }

    /// Insert an object, returning the previous content for its identifier.
    pub fn insert(&mut self, object: Object) -> Option<String> {
        self.objects.insert(object.identifier, object.content)
    }

    /// Insert many objects.
    pub fn extend(&mut self, objects: impl IntoIterator<Item = Object>) {
        for object in objects {
            self.insert(object);
        }
    }

    /// Look up an object's content.
    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.objects.get(identifier).map(String::as_str)
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Render the `objects` section of a project file.
    pub fn render(&self) -> String {
        let mut out = String::from("objects = {\n");
        for (identifier, content) in &self.objects {
            out.push_str(&format!("\t\t{} = {};\n", identifier, content));
        }
        out.push_str("\t};\n");
        out
    }
}
