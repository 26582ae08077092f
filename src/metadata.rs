//! Dataset metadata records, grouping and alias construction
//!
//! A [`Record`] describes one input dataset (its `dataset`, `exp`, `project`,
//! `filename`, ... attributes). Diagnostics group records by one attribute
//! and name their outputs after a composite alias built from several.

use crate::reporting::Reporter;
use std::collections::BTreeMap;

/// Flat string-keyed description of one dataset
pub type Record = BTreeMap<String, String>;

/// Attribute used as alias fallback when none of the requested ones exist
pub const DEFAULT_ALIAS_ATTRIBUTE: &str = "dataset";

/// Delimiter placed between alias components
pub const DEFAULT_ALIAS_DELIMITER: &str = "-";

/// Options for [`create_alias`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasOptions {
    /// Attribute whose value is returned when no requested attribute exists
    pub default: String,
    pub delimiter: String,
}

impl AliasOptions {
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }
}

impl Default for AliasOptions {
    fn default() -> Self {
        Self {
            default: DEFAULT_ALIAS_ATTRIBUTE.to_string(),
            delimiter: DEFAULT_ALIAS_DELIMITER.to_string(),
        }
    }
}

/// Build a composite identifier from selected record attributes
///
/// Values of the attributes present in `record` are joined with
/// `options.delimiter`, in the order given by `attributes`. When none of the
/// attributes exist, a warning is reported and the value of the
/// `options.default` attribute is returned instead (or the `default` text
/// itself if the record lacks that attribute as well).
pub fn create_alias<S: AsRef<str>>(
    record: &Record,
    attributes: &[S],
    options: &AliasOptions,
    reporter: &dyn Reporter,
) -> String {
    let parts: Vec<&str> = attributes
        .iter()
        .filter_map(|attr| record.get(attr.as_ref()).map(String::as_str))
        .collect();

    if parts.is_empty() {
        let alias = record
            .get(&options.default)
            .cloned()
            .unwrap_or_else(|| options.default.clone());
        let requested: Vec<&str> = attributes.iter().map(AsRef::as_ref).collect();
        reporter.warn(&format!(
            "Cannot create alias from attributes {requested:?}, none of them is available in \
             the dataset, using default '{alias}'"
        ));
        return alias;
    }

    parts.join(&options.delimiter)
}

/// Group records by the value of `key`
///
/// Records that do not carry `key` are left out.
pub fn group_metadata<'a, I>(records: I, key: &str) -> BTreeMap<String, Vec<Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<String, Vec<Record>> = BTreeMap::new();
    for record in records {
        if let Some(value) = record.get(key) {
            groups.entry(value.clone()).or_default().push(record.clone());
        }
    }
    groups
}

/// Fetch a required attribute
pub fn require_attribute<'a>(record: &'a Record, key: &str) -> crate::Result<&'a str> {
    record
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| crate::ClimDiagError::MissingAttribute {
            key: key.to_string(),
        })
}
