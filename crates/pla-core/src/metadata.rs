//! Metadata records and the field-value index.
//!
//! Frontmatter values arrive dynamically typed (scalar, list, null, nested
//! mapping). They are normalized once, at ingestion, into lists of strings;
//! every comparison downstream works on that normalized form.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Field name that the host's frontmatter parser injects to record source
/// offsets. It is never data.
pub const POSITION_FIELD: &str = "position";

/// One frontmatter field with its normalized values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataField<'a> {
    pub name: &'a str,
    pub values: &'a [String],
}

/// Ordered field name → values mapping for a single note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    fields: IndexMap<String, Vec<String>>,
}

impl MetadataRecord {
    /// Build a record from already-normalized fields. A repeated field name
    /// keeps its first position and accumulates values.
    pub fn from_fields<I, N, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let mut record = Self::default();
        for (name, values) in fields {
            record.push(name.into(), values.into_iter().map(Into::into));
        }
        record
    }

    /// Parse the YAML between the frontmatter delimiters.
    ///
    /// Returns `None` when the YAML is malformed or is not a mapping; such a
    /// note simply has no metadata.
    pub fn from_yaml(yaml: &str) -> Option<Self> {
        let value: Value = match serde_yaml::from_str(yaml) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed frontmatter");
                return None;
            }
        };
        Self::from_value(&value)
    }

    /// Normalize an already-parsed YAML value.
    pub fn from_value(value: &Value) -> Option<Self> {
        let mapping = match value {
            Value::Mapping(m) => m,
            Value::Tagged(tagged) => return Self::from_value(&tagged.value),
            _ => return None,
        };

        let mut record = Self::default();
        for (key, val) in mapping {
            let Some(name) = scalar_to_string(key) else {
                continue;
            };
            record.push(name, normalize_values(val));
        }
        Some(record)
    }

    fn push(&mut self, name: String, values: impl IntoIterator<Item = String>) {
        let field = self.fields.entry(name).or_default();
        for v in values {
            if !field.contains(&v) {
                field.push(v);
            }
        }
    }

    /// Iterate the fields in frontmatter order.
    pub fn fields(&self) -> impl Iterator<Item = MetadataField<'_>> {
        self.fields.iter().map(|(name, values)| MetadataField { name, values })
    }

    /// Iterate the fields that carry data (everything but `position`).
    pub fn data_fields(&self) -> impl Iterator<Item = MetadataField<'_>> {
        self.fields().filter(|f| f.name != POSITION_FIELD)
    }

    /// Values of the field with exactly this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

fn normalize_values(value: &Value) -> IndexSet<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

/// Compare two field names or values the way frontmatter authors expect:
/// equal ignoring case, or equal once both are capitalized
/// (`Company` / `company` / `COMPANY`).
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase() || capitalize_first(a) == capitalize_first(b)
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}

/// Field name → distinct values seen across the vault.
///
/// Values are stored case-sensitively in first-seen order; lookups by field
/// name fall back to [`names_match`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValueIndex {
    fields: BTreeMap<String, IndexSet<String>>,
}

impl FieldValueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge every data field of `record` into the index.
    pub fn merge_record(&mut self, record: &MetadataRecord) {
        for field in record.data_fields() {
            self.merge(field.name, field.values);
        }
    }

    /// Merge values for one field, skipping duplicates. `position` and empty
    /// value lists are ignored.
    pub fn merge(&mut self, name: &str, values: &[String]) {
        if name == POSITION_FIELD || values.is_empty() {
            return;
        }
        self.fields
            .entry(name.to_string())
            .or_default()
            .extend(values.iter().cloned());
    }

    /// Values for the field with exactly this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IndexSet<String>> {
        self.fields.get(name)
    }

    /// Values for `name`, trying an exact match before a case-insensitive one.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&IndexSet<String>> {
        self.get(name).or_else(|| {
            self.fields
                .iter()
                .find(|(k, _)| names_match(k, name))
                .map(|(_, v)| v)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
