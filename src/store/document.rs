//! Document store module
//!
//! The whole database is one flat JSON document: an object mapping
//! collection names to arrays of records. It is loaded into memory once at
//! startup and written back as a whole after each accepted mutation.

use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// In-memory document store, keyed by collection name
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    collections: BTreeMap<String, Vec<Value>>,
}

/// Errors raised while loading the store from disk
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Parse(serde_json::Error),
    /// Top level is not an object, or a collection is not an array
    Shape(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read database file: {e}"),
            Self::Parse(e) => write!(f, "database file is not valid JSON: {e}"),
            Self::Shape(message) => write!(f, "unexpected database shape: {message}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl DocumentStore {
    /// Parse a store from raw JSON text
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let root: Value = serde_json::from_str(text)?;
        let Value::Object(entries) = root else {
            return Err(LoadError::Shape(
                "top level must be an object mapping collection names to arrays".to_string(),
            ));
        };

        let mut collections = BTreeMap::new();
        for (name, value) in entries {
            match value {
                Value::Array(records) => {
                    collections.insert(name, records);
                }
                other => {
                    return Err(LoadError::Shape(format!(
                        "collection '{name}' must be an array of records, got {}",
                        json_type(&other)
                    )));
                }
            }
        }
        Ok(Self { collections })
    }

    /// Load the store from a JSON file
    pub fn load_file(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Collection names in sorted order
    pub fn collection_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.collections.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Records of a collection, in stored order
    pub fn records(&self, name: &str) -> Option<&[Value]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    pub fn records_mut(&mut self, name: &str) -> Option<&mut Vec<Value>> {
        self.collections.get_mut(name)
    }

    /// First record whose `id` field loosely equals the given identifier
    pub fn find_by_id(&self, name: &str, id: &str) -> Option<&Value> {
        self.records(name)?.iter().find(|record| id_matches(record, id))
    }

    /// One-line summary for startup logging
    pub fn summary(&self) -> String {
        let records: usize = self.collections.values().map(Vec::len).sum();
        format!("{} collections, {records} records", self.collections.len())
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.collections)
    }

    /// Serialize the whole store back to the database file
    pub fn save_file(&self, path: &Path) -> io::Result<()> {
        let text = self
            .to_json_pretty()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalize a JSON value to its loose textual form: strings compare by
/// their content, everything else by its serialized text.
pub fn loose_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Loose equality between a record field and a path- or query-supplied
/// string, so the numeric id `1` matches the path segment `"1"`.
///
/// # Examples
/// ```
/// use campus_api::store::loose_eq;
/// use serde_json::json;
///
/// assert!(loose_eq(&json!(1), "1"));
/// assert!(loose_eq(&json!("1"), "1"));
/// assert!(!loose_eq(&json!(10), "1"));
/// ```
pub fn loose_eq(field: &Value, supplied: &str) -> bool {
    loose_text(field) == supplied
}

/// Whether a record's `id` field loosely equals the given identifier.
/// Records without an `id` (and non-object records) never match.
pub fn id_matches(record: &Value, id: &str) -> bool {
    record.get("id").is_some_and(|field| loose_eq(field, id))
}

/// Position of the record matching an id within a collection
pub fn position_by_id(records: &[Value], id: &str) -> Option<usize> {
    records.iter().position(|record| id_matches(record, id))
}

/// Whether a record satisfies every (field, value) equality constraint.
/// A missing field is a non-match, never an error.
pub fn matches_filters(record: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(field, expected)| {
        record
            .get(field.as_str())
            .is_some_and(|value| loose_eq(value, expected))
    })
}

/// Next id for a created record: one past the largest numeric id present,
/// saturating at the top of the `i64` range
pub fn next_id(records: &[Value]) -> i64 {
    records
        .iter()
        .filter_map(|record| record.get("id"))
        .filter_map(numeric_id)
        .max()
        .map_or(1, |largest| largest.saturating_add(1))
}

fn numeric_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
