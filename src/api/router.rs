//! Resource routing core
//!
//! The deployment-independent heart of the API: pure functions from a store
//! snapshot and routing inputs to a status-plus-body outcome. The hyper
//! adapter in the parent module stays thin; everything testable lives here.

use serde_json::{json, Map, Value};

use super::query;
use super::response::{self, ApiResponse};
use crate::store::{self, DocumentStore};

/// The six collections declared in the index document's endpoint table
pub const CANONICAL_COLLECTIONS: [&str; 6] = [
    "students",
    "lecturers",
    "courses",
    "class-sections",
    "enrollment-records",
    "users",
];

/// Split a request path into routing segments.
///
/// The configured API prefix is stripped when the path starts with it, and
/// empty segments are discarded, so `/api/students/1` and `/students/1/`
/// both route as `["students", "1"]`.
pub fn path_segments<'a>(path: &'a str, prefix: &str) -> Vec<&'a str> {
    let routed = if prefix.is_empty() {
        path
    } else {
        path.strip_prefix(prefix).unwrap_or(path)
    };
    routed.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// The index document: a welcome line, the live collection names, and the
/// declared endpoint table.
pub fn index_document(store: &DocumentStore, prefix: &str) -> ApiResponse {
    let resources: Vec<&str> = store.collection_names().collect();
    let endpoints: Map<String, Value> = CANONICAL_COLLECTIONS
        .iter()
        .map(|name| ((*name).to_string(), Value::String(format!("{prefix}/{name}"))))
        .collect();

    response::ok(json!({
        "message": "API is working!",
        "resources": resources,
        "endpoints": endpoints,
    }))
}

/// A collection listing, narrowed by any query-string equality filters
pub fn list_collection(
    store: &DocumentStore,
    name: &str,
    raw_query: Option<&str>,
) -> ApiResponse {
    let Some(records) = store.records(name) else {
        return response::unknown_resource(name);
    };

    let filters = raw_query.map_or_else(Vec::new, query::parse_filters);
    let items: Vec<Value> = if filters.is_empty() {
        records.to_vec()
    } else {
        records
            .iter()
            .filter(|record| store::matches_filters(record, &filters))
            .cloned()
            .collect()
    };
    response::ok(Value::Array(items))
}

/// A single record fetched by loose id comparison
pub fn fetch_item(store: &DocumentStore, name: &str, id: &str) -> ApiResponse {
    match store.find_by_id(name, id) {
        Some(record) => response::ok(record.clone()),
        None => response::unknown_item(id),
    }
}
