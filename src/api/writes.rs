//! Write engine
//!
//! Create, replace, merge, and delete records by id against the mutable
//! store. Accepted creations are stamped with `createdAt` and accepted
//! updates with `updatedAt`, both in epoch milliseconds. Arity is strict:
//! POST addresses a collection, the other verbs address a single record.

use chrono::Utc;
use hyper::body::Bytes;
use hyper::Method;
use serde_json::{json, Map, Value};

use super::response::{self, ApiResponse};
use crate::store::{self, DocumentStore};

/// Field stamped on accepted creations (epoch milliseconds)
const CREATED_AT: &str = "createdAt";
/// Field stamped on accepted replacements and merges (epoch milliseconds)
const UPDATED_AT: &str = "updatedAt";

/// Apply a write verb to the store. The caller persists on success.
pub fn apply(
    store: &mut DocumentStore,
    method: &Method,
    collection: &str,
    id: Option<&str>,
    body: Option<&Bytes>,
) -> ApiResponse {
    match (method, id) {
        (&Method::POST, None) => create(store, collection, body),
        (&Method::PUT, Some(item)) => replace(store, collection, item, body),
        (&Method::PATCH, Some(item)) => merge(store, collection, item, body),
        (&Method::DELETE, Some(item)) => remove(store, collection, item),
        _ => response::method_not_allowed(),
    }
}

/// Parse a write body into a JSON object, or the 400 that rejects it
fn parse_object(body: Option<&Bytes>) -> Result<Map<String, Value>, ApiResponse> {
    let Some(bytes) = body else {
        return Err(response::bad_request("request body is required"));
    };
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| response::bad_request(&format!("invalid JSON: {e}")))?;
    match value {
        Value::Object(record) => Ok(record),
        _ => Err(response::bad_request("request body must be a JSON object")),
    }
}

fn timestamp_ms() -> Value {
    Value::from(Utc::now().timestamp_millis())
}

fn create(store: &mut DocumentStore, collection: &str, body: Option<&Bytes>) -> ApiResponse {
    let mut record = match parse_object(body) {
        Ok(record) => record,
        Err(rejection) => return rejection,
    };
    let Some(records) = store.records_mut(collection) else {
        return response::unknown_resource(collection);
    };

    let supplied_id = record.get("id").map(|id| store::loose_text(id).into_owned());
    match supplied_id {
        Some(id_text) => {
            if store::position_by_id(records, &id_text).is_some() {
                return response::conflict(&id_text);
            }
        }
        None => {
            record.insert("id".to_string(), Value::from(store::next_id(records)));
        }
    }
    record.insert(CREATED_AT.to_string(), timestamp_ms());

    let stored = Value::Object(record);
    records.push(stored.clone());
    response::created(stored)
}

fn replace(
    store: &mut DocumentStore,
    collection: &str,
    id: &str,
    body: Option<&Bytes>,
) -> ApiResponse {
    let mut record = match parse_object(body) {
        Ok(record) => record,
        Err(rejection) => return rejection,
    };
    let Some(records) = store.records_mut(collection) else {
        return response::unknown_resource(collection);
    };
    let Some(position) = store::position_by_id(records, id) else {
        return response::unknown_item(id);
    };

    // The stored id wins over whatever the body claims
    if let Some(existing_id) = records[position].get("id") {
        record.insert("id".to_string(), existing_id.clone());
    }
    record.insert(UPDATED_AT.to_string(), timestamp_ms());

    let stored = Value::Object(record);
    records[position] = stored.clone();
    response::ok(stored)
}

fn merge(
    store: &mut DocumentStore,
    collection: &str,
    id: &str,
    body: Option<&Bytes>,
) -> ApiResponse {
    let patch = match parse_object(body) {
        Ok(record) => record,
        Err(rejection) => return rejection,
    };
    let Some(records) = store.records_mut(collection) else {
        return response::unknown_resource(collection);
    };
    let Some(position) = store::position_by_id(records, id) else {
        return response::unknown_item(id);
    };
    let Some(existing) = records[position].as_object_mut() else {
        return response::unknown_item(id);
    };

    for (field, value) in patch {
        // The record id is not patchable
        if field == "id" {
            continue;
        }
        existing.insert(field, value);
    }
    existing.insert(UPDATED_AT.to_string(), timestamp_ms());

    response::ok(Value::Object(existing.clone()))
}

fn remove(store: &mut DocumentStore, collection: &str, id: &str) -> ApiResponse {
    let Some(records) = store.records_mut(collection) else {
        return response::unknown_resource(collection);
    };
    let Some(position) = store::position_by_id(records, id) else {
        return response::unknown_item(id);
    };
    records.remove(position);
    response::ok(json!({}))
}
