// API module entry
// Hyper adapter around the resource-routing core: reads write bodies,
// dispatches against the store, and keeps the fault boundary that turns
// internal failures into structured 500 answers instead of crashes

pub mod query;
pub mod response;
pub mod router;
pub mod writes;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::{HeaderMap, CONTENT_LENGTH};
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::logger;
use response::ApiResponse;

/// Serve one API request: extract the routing inputs, run the dispatcher,
/// and render the outcome with the CORS preamble.
pub async fn handle(req: Request<Incoming>, state: &AppState) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let raw_query = req.uri().query().map(ToString::to_string);

    // Only write verbs carry a body worth reading, and only when the
    // store accepts writes at all
    let outcome = if is_write(&method) && !state.read_only() {
        match read_body(req, state.config.http.max_body_size).await {
            Ok(body) => {
                dispatch(state, &method, &path, raw_query.as_deref(), Some(&body)).await
            }
            Err(rejection) => rejection,
        }
    } else {
        dispatch(state, &method, &path, raw_query.as_deref(), None).await
    };

    outcome.into_http()
}

/// Route one request against the store.
///
/// Resolution order: preflight short-circuit, index document for the bare
/// prefix, collection resolution (an unknown name outranks method
/// dispatch), then reads, writes, and the 405 fallback.
pub async fn dispatch(
    state: &AppState,
    method: &Method,
    path: &str,
    raw_query: Option<&str>,
    body: Option<&Bytes>,
) -> ApiResponse {
    if *method == Method::OPTIONS {
        return response::preflight();
    }

    let prefix = &state.config.http.path_prefix;
    let segments = router::path_segments(path, prefix);

    let Some((&collection, rest)) = segments.split_first() else {
        let store = state.store.read().await;
        return router::index_document(&store, prefix);
    };
    let id = rest.first().copied();

    if !state.store.read().await.contains(collection) {
        return response::unknown_resource(collection);
    }

    if *method == Method::GET {
        let store = state.store.read().await;
        return match id {
            Some(item) => router::fetch_item(&store, collection, item),
            None => router::list_collection(&store, collection, raw_query),
        };
    }

    if is_write(method) {
        if state.read_only() {
            return response::read_only_rejection();
        }
        return apply_write(state, method, collection, id, body).await;
    }

    response::method_not_allowed()
}

/// Run a mutation under the write lock and persist it before answering
async fn apply_write(
    state: &AppState,
    method: &Method,
    collection: &str,
    id: Option<&str>,
    body: Option<&Bytes>,
) -> ApiResponse {
    let mut store = state.store.write().await;
    let outcome = writes::apply(&mut store, method, collection, id, body);

    if outcome.status.is_success() {
        if let Err(e) = store.save_file(&state.db_path) {
            logger::log_error(&format!(
                "Failed to persist store to '{}': {e}",
                state.db_path.display()
            ));
            return response::fault(&format!("failed to persist store: {e}"));
        }
    }
    outcome
}

fn is_write(method: &Method) -> bool {
    matches!(
        method,
        &Method::POST | &Method::PUT | &Method::PATCH | &Method::DELETE
    )
}

/// Collect a write body, honoring the configured size limit. An oversized
/// declared length is refused before any frame is read; chunked bodies
/// declare no length, so the cap is also enforced while collecting.
async fn read_body<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, ApiResponse>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(length) = declared_length(req.headers()) {
        if length > max_body_size {
            logger::log_warning(&format!(
                "Request body too large: {length} bytes (max: {max_body_size})"
            ));
            return Err(response::payload_too_large(max_body_size));
        }
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!(
                "Request body too large: over {max_body_size} bytes without a declared length"
            ));
            Err(response::payload_too_large(max_body_size))
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            Err(response::fault(&format!("failed to read request body: {e}")))
        }
    }
}

/// Parse the Content-Length header when present and well-formed
fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig,
        StoreConfig,
    };
    use crate::store::DocumentStore;
    use hyper::StatusCode;
    use serde_json::json;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"{
        "students": [
            {"id": 1, "name": "Nadia Putri", "year": 2},
            {"id": 2, "name": "Joshua Lim", "year": 3}
        ],
        "users": [
            {"id": 1, "username": "admin", "role": "admin"}
        ]
    }"#;

    fn test_state(read_only: bool, db_path: PathBuf) -> AppState {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            store: StoreConfig {
                data_dir: "data".to_string(),
                template: "db.json".to_string(),
                read_only,
            },
            http: HttpConfig {
                path_prefix: "/api".to_string(),
                max_body_size: 1_048_576,
            },
            site: SiteConfig {
                static_dir: None,
                index_files: vec![],
            },
            logging: LoggingConfig {
                access_log: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
            },
        };
        let store = DocumentStore::from_json(SAMPLE).expect("sample store should parse");
        AppState::new(config, store, db_path)
    }

    #[tokio::test]
    async fn test_options_short_circuits_on_any_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(true, dir.path().join("db.json"));

        for path in ["/api", "/api/students", "/api/ghosts/41", "/anything"] {
            let outcome = dispatch(&state, &Method::OPTIONS, path, None, None).await;
            assert_eq!(outcome.status, StatusCode::OK, "path: {path}");
            assert_eq!(outcome.body, None, "path: {path}");
        }
    }

    #[tokio::test]
    async fn test_bare_prefix_serves_index_for_any_method() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(true, dir.path().join("db.json"));

        for method in [Method::GET, Method::POST, Method::DELETE] {
            let outcome = dispatch(&state, &method, "/api", None, None).await;
            assert_eq!(outcome.status, StatusCode::OK, "method: {method}");
            let body = outcome.body.expect("body");
            assert_eq!(body["message"], "API is working!");
            assert_eq!(body["resources"], json!(["students", "users"]));
        }
    }

    #[tokio::test]
    async fn test_collections_answer_prefixed_and_root_mounted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(true, dir.path().join("db.json"));

        let prefixed = dispatch(&state, &Method::GET, "/api/students/1", None, None).await;
        let rooted = dispatch(&state, &Method::GET, "/students/1", None, None).await;
        assert_eq!(prefixed.status, StatusCode::OK);
        assert_eq!(prefixed.body, rooted.body);
    }

    #[tokio::test]
    async fn test_unknown_collection_outranks_method_dispatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(true, dir.path().join("db.json"));

        let outcome = dispatch(&state, &Method::POST, "/api/ghosts", None, None).await;
        assert_eq!(outcome.status, StatusCode::NOT_FOUND);
        assert_eq!(
            outcome.body.expect("body")["error"],
            "Resource 'ghosts' not found"
        );
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes_and_leaves_store_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("db.json");
        let state = test_state(true, db_path.clone());

        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let path = if method == Method::POST {
                "/api/students"
            } else {
                "/api/students/1"
            };
            let outcome = dispatch(&state, &method, path, None, None).await;
            assert_eq!(outcome.status, StatusCode::METHOD_NOT_ALLOWED, "method: {method}");
            assert_eq!(
                outcome.body.expect("body")["error"],
                "Database is read-only"
            );
        }

        let listing = dispatch(&state, &Method::GET, "/api/students", None, None).await;
        let records = listing.body.expect("body");
        assert_eq!(records.as_array().expect("array").len(), 2);
        assert!(!db_path.exists(), "rejected writes must not touch disk");
    }

    #[tokio::test]
    async fn test_other_methods_are_not_allowed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(true, dir.path().join("db.json"));

        let outcome = dispatch(&state, &Method::HEAD, "/api/students", None, None).await;
        assert_eq!(outcome.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(outcome.body.expect("body")["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_list_filtering_through_dispatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(true, dir.path().join("db.json"));

        let outcome =
            dispatch(&state, &Method::GET, "/api/students", Some("year=3"), None).await;
        let body = outcome.body.expect("body");
        let matched = body.as_array().expect("array");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0]["name"], "Joshua Lim");
    }

    #[tokio::test]
    async fn test_repeated_reads_serialize_identically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(true, dir.path().join("db.json"));

        let first = dispatch(&state, &Method::GET, "/api/students", None, None).await;
        let second = dispatch(&state, &Method::GET, "/api/students", None, None).await;
        let first_text =
            serde_json::to_string_pretty(&first.body.expect("body")).expect("serialize");
        let second_text =
            serde_json::to_string_pretty(&second.body.expect("body")).expect("serialize");
        assert_eq!(first_text, second_text);
    }

    #[tokio::test]
    async fn test_accepted_write_persists_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("db.json");
        let state = test_state(false, db_path.clone());

        let body = Bytes::from(r#"{"name": "Mei Chen", "year": 1}"#.to_string());
        let outcome =
            dispatch(&state, &Method::POST, "/api/students", None, Some(&body)).await;
        assert_eq!(outcome.status, StatusCode::CREATED);

        let saved = std::fs::read_to_string(&db_path).expect("database file written");
        let reloaded = DocumentStore::from_json(&saved).expect("valid database");
        assert_eq!(reloaded.records("students").expect("students").len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_write_persists_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("db.json");
        let state = test_state(false, db_path.clone());

        let body = Bytes::from(r#"{"id": 1, "name": "Impostor"}"#.to_string());
        let outcome =
            dispatch(&state, &Method::POST, "/api/students", None, Some(&body)).await;
        assert_eq!(outcome.status, StatusCode::CONFLICT);
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn test_persistence_failure_surfaces_as_fault() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Parent directory does not exist, so the save must fail
        let db_path = dir.path().join("missing").join("db.json");
        let state = test_state(false, db_path);

        let body = Bytes::from(r#"{"name": "Mei Chen"}"#.to_string());
        let outcome =
            dispatch(&state, &Method::POST, "/api/students", None, Some(&body)).await;
        assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            outcome.body.expect("body")["error"],
            "Internal server error"
        );
    }

    #[test]
    fn test_declared_length_parses_only_well_formed_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), None);

        headers.insert(CONTENT_LENGTH, "512".parse().expect("header value"));
        assert_eq!(declared_length(&headers), Some(512));

        headers.insert(CONTENT_LENGTH, "lots".parse().expect("header value"));
        assert_eq!(declared_length(&headers), None);
    }

    fn write_request(payload: &str) -> Request<Full<Bytes>> {
        // Built without a Content-Length header, like a chunked upload
        Request::builder()
            .method(Method::POST)
            .uri("/api/students")
            .body(Full::new(Bytes::from(payload.to_string())))
            .expect("request")
    }

    #[tokio::test]
    async fn test_body_within_limit_is_collected() {
        let payload = r#"{"name": "Nadia Putri"}"#;
        let collected = read_body(write_request(payload), 1024)
            .await
            .expect("body should collect");
        assert_eq!(&collected[..], payload.as_bytes());
    }

    #[tokio::test]
    async fn test_undeclared_body_over_limit_is_rejected() {
        let payload = "x".repeat(64);
        let outcome = read_body(write_request(&payload), 16).await;
        let rejection = outcome.expect_err("oversized body should be rejected");
        assert_eq!(rejection.status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
