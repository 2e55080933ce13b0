// API response building module
// Structured JSON responses carrying the CORS preamble, plus the error
// bodies of the router's taxonomy

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::{json, Value};

use crate::logger;

/// Methods advertised on the CORS preamble (and accepted by the router)
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";
/// Headers a browser may send on cross-origin requests
pub const ALLOWED_HEADERS: &str =
    "Origin, X-Requested-With, Content-Type, Accept, Authorization";

/// Status plus JSON body produced by the resource router.
///
/// A `body` of `None` is an intentionally empty payload (the preflight
/// answer); everything else serializes as pretty-printed JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub const fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub const fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    /// Render into a hyper response with the CORS preamble applied
    pub fn into_http(self) -> Response<Full<Bytes>> {
        let (status, payload) = match self.body {
            Some(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => (self.status, Bytes::from(text)),
                Err(e) => {
                    logger::log_error(&format!("Failed to serialize response body: {e}"));
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Bytes::from(r#"{"error":"Internal server error"}"#),
                    )
                }
            },
            None => (self.status, Bytes::new()),
        };

        with_preamble(Response::builder().status(status))
            .body(Full::new(payload))
            .unwrap_or_else(|e| {
                logger::log_error(&format!("Failed to build response: {e}"));
                Response::new(Full::new(Bytes::from(
                    r#"{"error":"Internal server error"}"#,
                )))
            })
    }
}

/// Apply the CORS preamble and JSON content type every API answer carries
fn with_preamble(builder: hyper::http::response::Builder) -> hyper::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", ALLOWED_HEADERS)
        .header("Content-Type", "application/json")
}

/// 200 with a JSON payload
pub fn ok(body: Value) -> ApiResponse {
    ApiResponse::json(StatusCode::OK, body)
}

/// 201 for an accepted creation
pub fn created(body: Value) -> ApiResponse {
    ApiResponse::json(StatusCode::CREATED, body)
}

/// Preflight short-circuit: 200 with an empty body
pub const fn preflight() -> ApiResponse {
    ApiResponse::empty(StatusCode::OK)
}

/// 404 for a path segment that names no collection
pub fn unknown_resource(name: &str) -> ApiResponse {
    ApiResponse::json(
        StatusCode::NOT_FOUND,
        json!({ "error": format!("Resource '{name}' not found") }),
    )
}

/// 404 for an id with no matching record
pub fn unknown_item(id: &str) -> ApiResponse {
    ApiResponse::json(
        StatusCode::NOT_FOUND,
        json!({ "error": format!("Item with id {id} not found") }),
    )
}

/// 405 for verbs outside the supported set, and for write verbs whose
/// path shape does not fit the operation
pub fn method_not_allowed() -> ApiResponse {
    ApiResponse::json(
        StatusCode::METHOD_NOT_ALLOWED,
        json!({ "error": "Method not allowed" }),
    )
}

/// 405 notice for write verbs against a read-only deployment
pub fn read_only_rejection() -> ApiResponse {
    ApiResponse::json(
        StatusCode::METHOD_NOT_ALLOWED,
        json!({
            "error": "Database is read-only",
            "message": "This deployment serves an immutable data snapshot",
            "suggestion": "Run the server with store.read_only = false to accept writes",
        }),
    )
}

/// 400 for write bodies that are not a JSON object
pub fn bad_request(message: &str) -> ApiResponse {
    ApiResponse::json(
        StatusCode::BAD_REQUEST,
        json!({ "error": "Invalid request body", "message": message }),
    )
}

/// 409 for a creation reusing an existing id
pub fn conflict(id: &str) -> ApiResponse {
    ApiResponse::json(
        StatusCode::CONFLICT,
        json!({ "error": format!("Item with id {id} already exists") }),
    )
}

/// 413 for declared bodies over the configured limit
pub fn payload_too_large(limit: u64) -> ApiResponse {
    ApiResponse::json(
        StatusCode::PAYLOAD_TOO_LARGE,
        json!({
            "error": "Payload too large",
            "message": format!("Request body exceeds the {limit} byte limit"),
        }),
    )
}

/// 500 fault boundary: any internal failure surfaces as this body
pub fn fault(message: &str) -> ApiResponse {
    ApiResponse::json(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Internal server error", "message": message }),
    )
}
