//! Request handler module
//!
//! Top-level dispatch between the static site and the JSON API. Reads
//! outside the API prefix are first tried against the static directory and
//! fall through to the resource router on a miss, so the collections answer
//! at the root exactly like under the prefix.

pub mod static_files;

use http_body_util::Full;
use hyper::body::{Body as _, Bytes, Incoming};
use hyper::header::{REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::api;
use crate::config::AppState;
use crate::logger;
use crate::logger::AccessLogEntry;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_text(req.version()).to_string();
    entry.referer = header_text(&req, REFERER);
    entry.user_agent = header_text(&req, USER_AGENT);

    let response = route(req, &state).await;

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = body_len(&response);
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch between static lookup and the API
async fn route(req: Request<Incoming>, state: &AppState) -> Response<Full<Bytes>> {
    let method = req.method();
    let path = req.uri().path();
    let is_head = *method == Method::HEAD;

    // Static lookup only makes sense for reads outside the API prefix
    if (*method == Method::GET || is_head)
        && !under_prefix(path, &state.config.http.path_prefix)
    {
        if let Some(response) = static_files::try_serve(&state.config.site, path, is_head).await
        {
            return response;
        }
    }

    api::handle(req, state).await
}

fn under_prefix(path: &str, prefix: &str) -> bool {
    !prefix.is_empty() && path.starts_with(prefix)
}

fn header_text(req: &Request<Incoming>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn version_text(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}

fn body_len(response: &Response<Full<Bytes>>) -> usize {
    usize::try_from(response.body().size_hint().exact().unwrap_or(0)).unwrap_or(usize::MAX)
}
