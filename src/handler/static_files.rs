//! Static site serving module
//!
//! The long-running deployment hosts the built frontend next to the API.
//! Lookups are best-effort: a missing directory or file is a miss, and the
//! caller falls through to the resource router.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::SiteConfig;
use crate::logger;

/// Try to serve a request path from the static directory.
///
/// Returns `None` when static serving is disabled, the path does not
/// resolve to a file, or the file cannot be read.
pub async fn try_serve(
    site: &SiteConfig,
    path: &str,
    is_head: bool,
) -> Option<Response<Full<Bytes>>> {
    let static_dir = site.static_dir.as_deref().filter(|dir| !dir.is_empty())?;
    let file_path = resolve(static_dir, path, &site.index_files)?;

    let content = match fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to read static file '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    let content_type = content_type_for(file_path.extension().and_then(|e| e.to_str()));
    Some(build_file_response(content, content_type, is_head))
}

/// Map a URL path to a file inside the static directory.
///
/// Directory requests fall back to the configured index files, and the
/// canonicalized result must stay inside the static root.
fn resolve(static_dir: &str, path: &str, index_files: &[String]) -> Option<PathBuf> {
    // Remove leading slashes and neutralize traversal segments
    let clean = path.trim_start_matches('/').replace("..", "");
    let mut file_path = Path::new(static_dir).join(&clean);

    if file_path.is_dir() || clean.is_empty() || clean.ends_with('/') {
        let index = index_files
            .iter()
            .map(|index_file| file_path.join(index_file))
            .find(|candidate| candidate.is_file())?;
        file_path = index;
    }

    // A missing static root or file is an ordinary miss
    let root = Path::new(static_dir).canonicalize().ok()?;
    let resolved = file_path.canonicalize().ok()?;
    if !resolved.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {path} -> {}",
            resolved.display()
        ));
        return None;
    }

    Some(file_path)
}

fn build_file_response(
    content: Vec<u8>,
    content_type: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build static response: {e}"));
            Response::new(Full::new(Bytes::new()))
        })
}

/// Content-Type for the file extensions a built frontend ships with
fn content_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js" | "mjs") => "application/javascript",
        Some("json" | "map") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;

    #[test]
    fn test_content_type_common_extensions() {
        assert_eq!(content_type_for(Some("html")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Some("js")), "application/javascript");
        assert_eq!(content_type_for(Some("svg")), "image/svg+xml");
        assert_eq!(content_type_for(Some("woff2")), "font/woff2");
    }

    #[test]
    fn test_content_type_unknown_extension() {
        assert_eq!(content_type_for(Some("xyz")), "application/octet-stream");
        assert_eq!(content_type_for(None), "application/octet-stream");
    }

    #[test]
    fn test_resolve_prefers_exact_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std_fs::write(dir.path().join("app.js"), "console.log(1)").expect("write");

        let static_dir = dir.path().to_str().expect("utf-8 path");
        let resolved = resolve(static_dir, "/app.js", &["index.html".to_string()]);
        assert_eq!(resolved, Some(dir.path().join("app.js")));
    }

    #[test]
    fn test_resolve_falls_back_to_index_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std_fs::write(dir.path().join("index.html"), "<html></html>").expect("write");

        let static_dir = dir.path().to_str().expect("utf-8 path");
        let resolved = resolve(static_dir, "/", &["index.html".to_string()]);
        assert_eq!(resolved, Some(dir.path().join("index.html")));
    }

    #[test]
    fn test_resolve_miss_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let static_dir = dir.path().to_str().expect("utf-8 path");
        assert_eq!(resolve(static_dir, "/missing.css", &[]), None);
    }

    #[test]
    fn test_resolve_refuses_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let static_dir = dir.path().join("dist");
        std_fs::create_dir(&static_dir).expect("mkdir");
        std_fs::write(dir.path().join("secret.txt"), "hidden").expect("write");

        let static_dir = static_dir.to_str().expect("utf-8 path");
        assert_eq!(resolve(static_dir, "/../secret.txt", &[]), None);
    }
}
