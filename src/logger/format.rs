//! Access log formats
//!
//! Three formats are supported: `combined` (Apache/Nginx combined),
//! `common` (CLF), and `json` (one object per line). Unknown names fall
//! back to `combined` so a typo in the configuration still logs.

use chrono::Local;

/// Timestamp layout shared by the text formats
const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Everything one access log line is built from
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    /// Local time the request was accepted
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Time spent handling the request, in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Start an entry for an accepted request. The response fields keep
    /// their defaults until the answer exists.
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Render the entry in the named format, `combined` when unknown
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.clf_line(),
            "json" => self.json_line(),
            _ => format!(
                "{} \"{}\" \"{}\"",
                self.clf_line(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
        }
    }

    /// The request line: method, path with query, protocol version
    fn request_line(&self) -> String {
        let query = self
            .query
            .as_ref()
            .map_or_else(String::new, |q| format!("?{q}"));
        format!(
            "{} {}{} HTTP/{}",
            self.method, self.path, query, self.http_version
        )
    }

    /// Common Log Format line, also the leading part of `combined`
    fn clf_line(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn json_line(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}
