//! Request models for the proxy API
//!
//! Turns an incoming `/api/*path` request into the upstream URL it maps to.

/// A request for an upstream resource (GET /api/*path)
///
/// # Fields
/// - `path`: Path below the upstream base URL, without a leading slash
/// - `query`: Raw query string, forwarded as-is
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub path: String,
    pub query: Option<String>,
}

impl ProxyRequest {
    pub fn new(path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            path: path.into(),
            query: query.filter(|q| !q.is_empty()),
        }
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.path.trim_matches('/').is_empty() {
            return Some("Path cannot be empty".to_string());
        }
        if self.path.contains("..") {
            return Some("Path cannot contain '..'".to_string());
        }
        // The URL parser treats '\\' as '/' for http(s)
        if self.path.contains('\\') {
            return Some("Path cannot contain '\\'".to_string());
        }
        if self.path.contains("://") {
            return Some("Path cannot contain a URL scheme".to_string());
        }
        None
    }

    /// Full upstream URL, which doubles as the cache key.
    pub fn upstream_url(&self, base: &str) -> String {
        let path = self.path.trim_start_matches('/');
        match &self.query {
            Some(query) => format!("{}/{}?{}", base, path, query),
            None => format!("{}/{}", base, path),
        }
    }
}
