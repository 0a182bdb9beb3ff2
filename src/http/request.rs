//! Request view consumed by the router.
//!
//! # Responsibilities
//! - Expose the HTTP verb and path segments used for matching
//! - Answer post-template checks for template-bound routes
//! - Receive the parameters of the route that matched
//!
//! # Design Decisions
//! - One value per incoming request, never shared across threads
//! - Path segments are computed once at construction
//! - The matched route is recorded through `&self` so the router can
//!   hold a shared borrow for the whole declaration

use std::cell::RefCell;

use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;

use crate::routing::url_route::{split_segments, UrlRoute};

/// The request collaborator used by the router and middleware.
pub trait Request {
    /// Upper-case HTTP verb.
    fn method(&self) -> &str;

    /// Request path split on `/`, without leading or trailing slashes.
    fn path_segments(&self) -> &[String];

    /// Whether the request resolves to a post using template `slug`.
    fn is_post_template(&self, slug: &str) -> bool;

    /// Record the route that matched this request.
    fn set_current_route(&self, route: Option<&UrlRoute>);

    /// Header value, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Parameter captured by the matched route.
    fn route_param(&self, name: &str) -> Option<String>;
}

/// Request built from an incoming HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: String,
    path: String,
    segments: Vec<String>,
    headers: HeaderMap,
    post_template: Option<String>,
    route_params: RefCell<IndexMap<String, String>>,
}

impl HttpRequest {
    /// Create a request for `method` and `path` with no headers.
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            segments: split_segments(path),
            headers: HeaderMap::new(),
            post_template: None,
            route_params: RefCell::new(IndexMap::new()),
        }
    }

    /// Create a request from the head of an axum request.
    pub fn from_parts(parts: &Parts) -> Self {
        let mut request = Self::new(parts.method.as_str(), parts.uri.path());
        request.headers = parts.headers.clone();
        request
    }

    /// Add a header. Invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Ignoring invalid request header"),
        }
        self
    }

    /// Mark the request as resolving to a post rendered with `slug`.
    pub fn with_post_template(mut self, slug: impl Into<String>) -> Self {
        self.post_template = Some(slug.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// All parameters captured by the matched route.
    pub fn route_params(&self) -> IndexMap<String, String> {
        self.route_params.borrow().clone()
    }
}

impl Request for HttpRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn path_segments(&self) -> &[String] {
        &self.segments
    }

    fn is_post_template(&self, slug: &str) -> bool {
        self.post_template.as_deref() == Some(slug)
    }

    fn set_current_route(&self, route: Option<&UrlRoute>) {
        let params = route.map(|r| r.parameters().clone()).unwrap_or_default();
        *self.route_params.borrow_mut() = params;
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn route_param(&self, name: &str) -> Option<String> {
        self.route_params.borrow().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_method_is_upper_case() {
        let request = HttpRequest::new("post", "/contact");
        assert_eq!(request.method(), "POST");
        assert_eq!(request.path_segments(), ["contact"]);
    }

    #[test]
    fn test_from_parts() {
        let (parts, _) = axum::http::Request::builder()
            .method("PUT")
            .uri("http://example.com/blog/hello/?preview=true")
            .header("X-Theme", "snap")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let request = HttpRequest::from_parts(&parts);
        assert_eq!(request.method(), "PUT");
        assert_eq!(request.path(), "/blog/hello/");
        assert_eq!(request.path_segments(), ["blog", "hello"]);
        assert_eq!(request.header("x-theme"), Some("snap"));
    }

    #[test]
    fn test_post_template() {
        let request = HttpRequest::new("GET", "/about").with_post_template("landing");
        assert!(request.is_post_template("landing"));
        assert!(!request.is_post_template("default"));
        assert!(!HttpRequest::new("GET", "/").is_post_template("landing"));
    }

    #[test]
    fn test_set_current_route() {
        let request = HttpRequest::new("GET", "/blog/hello");
        let mut route = UrlRoute::new(request.path_segments().to_vec());
        route.add_url("blog/{slug}");

        request.set_current_route(Some(&route));
        assert_eq!(request.route_param("slug").as_deref(), Some("hello"));

        request.set_current_route(None);
        assert!(request.route_params().is_empty());
    }
}
