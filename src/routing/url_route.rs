//! URL pattern matching against the request path.
//!
//! # Responsibilities
//! - Split a declared pattern into segments
//! - Compare segment-by-segment with the request path
//! - Capture `{name}` placeholders as route parameters
//! - Apply optional per-parameter regex constraints
//!
//! # Design Decisions
//! - Segment count mismatch is a fast reject, no segment is compared
//! - Literal segments compare case-sensitively
//! - Captures are committed only when the whole pattern matched
//! - Constraints are anchored over the full captured value
//! - Each constraint pattern is compiled once per process, invalid ones included

use std::sync::LazyLock;

use dashmap::DashMap;
use indexmap::IndexMap;
use regex::Regex;

/// Compiled constraints keyed by their source pattern; `None` if invalid.
static CONSTRAINTS: LazyLock<DashMap<String, Option<Regex>>> = LazyLock::new(DashMap::new);

/// Split a path or pattern into segments.
///
/// Leading and trailing slashes are ignored, so `/blog/post/` and
/// `blog/post` both yield `["blog", "post"]`. The root path yields a
/// single empty segment.
pub fn split_segments(path: &str) -> Vec<String> {
    path.trim_matches('/').split('/').map(str::to_string).collect()
}

/// A declared URL pattern evaluated against one request path.
#[derive(Debug, Clone, Default)]
pub struct UrlRoute {
    /// Segments of the current request path.
    segments: Vec<String>,
    /// Segments of the most recently added pattern.
    parts: Vec<String>,
    /// Captured placeholder values, in pattern order.
    params: IndexMap<String, String>,
    matches: bool,
}

impl UrlRoute {
    /// Create an unmatched route for the given request path segments.
    pub fn new(segments: impl Into<Vec<String>>) -> Self {
        Self {
            segments: segments.into(),
            ..Self::default()
        }
    }

    /// Match `pattern` against the request path.
    ///
    /// On success the captured placeholders are added to
    /// [`parameters`](Self::parameters) and the route matches. On any
    /// mismatch the route stops matching and nothing is captured.
    pub fn add_url(&mut self, pattern: &str) {
        self.parts = split_segments(pattern);

        if self.parts.len() != self.segments.len() {
            self.matches = false;
            return;
        }

        let mut captured = IndexMap::new();
        for (part, actual) in self.parts.iter().zip(&self.segments) {
            if let Some(name) = part.strip_prefix('{') {
                let name = name.strip_suffix('}').unwrap_or(name);
                captured.insert(name.to_string(), actual.clone());
                continue;
            }

            if part != actual {
                self.matches = false;
                return;
            }
        }

        self.params.extend(captured);
        self.matches = true;
    }

    /// Constrain captured parameters with regular expressions.
    ///
    /// Keys that were never captured are ignored. The first failing
    /// constraint stops evaluation and the route no longer matches.
    pub fn add_tests<I, K, V>(&mut self, tests: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, pattern) in tests {
            let Some(value) = self.params.get(key.as_ref()) else {
                continue;
            };

            if !constraint_matches(pattern.as_ref(), value) {
                self.matches = false;
                return;
            }
        }
    }

    /// Whether the route currently matches the request.
    pub fn is_match(&self) -> bool {
        self.matches
    }

    /// Captured parameters. Only meaningful when the route matches.
    pub fn parameters(&self) -> &IndexMap<String, String> {
        &self.params
    }

    /// A single captured parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Segments of the last pattern passed to [`add_url`](Self::add_url).
    pub fn parts(&self) -> &[String] {
        &self.parts
    }
}

fn constraint_matches(pattern: &str, value: &str) -> bool {
    compiled(pattern).is_some_and(|re| re.is_match(value))
}

fn compiled(pattern: &str) -> Option<Regex> {
    if let Some(cached) = CONSTRAINTS.get(pattern) {
        return cached.clone();
    }

    let compiled = match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "Invalid route constraint");
            None
        }
    };
    CONSTRAINTS.insert(pattern.to_string(), compiled.clone());
    compiled
}
