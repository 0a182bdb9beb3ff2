//! Controller dispatch targets.

use std::fmt;

use crate::routing::error::RoutingError;

/// Where a matched route dispatches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerTarget {
    /// `"Class@method"`, with `Class` relative to the router namespace.
    ClassAndMethod { class: String, method: String },
    /// `(class, method)` with a fully-qualified class.
    Pair { class: String, method: String },
}

impl ControllerTarget {
    /// Parse a `Class@method` string.
    pub fn parse(spec: &str) -> Result<Self, RoutingError> {
        match spec.split_once('@') {
            Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                Ok(Self::ClassAndMethod {
                    class: class.to_string(),
                    method: method.to_string(),
                })
            }
            _ => Err(RoutingError::InvalidTarget(spec.to_string())),
        }
    }

    pub fn pair(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Pair {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Fully-qualified class name, resolving relative classes against `namespace`.
    pub fn class_in(&self, namespace: &str) -> String {
        match self {
            Self::ClassAndMethod { class, .. } => {
                let namespace = namespace.trim_end_matches("::");
                if namespace.is_empty() {
                    class.clone()
                } else {
                    format!("{namespace}::{class}")
                }
            }
            Self::Pair { class, .. } => class.clone(),
        }
    }

    pub fn method(&self) -> &str {
        match self {
            Self::ClassAndMethod { method, .. } | Self::Pair { method, .. } => method,
        }
    }
}

impl fmt::Display for ControllerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassAndMethod { class, method } => write!(f, "{class}@{method}"),
            Self::Pair { class, method } => write!(f, "{class}::{method}"),
        }
    }
}

/// Conversion into a dispatch target, used by `Router::dispatch`.
pub trait IntoTarget {
    fn into_target(self) -> Result<ControllerTarget, RoutingError>;
}

impl IntoTarget for ControllerTarget {
    fn into_target(self) -> Result<ControllerTarget, RoutingError> {
        Ok(self)
    }
}

impl IntoTarget for &str {
    fn into_target(self) -> Result<ControllerTarget, RoutingError> {
        ControllerTarget::parse(self)
    }
}

impl IntoTarget for String {
    fn into_target(self) -> Result<ControllerTarget, RoutingError> {
        ControllerTarget::parse(&self)
    }
}

impl<C: Into<String>, M: Into<String>> IntoTarget for (C, M) {
    fn into_target(self) -> Result<ControllerTarget, RoutingError> {
        Ok(ControllerTarget::pair(self.0, self.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class_and_method() {
        let target = ControllerTarget::parse("PostController@show").unwrap();
        assert_eq!(target.method(), "show");
        assert_eq!(
            target.class_in("theme::controllers"),
            "theme::controllers::PostController"
        );
        assert_eq!(target.class_in(""), "PostController");
        assert_eq!(target.to_string(), "PostController@show");
    }

    #[test]
    fn test_invalid_targets() {
        for spec in ["PostController", "@show", "PostController@", ""] {
            assert!(matches!(
                ControllerTarget::parse(spec),
                Err(RoutingError::InvalidTarget(_))
            ));
        }
    }

    #[test]
    fn test_pair_ignores_namespace() {
        let target = ("admin::Dashboard", "index").into_target().unwrap();
        assert_eq!(target.class_in("theme::controllers"), "admin::Dashboard");
        assert_eq!(target.method(), "index");
    }

    #[test]
    fn test_namespace_trailing_separator() {
        let target = "Page@home".into_target().unwrap();
        assert_eq!(target.class_in("theme::"), "theme::Page");
    }
}
