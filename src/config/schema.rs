//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section has defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Default controller namespace for `Class@method` targets.
pub const DEFAULT_NAMESPACE: &str = "theme::controllers";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SnapConfig {
    /// HTTP host settings.
    pub server: ServerConfig,

    /// Theme layout (templates, views).
    pub theme: ThemeConfig,

    /// Router defaults.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP host configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Total time allowed per request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Theme layout configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Templates directory, relative to the theme root.
    /// Views live in `{templates_directory}/views`.
    pub templates_directory: String,

    /// File extension of view templates.
    pub view_extension: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            templates_directory: "templates".to_string(),
            view_extension: "html".to_string(),
        }
    }
}

impl ThemeConfig {
    /// Directory view templates are loaded from.
    pub fn views_directory(&self) -> String {
        format!("{}/views", self.templates_directory.trim_end_matches('/'))
    }
}

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Namespace `Class@method` targets resolve against.
    pub default_namespace: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SnapConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.theme.templates_directory, "templates");
        assert_eq!(config.routing.default_namespace, DEFAULT_NAMESPACE);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_section() {
        let config: SnapConfig = toml::from_str(
            r#"
            [theme]
            templates_directory = "resources/"
            "#,
        )
        .unwrap();
        assert_eq!(config.theme.view_extension, "html");
        assert_eq!(config.theme.views_directory(), "resources/views");
    }
}
