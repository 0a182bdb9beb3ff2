//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, timeouts and theme layout
//! - Check the default namespace is a `::`-separated identifier path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SnapConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SnapConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} `{value}`: expected host:port")]
    InvalidAddress { field: &'static str, value: String },

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("theme.{0} must not be empty")]
    EmptyThemeField(&'static str),

    #[error("routing.default_namespace `{0}` is not a valid namespace path")]
    InvalidNamespace(String),
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &SnapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.theme.templates_directory.trim_matches('/').is_empty() {
        errors.push(ValidationError::EmptyThemeField("templates_directory"));
    }

    if config.theme.view_extension.is_empty() {
        errors.push(ValidationError::EmptyThemeField("view_extension"));
    }

    if !is_namespace_path(&config.routing.default_namespace) {
        errors.push(ValidationError::InvalidNamespace(
            config.routing.default_namespace.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_namespace_path(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace.split("::").all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SnapConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = SnapConfig::default();
        config.server.bind_address = "localhost".into();
        config.server.request_timeout_secs = 0;
        config.routing.default_namespace = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[1], ValidationError::ZeroTimeout);
        assert_eq!(errors[2], ValidationError::InvalidNamespace(String::new()));
    }

    #[test]
    fn test_namespace_paths() {
        assert!(is_namespace_path("theme::controllers"));
        assert!(is_namespace_path("Admin"));
        assert!(!is_namespace_path("theme::"));
        assert!(!is_namespace_path("1theme"));
        assert!(!is_namespace_path("theme controllers"));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = SnapConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::InvalidAddress { field: "observability.metrics_address", .. }
        ));
    }
}
