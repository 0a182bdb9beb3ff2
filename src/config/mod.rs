//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! snap.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SnapConfig (validated, immutable)
//!     → shared via ArcSwap with the host server
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the shared config (server/theme kept from boot)
//!     → next request's Router sees the new values
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - The router reads settings through dotted keys (`theme.templates_directory`)
//!   so it does not depend on the typed schema

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

use serde_json::Value;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ObservabilityConfig, RoutingConfig, ServerConfig, SnapConfig, ThemeConfig, DEFAULT_NAMESPACE,
};

/// The configuration collaborator used by the router.
pub trait Config {
    /// Look up a dotted key such as `theme.templates_directory`.
    fn get(&self, key: &str) -> Option<Value>;

    /// String value at `key`, if present and a string.
    fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(str::to_string))
    }
}

impl Config for SnapConfig {
    /// Only the section named by the first key segment is serialized.
    fn get(&self, key: &str) -> Option<Value> {
        let (section, rest) = match key.split_once('.') {
            Some((section, rest)) => (section, Some(rest)),
            None => (key, None),
        };
        let node = match section {
            "server" => serde_json::to_value(&self.server),
            "theme" => serde_json::to_value(&self.theme),
            "routing" => serde_json::to_value(&self.routing),
            "observability" => serde_json::to_value(&self.observability),
            _ => return None,
        }
        .ok()?;

        match rest {
            Some(rest) => lookup(&node, rest).cloned(),
            None => Some(node),
        }
    }
}

impl Config for Value {
    fn get(&self, key: &str) -> Option<Value> {
        lookup(self, key).cloned()
    }
}

fn lookup<'v>(root: &'v Value, key: &str) -> Option<&'v Value> {
    key.split('.').try_fold(root, |node, part| node.get(part))
}
