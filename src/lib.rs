//! Snap theme routing.
//!
//! A fluent route declaration DSL for theme front controllers: URL
//! patterns with `{param}` captures and regex constraints, verb filters,
//! predicates, named middleware and groups, dispatching the first match
//! to a view or a controller action.

pub mod config;
pub mod container;
pub mod http;
pub mod observability;
pub mod routing;
pub mod view;

pub use config::SnapConfig;
pub use http::HttpServer;
pub use routing::{Router, RoutingError};
