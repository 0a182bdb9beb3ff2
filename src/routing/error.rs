//! Routing error definitions.
//!
//! Only misconfiguration and dispatch failures are errors. A route that
//! simply does not apply (URL, verb, predicate, middleware or constraint
//! mismatch) is tracked as router state and never surfaces here.

use thiserror::Error;

use crate::container::ControllerError;
use crate::view::ViewError;

/// Errors raised while declaring or dispatching routes.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A route referenced middleware that was never registered.
    #[error("middleware `{0}` is not registered")]
    UnknownMiddleware(String),

    /// The controller class is unknown to the container after namespace resolution.
    #[error("controller `{0}` not found")]
    ControllerNotFound(String),

    /// A `Class@method` target could not be parsed.
    #[error("invalid controller target `{0}`, expected `Class@method`")]
    InvalidTarget(String),

    /// The controller action failed.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// The view failed to render.
    #[error(transparent)]
    View(#[from] ViewError),
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;
