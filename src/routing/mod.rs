//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Boot:
//!     MiddlewareRegistry (name → handler), shared via Arc
//!
//! Per request:
//!     Router::new(RouteContext)
//!     → route table runs declarations top to bottom
//!         → guards: url / constrain / when / not / verbs / post template
//!           (url_route.rs matches segments, captures {params})
//!         → using(): middleware.rs queues name|args specs
//!         → terminal: view() or dispatch()
//!             → verb check → middleware queue → match
//!             → View::render or Container controller action
//!     → first dispatch marks the request matched; later
//!       declarations are no-ops
//! ```
//!
//! # Design Decisions
//! - First match wins; the table keeps running but nothing else fires
//! - Non-matches are state, not errors
//! - Misconfiguration (unknown middleware, missing controller) errors
//!   immediately and propagates to the caller

pub mod error;
pub mod middleware;
pub mod router;
pub mod target;
pub mod url_route;

pub use error::{RoutingError, RoutingResult};
pub use middleware::{IntoSpecs, Middleware, MiddlewareQueue, MiddlewareRegistry};
pub use router::{Condition, RouteContext, RouteEvent, RouteState, Router};
pub use target::{ControllerTarget, IntoTarget};
pub use url_route::{split_segments, UrlRoute};

/// A theme's route declarations.
pub type RouteTable = dyn for<'a> Fn(&mut Router<'a>) -> Result<(), RoutingError> + Send + Sync;
