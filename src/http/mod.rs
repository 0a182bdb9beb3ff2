//! HTTP host subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, timeout, tracing)
//!     → request.rs (HttpRequest: verb, path segments, headers)
//!     → routing::Router runs the theme's route table
//!     → response.rs (HttpResponse: status + rendered body)
//!     → Send to client (404 if no route matched)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{HttpRequest, Request};
pub use response::{HttpResponse, Response};
pub use server::{AppState, HttpServer};
