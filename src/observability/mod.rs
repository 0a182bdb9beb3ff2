//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! router + server produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (request and match counters, latency histogram)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - Non-matching routes log at `trace` only; they are normal control flow
//! - Matches log at `debug`, request outcomes at `info` via `TraceLayer`
//! - Dispatch errors log at `error` in the server before the 500

pub mod logging;
pub mod metrics;
