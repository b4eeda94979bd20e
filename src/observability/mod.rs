//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! gateway, server, config reload produce:
//!     → logging.rs (structured log events, pretty or JSON)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (log aggregation picks it up)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached to every proxy log line
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
