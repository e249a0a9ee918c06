//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ledger, batch and CLI produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (counters, histograms; optional Prometheus listener)
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted strings
//! - Metrics are cheap (atomic increments) and no-ops without an exporter

pub mod logging;
pub mod metrics;
