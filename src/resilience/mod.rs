//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Submitted transaction:
//!     → backoff.rs (delay between status polls, capped and jittered)
//!     → bounded by the polling timeout in the submitter
//! ```
//!
//! # Design Decisions
//! - Every wait has a deadline
//! - No automatic retries: submissions are not idempotent, the operator re-runs

pub mod backoff;

pub use backoff::{calculate_backoff, PollBackoff};
