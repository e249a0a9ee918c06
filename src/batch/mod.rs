//! Sequential batch execution.
//!
//! # Data Flow
//! ```text
//! requested total / record list
//!     → chunking.rs (fixed-size chunks, per call site)
//!     → runner.rs (one submission per chunk, in order, halt on first failure)
//!     → BatchReport (outcomes, progress, resume point)
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: a call is confirmed before the next one is built
//! - No checkpoint file; the halt report tells the operator where to resume
//! - Chunk size and delay are call-site settings, not global constants

pub mod chunking;
pub mod runner;

use thiserror::Error;

use crate::ledger::types::LedgerError;

pub use chunking::{chunk_counts, chunk_records, MAX_CHUNKS};
pub use runner::{BatchItem, BatchLoop, BatchProgress, BatchReport};

/// Errors that abort a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// A chunk size of zero was requested.
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,

    /// The requested total would need more transactions than one run allows.
    #[error("{chunks} chunks requested, at most {max} per run; raise the chunk size or split the total")]
    TooManyChunks { chunks: u64, max: u64 },

    /// The call for an item could not be built.
    #[error("Could not build item {index}: {source}")]
    Build { index: usize, source: LedgerError },

    /// A node error prevented observing the outcome of an item.
    #[error("Item {index} aborted the batch after {completed} completed items: {source}")]
    Ledger {
        index: usize,
        completed: usize,
        source: LedgerError,
    },
}
