//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key, account address)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (REST requests with timeouts and read failover)
//!     → transaction.rs (build, sign, submit, poll until committed)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All node requests have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{Ledger, LedgerInfo, RestClient};
pub use transaction::TransactionSubmitter;
pub use types::{
    AccountAddress, Call, EntryFunctionId, GasUsage, LedgerError, LedgerResult, Outcome,
    OutcomeStatus, PendingHandle, TxStatus,
};
pub use wallet::Wallet;
