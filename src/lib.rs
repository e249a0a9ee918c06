//! Transaction tooling for the key and gen2 collection programs.

// Core
pub mod config;
pub mod ledger;
pub mod resilience;

// Batching and payloads
pub mod batch;
pub mod input;
pub mod operations;

// Operator surface
pub mod cli;
pub mod commands;
pub mod observability;
pub mod report;

pub use batch::{BatchLoop, BatchReport};
pub use config::schema::OpsConfig;
pub use ledger::{Call, Ledger, Outcome, RestClient, TransactionSubmitter, Wallet};
