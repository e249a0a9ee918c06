//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! mint-ops.toml (optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → OpsConfig (validated, immutable)
//!     → passed by reference to the submitter and batch loop
//! ```
//!
//! # Design Decisions
//! - Config is loaded once per process and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BatchConfig, ContractsConfig, IdentityConfig, LedgerConfig, ObservabilityConfig, OpsConfig,
    PollingConfig, SubmissionConfig,
};
