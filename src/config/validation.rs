//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and that URLs and
//! addresses parse. All problems are reported at once.

use std::fmt;
use url::Url;

use crate::config::schema::OpsConfig;
use crate::ledger::types::AccountAddress;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &OpsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_http_url("ledger.node_url", &config.ledger.node_url, &mut errors);
    for (i, url) in config.ledger.failover_urls.iter().enumerate() {
        check_http_url(&format!("ledger.failover_urls[{}]", i), url, &mut errors);
    }

    let positive = [
        ("ledger.request_timeout_secs", config.ledger.request_timeout_secs),
        ("submission.max_gas_amount", config.submission.max_gas_amount),
        ("submission.expiration_secs", config.submission.expiration_secs),
        ("polling.timeout_secs", config.polling.timeout_secs),
        ("polling.initial_interval_ms", config.polling.initial_interval_ms),
        ("batch.mint_chunk_size", config.batch.mint_chunk_size),
        ("batch.token_chunk_size", config.batch.token_chunk_size),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.polling.max_interval_ms < config.polling.initial_interval_ms {
        errors.push(ValidationError::new(
            "polling.max_interval_ms",
            "must not be smaller than polling.initial_interval_ms",
        ));
    }

    let contracts = [
        ("contracts.keys_address", &config.contracts.keys_address),
        ("contracts.gen2_address", &config.contracts.gen2_address),
    ];
    for (field, address) in contracts {
        if let Some(address) = address {
            if address.parse::<AccountAddress>().is_err() {
                errors.push(ValidationError::new(
                    field,
                    format!("'{}' is not an account address", address),
                ));
            }
        }
    }

    for (name, identity) in &config.identities {
        if identity.private_key_env.trim().is_empty() || identity.account_env.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("identities.{}", name),
                "environment variable names must not be empty",
            ));
        }
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("'{}' is not a socket address", addr),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}
