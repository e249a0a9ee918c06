//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::OpsConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Node URL override.
pub const NODE_URL_ENV_VAR: &str = "NODE_URL";
/// Key collection program address override.
pub const KEYS_ADDRESS_ENV_VAR: &str = "RES_ACCOUNT";
/// Gen2 program address override.
pub const GEN2_ADDRESS_ENV_VAR: &str = "ACCOUNT_GEN2";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<OpsConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Build the process configuration: file (or defaults), then environment
/// overrides, then the `--node-url` flag, then validation.
pub fn load_config(path: Option<&Path>, node_url: Option<&str>) -> Result<OpsConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => OpsConfig::default(),
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok());
    if let Some(url) = node_url {
        config.ledger.node_url = url.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        node_url = %config.ledger.node_url,
        failover_urls = config.ledger.failover_urls.len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Apply environment overrides. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut OpsConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(NODE_URL_ENV_VAR) {
        config.ledger.node_url = url;
    }
    if let Some(address) = get(KEYS_ADDRESS_ENV_VAR) {
        config.contracts.keys_address = Some(address);
    }
    if let Some(address) = get(GEN2_ADDRESS_ENV_VAR) {
        config.contracts.gen2_address = Some(address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_read_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [ledger]
            node_url = "https://fullnode.devnet.aptoslabs.com/v1"

            [batch]
            mint_chunk_size = 50
            "#
        )
        .unwrap();

        let config = read_config(file.path()).unwrap();
        assert_eq!(config.batch.mint_chunk_size, 50);
        assert_eq!(config.ledger.node_url, "https://fullnode.devnet.aptoslabs.com/v1");
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ledger\nnode_url = 1").unwrap();
        assert!(matches!(read_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Some(Path::new("/definitely/not/here.toml")), None);
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_node_url_flag_is_validated() {
        let result = load_config(None, Some("ftp://node.example/v1"));
        match result {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.field == "ledger.node_url"));
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_node_url_flag_applied() {
        let config = load_config(None, Some("https://flag.example/v1")).unwrap();
        assert_eq!(config.ledger.node_url, "https://flag.example/v1");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (NODE_URL_ENV_VAR, "https://node.example/v1"),
            (KEYS_ADDRESS_ENV_VAR, "abc"),
            (GEN2_ADDRESS_ENV_VAR, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = OpsConfig::default();
        apply_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.ledger.node_url, "https://node.example/v1");
        assert_eq!(config.contracts.keys_address.as_deref(), Some("abc"));
        assert!(config.contracts.gen2_address.is_none());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::Validation(vec![
            ValidationError {
                field: "a".into(),
                message: "bad".into(),
            },
            ValidationError {
                field: "b".into(),
                message: "worse".into(),
            },
        ]);
        assert_eq!(err.to_string(), "Validation failed: a: bad, b: worse");
    }
}
