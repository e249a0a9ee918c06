//! Batch input sources: address lists, URI lists and token asset CSV files.
//!
//! Line-based files ignore blank lines and `#` comments.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ledger::types::{AccountAddress, LedgerError};
use crate::operations::TokenAsset;

/// Errors reading an input file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Line {line}: {source}")]
    Address { line: usize, source: LedgerError },

    #[error("Invalid token asset record: {0}")]
    Csv(#[from] csv::Error),
}

/// Read a newline-separated address list.
pub fn read_addresses(path: &Path) -> Result<Vec<AccountAddress>, InputError> {
    parse_addresses(&read_text(path)?)
}

/// Parse a newline-separated address list, keeping order and duplicates.
pub fn parse_addresses(text: &str) -> Result<Vec<AccountAddress>, InputError> {
    entries(text)
        .map(|(line, value)| {
            value
                .parse()
                .map_err(|source| InputError::Address { line, source })
        })
        .collect()
}

/// Read a newline-separated list of plain values (e.g. token URIs).
pub fn read_lines(path: &Path) -> Result<Vec<String>, InputError> {
    Ok(entries(&read_text(path)?)
        .map(|(_, value)| value.to_string())
        .collect())
}

/// Read token assets from a CSV file with 13 columns, header optional.
pub fn read_token_assets(path: &Path) -> Result<Vec<TokenAsset>, InputError> {
    parse_token_assets(&read_text(path)?)
}

/// Parse token assets from CSV text. A first row starting with `token_uri`
/// is treated as a header.
pub fn parse_token_assets(text: &str) -> Result<Vec<TokenAsset>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut assets = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if i == 0 && record.get(0) == Some("token_uri") {
            continue;
        }
        assets.push(record.deserialize(None)?);
    }
    Ok(assets)
}

fn read_text(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Non-empty, non-comment lines with their 1-based line numbers.
fn entries(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}
