//! Key collection program.

use std::fmt;
use std::str::FromStr;

use crate::ledger::types::{AccountAddress, Call, LedgerResult};
use crate::operations::{minting_call, HEAVY_MAX_GAS};

/// Which key batch new mints belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBatch {
    Batch1,
    Batch2,
    Batch3,
}

impl KeyBatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyBatch::Batch1 => "batch_1",
            KeyBatch::Batch2 => "batch_2",
            KeyBatch::Batch3 => "batch_3",
        }
    }
}

impl FromStr for KeyBatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch_1" | "1" => Ok(KeyBatch::Batch1),
            "batch_2" | "2" => Ok(KeyBatch::Batch2),
            "batch_3" | "3" => Ok(KeyBatch::Batch3),
            other => Err(format!(
                "unknown key batch '{}', expected batch_1, batch_2 or batch_3",
                other
            )),
        }
    }
}

impl fmt::Display for KeyBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of the key collection and its token metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysCollectionConfig {
    pub collection_name: String,
    pub collection_description: String,
    pub collection_maximum: u64,
    pub collection_uri: String,
    pub base_token_name: String,
    pub token_description: String,
    pub token_uri: String,
    pub royalty_payee: AccountAddress,
    pub royalty_points_denominator: u64,
    pub royalty_points_numerator: u64,
}

/// Parameters of the collection keys are exchanged into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationCollectionConfig {
    pub collection_name: String,
    pub collection_description: String,
    pub collection_maximum: u64,
    pub collection_uri: String,
    pub base_token_name: String,
    pub royalty_payee: AccountAddress,
    pub token_description: String,
    /// Almost always 1.
    pub token_maximum: u64,
    pub royalty_points_denominator: u64,
    pub royalty_points_numerator: u64,
}

/// The `minting` module of the key collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysProgram {
    address: AccountAddress,
}

impl KeysProgram {
    pub fn new(address: AccountAddress) -> Self {
        Self { address }
    }

    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn create_keys_collection(&self, config: &KeysCollectionConfig) -> LedgerResult<Call> {
        Ok(
            minting_call(self.address, "create_keys_collection_with_key_metadata")?
                .string_arg(&config.collection_name)
                .string_arg(&config.collection_description)
                .u64_arg(config.collection_maximum)
                .string_arg(&config.collection_uri)
                .string_arg(&config.base_token_name)
                .string_arg(&config.token_description)
                .string_arg(&config.token_uri)
                .address_arg(&config.royalty_payee)
                .u64_arg(config.royalty_points_denominator)
                .u64_arg(config.royalty_points_numerator),
        )
    }

    /// Mint `amount` keys to the admin in one transaction.
    pub fn mint_keys_admin(&self, amount: u64) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "mint_keys_admin")?
            .u64_arg(amount)
            .with_max_gas_amount(HEAVY_MAX_GAS))
    }

    pub fn set_key_batch(&self, batch: KeyBatch) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "set_key_batch")?.string_arg(batch.as_str()))
    }

    pub fn add_to_whitelist(
        &self,
        addresses: &[AccountAddress],
        mint_limit: u64,
    ) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "add_to_whitelist")?
            .address_vec_arg(addresses)
            .u64_arg(mint_limit)
            .with_max_gas_amount(HEAVY_MAX_GAS))
    }

    pub fn set_destination_collection_config(
        &self,
        config: &DestinationCollectionConfig,
    ) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "set_destination_collection_config")?
            .string_arg(&config.collection_name)
            .string_arg(&config.collection_description)
            .u64_arg(config.collection_maximum)
            .string_arg(&config.collection_uri)
            .string_arg(&config.base_token_name)
            .address_arg(&config.royalty_payee)
            .string_arg(&config.token_description)
            .u64_arg(config.token_maximum)
            .u64_arg(config.royalty_points_denominator)
            .u64_arg(config.royalty_points_numerator))
    }

    pub fn create_destination_collection_from_config(&self) -> LedgerResult<Call> {
        Ok(
            minting_call(self.address, "create_destination_collection_from_config")?
                .with_max_gas_amount(HEAVY_MAX_GAS),
        )
    }

    /// Add destination token URIs. Large lists should be chunked by the caller.
    pub fn add_token_uris(&self, uris: &[String]) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "add_tokens")?
            .string_vec_arg(uris)
            .with_max_gas_amount(HEAVY_MAX_GAS))
    }

    pub fn set_reveal_config(&self, reveal_time_secs: u64, price_octas: u64) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "set_reveal_config")?
            .u64_arg(reveal_time_secs)
            .u64_arg(price_octas)
            .with_max_gas_amount(HEAVY_MAX_GAS))
    }

    /// Per-batch key prices in octas.
    pub fn set_price_config(&self, prices_octas: &[u64]) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "set_price_config")?.u64_vec_arg(prices_octas))
    }

    pub fn exchange(&self, source_token_name: &str) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "exchange")?
            .string_arg(source_token_name)
            .with_max_gas_amount(HEAVY_MAX_GAS))
    }

    pub fn set_admin(&self, new_admin: &AccountAddress) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "set_admin")?
            .address_arg(new_admin)
            .with_max_gas_amount(HEAVY_MAX_GAS))
    }
}
