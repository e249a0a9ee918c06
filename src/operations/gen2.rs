//! Gen2 collection program.

use serde::Deserialize;

use crate::ledger::types::{AccountAddress, Call, LedgerResult};
use crate::operations::keys::KeyBatch;
use crate::operations::minting_call;

/// One gen2 token: its URI, name, rarity and ten trait values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenAsset {
    pub token_uri: String,
    pub token_name: String,
    pub rarity: String,
    pub beak: String,
    pub eyes: String,
    pub base: String,
    pub patterns: String,
    pub hair: String,
    pub neck: String,
    pub clothes: String,
    pub body: String,
    pub earring: String,
    pub background: String,
}

impl TokenAsset {
    /// Number of fields in a record.
    pub const FIELDS: usize = 13;

    /// Fields in on-chain order.
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.token_uri.clone(),
            self.token_name.clone(),
            self.rarity.clone(),
            self.beak.clone(),
            self.eyes.clone(),
            self.base.clone(),
            self.patterns.clone(),
            self.hair.clone(),
            self.neck.clone(),
            self.clothes.clone(),
            self.body.clone(),
            self.earring.clone(),
            self.background.clone(),
        ]
    }
}

/// Creator-side settings of the gen2 collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorConfig {
    pub token_description: String,
    pub mint_payee: AccountAddress,
    pub collection_description: String,
    pub collection_name: String,
    pub collection_uri: String,
    pub collection_supply: u64,
    pub royalty_payee: AccountAddress,
    pub royalty_denominator: u64,
    pub royalty_numerator: u64,
}

/// The `minting` module of the gen2 collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gen2Program {
    address: AccountAddress,
}

impl Gen2Program {
    pub fn new(address: AccountAddress) -> Self {
        Self { address }
    }

    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn set_creator_config(&self, config: &CreatorConfig) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "set_creator_config")?
            .string_arg(&config.token_description)
            .address_arg(&config.mint_payee)
            .string_arg(&config.collection_description)
            .string_arg(&config.collection_name)
            .string_arg(&config.collection_uri)
            .u64_arg(config.collection_supply)
            .address_arg(&config.royalty_payee)
            .u64_arg(config.royalty_denominator)
            .u64_arg(config.royalty_numerator))
    }

    /// Rarity probabilities, one row per key batch.
    pub fn set_probability_config(&self, matrix: &[Vec<u64>]) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "set_probability_config")?.u64_matrix_arg(matrix))
    }

    pub fn set_price_config(&self, prices_octas: &[u64]) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "set_price_config")?.u64_vec_arg(prices_octas))
    }

    pub fn create_collection(&self) -> LedgerResult<Call> {
        minting_call(self.address, "create_collection")
    }

    /// Add token assets to the pool.
    pub fn add_tokens(&self, assets: &[TokenAsset]) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "add_tokens")?.string_matrix_arg(&rows(assets)))
    }

    /// Add token assets to the pool of one key batch.
    pub fn add_batch_tokens(&self, batch: KeyBatch, assets: &[TokenAsset]) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "add_tokens")?
            .string_arg(batch.as_str())
            .string_matrix_arg(&rows(assets)))
    }

    pub fn add_to_whitelist(
        &self,
        addresses: &[AccountAddress],
        mint_limit: u64,
    ) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "add_to_whitelist")?
            .address_vec_arg(addresses)
            .u64_arg(mint_limit))
    }

    pub fn wl_mint(&self, amount: u64) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "wl_mint")?.u64_arg(amount))
    }

    /// Burn one key and receive a gen2 token.
    pub fn burn_single_to_mint(&self, collection_name: &str, key_name: &str) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "burn_single_to_mint")?
            .string_arg(collection_name)
            .string_arg(key_name))
    }

    /// View: number of tokens left in a pool.
    pub fn view_pool_length(&self, pool: u64) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "view_pool_length")?.u64_arg(pool))
    }

    /// View: whitelist status of an address.
    pub fn view_wl_status(&self, address: &AccountAddress) -> LedgerResult<Call> {
        Ok(minting_call(self.address, "view_wl_status")?.address_arg(address))
    }
}

fn rows(assets: &[TokenAsset]) -> Vec<Vec<String>> {
    assets.iter().map(TokenAsset::to_fields).collect()
}
