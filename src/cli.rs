//! Command-line interface.

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::schema::{DEFAULT_IDENTITY, RECEIVER_IDENTITY};
use crate::ledger::types::AccountAddress;
use crate::operations::{parse_apt, KeyBatch};

#[derive(Parser, Debug)]
#[command(name = "mint-ops")]
#[command(version, about = "Submit and track collection program transactions", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Node REST endpoint, overrides config and NODE_URL
    #[arg(long, global = true)]
    pub node_url: Option<String>,

    /// Signing identity profile
    #[arg(short, long, global = true, default_value = DEFAULT_IDENTITY)]
    pub identity: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show chain id, ledger version and block height
    NodeInfo,
    /// Submit any entry function
    Call(CallArgs),
    /// Evaluate any view function
    View(ViewArgs),
    /// Key collection program
    #[command(subcommand)]
    Keys(KeysCommand),
    /// Gen2 collection program
    #[command(subcommand)]
    Gen2(Gen2Command),
    /// Offer one key per address in a file
    SendKeys(SendKeysArgs),
    /// Transfer consecutive keys directly to a co-signing receiver
    TransferKeys(TransferKeysArgs),
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Target as <address>::<module>::<function>
    pub function: String,

    /// Argument as JSON; anything that is not JSON is passed as a string
    #[arg(long = "arg", value_parser = parse_json_arg)]
    pub args: Vec<Value>,

    /// Type argument, e.g. 0x1::aptos_coin::AptosCoin
    #[arg(long = "type-arg")]
    pub type_args: Vec<String>,

    /// Gas budget for this call
    #[arg(long)]
    pub max_gas: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Target as <address>::<module>::<function>
    pub function: String,

    #[arg(long = "arg", value_parser = parse_json_arg)]
    pub args: Vec<Value>,

    #[arg(long = "type-arg")]
    pub type_args: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// Create the key collection with its token metadata
    CreateCollection(KeysCollectionArgs),
    /// Mint keys to the admin in chunks
    Mint(MintArgs),
    /// Select the batch new mints belong to
    SetKeyBatch {
        /// batch_1, batch_2 or batch_3
        batch: KeyBatch,
    },
    /// Whitelist addresses with a mint limit
    AddToWhitelist(WhitelistArgs),
    /// Configure the collection keys are exchanged into
    SetDestinationConfig(DestinationArgs),
    /// Create the destination collection from its stored config
    CreateDestinationCollection,
    /// Add destination token URIs from a file, one per line
    AddTokenUris(RecordFileArgs),
    /// Set reveal time and price
    SetRevealConfig {
        /// Unix timestamp in seconds
        reveal_time: u64,
        /// Price in APT
        #[arg(long, value_parser = parse_apt)]
        price: u64,
    },
    /// Set per-batch key prices in APT
    SetPriceConfig(PriceArgs),
    /// Exchange a key for a destination token
    Exchange {
        /// Name of the key token, e.g. "Key #12"
        source_token_name: String,
    },
    /// Hand the program admin role to another account
    SetAdmin { new_admin: AccountAddress },
}

#[derive(Subcommand, Debug)]
pub enum Gen2Command {
    /// Set creator, payee and royalty settings
    SetCreatorConfig(CreatorArgs),
    /// Set rarity probabilities, one row per key batch
    SetProbabilityConfig {
        /// Comma-separated percentages, e.g. 65,20,10,5
        #[arg(long = "row", required = true)]
        rows: Vec<ProbabilityRow>,
    },
    /// Set per-batch prices in APT
    SetPriceConfig(PriceArgs),
    /// Create the gen2 collection
    CreateCollection,
    /// Add token assets from a CSV file
    AddTokens {
        #[command(flatten)]
        records: RecordFileArgs,
        /// Add to the pool of one key batch
        #[arg(long)]
        batch: Option<KeyBatch>,
    },
    /// Whitelist addresses with a mint limit
    AddToWhitelist(WhitelistArgs),
    /// Mint as a whitelisted account
    WlMint { amount: u64 },
    /// Burn a key and receive a gen2 token
    BurnAndMint {
        /// Collection the key belongs to
        collection_name: String,
        /// Name of the key token to burn
        key_name: String,
    },
    /// Tokens left in a pool
    PoolLength { pool: u64 },
    /// Whitelist status of an address
    WlStatus { address: AccountAddress },
}

#[derive(Args, Debug)]
pub struct MintArgs {
    /// Total keys to mint
    pub amount: u64,

    /// Keys per transaction [default: batch.mint_chunk_size]
    #[arg(long)]
    pub chunk_size: Option<u64>,

    /// Pause between transactions [default: batch.delay_ms]
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RecordFileArgs {
    pub file: PathBuf,

    /// Records per transaction [default: batch.token_chunk_size]
    #[arg(long)]
    pub chunk_size: Option<u64>,

    #[arg(long)]
    pub delay_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct WhitelistArgs {
    #[arg(long = "address")]
    pub addresses: Vec<AccountAddress>,

    /// File with one address per line
    #[arg(long)]
    pub addresses_file: Option<PathBuf>,

    /// Mints allowed per address
    #[arg(long)]
    pub mint_limit: u64,
}

#[derive(Args, Debug)]
pub struct PriceArgs {
    /// Prices in APT, one per batch
    #[arg(required = true, value_parser = parse_apt)]
    pub prices: Vec<u64>,
}

#[derive(Args, Debug)]
pub struct KeysCollectionArgs {
    #[arg(long)]
    pub collection_name: String,
    #[arg(long)]
    pub collection_description: String,
    #[arg(long)]
    pub collection_maximum: u64,
    #[arg(long)]
    pub collection_uri: String,
    #[arg(long)]
    pub base_token_name: String,
    #[arg(long)]
    pub token_description: String,
    #[arg(long)]
    pub token_uri: String,
    #[arg(long)]
    pub royalty_payee: AccountAddress,
    #[arg(long, default_value_t = 100)]
    pub royalty_denominator: u64,
    #[arg(long, default_value_t = 0)]
    pub royalty_numerator: u64,
}

#[derive(Args, Debug)]
pub struct DestinationArgs {
    #[arg(long)]
    pub collection_name: String,
    #[arg(long)]
    pub collection_description: String,
    #[arg(long)]
    pub collection_maximum: u64,
    #[arg(long)]
    pub collection_uri: String,
    #[arg(long)]
    pub base_token_name: String,
    #[arg(long)]
    pub royalty_payee: AccountAddress,
    #[arg(long)]
    pub token_description: String,
    #[arg(long, default_value_t = 1)]
    pub token_maximum: u64,
    #[arg(long, default_value_t = 100)]
    pub royalty_denominator: u64,
    #[arg(long, default_value_t = 0)]
    pub royalty_numerator: u64,
}

#[derive(Args, Debug)]
pub struct CreatorArgs {
    #[arg(long)]
    pub token_description: String,
    #[arg(long)]
    pub mint_payee: AccountAddress,
    #[arg(long)]
    pub collection_description: String,
    #[arg(long)]
    pub collection_name: String,
    #[arg(long)]
    pub collection_uri: String,
    #[arg(long)]
    pub collection_supply: u64,
    #[arg(long)]
    pub royalty_payee: AccountAddress,
    #[arg(long, default_value_t = 100)]
    pub royalty_denominator: u64,
    #[arg(long, default_value_t = 0)]
    pub royalty_numerator: u64,
}

#[derive(Args, Debug)]
pub struct SendKeysArgs {
    /// File with one receiver address per line
    pub addresses_file: PathBuf,

    #[arg(long)]
    pub collection_name: String,

    /// Keys are named "<base> #<n>"
    #[arg(long)]
    pub base_name: String,

    /// Number of the first key to send
    #[arg(long, default_value_t = 0)]
    pub start_number: u64,

    /// Key creator [default: contracts.keys_address]
    #[arg(long)]
    pub creator: Option<AccountAddress>,

    #[arg(long, default_value_t = 0)]
    pub property_version: u64,

    #[arg(long)]
    pub delay_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct TransferKeysArgs {
    /// Number of keys to transfer
    pub count: u64,

    /// Identity profile of the receiver, who co-signs each transfer
    #[arg(long, default_value = RECEIVER_IDENTITY)]
    pub receiver: String,

    #[arg(long)]
    pub collection_name: String,

    /// Keys are named "<base> #<n>"
    #[arg(long)]
    pub base_name: String,

    /// Number of the first key to transfer
    #[arg(long, default_value_t = 0)]
    pub start_number: u64,

    /// Key creator [default: contracts.keys_address]
    #[arg(long)]
    pub creator: Option<AccountAddress>,

    #[arg(long, default_value_t = 0)]
    pub property_version: u64,

    #[arg(long)]
    pub delay_ms: Option<u64>,
}

/// One row of the probability matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbabilityRow(pub Vec<u64>);

impl FromStr for ProbabilityRow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(|part| {
                part.trim()
                    .parse::<u64>()
                    .map_err(|e| format!("'{}' in row '{}': {}", part.trim(), s, e))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ProbabilityRow)
    }
}

fn parse_json_arg(raw: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}
