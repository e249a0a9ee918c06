//! Subcommand execution.
//!
//! Every command prints one report line per terminal outcome on stdout and
//! returns whether all of its outcomes succeeded. Errors that prevent
//! observing an outcome are returned as [`CommandError`].

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

use crate::batch::{
    chunk_counts, chunk_records, BatchError, BatchItem, BatchLoop, BatchReport, MAX_CHUNKS,
};
use crate::cli::{
    CallArgs, Cli, Command, CreatorArgs, DestinationArgs, Gen2Command, KeysCollectionArgs,
    KeysCommand, MintArgs, RecordFileArgs, SendKeysArgs, TransferKeysArgs, ViewArgs,
    WhitelistArgs,
};
use crate::config::loader::{GEN2_ADDRESS_ENV_VAR, KEYS_ADDRESS_ENV_VAR};
use crate::config::schema::OpsConfig;
use crate::input::{self, InputError};
use crate::ledger::client::{Ledger, RestClient};
use crate::ledger::transaction::TransactionSubmitter;
use crate::ledger::types::{AccountAddress, Call, LedgerError, LedgerResult};
use crate::ledger::wallet::Wallet;
use crate::observability::metrics;
use crate::operations::{
    CreatorConfig, DestinationCollectionConfig, Gen2Program, KeyBatch, KeyDistribution,
    KeysCollectionConfig, KeysProgram,
};
use crate::report;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Unknown identity '{0}'; add it under [identities] in the config")]
    UnknownIdentity(String),

    #[error("{field} is not configured (set it in the config or {env_var})")]
    MissingContract {
        field: &'static str,
        env_var: &'static str,
    },

    #[error("No addresses given; use --address or --addresses-file")]
    NoAddresses,
}

/// Everything a command needs: configuration, the submitter and the
/// signing identity, loaded on first use.
pub struct Context<L> {
    config: OpsConfig,
    identity: String,
    submitter: TransactionSubmitter<L>,
    wallet: OnceLock<Wallet>,
}

impl<L: Ledger> Context<L> {
    pub fn new(config: OpsConfig, identity: impl Into<String>, ledger: L) -> Self {
        let submitter =
            TransactionSubmitter::new(ledger, config.submission.clone(), &config.polling);
        Self {
            config,
            identity: identity.into(),
            submitter,
            wallet: OnceLock::new(),
        }
    }

    /// Use `wallet` instead of loading the identity from the environment.
    pub fn with_wallet(self, wallet: Wallet) -> Self {
        let _ = self.wallet.set(wallet);
        self
    }

    pub fn config(&self) -> &OpsConfig {
        &self.config
    }

    pub fn submitter(&self) -> &TransactionSubmitter<L> {
        &self.submitter
    }

    pub fn wallet(&self) -> Result<&Wallet, CommandError> {
        if let Some(wallet) = self.wallet.get() {
            return Ok(wallet);
        }

        let wallet = self.load_wallet(&self.identity)?;
        Ok(self.wallet.get_or_init(|| wallet))
    }

    /// Load the named identity from the environment.
    pub fn load_wallet(&self, name: &str) -> Result<Wallet, CommandError> {
        let identity = self
            .config
            .identity(name)
            .ok_or_else(|| CommandError::UnknownIdentity(name.to_string()))?;
        let wallet = Wallet::from_env(&identity)?;

        tracing::debug!(identity = %name, "Signing identity loaded");
        Ok(wallet)
    }

    pub fn keys_program(&self) -> Result<KeysProgram, CommandError> {
        let address = contract_address(
            self.config.contracts.keys_address.as_deref(),
            "contracts.keys_address",
            KEYS_ADDRESS_ENV_VAR,
        )?;
        Ok(KeysProgram::new(address))
    }

    pub fn gen2_program(&self) -> Result<Gen2Program, CommandError> {
        let address = contract_address(
            self.config.contracts.gen2_address.as_deref(),
            "contracts.gen2_address",
            GEN2_ADDRESS_ENV_VAR,
        )?;
        Ok(Gen2Program::new(address))
    }

    fn delay(&self, override_ms: Option<u64>) -> Duration {
        Duration::from_millis(override_ms.unwrap_or(self.config.batch.delay_ms))
    }
}

fn contract_address(
    value: Option<&str>,
    field: &'static str,
    env_var: &'static str,
) -> Result<AccountAddress, CommandError> {
    let value = value.ok_or(CommandError::MissingContract { field, env_var })?;
    Ok(value.parse()?)
}

/// Run the parsed command line against the configured node.
pub async fn run(cli: Cli, config: OpsConfig) -> Result<bool, CommandError> {
    let client = RestClient::new(config.ledger.clone())?;
    let ctx = Context::new(config, cli.identity, client);

    match cli.command {
        Command::NodeInfo => {
            let info = ctx.submitter().ledger().ledger_info().await?;
            println!("chain_id: {}", info.chain_id);
            println!("ledger_version: {}", info.ledger_version);
            println!("block_height: {}", info.block_height);
            Ok(true)
        }
        Command::Call(args) => call(&ctx, &args).await,
        Command::View(args) => view(&ctx, &args).await,
        Command::Keys(command) => keys(&ctx, command).await,
        Command::Gen2(command) => gen2(&ctx, command).await,
        Command::SendKeys(args) => send_keys(&ctx, &args).await,
        Command::TransferKeys(args) => transfer_keys(&ctx, &args).await,
    }
}

/// Key collection subcommands.
pub async fn keys<L: Ledger>(ctx: &Context<L>, command: KeysCommand) -> Result<bool, CommandError> {
    let program = ctx.keys_program()?;

    match command {
        KeysCommand::CreateCollection(args) => {
            let call = program.create_keys_collection(&keys_collection_config(args))?;
            submit_one(ctx, "Create keys collection", &call).await
        }
        KeysCommand::Mint(args) => mint_keys(ctx, &args).await,
        KeysCommand::SetKeyBatch { batch } => {
            submit_one(ctx, "Set key batch", &program.set_key_batch(batch)?).await
        }
        KeysCommand::AddToWhitelist(args) => {
            let addresses = whitelist_addresses(&args)?;
            let call = program.add_to_whitelist(&addresses, args.mint_limit)?;
            submit_one(ctx, "Add to whitelist", &call).await
        }
        KeysCommand::SetDestinationConfig(args) => {
            let call = program.set_destination_collection_config(&destination_config(args))?;
            submit_one(ctx, "Set destination collection config", &call).await
        }
        KeysCommand::CreateDestinationCollection => {
            let call = program.create_destination_collection_from_config()?;
            submit_one(ctx, "Create destination collection", &call).await
        }
        KeysCommand::AddTokenUris(args) => add_token_uris(ctx, &args).await,
        KeysCommand::SetRevealConfig { reveal_time, price } => {
            let call = program.set_reveal_config(reveal_time, price)?;
            submit_one(ctx, "Set reveal config", &call).await
        }
        KeysCommand::SetPriceConfig(args) => {
            submit_one(ctx, "Set price config", &program.set_price_config(&args.prices)?).await
        }
        KeysCommand::Exchange { source_token_name } => {
            submit_one(ctx, "Exchange", &program.exchange(&source_token_name)?).await
        }
        KeysCommand::SetAdmin { new_admin } => {
            submit_one(ctx, "Set admin", &program.set_admin(&new_admin)?).await
        }
    }
}

/// Gen2 collection subcommands.
pub async fn gen2<L: Ledger>(ctx: &Context<L>, command: Gen2Command) -> Result<bool, CommandError> {
    let program = ctx.gen2_program()?;

    match command {
        Gen2Command::SetCreatorConfig(args) => {
            let call = program.set_creator_config(&creator_config(args))?;
            submit_one(ctx, "Set creator config", &call).await
        }
        Gen2Command::SetProbabilityConfig { rows } => {
            let matrix: Vec<Vec<u64>> = rows.into_iter().map(|row| row.0).collect();
            let call = program.set_probability_config(&matrix)?;
            submit_one(ctx, "Set probability config", &call).await
        }
        Gen2Command::SetPriceConfig(args) => {
            submit_one(ctx, "Set price config", &program.set_price_config(&args.prices)?).await
        }
        Gen2Command::CreateCollection => {
            submit_one(ctx, "Create gen2 collection", &program.create_collection()?).await
        }
        Gen2Command::AddTokens { records, batch } => {
            add_tokens(ctx, &program, &records, batch).await
        }
        Gen2Command::AddToWhitelist(args) => {
            let addresses = whitelist_addresses(&args)?;
            let call = program.add_to_whitelist(&addresses, args.mint_limit)?;
            submit_one(ctx, "Add to whitelist", &call).await
        }
        Gen2Command::WlMint { amount } => {
            submit_one(ctx, "Whitelist mint", &program.wl_mint(amount)?).await
        }
        Gen2Command::BurnAndMint {
            collection_name,
            key_name,
        } => {
            let call = program.burn_single_to_mint(&collection_name, &key_name)?;
            submit_one(ctx, "Burn and mint", &call).await
        }
        Gen2Command::PoolLength { pool } => {
            print_view(ctx, &program.view_pool_length(pool)?).await
        }
        Gen2Command::WlStatus { address } => {
            print_view(ctx, &program.view_wl_status(&address)?).await
        }
    }
}

/// Submit an arbitrary entry function.
pub async fn call<L: Ledger>(ctx: &Context<L>, args: &CallArgs) -> Result<bool, CommandError> {
    let mut call = build_call(&args.function, &args.type_args, &args.args)?;
    if let Some(max_gas) = args.max_gas {
        call = call.with_max_gas_amount(max_gas);
    }
    submit_one(ctx, &args.function, &call).await
}

/// Evaluate an arbitrary view function.
pub async fn view<L: Ledger>(ctx: &Context<L>, args: &ViewArgs) -> Result<bool, CommandError> {
    let call = build_call(&args.function, &args.type_args, &args.args)?;
    print_view(ctx, &call).await
}

fn build_call(
    function: &str,
    type_args: &[String],
    args: &[serde_json::Value],
) -> LedgerResult<Call> {
    let call = type_args
        .iter()
        .fold(Call::parse(function)?, |call, tag| call.type_arg(tag.clone()));
    Ok(args.iter().fold(call, |call, value| call.arg(value.clone())))
}

/// Mint `amount` keys in chunks, halting on the first failed chunk.
pub async fn mint_keys<L: Ledger>(ctx: &Context<L>, args: &MintArgs) -> Result<bool, CommandError> {
    let program = ctx.keys_program()?;
    let chunk_size = args.chunk_size.unwrap_or(ctx.config.batch.mint_chunk_size);
    let chunks = chunk_counts(args.amount, chunk_size)?;

    let batch = run_batch(ctx, "Mint keys", "keys", &chunks, args.delay_ms, |_, amount| {
        program.mint_keys_admin(*amount)
    })
    .await?;

    let hint = format!(
        "Re-run `keys mint {}` to mint the rest.",
        batch.progress.units_left()
    );
    println!("{}", report::batch_summary_line("Mint keys", &batch, "keys", &hint));
    Ok(batch.is_complete())
}

/// Add destination token URIs from a file in chunks.
pub async fn add_token_uris<L: Ledger>(
    ctx: &Context<L>,
    args: &RecordFileArgs,
) -> Result<bool, CommandError> {
    let program = ctx.keys_program()?;
    let uris = input::read_lines(&args.file)?;
    let chunks = chunk_records(&uris, record_chunk_size(ctx, args.chunk_size))?;

    let batch = run_batch(ctx, "Add token URIs", "URIs", &chunks, args.delay_ms, |_, chunk| {
        program.add_token_uris(chunk)
    })
    .await?;

    let hint = skip_hint(&args.file, batch.progress.completed_units, "URIs");
    println!("{}", report::batch_summary_line("Add token URIs", &batch, "URIs", &hint));
    Ok(batch.is_complete())
}

/// Add gen2 token assets from a CSV file in chunks.
pub async fn add_tokens<L: Ledger>(
    ctx: &Context<L>,
    program: &Gen2Program,
    args: &RecordFileArgs,
    key_batch: Option<KeyBatch>,
) -> Result<bool, CommandError> {
    let assets = input::read_token_assets(&args.file)?;
    let chunks = chunk_records(&assets, record_chunk_size(ctx, args.chunk_size))?;

    let batch = run_batch(ctx, "Add tokens", "tokens", &chunks, args.delay_ms, |_, chunk| {
        match key_batch {
            Some(key_batch) => program.add_batch_tokens(key_batch, chunk),
            None => program.add_tokens(chunk),
        }
    })
    .await?;

    let hint = skip_hint(&args.file, batch.progress.completed_units, "records");
    println!("{}", report::batch_summary_line("Add tokens", &batch, "tokens", &hint));
    Ok(batch.is_complete())
}

/// Offer one key per receiver, numbering keys from the start number.
pub async fn send_keys<L: Ledger>(
    ctx: &Context<L>,
    args: &SendKeysArgs,
) -> Result<bool, CommandError> {
    let receivers = input::read_addresses(&args.addresses_file)?;
    if receivers.is_empty() {
        return Err(CommandError::NoAddresses);
    }

    let creator = match args.creator {
        Some(creator) => creator,
        None => ctx.keys_program()?.address(),
    };
    let distribution = KeyDistribution {
        creator,
        collection_name: args.collection_name.clone(),
        base_token_name: args.base_name.clone(),
        property_version: args.property_version,
    };
    let deliveries = KeyDistribution::plan(&receivers, args.start_number);

    let batch = BatchLoop::new(ctx.submitter(), ctx.wallet()?, "Send keys")
        .with_delay(ctx.delay(args.delay_ms))
        .run(
            &deliveries,
            |_, delivery| distribution.offer(delivery),
            |_, delivery, outcome, progress| {
                let operation = format!(
                    "Send {} to {}",
                    distribution.token_name(delivery.key_number),
                    delivery.receiver
                );
                println!(
                    "{}",
                    report::batch_outcome_line(&operation, outcome, progress, "addresses")
                );
            },
        )
        .await?;

    let served = batch.progress.completed_items as u64;
    let hint = format!(
        "Remove the first {} addresses from {} and re-run with --start-number {}.",
        served,
        args.addresses_file.display(),
        args.start_number + served
    );
    println!("{}", report::batch_summary_line("Send keys", &batch, "addresses", &hint));
    Ok(batch.is_complete())
}

/// Transfer keys to the receiver identity, which co-signs each transfer.
pub async fn transfer_keys<L: Ledger>(
    ctx: &Context<L>,
    args: &TransferKeysArgs,
) -> Result<bool, CommandError> {
    let receiver = ctx.load_wallet(&args.receiver)?;
    transfer_keys_to(ctx, args, &receiver).await
}

/// Transfer `args.count` consecutive keys to `receiver`, halting on the
/// first failed transfer.
pub async fn transfer_keys_to<L: Ledger>(
    ctx: &Context<L>,
    args: &TransferKeysArgs,
    receiver: &Wallet,
) -> Result<bool, CommandError> {
    let creator = match args.creator {
        Some(creator) => creator,
        None => ctx.keys_program()?.address(),
    };
    let distribution = KeyDistribution {
        creator,
        collection_name: args.collection_name.clone(),
        base_token_name: args.base_name.clone(),
        property_version: args.property_version,
    };
    if args.count > MAX_CHUNKS {
        return Err(BatchError::TooManyChunks {
            chunks: args.count,
            max: MAX_CHUNKS,
        }
        .into());
    }
    let deliveries =
        KeyDistribution::plan_direct(receiver.address(), args.start_number, args.count);

    let batch = BatchLoop::new(ctx.submitter(), ctx.wallet()?, "Transfer keys")
        .with_co_signers(std::slice::from_ref(receiver))
        .with_delay(ctx.delay(args.delay_ms))
        .run(
            &deliveries,
            |_, delivery| distribution.direct_transfer(delivery),
            |_, delivery, outcome, progress| {
                let operation = format!(
                    "Transfer {} to {}",
                    distribution.token_name(delivery.key_number),
                    delivery.receiver
                );
                println!(
                    "{}",
                    report::batch_outcome_line(&operation, outcome, progress, "keys")
                );
            },
        )
        .await?;

    let transferred = batch.progress.completed_items as u64;
    let hint = format!(
        "Re-run with count {} and --start-number {}.",
        batch.progress.units_left(),
        args.start_number + transferred
    );
    println!("{}", report::batch_summary_line("Transfer keys", &batch, "keys", &hint));
    Ok(batch.is_complete())
}

async fn submit_one<L: Ledger>(
    ctx: &Context<L>,
    operation: &str,
    call: &Call,
) -> Result<bool, CommandError> {
    let outcome = ctx.submitter().submit(call, ctx.wallet()?).await?;
    metrics::record_outcome(operation, &outcome);
    println!("{}", report::outcome_line(operation, &outcome));
    Ok(outcome.is_success())
}

async fn run_batch<L, T, B>(
    ctx: &Context<L>,
    operation: &str,
    unit: &str,
    items: &[T],
    delay_ms: Option<u64>,
    build: B,
) -> Result<BatchReport, CommandError>
where
    L: Ledger,
    T: BatchItem,
    B: FnMut(usize, &T) -> LedgerResult<Call>,
{
    let batch = BatchLoop::new(ctx.submitter(), ctx.wallet()?, operation)
        .with_delay(ctx.delay(delay_ms))
        .run(items, build, |_, _, outcome, progress| {
            println!(
                "{}",
                report::batch_outcome_line(operation, outcome, progress, unit)
            );
        })
        .await?;
    Ok(batch)
}

async fn print_view<L: Ledger>(ctx: &Context<L>, call: &Call) -> Result<bool, CommandError> {
    let values = ctx.submitter().ledger().view(&call.view_request()).await?;
    for value in values {
        println!("{:#}", value);
    }
    Ok(true)
}

fn record_chunk_size<L>(ctx: &Context<L>, chunk_size: Option<u64>) -> usize {
    chunk_size.unwrap_or(ctx.config.batch.token_chunk_size) as usize
}

fn skip_hint(file: &Path, done: u64, what: &str) -> String {
    format!(
        "Remove the first {} {} from {} and re-run.",
        done,
        what,
        file.display()
    )
}

fn whitelist_addresses(args: &WhitelistArgs) -> Result<Vec<AccountAddress>, CommandError> {
    let mut addresses = args.addresses.clone();
    if let Some(path) = &args.addresses_file {
        addresses.extend(input::read_addresses(path)?);
    }
    if addresses.is_empty() {
        return Err(CommandError::NoAddresses);
    }
    Ok(addresses)
}

fn keys_collection_config(args: KeysCollectionArgs) -> KeysCollectionConfig {
    KeysCollectionConfig {
        collection_name: args.collection_name,
        collection_description: args.collection_description,
        collection_maximum: args.collection_maximum,
        collection_uri: args.collection_uri,
        base_token_name: args.base_token_name,
        token_description: args.token_description,
        token_uri: args.token_uri,
        royalty_payee: args.royalty_payee,
        royalty_points_denominator: args.royalty_denominator,
        royalty_points_numerator: args.royalty_numerator,
    }
}

fn destination_config(args: DestinationArgs) -> DestinationCollectionConfig {
    DestinationCollectionConfig {
        collection_name: args.collection_name,
        collection_description: args.collection_description,
        collection_maximum: args.collection_maximum,
        collection_uri: args.collection_uri,
        base_token_name: args.base_token_name,
        royalty_payee: args.royalty_payee,
        token_description: args.token_description,
        token_maximum: args.token_maximum,
        royalty_points_denominator: args.royalty_denominator,
        royalty_points_numerator: args.royalty_numerator,
    }
}

fn creator_config(args: CreatorArgs) -> CreatorConfig {
    CreatorConfig {
        token_description: args.token_description,
        mint_payee: args.mint_payee,
        collection_description: args.collection_description,
        collection_name: args.collection_name,
        collection_uri: args.collection_uri,
        collection_supply: args.collection_supply,
        royalty_payee: args.royalty_payee,
        royalty_denominator: args.royalty_denominator,
        royalty_numerator: args.royalty_numerator,
    }
}
