//! Command execution against a scripted ledger.

use serde_json::json;
use std::io::Write;

use mint_ops::cli::{
    CallArgs, Gen2Command, MintArgs, RecordFileArgs, SendKeysArgs, TransferKeysArgs,
};
use mint_ops::batch::BatchError;
use mint_ops::commands::{self, CommandError};
use mint_ops::ledger::types::TransactionSignature;
use mint_ops::ledger::{LedgerError, Wallet};
use mint_ops::operations::{KeyBatch, HEAVY_MAX_GAS};

mod common;
use common::{ScriptedLedger, Step};

fn temp_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_mint_uses_configured_chunk_size() {
    let ledger = ScriptedLedger::default();
    let ctx = common::context(ledger.clone());

    let args = MintArgs {
        amount: 250,
        chunk_size: None,
        delay_ms: None,
    };
    assert!(commands::mint_keys(&ctx, &args).await.unwrap());

    let submitted = ledger.submitted();
    assert_eq!(submitted.len(), 3);
    assert_eq!(submitted[2].raw.payload.arguments, vec![json!("50")]);
    assert_eq!(submitted[0].raw.max_gas_amount, HEAVY_MAX_GAS);
    assert!(submitted[0]
        .raw
        .payload
        .function
        .to_string()
        .ends_with("::minting::mint_keys_admin"));
    // Sequence numbers advance with each committed transaction.
    let sequence_numbers: Vec<u64> = submitted.iter().map(|s| s.raw.sequence_number).collect();
    assert_eq!(sequence_numbers, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_mint_reports_failure() {
    let ledger = ScriptedLedger::new([Step::Succeed, Step::Fail("Move abort: EMAX_SUPPLY")]);
    let ctx = common::context(ledger.clone());

    let args = MintArgs {
        amount: 100,
        chunk_size: Some(25),
        delay_ms: Some(0),
    };
    assert!(!commands::mint_keys(&ctx, &args).await.unwrap());
    assert_eq!(ledger.submitted().len(), 2);
}

#[tokio::test]
async fn test_mint_rejects_oversized_plan() {
    let ledger = ScriptedLedger::default();
    let ctx = common::context(ledger.clone());

    let args = MintArgs {
        amount: u64::MAX,
        chunk_size: Some(1),
        delay_ms: None,
    };
    let err = commands::mint_keys(&ctx, &args).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Batch(BatchError::TooManyChunks { .. })
    ));
    assert_eq!(ledger.requests(), 0);
}

#[tokio::test]
async fn test_send_keys_stops_at_failed_offer() {
    let ledger = ScriptedLedger::new([Step::Succeed, Step::Fail("Move abort: ENO_TOKEN")]);
    let ctx = common::context(ledger.clone());
    let addresses = temp_file("0x1\n# second receiver\n0x2\n0x3\n");

    let args = SendKeysArgs {
        addresses_file: addresses.path().to_path_buf(),
        collection_name: "Keys".into(),
        base_name: "Key".into(),
        start_number: 7,
        creator: None,
        property_version: 0,
        delay_ms: None,
    };
    assert!(!commands::send_keys(&ctx, &args).await.unwrap());

    let arguments = ledger.submitted_arguments();
    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments[1][0], json!(common::address("0x2").to_string()));
    assert_eq!(arguments[1][1], json!(common::address(common::KEYS_ADDRESS).to_string()));
    assert_eq!(arguments[1][3], json!("Key #8"));
}

fn transfer_args(count: u64, receiver: &str) -> TransferKeysArgs {
    TransferKeysArgs {
        count,
        receiver: receiver.into(),
        collection_name: "Keys".into(),
        base_name: "Key".into(),
        start_number: 20,
        creator: None,
        property_version: 0,
        delay_ms: None,
    }
}

fn receiver_wallet() -> Wallet {
    Wallet::from_private_key(
        "0x5151515151515151515151515151515151515151515151515151515151515151",
        "0xb0b",
    )
    .unwrap()
}

#[tokio::test]
async fn test_transfer_keys_co_signed_by_receiver() {
    let ledger = ScriptedLedger::new([Step::Succeed, Step::Fail("Move abort: EINSUFFICIENT_BALANCE")]);
    let ctx = common::context(ledger.clone());
    let receiver = receiver_wallet();

    let args = transfer_args(3, "receiver");
    assert!(!commands::transfer_keys_to(&ctx, &args, &receiver).await.unwrap());

    let submitted = ledger.submitted();
    assert_eq!(submitted.len(), 2);
    assert!(submitted[0]
        .raw
        .payload
        .function
        .to_string()
        .ends_with("::token::direct_transfer_script"));
    assert_eq!(submitted[1].raw.payload.arguments[2], json!("Key #21"));
    assert_eq!(submitted[1].raw.secondary_signers, vec![receiver.address()]);
    match &submitted[0].signature {
        TransactionSignature::MultiAgent(multi) => {
            assert_eq!(multi.sender.public_key, common::wallet().public_key_hex());
            assert_eq!(multi.secondary_signer_addresses, vec![receiver.address()]);
            assert_eq!(multi.secondary_signers[0].public_key, receiver.public_key_hex());
        }
        other => panic!("expected multi-agent signature, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transfer_keys_unknown_receiver_identity() {
    let ledger = ScriptedLedger::default();
    let ctx = common::context(ledger.clone());

    let err = commands::transfer_keys(&ctx, &transfer_args(1, "nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::UnknownIdentity(ref name) if name == "nobody"));
    assert_eq!(ledger.requests(), 0);
}

#[tokio::test]
async fn test_send_keys_rejects_empty_file() {
    let ctx = common::context(ScriptedLedger::default());
    let addresses = temp_file("# nobody yet\n");

    let args = SendKeysArgs {
        addresses_file: addresses.path().to_path_buf(),
        collection_name: "Keys".into(),
        base_name: "Key".into(),
        start_number: 0,
        creator: None,
        property_version: 0,
        delay_ms: None,
    };
    assert!(matches!(
        commands::send_keys(&ctx, &args).await,
        Err(CommandError::NoAddresses)
    ));
}

#[tokio::test]
async fn test_add_batch_tokens_from_csv() {
    let ledger = ScriptedLedger::default();
    let ctx = common::context(ledger.clone());
    let csv = temp_file(
        "\
token_uri,token_name,rarity,beak,eyes,base,patterns,hair,neck,clothes,body,earring,background
uri1,name1,rarity1,beak1,eyes1,base1,patterns1,hair1,neck1,clothes1,body1,earring1,background1
uri2,name2,rarity2,beak2,eyes2,base2,patterns2,hair2,neck2,clothes2,body2,earring2,background2
uri3,name3,rarity3,beak3,eyes3,base3,patterns3,hair3,neck3,clothes3,body3,earring3,background3
",
    );

    let command = Gen2Command::AddTokens {
        records: RecordFileArgs {
            file: csv.path().to_path_buf(),
            chunk_size: Some(2),
            delay_ms: None,
        },
        batch: Some(KeyBatch::Batch2),
    };
    assert!(commands::gen2(&ctx, command).await.unwrap());

    let arguments = ledger.submitted_arguments();
    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments[0][0], json!("batch_2"));
    assert_eq!(arguments[0][1].as_array().unwrap().len(), 2);
    assert_eq!(arguments[1][1][0][1], json!("name3"));
}

#[tokio::test]
async fn test_missing_contract_address() {
    let mut config = common::test_config();
    config.contracts.gen2_address = None;
    let ledger = ScriptedLedger::default();
    let ctx = common::context_with(config, ledger.clone());

    let err = commands::gen2(&ctx, Gen2Command::CreateCollection)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::MissingContract {
            env_var: "ACCOUNT_GEN2",
            ..
        }
    ));
    assert_eq!(ledger.requests(), 0);
}

#[tokio::test]
async fn test_pool_length_view() {
    let ledger = ScriptedLedger::default().with_view_response(vec![json!("42")]);
    let ctx = common::context(ledger.clone());

    assert!(commands::gen2(&ctx, Gen2Command::PoolLength { pool: 5 })
        .await
        .unwrap());

    let views = ledger.views();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].function.function, "view_pool_length");
    assert_eq!(views[0].arguments, vec![json!("5")]);
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn test_generic_call() {
    let ledger = ScriptedLedger::default();
    let ctx = common::context(ledger.clone());

    let args = CallArgs {
        function: "0xcafe::minting::test_upgraded_v1".into(),
        args: Vec::new(),
        type_args: Vec::new(),
        max_gas: Some(2_000_000),
    };
    assert!(commands::call(&ctx, &args).await.unwrap());
    assert_eq!(ledger.submitted()[0].raw.max_gas_amount, 2_000_000);
}

#[tokio::test]
async fn test_generic_call_with_malformed_target() {
    let ledger = ScriptedLedger::default();
    let ctx = common::context(ledger.clone());

    let args = CallArgs {
        function: "minting::set_admin".into(),
        args: Vec::new(),
        type_args: Vec::new(),
        max_gas: None,
    };
    let err = commands::call(&ctx, &args).await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Ledger(LedgerError::InvalidCall(_))
    ));
    assert_eq!(ledger.requests(), 0);
}
