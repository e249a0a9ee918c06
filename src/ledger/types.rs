//! Ledger-facing types and error definitions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export LedgerConfig from config module to avoid duplication
pub use crate::config::schema::LedgerConfig;

/// Octas per APT.
pub const OCTAS_PER_APT: u64 = 100_000_000;

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Connection or request failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered with a non-success status.
    #[error("Node rejected request (status {status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Transaction was submitted but not observed as committed in time.
    #[error(
        "Transaction {hash} not confirmed after {waited_secs} seconds; \
         it may still commit, check it before resubmitting"
    )]
    ConfirmationTimeout { hash: String, waited_secs: u64 },

    /// The node answered with a body we could not interpret.
    #[error("Unexpected node response: {0}")]
    Decode(String),

    /// Invalid private key, account address or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The call could not be built.
    #[error("Invalid call: {0}")]
    InvalidCall(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    pub const LENGTH: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for AccountAddress {
    type Err = LedgerError;

    /// Accepts short (`0x1`) and long forms, with or without the `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if digits.is_empty() || digits.len() > Self::LENGTH * 2 {
            return Err(LedgerError::InvalidCall(format!(
                "Invalid account address '{}'",
                s
            )));
        }

        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&padded, &mut bytes).map_err(|e| {
            LedgerError::InvalidCall(format!("Invalid account address '{}': {}", s, e))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fully qualified entry function, `<address>::<module>::<function>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFunctionId {
    pub address: AccountAddress,
    pub module: String,
    pub function: String,
}

impl EntryFunctionId {
    pub fn new(address: AccountAddress, module: &str, function: &str) -> LedgerResult<Self> {
        for ident in [module, function] {
            if !is_identifier(ident) {
                return Err(LedgerError::InvalidCall(format!(
                    "'{}' is not a valid identifier",
                    ident
                )));
            }
        }
        Ok(Self {
            address,
            module: module.to_string(),
            function: function.to_string(),
        })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for EntryFunctionId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split("::").collect();
        let [address, module, function] = parts.as_slice() else {
            return Err(LedgerError::InvalidCall(format!(
                "Target '{}' is not of the form <address>::<module>::<function>",
                s
            )));
        };
        Self::new(address.parse()?, module, function)
    }
}

impl fmt::Display for EntryFunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.function)
    }
}

impl Serialize for EntryFunctionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One state-changing remote call, prior to signing.
///
/// Built by value; once handed to the submitter it is only read.
/// 64-bit integers are encoded as decimal strings, which is how the node
/// expects `u64` arguments in JSON payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    function: EntryFunctionId,
    type_arguments: Vec<String>,
    arguments: Vec<Value>,
    max_gas_amount: Option<u64>,
}

impl Call {
    pub fn new(function: EntryFunctionId) -> Self {
        Self {
            function,
            type_arguments: Vec::new(),
            arguments: Vec::new(),
            max_gas_amount: None,
        }
    }

    /// Parse the target and start a call. Fails before any network traffic.
    pub fn parse(function: &str) -> LedgerResult<Self> {
        Ok(Self::new(function.parse()?))
    }

    pub fn type_arg(mut self, type_tag: impl Into<String>) -> Self {
        self.type_arguments.push(type_tag.into());
        self
    }

    /// Raw JSON argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value.into());
        self
    }

    pub fn u64_arg(self, value: u64) -> Self {
        self.arg(value.to_string())
    }

    pub fn u64_vec_arg(self, values: &[u64]) -> Self {
        self.arg(u64_array(values))
    }

    pub fn u64_matrix_arg(self, rows: &[Vec<u64>]) -> Self {
        self.arg(Value::Array(rows.iter().map(|r| u64_array(r)).collect()))
    }

    pub fn string_arg(self, value: impl Into<String>) -> Self {
        self.arg(Value::String(value.into()))
    }

    pub fn string_vec_arg<S: AsRef<str>>(self, values: &[S]) -> Self {
        self.arg(string_array(values))
    }

    pub fn string_matrix_arg<S: AsRef<str>>(self, rows: &[Vec<S>]) -> Self {
        self.arg(Value::Array(rows.iter().map(|r| string_array(r)).collect()))
    }

    pub fn address_arg(self, address: &AccountAddress) -> Self {
        self.arg(address.to_string())
    }

    pub fn address_vec_arg(self, addresses: &[AccountAddress]) -> Self {
        self.arg(Value::Array(
            addresses.iter().map(|a| Value::String(a.to_string())).collect(),
        ))
    }

    pub fn with_max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = Some(max_gas_amount);
        self
    }

    pub fn function(&self) -> &EntryFunctionId {
        &self.function
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn type_arguments(&self) -> &[String] {
        &self.type_arguments
    }

    pub fn max_gas_amount(&self) -> Option<u64> {
        self.max_gas_amount
    }

    /// Payload as submitted inside a transaction.
    pub fn payload(&self) -> EntryFunctionPayload {
        EntryFunctionPayload {
            function: self.function.clone(),
            type_arguments: self.type_arguments.clone(),
            arguments: self.arguments.clone(),
        }
    }

    /// Body for a read-only view request.
    pub fn view_request(&self) -> ViewRequest {
        ViewRequest {
            function: self.function.clone(),
            type_arguments: self.type_arguments.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

fn u64_array(values: &[u64]) -> Value {
    Value::Array(values.iter().map(|v| Value::String(v.to_string())).collect())
}

fn string_array<S: AsRef<str>>(values: &[S]) -> Value {
    Value::Array(
        values
            .iter()
            .map(|v| Value::String(v.as_ref().to_string()))
            .collect(),
    )
}

/// `entry_function_payload` JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "entry_function_payload")]
pub struct EntryFunctionPayload {
    pub function: EntryFunctionId,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

/// Body of a `/view` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRequest {
    pub function: EntryFunctionId,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

/// Unsigned transaction: a call bound to a sender and gas parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    #[serde(with = "u64_string")]
    pub sequence_number: u64,
    #[serde(with = "u64_string")]
    pub max_gas_amount: u64,
    #[serde(with = "u64_string")]
    pub gas_unit_price: u64,
    #[serde(with = "u64_string")]
    pub expiration_timestamp_secs: u64,
    pub payload: EntryFunctionPayload,
    /// Co-signers of a multi-agent transaction. They are part of the
    /// signing message but travel in the authenticator on submission.
    #[serde(skip)]
    pub secondary_signers: Vec<AccountAddress>,
}

/// Body of `/transactions/encode_submission`.
#[derive(Debug, Serialize)]
pub struct EncodeSubmissionRequest<'a> {
    #[serde(flatten)]
    pub raw: &'a RawTransaction,
    #[serde(skip_serializing_if = "no_signers")]
    pub secondary_signers: &'a [AccountAddress],
}

fn no_signers(signers: &&[AccountAddress]) -> bool {
    signers.is_empty()
}

impl<'a> From<&'a RawTransaction> for EncodeSubmissionRequest<'a> {
    fn from(raw: &'a RawTransaction) -> Self {
        Self {
            raw,
            secondary_signers: &raw.secondary_signers,
        }
    }
}

/// One ed25519 signature with its public key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "ed25519_signature")]
pub struct Ed25519Signature {
    pub public_key: String,
    pub signature: String,
}

/// Sender plus co-signers, all over the same signing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "multi_agent_signature")]
pub struct MultiAgentSignature {
    pub sender: Ed25519Signature,
    pub secondary_signer_addresses: Vec<AccountAddress>,
    pub secondary_signers: Vec<Ed25519Signature>,
}

/// Authenticator attached to a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TransactionSignature {
    Ed25519(Ed25519Signature),
    MultiAgent(MultiAgentSignature),
}

impl TransactionSignature {
    /// The sender's own signature.
    pub fn sender(&self) -> &Ed25519Signature {
        match self {
            TransactionSignature::Ed25519(signature) => signature,
            TransactionSignature::MultiAgent(multi) => &multi.sender,
        }
    }
}

/// A raw transaction plus its signature, ready for transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedSubmission {
    #[serde(flatten)]
    pub raw: RawTransaction,
    pub signature: TransactionSignature,
}

/// Handle for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingHandle {
    pub hash: String,
}

/// Gas consumed by a committed transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasUsage {
    pub gas_used: u64,
    pub gas_unit_price: u64,
}

impl GasUsage {
    /// Cost in octas.
    pub fn octas(&self) -> u64 {
        self.gas_used.saturating_mul(self.gas_unit_price)
    }

    /// Cost in APT.
    pub fn apt(&self) -> f64 {
        self.octas() as f64 / OCTAS_PER_APT as f64
    }
}

/// Terminal status of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Applied at the given ledger version.
    Succeeded { version: u64 },
    /// Committed but aborted, or discarded.
    Failed {
        vm_status: String,
        version: Option<u64>,
    },
}

/// Terminal result of a submitted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub hash: String,
    pub gas: GasUsage,
    pub status: OutcomeStatus,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded { .. })
    }

    /// Ledger version, if the transaction made it into the ledger.
    pub fn version(&self) -> Option<u64> {
        match &self.status {
            OutcomeStatus::Succeeded { version } => Some(*version),
            OutcomeStatus::Failed { version, .. } => *version,
        }
    }

    /// Remote diagnostic, only for failed outcomes.
    pub fn vm_status(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Succeeded { .. } => None,
            OutcomeStatus::Failed { vm_status, .. } => Some(vm_status),
        }
    }
}

/// Result of a status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Not yet committed (unknown to the node, or in mempool).
    Pending,
    /// Committed with a terminal outcome.
    Committed(Outcome),
}

/// `u64` fields travel as decimal strings.
pub(crate) mod u64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s.parse().map_err(serde::de::Error::custom),
            StringOrNumber::Number(n) => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_short_and_long_forms() {
        let short: AccountAddress = "0x1".parse().unwrap();
        let long: AccountAddress =
            "0000000000000000000000000000000000000000000000000000000000000001"
                .parse()
                .unwrap();
        assert_eq!(short, long);
        assert_eq!(
            short.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_address_rejects_garbage() {
        assert!("0x".parse::<AccountAddress>().is_err());
        assert!("0xzz".parse::<AccountAddress>().is_err());
        assert!(format!("0x{}", "a".repeat(65))
            .parse::<AccountAddress>()
            .is_err());
    }

    #[test]
    fn test_function_id_parse() {
        let id: EntryFunctionId = "0x1::minting::mint_keys_admin".parse().unwrap();
        assert_eq!(id.module, "minting");
        assert_eq!(id.function, "mint_keys_admin");
        assert!(id.to_string().ends_with("::minting::mint_keys_admin"));
    }

    #[test]
    fn test_malformed_target_rejected() {
        for target in [
            "minting::mint",
            "0x1::minting",
            "0x1::minting::mint::extra",
            "0x1::9bad::mint",
            "0x1::minting::",
            "nothex::minting::mint",
        ] {
            let err = Call::parse(target).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidCall(_)), "{}", target);
        }
    }

    #[test]
    fn test_payload_serialization() {
        let call = Call::parse("0x1::minting::add_to_whitelist")
            .unwrap()
            .address_vec_arg(&["0x2".parse().unwrap()])
            .u64_arg(10);
        let json = serde_json::to_value(call.payload()).unwrap();
        assert_eq!(json["type"], "entry_function_payload");
        assert_eq!(json["arguments"][1], "10");
        assert_eq!(json["type_arguments"], serde_json::json!([]));
        assert!(json["function"]
            .as_str()
            .unwrap()
            .ends_with("::minting::add_to_whitelist"));
    }

    #[test]
    fn test_signed_submission_flattens_raw_fields() {
        let call = Call::parse("0x1::minting::create_collection").unwrap();
        let submission = SignedSubmission {
            raw: RawTransaction {
                sender: "0x5".parse().unwrap(),
                sequence_number: 7,
                max_gas_amount: 2000,
                gas_unit_price: 100,
                expiration_timestamp_secs: 1_700_000_000,
                payload: call.payload(),
                secondary_signers: Vec::new(),
            },
            signature: TransactionSignature::Ed25519(Ed25519Signature {
                public_key: "0xaa".into(),
                signature: "0xbb".into(),
            }),
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["sequence_number"], "7");
        assert_eq!(json["gas_unit_price"], "100");
        assert_eq!(json["signature"]["type"], "ed25519_signature");
        assert_eq!(json["signature"]["public_key"], "0xaa");
        assert_eq!(json["payload"]["type"], "entry_function_payload");

        let encode = serde_json::to_value(EncodeSubmissionRequest::from(&submission.raw)).unwrap();
        assert!(encode.get("secondary_signers").is_none());
    }

    #[test]
    fn test_multi_agent_submission_shape() {
        let receiver: AccountAddress = "0x7f".parse().unwrap();
        let raw = RawTransaction {
            sender: "0x5".parse().unwrap(),
            sequence_number: 3,
            max_gas_amount: 2000,
            gas_unit_price: 100,
            expiration_timestamp_secs: 1_700_000_000,
            payload: Call::parse("0x3::token::direct_transfer_script").unwrap().payload(),
            secondary_signers: vec![receiver],
        };

        let encode = serde_json::to_value(EncodeSubmissionRequest::from(&raw)).unwrap();
        assert_eq!(encode["secondary_signers"], serde_json::json!([receiver.to_string()]));
        assert_eq!(encode["sequence_number"], "3");

        let submission = SignedSubmission {
            raw,
            signature: TransactionSignature::MultiAgent(MultiAgentSignature {
                sender: Ed25519Signature {
                    public_key: "0xaa".into(),
                    signature: "0xbb".into(),
                },
                secondary_signer_addresses: vec![receiver],
                secondary_signers: vec![Ed25519Signature {
                    public_key: "0xcc".into(),
                    signature: "0xdd".into(),
                }],
            }),
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert!(json.get("secondary_signers").is_none());
        assert_eq!(json["signature"]["type"], "multi_agent_signature");
        assert_eq!(json["signature"]["sender"]["type"], "ed25519_signature");
        assert_eq!(json["signature"]["sender"]["signature"], "0xbb");
        assert_eq!(
            json["signature"]["secondary_signer_addresses"],
            serde_json::json!([receiver.to_string()])
        );
        assert_eq!(json["signature"]["secondary_signers"][0]["public_key"], "0xcc");
        assert_eq!(submission.signature.sender().public_key, "0xaa");
    }

    #[test]
    fn test_gas_usage_in_apt() {
        let gas = GasUsage {
            gas_used: 1_500,
            gas_unit_price: 100,
        };
        assert_eq!(gas.octas(), 150_000);
        assert!((gas.apt() - 0.0015).abs() < f64::EPSILON);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = Outcome {
            hash: "0x1".into(),
            gas: GasUsage::default(),
            status: OutcomeStatus::Succeeded { version: 42 },
        };
        assert!(ok.is_success());
        assert_eq!(ok.version(), Some(42));
        assert_eq!(ok.vm_status(), None);

        let failed = Outcome {
            status: OutcomeStatus::Failed {
                vm_status: "Move abort".into(),
                version: None,
            },
            ..ok
        };
        assert!(!failed.is_success());
        assert_eq!(failed.vm_status(), Some("Move abort"));
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Timeout(10);
        assert_eq!(err.to_string(), "Request timeout after 10 seconds");

        let err = LedgerError::ConfirmationTimeout {
            hash: "0xabc".into(),
            waited_secs: 60,
        };
        assert!(err.to_string().contains("may still commit"));
    }
}
