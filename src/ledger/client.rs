//! Ledger REST client with timeout and error handling.
//!
//! # Responsibilities
//! - Talk to the node's REST API (accounts, gas estimate, submissions, views)
//! - Fail over across endpoints for read requests
//! - Turn node error bodies into typed errors
//! - Map committed transactions into outcomes

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::ledger::types::{
    u64_string, AccountAddress, EncodeSubmissionRequest, GasUsage, LedgerConfig, LedgerError, LedgerResult, Outcome,
    OutcomeStatus, PendingHandle, RawTransaction, SignedSubmission, TxStatus, ViewRequest,
};
use crate::observability::metrics;

/// The remote ledger as seen by the submitter.
///
/// Every method is a single request; callers own sequencing.
pub trait Ledger: Send + Sync {
    /// Current sequence number of `account`.
    fn sequence_number(
        &self,
        account: AccountAddress,
    ) -> impl Future<Output = LedgerResult<u64>> + Send;

    /// Suggested gas unit price in octas.
    fn estimate_gas_price(&self) -> impl Future<Output = LedgerResult<u64>> + Send;

    /// Bytes to sign for `raw`, co-signers included.
    fn encode_submission(
        &self,
        raw: &RawTransaction,
    ) -> impl Future<Output = LedgerResult<Vec<u8>>> + Send;

    /// Hand a signed transaction to the node.
    fn submit(
        &self,
        submission: &SignedSubmission,
    ) -> impl Future<Output = LedgerResult<PendingHandle>> + Send;

    /// Look up a submitted transaction.
    fn transaction_status(
        &self,
        handle: &PendingHandle,
    ) -> impl Future<Output = LedgerResult<TxStatus>> + Send;

    /// Evaluate a read-only view function.
    fn view(&self, request: &ViewRequest) -> impl Future<Output = LedgerResult<Vec<Value>>> + Send;
}

/// Node summary returned by the API root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerInfo {
    pub chain_id: u8,
    #[serde(with = "u64_string")]
    pub ledger_version: u64,
    #[serde(with = "u64_string")]
    pub block_height: u64,
}

#[derive(Deserialize)]
struct AccountData {
    #[serde(with = "u64_string")]
    sequence_number: u64,
}

#[derive(Deserialize)]
struct GasEstimate {
    gas_estimate: u64,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    vm_error_code: Option<u64>,
}

/// Subset of a transaction as returned by `/transactions/by_hash`.
#[derive(Debug, Deserialize)]
struct TransactionView {
    #[serde(rename = "type")]
    kind: String,
    hash: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
    #[serde(default)]
    gas_used: Option<String>,
    #[serde(default)]
    gas_unit_price: Option<String>,
}

impl TransactionView {
    fn into_status(self) -> LedgerResult<TxStatus> {
        if self.kind == "pending_transaction" {
            return Ok(TxStatus::Pending);
        }

        let parse = |field: &str, value: Option<String>| -> LedgerResult<Option<u64>> {
            value
                .map(|v| {
                    v.parse::<u64>().map_err(|e| {
                        LedgerError::Decode(format!("Field '{}' is not a u64: {}", field, e))
                    })
                })
                .transpose()
        };

        let version = parse("version", self.version)?;
        let gas = GasUsage {
            gas_used: parse("gas_used", self.gas_used)?.unwrap_or_default(),
            gas_unit_price: parse("gas_unit_price", self.gas_unit_price)?.unwrap_or_default(),
        };
        let success = self.success.ok_or_else(|| {
            LedgerError::Decode(format!("Committed transaction {} has no success flag", self.hash))
        })?;

        let status = if success {
            let version = version.ok_or_else(|| {
                LedgerError::Decode(format!("Successful transaction {} has no version", self.hash))
            })?;
            OutcomeStatus::Succeeded { version }
        } else {
            OutcomeStatus::Failed {
                vm_status: self.vm_status.unwrap_or_else(|| "unknown".to_string()),
                version,
            }
        };

        Ok(TxStatus::Committed(Outcome {
            hash: self.hash,
            gas,
            status,
        }))
    }
}

/// REST client for a ledger node, with failover for reads.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    /// Primary endpoint first, then failovers.
    endpoints: Vec<Url>,
    config: LedgerConfig,
    timeout_duration: Duration,
}

impl RestClient {
    /// Create a new client. Invalid failover URLs are skipped with a warning.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let primary = Url::parse(&config.node_url).map_err(|e| {
            LedgerError::Transport(format!("Invalid node URL '{}': {}", config.node_url, e))
        })?;
        let mut endpoints = vec![primary];

        for url_str in &config.failover_urls {
            match Url::parse(url_str) {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover node URL"),
            }
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LedgerError::Transport(format!("HTTP client setup failed: {}", e)))?;

        tracing::debug!(
            node_url = %config.node_url,
            failovers = endpoints.len() - 1,
            "Ledger client initialized"
        );

        Ok(Self {
            http,
            endpoints,
            timeout_duration: Duration::from_secs(config.request_timeout_secs),
            config,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Chain id, ledger version and block height.
    pub async fn ledger_info(&self) -> LedgerResult<LedgerInfo> {
        self.read(|http, base| http.get(endpoint(base, "")), false)
            .await?
            .ok_or_else(|| LedgerError::Decode("Ledger info not found".to_string()))
    }

    /// Check if the node is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.ledger_info().await.is_ok()
    }

    /// Read request: fails over to the next endpoint on transport errors and
    /// timeouts. With `allow_not_found`, a 404 is `Ok(None)`.
    async fn read<T, F>(&self, build: F, allow_not_found: bool) -> LedgerResult<Option<T>>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client, &Url) -> RequestBuilder,
    {
        let mut last_error = None;
        for (i, base) in self.endpoints.iter().enumerate() {
            match self.execute(build(&self.http, base), allow_not_found).await {
                Ok(value) => return Ok(value),
                Err(e @ (LedgerError::Transport(_) | LedgerError::Timeout(_))) => {
                    tracing::warn!(endpoint_idx = i, error = %e, "Node request failed, trying next endpoint");
                    metrics::record_rpc_failure("read");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error
            .unwrap_or_else(|| LedgerError::Transport("No node endpoints configured".to_string())))
    }

    /// Single request against the primary endpoint.
    async fn write<T, F>(&self, build: F) -> LedgerResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&reqwest::Client, &Url) -> RequestBuilder,
    {
        let request = build(&self.http, &self.endpoints[0]);
        match self.execute(request, false).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(LedgerError::Decode("Empty response".to_string())),
            Err(e) => {
                metrics::record_rpc_failure("write");
                Err(e)
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        allow_not_found: bool,
    ) -> LedgerResult<Option<T>> {
        let attempt = async {
            let response = request
                .send()
                .await
                .map_err(|e| LedgerError::Transport(e.to_string()))?;

            let status = response.status();
            if allow_not_found && status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(api_error(status, &body));
            }

            response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| LedgerError::Decode(e.to_string()))
        };

        match timeout(self.timeout_duration, attempt).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout(self.timeout_duration.as_secs())),
        }
    }
}

impl Ledger for RestClient {
    async fn sequence_number(&self, account: AccountAddress) -> LedgerResult<u64> {
        let path = format!("accounts/{}", account);
        let data: Option<AccountData> = self
            .read(|http, base| http.get(endpoint(base, &path)), false)
            .await?;
        data.map(|d| d.sequence_number)
            .ok_or_else(|| LedgerError::Decode(format!("Account {} not found", account)))
    }

    async fn estimate_gas_price(&self) -> LedgerResult<u64> {
        let estimate: Option<GasEstimate> = self
            .read(|http, base| http.get(endpoint(base, "estimate_gas_price")), false)
            .await?;
        estimate
            .map(|e| e.gas_estimate)
            .ok_or_else(|| LedgerError::Decode("Missing gas estimate".to_string()))
    }

    async fn encode_submission(&self, raw: &RawTransaction) -> LedgerResult<Vec<u8>> {
        let request = EncodeSubmissionRequest::from(raw);
        let encoded: Option<String> = self
            .read(
                |http, base| {
                    http.post(endpoint(base, "transactions/encode_submission"))
                        .json(&request)
                },
                false,
            )
            .await?;
        let encoded =
            encoded.ok_or_else(|| LedgerError::Decode("Empty signing message".to_string()))?;
        hex::decode(encoded.trim_start_matches("0x"))
            .map_err(|e| LedgerError::Decode(format!("Signing message is not hex: {}", e)))
    }

    async fn submit(&self, submission: &SignedSubmission) -> LedgerResult<PendingHandle> {
        self.write(|http, base| http.post(endpoint(base, "transactions")).json(submission))
            .await
    }

    async fn transaction_status(&self, handle: &PendingHandle) -> LedgerResult<TxStatus> {
        let path = format!("transactions/by_hash/{}", handle.hash);
        let view: Option<TransactionView> = self
            .read(|http, base| http.get(endpoint(base, &path)), true)
            .await?;
        match view {
            Some(view) => view.into_status(),
            None => Ok(TxStatus::Pending),
        }
    }

    async fn view(&self, request: &ViewRequest) -> LedgerResult<Vec<Value>> {
        let values: Option<Vec<Value>> = self
            .read(|http, base| http.post(endpoint(base, "view")).json(request), false)
            .await?;
        Ok(values.unwrap_or_default())
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("node_url", &self.config.node_url)
            .field("failovers", &(self.endpoints.len() - 1))
            .field("timeout_secs", &self.config.request_timeout_secs)
            .finish()
    }
}

fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}

fn api_error(status: StatusCode, body: &str) -> LedgerError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => {
            let code = match (err.error_code, err.vm_error_code) {
                (Some(code), Some(vm)) => format!("{} / vm {}", code, vm),
                (Some(code), None) => code,
                (None, Some(vm)) => format!("vm {}", vm),
                (None, None) => "unknown".to_string(),
            };
            LedgerError::Api {
                status: status.as_u16(),
                code,
                message: err.message,
            }
        }
        Err(_) => LedgerError::Api {
            status: status.as_u16(),
            code: "unknown".to_string(),
            message: body.trim().to_string(),
        },
    }
}
