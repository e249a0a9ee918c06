//! Shared utilities for integration tests.

#![allow(dead_code)]

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use mint_ops::commands::Context;
use mint_ops::config::{OpsConfig, PollingConfig};
use mint_ops::ledger::types::{
    AccountAddress, GasUsage, LedgerError, LedgerResult, Outcome, OutcomeStatus, PendingHandle,
    RawTransaction, SignedSubmission, TxStatus, ViewRequest,
};
use mint_ops::ledger::{Ledger, Wallet};

pub const TEST_PRIVATE_KEY: &str =
    "0x4242424242424242424242424242424242424242424242424242424242424242";
pub const TEST_ACCOUNT: &str = "0xa11ce";
pub const KEYS_ADDRESS: &str = "0xcafe";
pub const GEN2_ADDRESS: &str = "0x6e2";

/// Gas units every scripted transaction reports.
pub const GAS_USED: u64 = 500;
/// Gas unit price the scripted ledger estimates.
pub const GAS_UNIT_PRICE: u64 = 100;

/// How the scripted ledger answers the next submission.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed,
    Fail(&'static str),
    TransportError,
}

#[derive(Default)]
struct State {
    script: VecDeque<Step>,
    submitted: Vec<SignedSubmission>,
    outcomes: HashMap<String, Outcome>,
    requests: usize,
    views: Vec<ViewRequest>,
    view_response: Vec<Value>,
}

/// In-memory ledger that commits each submission immediately according to
/// a script. Submissions past the end of the script succeed.
#[derive(Clone, Default)]
pub struct ScriptedLedger {
    state: Arc<Mutex<State>>,
}

impl ScriptedLedger {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        let ledger = Self::default();
        ledger.state.lock().unwrap().script = script.into_iter().collect();
        ledger
    }

    pub fn with_view_response(self, values: Vec<Value>) -> Self {
        self.state.lock().unwrap().view_response = values;
        self
    }

    pub fn submitted(&self) -> Vec<SignedSubmission> {
        self.state.lock().unwrap().submitted.clone()
    }

    /// Arguments of every submitted payload, in submission order.
    pub fn submitted_arguments(&self) -> Vec<Vec<Value>> {
        self.submitted()
            .into_iter()
            .map(|s| s.raw.payload.arguments)
            .collect()
    }

    pub fn views(&self) -> Vec<ViewRequest> {
        self.state.lock().unwrap().views.clone()
    }

    /// Number of requests that would have reached a node.
    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }
}

impl Ledger for ScriptedLedger {
    async fn sequence_number(&self, _account: AccountAddress) -> LedgerResult<u64> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;
        Ok(state.submitted.len() as u64)
    }

    async fn estimate_gas_price(&self) -> LedgerResult<u64> {
        self.state.lock().unwrap().requests += 1;
        Ok(GAS_UNIT_PRICE)
    }

    async fn encode_submission(&self, _raw: &RawTransaction) -> LedgerResult<Vec<u8>> {
        self.state.lock().unwrap().requests += 1;
        Ok(b"signing message".to_vec())
    }

    async fn submit(&self, submission: &SignedSubmission) -> LedgerResult<PendingHandle> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;

        let step = state.script.pop_front().unwrap_or(Step::Succeed);
        let n = state.submitted.len() as u64;
        let hash = format!("0x{:064x}", n + 1);

        let status = match step {
            Step::Succeed => OutcomeStatus::Succeeded { version: 1_000 + n },
            Step::Fail(vm_status) => OutcomeStatus::Failed {
                vm_status: vm_status.to_string(),
                version: Some(1_000 + n),
            },
            Step::TransportError => {
                return Err(LedgerError::Transport("connection reset by peer".to_string()))
            }
        };

        state.submitted.push(submission.clone());
        state.outcomes.insert(
            hash.clone(),
            Outcome {
                hash: hash.clone(),
                gas: GasUsage {
                    gas_used: GAS_USED,
                    gas_unit_price: submission.raw.gas_unit_price,
                },
                status,
            },
        );
        Ok(PendingHandle { hash })
    }

    async fn transaction_status(&self, handle: &PendingHandle) -> LedgerResult<TxStatus> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;
        Ok(match state.outcomes.get(&handle.hash) {
            Some(outcome) => TxStatus::Committed(outcome.clone()),
            None => TxStatus::Pending,
        })
    }

    async fn view(&self, request: &ViewRequest) -> LedgerResult<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;
        state.views.push(request.clone());
        Ok(state.view_response.clone())
    }
}

pub fn wallet() -> Wallet {
    Wallet::from_private_key(TEST_PRIVATE_KEY, TEST_ACCOUNT).unwrap()
}

/// Polling fast enough for tests.
pub fn fast_polling() -> PollingConfig {
    PollingConfig {
        timeout_secs: 5,
        initial_interval_ms: 1,
        max_interval_ms: 5,
    }
}

pub fn test_config() -> OpsConfig {
    let mut config = OpsConfig::default();
    config.polling = fast_polling();
    config.contracts.keys_address = Some(KEYS_ADDRESS.to_string());
    config.contracts.gen2_address = Some(GEN2_ADDRESS.to_string());
    config
}

pub fn context(ledger: ScriptedLedger) -> Context<ScriptedLedger> {
    context_with(test_config(), ledger)
}

pub fn context_with(config: OpsConfig, ledger: ScriptedLedger) -> Context<ScriptedLedger> {
    Context::new(config, "default", ledger).with_wallet(wallet())
}

pub fn address(s: &str) -> AccountAddress {
    s.parse().unwrap()
}
