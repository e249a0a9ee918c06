//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Bind a call to the sender's sequence number and gas parameters
//! - Sign the node-encoded signing message locally
//! - Submit and poll until the transaction is committed
//!
//! There are no retries here. A transport error after submission leaves
//! the transaction's fate unknown; the caller must check before re-running.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::time::{sleep, timeout};

use crate::config::schema::{PollingConfig, SubmissionConfig};
use crate::ledger::client::Ledger;
use crate::ledger::types::{
    Call, LedgerError, LedgerResult, MultiAgentSignature, Outcome, PendingHandle, RawTransaction,
    SignedSubmission, TransactionSignature, TxStatus,
};
use crate::ledger::wallet::Wallet;
use crate::observability::metrics;
use crate::resilience::PollBackoff;

/// Drives a call through build, sign, submit and confirmation.
pub struct TransactionSubmitter<L> {
    ledger: L,
    submission: SubmissionConfig,
    backoff: PollBackoff,
}

impl<L: Ledger> TransactionSubmitter<L> {
    /// Create a new submitter.
    pub fn new(ledger: L, submission: SubmissionConfig, polling: &PollingConfig) -> Self {
        Self {
            ledger,
            submission,
            backoff: PollBackoff::from(polling),
        }
    }

    /// Get the underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Build the unsigned transaction for `call` sent by `wallet`.
    pub async fn build(&self, call: &Call, wallet: &Wallet) -> LedgerResult<RawTransaction> {
        let sequence_number = self.ledger.sequence_number(wallet.address()).await?;

        let gas_unit_price = match self.submission.gas_unit_price {
            Some(price) => price,
            None => self.ledger.estimate_gas_price().await?,
        };

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Ok(RawTransaction {
            sender: wallet.address(),
            sequence_number,
            max_gas_amount: call
                .max_gas_amount()
                .unwrap_or(self.submission.max_gas_amount),
            gas_unit_price,
            expiration_timestamp_secs: now + self.submission.expiration_secs,
            payload: call.payload(),
            secondary_signers: Vec::new(),
        })
    }

    /// Sign a raw transaction. The key stays in `wallet`.
    pub async fn sign(&self, raw: RawTransaction, wallet: &Wallet) -> LedgerResult<SignedSubmission> {
        self.sign_multi_agent(raw, wallet, &[]).await
    }

    /// Sign as the sender and as every co-signer. `co_signers` must match
    /// `raw.secondary_signers` in order; all of them sign the same message.
    pub async fn sign_multi_agent(
        &self,
        raw: RawTransaction,
        wallet: &Wallet,
        co_signers: &[Wallet],
    ) -> LedgerResult<SignedSubmission> {
        let matches = raw.secondary_signers.len() == co_signers.len()
            && raw
                .secondary_signers
                .iter()
                .zip(co_signers)
                .all(|(address, co_signer)| *address == co_signer.address());
        if !matches {
            return Err(LedgerError::Wallet(
                "Co-signers do not match the transaction's secondary signers".to_string(),
            ));
        }

        let message = self.ledger.encode_submission(&raw).await?;
        let sender = wallet.signature_for(&message);
        let signature = if co_signers.is_empty() {
            TransactionSignature::Ed25519(sender)
        } else {
            TransactionSignature::MultiAgent(MultiAgentSignature {
                sender,
                secondary_signer_addresses: raw.secondary_signers.clone(),
                secondary_signers: co_signers
                    .iter()
                    .map(|co_signer| co_signer.signature_for(&message))
                    .collect(),
            })
        };
        Ok(SignedSubmission { raw, signature })
    }

    /// Build, sign, submit and wait for one call.
    ///
    /// A committed-but-failed transaction is `Ok` with a failed outcome.
    /// Anything that prevents observing a terminal state is an `Err`.
    pub async fn submit(&self, call: &Call, wallet: &Wallet) -> LedgerResult<Outcome> {
        self.submit_multi_agent(call, wallet, &[]).await
    }

    /// Like [`submit`](Self::submit), with `co_signers` signing alongside
    /// the sender. An empty slice is a plain single-signer transaction.
    pub async fn submit_multi_agent(
        &self,
        call: &Call,
        wallet: &Wallet,
        co_signers: &[Wallet],
    ) -> LedgerResult<Outcome> {
        let started = Instant::now();
        let mut raw = self.build(call, wallet).await?;
        raw.secondary_signers = co_signers.iter().map(Wallet::address).collect();
        let sequence_number = raw.sequence_number;
        let signed = self.sign_multi_agent(raw, wallet, co_signers).await?;
        let handle = self.ledger.submit(&signed).await?;

        tracing::info!(
            function = %call.function(),
            hash = %handle.hash,
            sequence_number,
            co_signers = co_signers.len(),
            "Transaction submitted"
        );

        let outcome = self.wait_for_outcome(&handle).await?;
        metrics::record_confirmation_latency(started.elapsed());
        Ok(outcome)
    }

    /// Poll until `handle` is committed or the polling timeout elapses.
    pub async fn wait_for_outcome(&self, handle: &PendingHandle) -> LedgerResult<Outcome> {
        let result = timeout(self.backoff.timeout, async {
            let mut attempt = 0u32;
            loop {
                sleep(self.backoff.delay(attempt)).await;
                attempt = attempt.saturating_add(1);

                match self.ledger.transaction_status(handle).await? {
                    TxStatus::Committed(outcome) => return Ok(outcome),
                    TxStatus::Pending => {
                        tracing::debug!(hash = %handle.hash, attempt, "Transaction pending");
                    }
                }
            }
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(_) => Err(LedgerError::ConfirmationTimeout {
                hash: handle.hash.clone(),
                waited_secs: self.backoff.timeout.as_secs(),
            }),
        }
    }

    /// Polling timeout in effect.
    pub fn poll_timeout(&self) -> Duration {
        self.backoff.timeout
    }
}

impl<L> std::fmt::Debug for TransactionSubmitter<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSubmitter")
            .field("submission", &self.submission)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}
