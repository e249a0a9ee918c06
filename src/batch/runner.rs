//! Halt-on-first-failure batch loop.

use std::time::Duration;
use tokio::time::sleep;

use crate::batch::BatchError;
use crate::ledger::client::Ledger;
use crate::ledger::transaction::TransactionSubmitter;
use crate::ledger::types::{Call, LedgerResult, Outcome};
use crate::ledger::wallet::Wallet;
use crate::observability::metrics;

/// Something a batch processes; `units` is what the operator counts
/// (keys minted, records added, addresses served).
pub trait BatchItem {
    fn units(&self) -> u64;
}

/// A mint chunk: its size.
impl BatchItem for u64 {
    fn units(&self) -> u64 {
        *self
    }
}

/// A record chunk: its length.
impl<T> BatchItem for Vec<T> {
    fn units(&self) -> u64 {
        self.len() as u64
    }
}

/// Progress through a batch. Held in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProgress {
    pub total_units: u64,
    pub completed_units: u64,
    pub total_items: usize,
    pub completed_items: usize,
    /// Index of the last item that succeeded.
    pub last_completed_index: Option<usize>,
    /// Gas spent so far, failed items included.
    pub gas_octas: u64,
}

impl BatchProgress {
    fn new<T: BatchItem>(items: &[T]) -> Self {
        Self {
            total_units: items.iter().map(BatchItem::units).sum(),
            total_items: items.len(),
            ..Self::default()
        }
    }

    /// Units not yet applied, including those of a failed item.
    pub fn units_left(&self) -> u64 {
        self.total_units - self.completed_units
    }
}

/// What a batch run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// One outcome per attempted item, in order.
    pub outcomes: Vec<Outcome>,
    pub progress: BatchProgress,
    /// Index of the item whose outcome failed, if any.
    pub halted_at: Option<usize>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.halted_at.is_none()
    }

    /// Items after the failed one, which were never submitted.
    pub fn never_attempted(&self) -> usize {
        match self.halted_at {
            Some(index) => self.progress.total_items - index - 1,
            None => 0,
        }
    }

    /// Index to resume from: the failed item itself.
    pub fn resume_index(&self) -> Option<usize> {
        self.halted_at
    }
}

/// Runs one submission per item, strictly in order, stopping at the first
/// failed outcome.
pub struct BatchLoop<'a, L> {
    submitter: &'a TransactionSubmitter<L>,
    wallet: &'a Wallet,
    co_signers: &'a [Wallet],
    operation: String,
    delay: Duration,
}

impl<'a, L: Ledger> BatchLoop<'a, L> {
    pub fn new(
        submitter: &'a TransactionSubmitter<L>,
        wallet: &'a Wallet,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            submitter,
            wallet,
            co_signers: &[],
            operation: operation.into(),
            delay: Duration::ZERO,
        }
    }

    /// Have `co_signers` sign every transaction alongside the sender.
    pub fn with_co_signers(mut self, co_signers: &'a [Wallet]) -> Self {
        self.co_signers = co_signers;
        self
    }

    /// Pause after each successful item that has a successor.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Process `items`. `build` creates the call for an item right before it
    /// is submitted; `on_outcome` sees every outcome as it arrives.
    pub async fn run<T, B, O>(
        &self,
        items: &[T],
        mut build: B,
        mut on_outcome: O,
    ) -> Result<BatchReport, BatchError>
    where
        T: BatchItem,
        B: FnMut(usize, &T) -> LedgerResult<Call>,
        O: FnMut(usize, &T, &Outcome, &BatchProgress),
    {
        let mut progress = BatchProgress::new(items);
        let mut outcomes = Vec::with_capacity(items.len());

        tracing::info!(
            operation = %self.operation,
            items = progress.total_items,
            units = progress.total_units,
            "Batch started"
        );

        for (index, item) in items.iter().enumerate() {
            let call = build(index, item).map_err(|source| BatchError::Build { index, source })?;

            let outcome = self
                .submitter
                .submit_multi_agent(&call, self.wallet, self.co_signers)
                .await
                .map_err(|source| BatchError::Ledger {
                    index,
                    completed: progress.completed_items,
                    source,
                })?;

            metrics::record_outcome(&self.operation, &outcome);
            progress.gas_octas = progress.gas_octas.saturating_add(outcome.gas.octas());

            let succeeded = outcome.is_success();
            if succeeded {
                progress.completed_units += item.units();
                progress.completed_items += 1;
                progress.last_completed_index = Some(index);
            }

            on_outcome(index, item, &outcome, &progress);
            outcomes.push(outcome);

            if !succeeded {
                tracing::warn!(
                    operation = %self.operation,
                    index,
                    units_left = progress.units_left(),
                    "Batch halted on failed outcome"
                );
                metrics::record_batch_halt(&self.operation);
                return Ok(BatchReport {
                    outcomes,
                    progress,
                    halted_at: Some(index),
                });
            }

            if index + 1 < items.len() && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
        }

        tracing::info!(
            operation = %self.operation,
            units = progress.completed_units,
            gas_octas = progress.gas_octas,
            "Batch finished"
        );

        Ok(BatchReport {
            outcomes,
            progress,
            halted_at: None,
        })
    }
}
