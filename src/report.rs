//! Operator-facing report lines.
//!
//! One line per terminal outcome on stdout:
//! ```text
//! <operation> succeeded. Gas spent <apt> APT. Transaction <version>
//! <operation> failed, got error: <vm_status>. Transaction <hash>
//! ```
//! Batches append progress to each line and end with a summary or a
//! `STOPPING` line naming the resume point.

use crate::batch::{BatchProgress, BatchReport};
use crate::ledger::types::{Outcome, OutcomeStatus, OCTAS_PER_APT};

/// Format octas as APT without trailing zeros.
pub fn format_apt(octas: u64) -> String {
    let whole = octas / OCTAS_PER_APT;
    let fraction = octas % OCTAS_PER_APT;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:08}", fraction);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

pub fn outcome_line(operation: &str, outcome: &Outcome) -> String {
    match &outcome.status {
        OutcomeStatus::Succeeded { version } => format!(
            "{} succeeded. Gas spent {} APT. Transaction {}",
            operation,
            format_apt(outcome.gas.octas()),
            version
        ),
        OutcomeStatus::Failed { vm_status, .. } => format!(
            "{} failed, got error: {}. Transaction {}",
            operation, vm_status, outcome.hash
        ),
    }
}

/// Outcome line with batch progress, e.g. `[2/3 done, keys left: 50, 0.01 APT so far]`.
pub fn batch_outcome_line(
    operation: &str,
    outcome: &Outcome,
    progress: &BatchProgress,
    unit: &str,
) -> String {
    format!(
        "{} [{}/{} done, {} left: {}, {} APT so far]",
        outcome_line(operation, outcome),
        progress.completed_items,
        progress.total_items,
        unit,
        progress.units_left(),
        format_apt(progress.gas_octas)
    )
}

/// Closing line of a batch. `resume_hint` is only used after a halt.
pub fn batch_summary_line(
    operation: &str,
    report: &BatchReport,
    unit: &str,
    resume_hint: &str,
) -> String {
    let progress = &report.progress;
    match report.halted_at {
        None => format!(
            "{} finished: {} {} in {} transactions. Total gas spent {} APT",
            operation,
            progress.completed_units,
            unit,
            report.outcomes.len(),
            format_apt(progress.gas_octas)
        ),
        Some(index) => format!(
            "STOPPING {}: {} not attempted, item {} failed and must be retried ({} left: {}). {}",
            operation,
            count(report.never_attempted(), "item", "items"),
            index,
            unit,
            progress.units_left(),
            resume_hint
        ),
    }
}

fn count(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::GasUsage;

    fn success() -> Outcome {
        Outcome {
            hash: "0xabc".into(),
            gas: GasUsage {
                gas_used: 520,
                gas_unit_price: 100,
            },
            status: OutcomeStatus::Succeeded { version: 987 },
        }
    }

    #[test]
    fn test_format_apt() {
        assert_eq!(format_apt(0), "0");
        assert_eq!(format_apt(52_000), "0.00052");
        assert_eq!(format_apt(455_000_000), "4.55");
        assert_eq!(format_apt(200_000_000), "2");
    }

    #[test]
    fn test_success_line() {
        assert_eq!(
            outcome_line("Set admin", &success()),
            "Set admin succeeded. Gas spent 0.00052 APT. Transaction 987"
        );
    }

    #[test]
    fn test_failure_line() {
        let outcome = Outcome {
            status: OutcomeStatus::Failed {
                vm_status: "Move abort: 0x5".into(),
                version: Some(1),
            },
            ..success()
        };
        assert_eq!(
            outcome_line("Mint keys", &outcome),
            "Mint keys failed, got error: Move abort: 0x5. Transaction 0xabc"
        );
    }

    #[test]
    fn test_batch_lines() {
        let progress = BatchProgress {
            total_units: 250,
            completed_units: 100,
            total_items: 3,
            completed_items: 1,
            last_completed_index: Some(0),
            gas_octas: 52_000,
        };
        let line = batch_outcome_line("Mint keys", &success(), &progress, "keys");
        assert!(line.ends_with("[1/3 done, keys left: 150, 0.00052 APT so far]"));

        let report = BatchReport {
            outcomes: vec![success(), success()],
            progress,
            halted_at: Some(1),
        };
        let summary = batch_summary_line("Mint keys", &report, "keys", "Re-run with --amount 150");
        assert_eq!(
            summary,
            "STOPPING Mint keys: 1 item not attempted, item 1 failed and must be retried (keys left: 150). Re-run with --amount 150"
        );
    }

    #[test]
    fn test_halt_on_last_item() {
        let report = BatchReport {
            outcomes: vec![success()],
            progress: BatchProgress {
                total_units: 3,
                completed_units: 2,
                total_items: 3,
                completed_items: 2,
                last_completed_index: Some(1),
                gas_octas: 0,
            },
            halted_at: Some(2),
        };
        let summary = batch_summary_line("Send keys", &report, "addresses", "Resume with --start-number 2");
        assert!(summary.starts_with("STOPPING Send keys: 0 items not attempted, item 2 failed"));
        assert!(summary.contains("(addresses left: 1)"));
    }
}
