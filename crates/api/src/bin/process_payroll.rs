//! Run a payroll batch over a JSON dataset.
//!
//! ```text
//! process-payroll --data payroll.json --admin-email admin@example.com [--period <id>] [--force]
//! ```
//!
//! The dataset is rewritten in place with the calculated payrolls and the
//! period's new status.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use tillpoint_core::PayrollPeriodId;
use tillpoint_payroll::{BatchRequest, InMemoryPayrollStore, PayrollBatch, PayrollDataset};

#[derive(Debug, Parser)]
#[command(name = "process-payroll", about = "Calculate payroll for a pay period")]
struct Cli {
    /// Payroll dataset (JSON) to read and update.
    #[arg(long, value_name = "FILE")]
    data: PathBuf,

    /// Period to process. Defaults to the latest draft period.
    #[arg(long, value_name = "ID")]
    period: Option<PayrollPeriodId>,

    /// Email of the admin the run is attributed to.
    #[arg(long)]
    admin_email: String,

    /// Process even if the period is no longer in draft.
    #[arg(long)]
    force: bool,
}

impl Cli {
    fn request(&self) -> BatchRequest {
        let request = match self.period {
            Some(id) => BatchRequest::for_period(id, &self.admin_email),
            None => BatchRequest::latest_draft(&self.admin_email),
        };
        if self.force { request.forced() } else { request }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tillpoint_observability::init();

    let raw = fs::read_to_string(&cli.data)
        .with_context(|| format!("failed to read {}", cli.data.display()))?;
    let dataset = PayrollDataset::from_json(&raw)
        .with_context(|| format!("failed to parse {}", cli.data.display()))?;

    let store = Arc::new(InMemoryPayrollStore::from_dataset(dataset));
    let batch = PayrollBatch::new(store.clone());
    let summary = batch.run(&cli.request()).context("payroll batch aborted")?;

    let updated = store
        .dataset()
        .to_json_pretty()
        .context("failed to encode payroll dataset")?;
    fs::write(&cli.data, updated)
        .with_context(|| format!("failed to write {}", cli.data.display()))?;

    println!(
        "Payroll period {} is now {}",
        summary.period_id, summary.period_status
    );
    println!("Successfully processed: {}", summary.processed);
    println!("Skipped (already processed): {}", summary.skipped);
    println!("Errors: {}", summary.failed);
    for failure in &summary.failures {
        println!("  {}: {}", failure.employee_id, failure.reason);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_the_request() {
        let cli = Cli::parse_from([
            "process-payroll",
            "--data",
            "payroll.json",
            "--admin-email",
            "boss@example.com",
            "--force",
        ]);
        let request = cli.request();
        assert!(request.force);
        assert_eq!(request.admin_email, "boss@example.com");
        assert_eq!(request.period, tillpoint_payroll::PeriodSelector::LatestDraft);
    }

    #[test]
    fn period_id_must_be_a_uuid() {
        assert!(
            Cli::try_parse_from([
                "process-payroll",
                "--data",
                "p.json",
                "--admin-email",
                "a@b.c",
                "--period",
                "march",
            ])
            .is_err()
        );
    }
}
