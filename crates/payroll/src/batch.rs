//! Payroll batch run over every eligible employee of one period.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use tillpoint_core::{EmployeeId, PayrollPeriodId};

use crate::calculator::{PayrollCalculator, StandardCalculator};
use crate::error::{PayrollError, PayrollResult};
use crate::model::{PayrollPeriod, PayrollStatus, PeriodStatus};
use crate::store::PayrollStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelector {
    Id(PayrollPeriodId),
    /// Draft period with the latest start date.
    LatestDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub period: PeriodSelector,
    pub admin_email: String,
    /// Process a period that is no longer in draft.
    pub force: bool,
}

impl BatchRequest {
    pub fn latest_draft(admin_email: impl Into<String>) -> Self {
        Self {
            period: PeriodSelector::LatestDraft,
            admin_email: admin_email.into(),
            force: false,
        }
    }

    pub fn for_period(id: PayrollPeriodId, admin_email: impl Into<String>) -> Self {
        Self {
            period: PeriodSelector::Id(id),
            ..Self::latest_draft(admin_email)
        }
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeFailure {
    pub employee_id: EmployeeId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub period_id: PayrollPeriodId,
    pub period_status: PeriodStatus,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<EmployeeFailure>,
}

enum Outcome {
    Calculated,
    Skipped,
}

/// Runs the per-employee calculation for a period.
///
/// Each employee is handled in its own store transaction: a failure rolls
/// back that employee only and the run continues with the next one.
#[derive(Debug, Clone)]
pub struct PayrollBatch<S, C = StandardCalculator> {
    store: S,
    calculator: C,
}

impl<S: PayrollStore> PayrollBatch<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            calculator: StandardCalculator,
        }
    }
}

impl<S: PayrollStore, C: PayrollCalculator> PayrollBatch<S, C> {
    pub fn with_calculator(store: S, calculator: C) -> Self {
        Self { store, calculator }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn run(&self, request: &BatchRequest) -> PayrollResult<BatchSummary> {
        let admin = self
            .store
            .user_by_email(&request.admin_email)
            .ok_or_else(|| PayrollError::AdminNotFound(request.admin_email.clone()))?;

        let mut period = self.resolve_period(request)?;
        info!(
            period_id = %period.id,
            start = %period.start_date,
            end = %period.end_date,
            admin = %admin.email,
            "processing payroll period"
        );

        let items = self.store.payroll_items();
        let employees: Vec<_> = self
            .store
            .employees()
            .into_iter()
            .filter(|e| period.covers(e))
            .collect();

        let mut processed = 0;
        let mut skipped = 0;
        let mut failures = Vec::new();

        for employee in &employees {
            let mut outcome = Outcome::Skipped;
            let result = self.store.transaction(&mut |tx| {
                let mut payroll = tx.get_or_create_payroll(employee.id, period.id, admin.id)?;
                if payroll.status != PayrollStatus::Draft {
                    outcome = Outcome::Skipped;
                    return Ok(());
                }

                let pay = self.calculator.calculate(employee, &items)?;
                payroll.basic_salary = pay.basic_salary;
                payroll.gross_pay = pay.gross_pay;
                payroll.total_deductions = pay.total_deductions;
                payroll.net_pay = pay.net_pay;
                payroll.status = PayrollStatus::Calculated;
                payroll.last_modified_by = Some(admin.id);
                payroll.calculated_at = Some(Utc::now());
                tx.save_payroll(payroll)?;

                outcome = Outcome::Calculated;
                Ok(())
            });

            match result {
                Ok(()) => match outcome {
                    Outcome::Calculated => processed += 1,
                    Outcome::Skipped => skipped += 1,
                },
                Err(err) => {
                    error!(employee_id = %employee.id, error = %err, "payroll calculation failed");
                    failures.push(EmployeeFailure {
                        employee_id: employee.id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if processed > 0 {
            period.status = PeriodStatus::Processing;
            period.last_modified_by = Some(admin.id);
            let update = period.clone();
            self.store
                .transaction(&mut |tx| tx.save_period(update.clone()))?;
        }

        let summary = BatchSummary {
            period_id: period.id,
            period_status: period.status,
            processed,
            skipped,
            failed: failures.len(),
            failures,
        };

        info!(
            period_id = %summary.period_id,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            status = %summary.period_status,
            "payroll batch finished"
        );

        Ok(summary)
    }

    fn resolve_period(&self, request: &BatchRequest) -> PayrollResult<PayrollPeriod> {
        let period = match request.period {
            PeriodSelector::Id(id) => self
                .store
                .period(id)
                .ok_or(PayrollError::PeriodNotFound(id))?,
            PeriodSelector::LatestDraft => self
                .store
                .latest_draft_period()
                .ok_or(PayrollError::NoDraftPeriod)?,
        };

        if period.status != PeriodStatus::Draft {
            if !request.force {
                return Err(PayrollError::PeriodNotDraft {
                    id: period.id,
                    status: period.status,
                });
            }
            warn!(period_id = %period.id, status = %period.status, "forcing payroll run on non-draft period");
        }

        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::PayBreakdown;
    use crate::model::{Employee, EmploymentType, PayrollItem, PayrollItemType, UserAccount};
    use crate::store::InMemoryPayrollStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tillpoint_core::BranchId;

    const ADMIN: &str = "admin@example.com";

    fn june() -> PayrollPeriod {
        PayrollPeriod::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap()
    }

    fn store_with_admin() -> Arc<InMemoryPayrollStore> {
        let store = Arc::new(InMemoryPayrollStore::new());
        store.insert_user(UserAccount::new(ADMIN, "Admin"));
        store
    }

    #[test]
    fn failing_employee_does_not_stop_the_next_one() {
        let store = store_with_admin();
        let period = june();
        store.insert_period(period.clone());
        let broken = Employee::new("A", EmploymentType::FullTime);
        let fine = Employee::new("B", EmploymentType::FullTime).with_rate(dec!(1000));
        store.insert_employee(broken.clone());
        store.insert_employee(fine.clone());

        let summary = PayrollBatch::new(store.clone())
            .run(&BatchRequest::for_period(period.id, ADMIN))
            .unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].employee_id, broken.id);
        assert!(store.payroll(broken.id, period.id).is_none());
        let payroll = store.payroll(fine.id, period.id).unwrap();
        assert_eq!(payroll.status, PayrollStatus::Calculated);
        assert_eq!(payroll.net_pay, dec!(1000));
        assert_eq!(summary.period_status, PeriodStatus::Processing);
        assert_eq!(store.period(period.id).unwrap().status, PeriodStatus::Processing);
    }

    #[test]
    fn each_failure_counts_once() {
        let store = store_with_admin();
        let period = june();
        store.insert_period(period.clone());
        for name in ["A", "B", "C"] {
            store.insert_employee(Employee::new(name, EmploymentType::Casual));
        }

        let summary = PayrollBatch::new(store.clone())
            .run(&BatchRequest::for_period(period.id, ADMIN))
            .unwrap();

        assert_eq!(summary.failed, 3);
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.period_status, PeriodStatus::Draft);
        assert_eq!(store.period(period.id).unwrap().status, PeriodStatus::Draft);
    }

    #[test]
    fn second_run_skips_calculated_records() {
        let store = store_with_admin();
        let period = june();
        store.insert_period(period.clone());
        store.insert_employee(Employee::new("A", EmploymentType::FullTime).with_rate(dec!(500)));

        let batch = PayrollBatch::new(store.clone());
        batch.run(&BatchRequest::for_period(period.id, ADMIN)).unwrap();
        let again = batch
            .run(&BatchRequest::for_period(period.id, ADMIN).forced())
            .unwrap();

        assert_eq!(again.processed, 0);
        assert_eq!(again.skipped, 1);
        assert_eq!(store.payrolls().len(), 1);
    }

    #[test]
    fn latest_draft_period_is_selected() {
        let store = store_with_admin();
        let old = june();
        let newer = PayrollPeriod::new(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
        )
        .unwrap();
        store.insert_period(old.clone());
        store.insert_period(newer.clone());
        store.insert_employee(Employee::new("A", EmploymentType::FullTime).with_rate(dec!(1)));

        let summary = PayrollBatch::new(store.clone())
            .run(&BatchRequest::latest_draft(ADMIN))
            .unwrap();

        assert_eq!(summary.period_id, newer.id);
        assert_eq!(store.period(old.id).unwrap().status, PeriodStatus::Draft);
    }

    #[test]
    fn non_draft_period_needs_force() {
        let store = store_with_admin();
        let period = june().with_status(PeriodStatus::Completed);
        store.insert_period(period.clone());
        store.insert_employee(Employee::new("A", EmploymentType::FullTime).with_rate(dec!(1)));
        let batch = PayrollBatch::new(store.clone());

        let err = batch
            .run(&BatchRequest::for_period(period.id, ADMIN))
            .unwrap_err();
        assert_eq!(
            err,
            PayrollError::PeriodNotDraft {
                id: period.id,
                status: PeriodStatus::Completed
            }
        );
        assert!(store.payrolls().is_empty());

        let forced = batch
            .run(&BatchRequest::for_period(period.id, ADMIN).forced())
            .unwrap();
        assert_eq!(forced.processed, 1);
    }

    #[test]
    fn fatal_lookups_abort_before_any_employee() {
        let store = store_with_admin();
        let period = june();
        store.insert_period(period.clone());
        store.insert_employee(Employee::new("A", EmploymentType::FullTime).with_rate(dec!(1)));
        let batch = PayrollBatch::new(store.clone());

        let err = batch
            .run(&BatchRequest::for_period(period.id, "ghost@example.com"))
            .unwrap_err();
        assert_eq!(err, PayrollError::AdminNotFound("ghost@example.com".into()));
        assert!(err.is_fatal());

        let missing = PayrollPeriodId::new();
        let err = batch.run(&BatchRequest::for_period(missing, ADMIN)).unwrap_err();
        assert_eq!(err, PayrollError::PeriodNotFound(missing));

        assert!(store.payrolls().is_empty());
    }

    #[test]
    fn no_draft_period_is_fatal() {
        let store = store_with_admin();
        store.insert_period(june().with_status(PeriodStatus::Closed));

        let err = PayrollBatch::new(store)
            .run(&BatchRequest::latest_draft(ADMIN))
            .unwrap_err();
        assert_eq!(err, PayrollError::NoDraftPeriod);
    }

    #[test]
    fn branch_period_only_processes_its_staff() {
        let store = store_with_admin();
        let branch = BranchId::new();
        let period = june().for_branch(branch);
        store.insert_period(period.clone());
        let local = Employee::new("A", EmploymentType::FullTime)
            .at_branch(branch)
            .with_rate(dec!(1));
        let remote = Employee::new("B", EmploymentType::FullTime)
            .at_branch(BranchId::new())
            .with_rate(dec!(1));
        let gone = Employee::new("C", EmploymentType::FullTime)
            .at_branch(branch)
            .with_rate(dec!(1))
            .inactive();
        store.insert_employee(local.clone());
        store.insert_employee(remote.clone());
        store.insert_employee(gone);

        let summary = PayrollBatch::new(store.clone())
            .run(&BatchRequest::for_period(period.id, ADMIN))
            .unwrap();

        assert_eq!(summary.processed, 1);
        assert!(store.payroll(local.id, period.id).is_some());
        assert!(store.payroll(remote.id, period.id).is_none());
    }

    #[test]
    fn payroll_items_flow_into_the_record() {
        let store = store_with_admin();
        let period = june();
        store.insert_period(period.clone());
        let employee = Employee::new("A", EmploymentType::FullTime).with_rate(dec!(2000));
        store.insert_employee(employee.clone());
        store.insert_item(PayrollItem::fixed("Housing", PayrollItemType::Allowance, dec!(300)));
        store.insert_item(PayrollItem::percent("PAYE", PayrollItemType::Tax, dec!(10)));

        PayrollBatch::new(store.clone())
            .run(&BatchRequest::for_period(period.id, ADMIN))
            .unwrap();

        let payroll = store.payroll(employee.id, period.id).unwrap();
        assert_eq!(payroll.gross_pay, dec!(2300));
        assert_eq!(payroll.total_deductions, dec!(200));
        assert_eq!(payroll.net_pay, dec!(2100));
    }

    struct Flaky {
        fail_for: EmployeeId,
    }

    impl PayrollCalculator for Flaky {
        fn calculate(&self, employee: &Employee, items: &[PayrollItem]) -> PayrollResult<PayBreakdown> {
            if employee.id == self.fail_for {
                return Err(PayrollError::Calculation {
                    employee: employee.id,
                    reason: "rate service unavailable".into(),
                });
            }
            StandardCalculator.calculate(employee, items)
        }
    }

    #[test]
    fn custom_calculator_failures_are_isolated() {
        let store = store_with_admin();
        let period = june();
        store.insert_period(period.clone());
        let a = Employee::new("A", EmploymentType::FullTime).with_rate(dec!(10));
        let b = Employee::new("B", EmploymentType::FullTime).with_rate(dec!(20));
        store.insert_employee(a.clone());
        store.insert_employee(b.clone());

        let summary = PayrollBatch::with_calculator(store.clone(), Flaky { fail_for: a.id })
            .run(&BatchRequest::for_period(period.id, ADMIN))
            .unwrap();

        assert_eq!((summary.processed, summary.failed), (1, 1));
        assert!(summary.failures[0].reason.contains("rate service unavailable"));
        assert_eq!(store.payroll(b.id, period.id).unwrap().net_pay, dec!(20));
    }
}
