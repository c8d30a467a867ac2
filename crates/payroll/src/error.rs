use thiserror::Error;

use tillpoint_core::{EmployeeId, PayrollPeriodId};

use crate::model::PeriodStatus;

pub type PayrollResult<T> = Result<T, PayrollError>;

/// Payroll failures.
///
/// The first four abort a batch before any employee is touched; the rest
/// are scoped to one employee and only counted by the batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayrollError {
    #[error("admin user with email {0} not found")]
    AdminNotFound(String),

    #[error("payroll period {0} not found")]
    PeriodNotFound(PayrollPeriodId),

    #[error("no draft payroll period found")]
    NoDraftPeriod,

    #[error("payroll period {id} is {status}, not draft (use --force to override)")]
    PeriodNotDraft {
        id: PayrollPeriodId,
        status: PeriodStatus,
    },

    #[error("employee {0} has no pay rate configured")]
    MissingRate(EmployeeId),

    #[error("calculation failed for employee {employee}: {reason}")]
    Calculation { employee: EmployeeId, reason: String },

    #[error("payroll store error: {0}")]
    Store(String),
}

impl PayrollError {
    /// Whether this error stops a batch run outright.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PayrollError::AdminNotFound(_)
                | PayrollError::PeriodNotFound(_)
                | PayrollError::NoDraftPeriod
                | PayrollError::PeriodNotDraft { .. }
        )
    }
}
