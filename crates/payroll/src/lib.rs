//! Payroll batch processing.
//!
//! A batch resolves an admin and a period, then calculates every eligible
//! employee's pay in its own store transaction. See [`PayrollBatch`].

pub mod batch;
pub mod calculator;
pub mod error;
pub mod model;
pub mod store;

pub use batch::{BatchRequest, BatchSummary, EmployeeFailure, PayrollBatch, PeriodSelector};
pub use calculator::{PayBreakdown, PayrollCalculator, StandardCalculator};
pub use error::{PayrollError, PayrollResult};
pub use model::{
    Employee, EmployeePayroll, EmploymentType, PayrollItem, PayrollItemType, PayrollPeriod,
    PayrollStatus, PeriodStatus, UserAccount,
};
pub use store::{InMemoryPayrollStore, PayrollDataset, PayrollStore, PayrollTx, TxWork};
