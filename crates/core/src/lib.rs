//! `tillpoint-core`: shared building blocks for the back-office crates.
//!
//! Strongly-typed identifiers, the domain error model and reporting windows.
//! No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod window;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    AdjustmentId, BranchId, CategoryId, EmployeeId, EmployeePayrollId, OrderId, OrderItemId,
    PayrollItemId, PayrollPeriodId, ProductId, TransactionId, UserId,
};
pub use window::{ReportWindow, TimePeriod};
