use thiserror::Error;

use tillpoint_core::{BranchId, CategoryId, DomainError, ProductId};

pub type ReportResult<T> = Result<T, ReportError>;

/// Failures a report can surface.
///
/// Empty result sets are never errors; only a filter naming a record that
/// does not exist is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("branch {0} not found")]
    BranchNotFound(BranchId),
}

impl From<ReportError> for DomainError {
    fn from(value: ReportError) -> Self {
        DomainError::not_found(match value {
            ReportError::CategoryNotFound(id) => format!("category {id}"),
            ReportError::ProductNotFound(id) => format!("product {id}"),
            ReportError::BranchNotFound(id) => format!("branch {id}"),
        })
    }
}
