//! Read-side data access for inventory reporting.

use std::sync::Arc;

use tillpoint_core::{BranchId, CategoryId, ProductId};

use crate::model::{
    Branch, BranchStock, Category, InventoryAdjustment, InventoryTransaction, Product,
};

/// Read-only view over persisted inventory state.
///
/// Reports never write through this interface and never lock: a stock update
/// racing a report may or may not be visible to it.
pub trait InventoryReader: Send + Sync {
    fn category(&self, id: CategoryId) -> Option<Category>;
    fn branch(&self, id: BranchId) -> Option<Branch>;
    fn product(&self, id: ProductId) -> Option<Product>;

    /// All products, including inactive ones.
    fn products(&self) -> Vec<Product>;
    fn branches(&self) -> Vec<Branch>;
    fn categories(&self) -> Vec<Category>;
    fn branch_stocks(&self) -> Vec<BranchStock>;
    fn transactions(&self) -> Vec<InventoryTransaction>;
    fn adjustments(&self) -> Vec<InventoryAdjustment>;
}

impl<S> InventoryReader for Arc<S>
where
    S: InventoryReader + ?Sized,
{
    fn category(&self, id: CategoryId) -> Option<Category> {
        (**self).category(id)
    }

    fn branch(&self, id: BranchId) -> Option<Branch> {
        (**self).branch(id)
    }

    fn product(&self, id: ProductId) -> Option<Product> {
        (**self).product(id)
    }

    fn products(&self) -> Vec<Product> {
        (**self).products()
    }

    fn branches(&self) -> Vec<Branch> {
        (**self).branches()
    }

    fn categories(&self) -> Vec<Category> {
        (**self).categories()
    }

    fn branch_stocks(&self) -> Vec<BranchStock> {
        (**self).branch_stocks()
    }

    fn transactions(&self) -> Vec<InventoryTransaction> {
        (**self).transactions()
    }

    fn adjustments(&self) -> Vec<InventoryAdjustment> {
        (**self).adjustments()
    }
}
