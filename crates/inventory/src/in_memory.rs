//! In-memory inventory store for tests/dev and for snapshots loaded at startup.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use tillpoint_core::{BranchId, CategoryId, Entity, ProductId};

use crate::model::{
    Branch, BranchStock, Category, InventoryAdjustment, InventoryTransaction, Product,
};
use crate::reader::InventoryReader;

/// Plain owned copy of every inventory table the reports read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub branch_stocks: Vec<BranchStock>,
    #[serde(default)]
    pub transactions: Vec<InventoryTransaction>,
    #[serde(default)]
    pub adjustments: Vec<InventoryAdjustment>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: HashMap<CategoryId, Category>,
    branches: HashMap<BranchId, Branch>,
    products: HashMap<ProductId, Product>,
    stocks: HashMap<(ProductId, BranchId), BranchStock>,
    transactions: Vec<InventoryTransaction>,
    adjustments: Vec<InventoryAdjustment>,
}

/// In-memory inventory tables.
///
/// - No IO
/// - Lock poisoning degrades to "no data" on reads and a dropped write
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: InventorySnapshot) -> Self {
        let store = Self::new();
        store.load(snapshot);
        store
    }

    /// Replace every table with the snapshot contents.
    pub fn load(&self, snapshot: InventorySnapshot) {
        let tables = Tables {
            categories: index(snapshot.categories),
            branches: index(snapshot.branches),
            products: index(snapshot.products),
            stocks: snapshot
                .branch_stocks
                .into_iter()
                .map(|s| ((s.product_id, s.branch_id), s))
                .collect(),
            transactions: snapshot.transactions,
            adjustments: snapshot.adjustments,
        };

        if let Ok(mut inner) = self.inner.write() {
            *inner = tables;
        }
    }

    pub fn insert_category(&self, category: Category) {
        if let Ok(mut inner) = self.inner.write() {
            inner.categories.insert(category.id(), category);
        }
    }

    pub fn insert_branch(&self, branch: Branch) {
        if let Ok(mut inner) = self.inner.write() {
            inner.branches.insert(branch.id(), branch);
        }
    }

    pub fn insert_product(&self, product: Product) {
        if let Ok(mut inner) = self.inner.write() {
            inner.products.insert(product.id(), product);
        }
    }

    /// Insert or replace the stock row for `(product, branch)`.
    pub fn upsert_stock(&self, stock: BranchStock) {
        if let Ok(mut inner) = self.inner.write() {
            inner.stocks.insert((stock.product_id, stock.branch_id), stock);
        }
    }

    /// Append a movement to the log. The log is never rewritten.
    pub fn record_transaction(&self, transaction: InventoryTransaction) {
        if let Ok(mut inner) = self.inner.write() {
            inner.transactions.push(transaction);
        }
    }

    pub fn record_adjustment(&self, adjustment: InventoryAdjustment) {
        if let Ok(mut inner) = self.inner.write() {
            inner.adjustments.push(adjustment);
        }
    }
}

fn index<E: Entity>(rows: Vec<E>) -> HashMap<E::Id, E> {
    rows.into_iter().map(|row| (row.id(), row)).collect()
}

impl InventoryReader for InMemoryInventoryStore {
    fn category(&self, id: CategoryId) -> Option<Category> {
        self.inner.read().ok()?.categories.get(&id).cloned()
    }

    fn branch(&self, id: BranchId) -> Option<Branch> {
        self.inner.read().ok()?.branches.get(&id).cloned()
    }

    fn product(&self, id: ProductId) -> Option<Product> {
        self.inner.read().ok()?.products.get(&id).cloned()
    }

    fn products(&self) -> Vec<Product> {
        match self.inner.read() {
            Ok(inner) => inner.products.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn branches(&self) -> Vec<Branch> {
        match self.inner.read() {
            Ok(inner) => inner.branches.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn categories(&self) -> Vec<Category> {
        match self.inner.read() {
            Ok(inner) => inner.categories.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn branch_stocks(&self) -> Vec<BranchStock> {
        match self.inner.read() {
            Ok(inner) => inner.stocks.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn transactions(&self) -> Vec<InventoryTransaction> {
        match self.inner.read() {
            Ok(inner) => inner.transactions.clone(),
            Err(_) => vec![],
        }
    }

    fn adjustments(&self) -> Vec<InventoryAdjustment> {
        match self.inner.read() {
            Ok(inner) => inner.adjustments.clone(),
            Err(_) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn stock_rows_are_keyed_by_product_and_branch() {
        let store = InMemoryInventoryStore::new();
        let branch = Branch::new("Downtown");
        let product = Product::new("FLR-01", "Flour", dec!(1.10), dec!(0));

        store.upsert_stock(BranchStock::new(product.id, branch.id, dec!(5), dec!(10)));
        store.upsert_stock(BranchStock::new(product.id, branch.id, dec!(7), dec!(10)));

        let stocks = store.branch_stocks();
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks[0].current_stock, dec!(7));
    }

    #[test]
    fn snapshot_load_replaces_previous_contents() {
        let store = InMemoryInventoryStore::new();
        store.insert_product(Product::new("A", "Apple", dec!(1), dec!(2)));

        let beans = Product::new("B", "Beans", dec!(3), dec!(4));
        let beans_id = beans.id;
        store.load(InventorySnapshot {
            products: vec![beans],
            ..Default::default()
        });

        let products = store.products();
        assert_eq!(products.len(), 1);
        assert_eq!(store.product(beans_id).unwrap().name, "Beans");
    }
}
