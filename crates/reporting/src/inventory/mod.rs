//! Inventory reports: stock alerts, stock taking, stock movement and stock
//! adjustment.
//!
//! Each report lives in its own module as a plain function over an
//! [`InventoryReader`]; [`InventoryReportGenerator`] bundles them with a
//! shared [`ReportWindow`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use tillpoint_core::{BranchId, CategoryId, ProductId, ReportWindow};
use tillpoint_inventory::{InventoryReader, Product};

use crate::error::ReportResult;

pub mod adjustment;
pub mod alerts;
pub mod movement;
pub mod stock_taking;

use adjustment::{StockAdjustmentFilter, StockAdjustmentReport};
use alerts::StockAlertReport;
use movement::{StockMovementFilter, StockMovementReport};
use stock_taking::{StockTakingFilter, StockTakingReport};

/// Stock percentage (of reorder level) at or under which a row is "low".
pub const DEFAULT_ALERT_THRESHOLD: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Stateless façade over the inventory report functions.
#[derive(Debug, Clone)]
pub struct InventoryReportGenerator<R> {
    reader: R,
    window: ReportWindow,
    alert_threshold: Decimal,
}

/// Stock alerts, movement and adjustments with no filters, keyed by report type.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReportBundle {
    pub stock_alerts: StockAlertReport,
    pub stock_movement: StockMovementReport,
    pub stock_adjustment: StockAdjustmentReport,
}

impl<R: InventoryReader> InventoryReportGenerator<R> {
    /// Generator with an open window (no date filtering).
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            window: ReportWindow::open(),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }

    /// Threshold used by [`Self::generate_all`].
    pub fn with_alert_threshold(mut self, threshold_percentage: Decimal) -> Self {
        self.alert_threshold = threshold_percentage;
        self
    }

    pub fn with_window(mut self, window: ReportWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> &ReportWindow {
        &self.window
    }

    pub fn stock_alerts(&self, threshold_percentage: Decimal) -> StockAlertReport {
        alerts::stock_alerts(&self.reader, threshold_percentage)
    }

    pub fn stock_taking(&self, filter: &StockTakingFilter) -> ReportResult<StockTakingReport> {
        stock_taking::stock_taking(&self.reader, &self.window, filter)
    }

    pub fn stock_movement(
        &self,
        filter: &StockMovementFilter,
    ) -> ReportResult<StockMovementReport> {
        movement::stock_movement(&self.reader, &self.window, filter)
    }

    pub fn stock_adjustment(
        &self,
        filter: &StockAdjustmentFilter,
    ) -> ReportResult<StockAdjustmentReport> {
        adjustment::stock_adjustment(&self.reader, &self.window, filter)
    }

    pub fn generate_all(&self) -> ReportResult<InventoryReportBundle> {
        Ok(InventoryReportBundle {
            stock_alerts: self.stock_alerts(self.alert_threshold),
            stock_movement: self.stock_movement(&StockMovementFilter::default())?,
            stock_adjustment: self.stock_adjustment(&StockAdjustmentFilter::default())?,
        })
    }
}

/// Name lookups resolved once per report instead of once per row.
pub(crate) struct Lookups {
    pub products: HashMap<ProductId, Product>,
    pub branches: HashMap<BranchId, String>,
    pub categories: HashMap<CategoryId, String>,
}

impl Lookups {
    pub fn load<R: InventoryReader + ?Sized>(reader: &R) -> Self {
        Self {
            products: reader.products().into_iter().map(|p| (p.id, p)).collect(),
            branches: reader.branches().into_iter().map(|b| (b.id, b.name)).collect(),
            categories: reader.categories().into_iter().map(|c| (c.id, c.name)).collect(),
        }
    }

    pub fn branch_name(&self, id: Option<BranchId>) -> Option<String> {
        id.and_then(|id| self.branches.get(&id).cloned())
    }

    pub fn category_name(&self, id: Option<CategoryId>) -> Option<String> {
        id.and_then(|id| self.categories.get(&id).cloned())
    }
}

/// Resolve an optional product filter to the product's name.
pub(crate) fn product_filter_name<R: InventoryReader + ?Sized>(
    reader: &R,
    product_id: Option<ProductId>,
) -> ReportResult<Option<String>> {
    match product_id {
        Some(id) => reader
            .product(id)
            .map(|p| Some(p.name))
            .ok_or(crate::error::ReportError::ProductNotFound(id)),
        None => Ok(None),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    use tillpoint_inventory::{Branch, Category, InMemoryInventoryStore, Product};

    pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    /// A small kitchen: two branches, two categories.
    pub struct Kitchen {
        pub store: InMemoryInventoryStore,
        pub downtown: Branch,
        pub airport: Branch,
        pub produce: Category,
        pub dairy: Category,
    }

    impl Kitchen {
        pub fn new() -> Self {
            let store = InMemoryInventoryStore::new();
            let downtown = Branch::new("Downtown");
            let airport = Branch::new("Airport");
            let produce = Category::new("Produce");
            let dairy = Category::new("Dairy");
            store.insert_branch(downtown.clone());
            store.insert_branch(airport.clone());
            store.insert_category(produce.clone());
            store.insert_category(dairy.clone());
            Self {
                store,
                downtown,
                airport,
                produce,
                dairy,
            }
        }

        pub fn product(&self, sku: &str, name: &str, cost: Decimal, price: Decimal) -> Product {
            let p = Product::new(sku, name, cost, price);
            self.store.insert_product(p.clone());
            p
        }
    }
}
