use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use tillpoint_core::{BranchId, ProductId};
use tillpoint_inventory::InventoryReader;

use super::Lookups;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    OutOfStock,
    LowStock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockAlertRow {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub current_stock: Decimal,
    pub reorder_level: Decimal,
    /// Only present on low-stock rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_percentage: Option<Decimal>,
    pub unit: String,
    pub category: Option<String>,
    pub branch: Option<String>,
    pub branch_id: BranchId,
    pub alert_type: AlertType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockAlertReport {
    pub report_type: &'static str,
    pub generated_at: DateTime<Utc>,
    pub out_of_stock: Vec<StockAlertRow>,
    pub low_stock: Vec<StockAlertRow>,
    pub out_of_stock_count: usize,
    pub low_stock_count: usize,
    pub threshold_percentage: Decimal,
}

/// Classify a single stock level.
///
/// Out of stock wins over low stock; a zero reorder level never yields a
/// low-stock alert.
pub fn classify(
    current_stock: Decimal,
    reorder_level: Decimal,
    threshold_percentage: Decimal,
) -> Option<AlertType> {
    if current_stock <= Decimal::ZERO {
        return Some(AlertType::OutOfStock);
    }
    match stock_percentage(current_stock, reorder_level) {
        Some(pct) if pct <= threshold_percentage => Some(AlertType::LowStock),
        _ => None,
    }
}

/// `current / reorder * 100`, or `None` when there is no reorder level.
pub fn stock_percentage(current_stock: Decimal, reorder_level: Decimal) -> Option<Decimal> {
    if reorder_level <= Decimal::ZERO {
        return None;
    }
    current_stock
        .checked_div(reorder_level)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

pub(crate) fn stock_alerts<R: InventoryReader + ?Sized>(
    reader: &R,
    threshold_percentage: Decimal,
) -> StockAlertReport {
    let lookups = Lookups::load(reader);
    let mut out_of_stock = Vec::new();
    let mut low_stock = Vec::new();

    for stock in reader.branch_stocks().into_iter().filter(|s| s.is_active) {
        let Some(product) = lookups
            .products
            .get(&stock.product_id)
            .filter(|p| p.is_active)
        else {
            continue;
        };

        let Some(alert_type) =
            classify(stock.current_stock, stock.reorder_level, threshold_percentage)
        else {
            continue;
        };

        let (current_stock, stock_percentage) = match alert_type {
            AlertType::OutOfStock => (Decimal::ZERO, None),
            AlertType::LowStock => (
                stock.current_stock,
                stock_percentage(stock.current_stock, stock.reorder_level).map(|pct| {
                    pct.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
                }),
            ),
        };

        let row = StockAlertRow {
            id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            current_stock,
            reorder_level: stock.reorder_level,
            stock_percentage,
            unit: product.unit_label().to_string(),
            category: lookups.category_name(product.category_id),
            branch: lookups.branch_name(Some(stock.branch_id)),
            branch_id: stock.branch_id,
            alert_type,
        };

        match alert_type {
            AlertType::OutOfStock => out_of_stock.push(row),
            AlertType::LowStock => low_stock.push(row),
        }
    }

    out_of_stock.sort_by(|a, b| (&a.name, &a.branch).cmp(&(&b.name, &b.branch)));
    low_stock.sort_by(|a, b| (&a.name, &a.branch).cmp(&(&b.name, &b.branch)));

    tracing::debug!(
        out_of_stock = out_of_stock.len(),
        low_stock = low_stock.len(),
        %threshold_percentage,
        "stock alerts generated"
    );

    StockAlertReport {
        report_type: "stock_alerts",
        generated_at: Utc::now(),
        out_of_stock_count: out_of_stock.len(),
        low_stock_count: low_stock.len(),
        out_of_stock,
        low_stock,
        threshold_percentage,
    }
}
