use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{ProductId, ReportWindow, TransactionId};
use tillpoint_inventory::{InventoryReader, TransactionType};

use crate::error::ReportResult;

use super::{Lookups, product_filter_name};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StockMovementFilter {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub movement_type: Option<TransactionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockMovementRow {
    pub id: TransactionId,
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub movement_type: TransactionType,
    pub quantity: Decimal,
    pub branch: Option<String>,
    pub reference: String,
    pub created_by: Option<String>,
    pub cost_price: Decimal,
    /// `quantity * cost_price`
    pub line_value: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovementSummary {
    pub total_movements: usize,
    pub total_items_moved: Decimal,
    pub total_value_moved: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockMovementReport {
    pub report_type: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub window: ReportWindow,
    pub product_filter: Option<String>,
    pub movement_type_filter: Option<TransactionType>,
    pub summary: MovementSummary,
    pub movements: Vec<StockMovementRow>,
}

pub(crate) fn stock_movement<R: InventoryReader + ?Sized>(
    reader: &R,
    window: &ReportWindow,
    filter: &StockMovementFilter,
) -> ReportResult<StockMovementReport> {
    let product_filter = product_filter_name(reader, filter.product_id)?;
    let lookups = Lookups::load(reader);

    let mut movements: Vec<StockMovementRow> = reader
        .transactions()
        .into_iter()
        .filter(|tx| filter.product_id.is_none_or(|id| tx.product_id == id))
        .filter(|tx| filter.movement_type.is_none_or(|t| tx.transaction_type == t))
        .filter(|tx| window.contains(tx.created_at))
        .filter_map(|tx| {
            let Some(product) = lookups.products.get(&tx.product_id) else {
                tracing::warn!(
                    transaction_id = %tx.id,
                    product_id = %tx.product_id,
                    "transaction references unknown product; skipped"
                );
                return None;
            };
            Some(StockMovementRow {
                id: tx.id,
                product_id: product.id,
                product_name: product.name.clone(),
                sku: product.sku.clone(),
                movement_type: tx.transaction_type,
                quantity: tx.quantity,
                branch: lookups.branch_name(tx.branch_id),
                reference: tx.reference,
                created_by: tx.created_by,
                cost_price: product.cost_price,
                line_value: tx.quantity * product.cost_price,
                created_at: tx.created_at,
            })
        })
        .collect();

    movements.sort_by_key(|row| (row.created_at, row.id));

    let summary = MovementSummary {
        total_movements: movements.len(),
        total_items_moved: movements.iter().map(|m| m.quantity).sum(),
        total_value_moved: movements.iter().map(|m| m.line_value).sum(),
    };

    tracing::debug!(movements = summary.total_movements, "stock movement generated");

    Ok(StockMovementReport {
        report_type: "stock_movement",
        generated_at: Utc::now(),
        window: *window,
        product_filter,
        movement_type_filter: filter.movement_type,
        summary,
        movements,
    })
}
