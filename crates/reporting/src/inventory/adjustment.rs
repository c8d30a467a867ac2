use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{AdjustmentId, ProductId, ReportWindow};
use tillpoint_inventory::{AdjustmentStatus, InventoryReader, TransactionType};

use crate::error::ReportResult;

use super::{Lookups, product_filter_name};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StockAdjustmentFilter {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub adjustment_type: Option<TransactionType>,
    #[serde(default)]
    pub status: Option<AdjustmentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockAdjustmentRow {
    pub id: AdjustmentId,
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub branch: Option<String>,
    pub adjustment_type: TransactionType,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    pub quantity_delta: Decimal,
    pub cost_price: Decimal,
    pub value_effect: Decimal,
    pub reason: String,
    pub status: AdjustmentStatus,
    pub requested_by: Option<String>,
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdjustmentSummary {
    pub total_adjustments: usize,
    /// Net signed quantity change.
    pub total_quantity: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockAdjustmentReport {
    pub report_type: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub window: ReportWindow,
    pub product_filter: Option<String>,
    pub adjustment_type_filter: Option<TransactionType>,
    pub status_filter: Option<AdjustmentStatus>,
    pub summary: AdjustmentSummary,
    pub adjustments: Vec<StockAdjustmentRow>,
}

pub(crate) fn stock_adjustment<R: InventoryReader + ?Sized>(
    reader: &R,
    window: &ReportWindow,
    filter: &StockAdjustmentFilter,
) -> ReportResult<StockAdjustmentReport> {
    let product_filter = product_filter_name(reader, filter.product_id)?;
    let lookups = Lookups::load(reader);

    let mut adjustments: Vec<StockAdjustmentRow> = reader
        .adjustments()
        .into_iter()
        .filter(|a| filter.product_id.is_none_or(|id| a.product_id == id))
        .filter(|a| filter.adjustment_type.is_none_or(|t| a.transaction_type == t))
        .filter(|a| filter.status.is_none_or(|s| a.status == s))
        .filter(|a| window.contains(a.created_at))
        .filter_map(|a| {
            let Some(product) = lookups.products.get(&a.product_id) else {
                tracing::warn!(
                    adjustment_id = %a.id,
                    product_id = %a.product_id,
                    "adjustment references unknown product; skipped"
                );
                return None;
            };
            let quantity_delta = a.quantity_delta();
            Some(StockAdjustmentRow {
                id: a.id,
                product_id: product.id,
                product_name: product.name.clone(),
                sku: product.sku.clone(),
                branch: lookups.branch_name(a.branch_id),
                adjustment_type: a.transaction_type,
                quantity_before: a.quantity_before,
                quantity_after: a.quantity_after,
                quantity_delta,
                cost_price: product.cost_price,
                value_effect: quantity_delta * product.cost_price,
                reason: a.reason,
                status: a.status,
                requested_by: a.requested_by,
                reviewed_by: a.reviewed_by,
                created_at: a.created_at,
            })
        })
        .collect();

    adjustments.sort_by_key(|row| (row.created_at, row.id));

    let summary = AdjustmentSummary {
        total_adjustments: adjustments.len(),
        total_quantity: adjustments.iter().map(|a| a.quantity_delta).sum(),
        total_value: adjustments.iter().map(|a| a.value_effect).sum(),
    };

    tracing::debug!(adjustments = summary.total_adjustments, "stock adjustment generated");

    Ok(StockAdjustmentReport {
        report_type: "stock_adjustment",
        generated_at: Utc::now(),
        window: *window,
        product_filter,
        adjustment_type_filter: filter.adjustment_type,
        status_filter: filter.status,
        summary,
        adjustments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::inventory::fixtures::{Kitchen, at};
    use rust_decimal_macros::dec;
    use tillpoint_inventory::{InMemoryInventoryStore, InventoryAdjustment};

    #[test]
    fn empty_adjustments_give_zero_summary() {
        let store = InMemoryInventoryStore::new();
        let report =
            stock_adjustment(&store, &ReportWindow::open(), &StockAdjustmentFilter::default())
                .unwrap();

        assert_eq!(report.summary, AdjustmentSummary::default());
        assert!(report.adjustments.is_empty());
        assert_eq!(report.report_type, "stock_adjustment");
    }

    #[test]
    fn rows_carry_signed_delta_and_value_effect() {
        let k = Kitchen::new();
        let cream = k.product("CRM", "Cream", dec!(2), dec!(4));
        k.store.record_adjustment(
            InventoryAdjustment::new(cream.id, Some(k.airport.id), dec!(10), dec!(7), "spoiled", at(3, 9))
                .requested_by("Kim")
                .reviewed(AdjustmentStatus::Approved, "Lee"),
        );
        k.store.record_adjustment(InventoryAdjustment::new(
            cream.id,
            Some(k.airport.id),
            dec!(7),
            dec!(8),
            "recount",
            at(4, 9),
        ));

        let report =
            stock_adjustment(&k.store, &ReportWindow::open(), &StockAdjustmentFilter::default())
                .unwrap();

        let first = &report.adjustments[0];
        assert_eq!(first.quantity_delta, dec!(-3));
        assert_eq!(first.value_effect, dec!(-6));
        assert_eq!(first.branch.as_deref(), Some("Airport"));
        assert_eq!(first.requested_by.as_deref(), Some("Kim"));
        assert_eq!(first.reviewed_by.as_deref(), Some("Lee"));
        assert_eq!(report.summary.total_adjustments, 2);
        assert_eq!(report.summary.total_quantity, dec!(-2));
        assert_eq!(report.summary.total_value, dec!(-4));
    }

    #[test]
    fn status_type_and_window_filters() {
        let k = Kitchen::new();
        let ham = k.product("HAM", "Ham", dec!(3), dec!(6));
        k.store.record_adjustment(
            InventoryAdjustment::new(ham.id, None, dec!(5), dec!(4), "waste", at(2, 0))
                .filed_as(TransactionType::Waste)
                .reviewed(AdjustmentStatus::Approved, "Lee"),
        );
        k.store.record_adjustment(
            InventoryAdjustment::new(ham.id, None, dec!(4), dec!(3), "waste", at(2, 0))
                .filed_as(TransactionType::Waste),
        );
        k.store.record_adjustment(
            InventoryAdjustment::new(ham.id, None, dec!(3), dec!(1), "waste", at(25, 0))
                .filed_as(TransactionType::Waste)
                .reviewed(AdjustmentStatus::Approved, "Lee"),
        );

        let window = ReportWindow::between(at(1, 0), at(10, 0)).unwrap();
        let filter = StockAdjustmentFilter {
            product_id: Some(ham.id),
            adjustment_type: Some(TransactionType::Waste),
            status: Some(AdjustmentStatus::Approved),
        };
        let report = stock_adjustment(&k.store, &window, &filter).unwrap();

        assert_eq!(report.adjustments.len(), 1);
        assert_eq!(report.adjustments[0].quantity_after, dec!(4));
        assert_eq!(report.status_filter, Some(AdjustmentStatus::Approved));
        assert_eq!(report.product_filter.as_deref(), Some("Ham"));
    }

    #[test]
    fn unknown_product_filter_is_not_found() {
        let store = InMemoryInventoryStore::new();
        let missing = ProductId::new();
        let filter = StockAdjustmentFilter {
            product_id: Some(missing),
            ..Default::default()
        };

        let err = stock_adjustment(&store, &ReportWindow::open(), &filter).unwrap_err();
        assert_eq!(err, ReportError::ProductNotFound(missing));
    }
}
