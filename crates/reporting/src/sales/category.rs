use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tillpoint_core::{CategoryId, ReportWindow};
use tillpoint_inventory::InventoryReader;
use tillpoint_sales::SalesReader;

use crate::inventory::Lookups;
use crate::inventory::stock_taking::UNCATEGORIZED;

use super::{SalesScope, Tally, average, share};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySalesRow {
    pub category_id: Option<CategoryId>,
    pub category: String,
    pub total_quantity: Decimal,
    pub total_sales: Decimal,
    pub avg_price: Decimal,
    pub order_count: usize,
    pub sales_percentage: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorySalesTotals {
    pub total_sales: Decimal,
    pub total_quantity: Decimal,
    /// Distinct orders with at least one counted line.
    pub order_count: usize,
    pub avg_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesByCategoryReport {
    pub report_type: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub window: ReportWindow,
    pub branch_filter: Option<String>,
    pub totals: CategorySalesTotals,
    pub categories: Vec<CategorySalesRow>,
}

pub(crate) fn sales_by_category<S, C>(
    scope: &SalesScope,
    sales: &S,
    catalog: &C,
) -> SalesByCategoryReport
where
    S: SalesReader + ?Sized,
    C: InventoryReader + ?Sized,
{
    let lookups = Lookups::load(catalog);

    let mut tallies: HashMap<Option<CategoryId>, Tally> = HashMap::new();
    let mut orders = HashSet::new();
    for item in scope.items(sales) {
        let Some(product) = lookups.products.get(&item.product_id) else {
            tracing::warn!(
                order_id = %item.order_id,
                product_id = %item.product_id,
                "order line references unknown product; skipped"
            );
            continue;
        };
        tallies.entry(product.category_id).or_default().record(&item);
        orders.insert(item.order_id);
    }

    let total_sales: Decimal = tallies.values().map(|t| t.sales).sum();
    let total_quantity: Decimal = tallies.values().map(|t| t.quantity).sum();

    let mut categories: Vec<CategorySalesRow> = tallies
        .into_iter()
        .map(|(category_id, tally)| CategorySalesRow {
            category_id,
            category: lookups
                .category_name(category_id)
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            total_quantity: tally.quantity,
            total_sales: tally.sales,
            avg_price: tally.avg_price(),
            order_count: tally.orders.len(),
            sales_percentage: share(tally.sales, total_sales),
        })
        .collect();
    categories.sort_by(|a, b| {
        b.total_sales
            .cmp(&a.total_sales)
            .then_with(|| a.category.cmp(&b.category))
    });

    tracing::debug!(categories = categories.len(), "sales by category generated");

    SalesByCategoryReport {
        report_type: "sales_by_category",
        generated_at: Utc::now(),
        window: scope.window,
        branch_filter: scope.branch_filter.clone(),
        totals: CategorySalesTotals {
            total_sales,
            total_quantity,
            order_count: orders.len(),
            avg_price: average(total_sales, total_quantity),
        },
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sales::fixtures::Till;
    use rust_decimal_macros::dec;
    use tillpoint_core::ProductId;
    use tillpoint_sales::OrderItem;

    #[test]
    fn categories_are_ranked_by_revenue() {
        let till = Till::new();
        let dairy = till.kitchen.dairy.id;
        let report = till.generator().sales_by_category().unwrap();

        let names: Vec<_> = report.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Dairy", "Produce", UNCATEGORIZED]);

        let top = &report.categories[0];
        assert_eq!(top.category_id, Some(dairy));
        assert_eq!(top.total_sales, dec!(12));
        assert_eq!(top.total_quantity, dec!(4));
        assert_eq!(top.avg_price, dec!(3));
        assert_eq!(top.order_count, 2);
        assert_eq!(top.sales_percentage, dec!(48));

        assert_eq!(report.totals.total_sales, dec!(25));
        assert_eq!(report.totals.total_quantity, dec!(13));
        assert_eq!(report.totals.order_count, 4);
        assert_eq!(report.totals.avg_price, dec!(1.92));
    }

    #[test]
    fn lines_for_unknown_products_are_skipped() {
        let till = Till::new();
        let order = till
            .sales
            .orders()
            .into_iter()
            .find(|o| o.order_number == "ORD-2")
            .unwrap();
        till.sales
            .add_item(OrderItem::new(order.id, ProductId::new(), dec!(1), dec!(99)));

        let report = till.generator().sales_by_category().unwrap();
        assert_eq!(report.totals.total_sales, dec!(25));
    }
}
