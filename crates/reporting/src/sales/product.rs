use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{CategoryId, ProductId, ReportWindow};
use tillpoint_inventory::InventoryReader;
use tillpoint_sales::SalesReader;

use crate::error::{ReportError, ReportResult};
use crate::inventory::Lookups;
use crate::inventory::stock_taking::UNCATEGORIZED;

use super::{SalesScope, Tally, share};

/// Rows returned when the caller does not ask for a count.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductSalesFilter {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for ProductSalesFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSalesRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub category: String,
    pub total_quantity: Decimal,
    pub total_sales: Decimal,
    pub avg_price: Decimal,
    pub order_count: usize,
    pub sales_percentage: Decimal,
}

/// Totals over every matching product, not just the listed ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductSalesTotals {
    pub total_quantity: Decimal,
    pub total_sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSalesReport {
    pub report_type: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub window: ReportWindow,
    pub branch_filter: Option<String>,
    pub category_filter: Option<String>,
    pub top_n: usize,
    pub totals: ProductSalesTotals,
    pub products: Vec<ProductSalesRow>,
}

pub(crate) fn sales_by_product<S, C>(
    scope: &SalesScope,
    sales: &S,
    catalog: &C,
    filter: &ProductSalesFilter,
) -> ReportResult<ProductSalesReport>
where
    S: SalesReader + ?Sized,
    C: InventoryReader + ?Sized,
{
    let category_filter = match filter.category_id {
        Some(id) => Some(
            catalog
                .category(id)
                .ok_or(ReportError::CategoryNotFound(id))?
                .name,
        ),
        None => None,
    };
    let lookups = Lookups::load(catalog);

    let mut tallies: HashMap<ProductId, Tally> = HashMap::new();
    for item in scope.items(sales) {
        let Some(product) = lookups.products.get(&item.product_id) else {
            tracing::warn!(
                order_id = %item.order_id,
                product_id = %item.product_id,
                "order line references unknown product; skipped"
            );
            continue;
        };
        if filter.category_id.is_some() && product.category_id != filter.category_id {
            continue;
        }
        tallies.entry(product.id).or_default().record(&item);
    }

    let totals = ProductSalesTotals {
        total_quantity: tallies.values().map(|t| t.quantity).sum(),
        total_sales: tallies.values().map(|t| t.sales).sum(),
    };

    let mut products: Vec<ProductSalesRow> = tallies
        .into_iter()
        .filter_map(|(product_id, tally)| {
            let product = lookups.products.get(&product_id)?;
            Some(ProductSalesRow {
                product_id,
                product_name: product.name.clone(),
                sku: product.sku.clone(),
                category: lookups
                    .category_name(product.category_id)
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                total_quantity: tally.quantity,
                total_sales: tally.sales,
                avg_price: tally.avg_price(),
                order_count: tally.orders.len(),
                sales_percentage: share(tally.sales, totals.total_sales),
            })
        })
        .collect();
    products.sort_by(|a, b| {
        b.total_sales
            .cmp(&a.total_sales)
            .then_with(|| a.product_name.cmp(&b.product_name))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    products.truncate(filter.top_n);

    tracing::debug!(
        products = products.len(),
        top_n = filter.top_n,
        "top products generated"
    );

    Ok(ProductSalesReport {
        report_type: "top_products",
        generated_at: Utc::now(),
        window: scope.window,
        branch_filter: scope.branch_filter.clone(),
        category_filter,
        top_n: filter.top_n,
        totals,
        products,
    })
}
