use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{CategoryId, ProductId, ReportWindow};
use tillpoint_inventory::{InventoryReader, TransactionType};

use crate::error::{ReportError, ReportResult};

use super::Lookups;

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StockTakingFilter {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub include_zero_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockTakingRow {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub current_stock: Decimal,
    pub unit: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub total_value: Decimal,
    pub items_sold: Decimal,
    pub items_received: Decimal,
    pub items_adjusted: Decimal,
    pub items_wasted: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorySummary {
    pub total_products: usize,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockTakingReport {
    pub report_type: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub window: ReportWindow,
    pub category_filter: Option<String>,
    pub include_zero_stock: bool,
    pub total_products: usize,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    pub categories: BTreeMap<String, CategorySummary>,
    pub items: Vec<StockTakingRow>,
}

impl StockTakingReport {
    fn empty(window: ReportWindow, category_filter: Option<String>, include_zero_stock: bool) -> Self {
        Self {
            report_type: "stock_taking",
            generated_at: Utc::now(),
            window,
            category_filter,
            include_zero_stock,
            total_products: 0,
            total_quantity: Decimal::ZERO,
            total_value: Decimal::ZERO,
            categories: BTreeMap::new(),
            items: Vec::new(),
        }
    }
}

/// Window-scoped movement counters for one product.
#[derive(Debug, Default, Clone, Copy)]
struct Movement {
    sold: Decimal,
    received: Decimal,
    adjusted: Decimal,
    wasted: Decimal,
}

impl Movement {
    fn record(&mut self, kind: TransactionType, quantity: Decimal) {
        match kind {
            TransactionType::Sale => self.sold += quantity,
            TransactionType::Purchase | TransactionType::Return => self.received += quantity,
            TransactionType::Adjustment => self.adjusted += quantity,
            TransactionType::Waste => self.wasted += quantity,
            TransactionType::Transfer | TransactionType::Production => {}
        }
    }
}

pub(crate) fn stock_taking<R: InventoryReader + ?Sized>(
    reader: &R,
    window: &ReportWindow,
    filter: &StockTakingFilter,
) -> ReportResult<StockTakingReport> {
    let category_filter = match filter.category_id {
        Some(id) => Some(
            reader
                .category(id)
                .ok_or(ReportError::CategoryNotFound(id))?
                .name,
        ),
        None => None,
    };

    let lookups = Lookups::load(reader);
    if lookups.products.is_empty() {
        return Ok(StockTakingReport::empty(
            *window,
            category_filter,
            filter.include_zero_stock,
        ));
    }

    let mut on_hand: HashMap<ProductId, Decimal> = HashMap::new();
    for stock in reader.branch_stocks() {
        *on_hand.entry(stock.product_id).or_default() += stock.current_stock;
    }

    let mut movements: HashMap<ProductId, Movement> = HashMap::new();
    for tx in reader
        .transactions()
        .into_iter()
        .filter(|tx| window.contains(tx.created_at))
    {
        movements
            .entry(tx.product_id)
            .or_default()
            .record(tx.transaction_type, tx.quantity);
    }

    let mut report = StockTakingReport::empty(*window, category_filter, filter.include_zero_stock);

    for product in lookups.products.values().filter(|p| p.is_active) {
        if filter.category_id.is_some() && product.category_id != filter.category_id {
            continue;
        }

        let current_stock = on_hand.get(&product.id).copied().unwrap_or_default();
        if !filter.include_zero_stock && current_stock <= Decimal::ZERO {
            continue;
        }

        let category = lookups
            .category_name(product.category_id)
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let total_value = current_stock * product.cost_price;
        let moved = movements.get(&product.id).copied().unwrap_or_default();

        let summary = report.categories.entry(category.clone()).or_default();
        summary.total_products += 1;
        summary.total_quantity += current_stock;
        summary.total_value += total_value;

        report.total_quantity += current_stock;
        report.total_value += total_value;
        report.items.push(StockTakingRow {
            id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            category,
            current_stock,
            unit: product.unit_label().to_string(),
            cost_price: product.cost_price,
            selling_price: product.selling_price,
            total_value,
            items_sold: moved.sold,
            items_received: moved.received,
            items_adjusted: moved.adjusted,
            items_wasted: moved.wasted,
        });
    }

    report.total_products = report.items.len();
    report
        .items
        .sort_by(|a, b| (&a.category, &a.name, a.id).cmp(&(&b.category, &b.name, b.id)));

    tracing::debug!(
        items = report.total_products,
        categories = report.categories.len(),
        "stock taking generated"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::fixtures::{Kitchen, at};
    use rust_decimal_macros::dec;
    use tillpoint_inventory::{
        BranchStock, Category, InMemoryInventoryStore, InventoryTransaction,
    };

    #[test]
    fn no_products_yields_the_empty_shape() {
        let store = InMemoryInventoryStore::new();
        let report =
            stock_taking(&store, &ReportWindow::open(), &StockTakingFilter::default()).unwrap();

        assert_eq!(report.total_products, 0);
        assert_eq!(report.total_quantity, Decimal::ZERO);
        assert_eq!(report.total_value, Decimal::ZERO);
        assert!(report.categories.is_empty());
        assert!(report.items.is_empty());
    }

    #[test]
    fn unknown_category_filter_is_not_found_even_without_products() {
        let store = InMemoryInventoryStore::new();
        let missing = CategoryId::new();
        let filter = StockTakingFilter {
            category_id: Some(missing),
            include_zero_stock: false,
        };

        let err = stock_taking(&store, &ReportWindow::open(), &filter).unwrap_err();
        assert_eq!(err, ReportError::CategoryNotFound(missing));
    }

    #[test]
    fn stock_is_summed_across_branches_and_valued_at_cost() {
        let k = Kitchen::new();
        let rice = k.product("RCE", "Rice", dec!(2.50), dec!(4)).in_category(k.produce.id);
        k.store.insert_product(rice.clone());
        k.store.upsert_stock(BranchStock::new(rice.id, k.downtown.id, dec!(10), dec!(5)));
        k.store.upsert_stock(BranchStock::new(rice.id, k.airport.id, dec!(4), dec!(5)));

        let report =
            stock_taking(&k.store, &ReportWindow::open(), &StockTakingFilter::default()).unwrap();

        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].current_stock, dec!(14));
        assert_eq!(report.items[0].total_value, dec!(35.00));
        assert_eq!(report.categories["Produce"].total_products, 1);
        assert_eq!(report.total_value, dec!(35.00));
    }

    #[test]
    fn zero_stock_products_need_the_flag() {
        let k = Kitchen::new();
        let empty = k.product("SLT", "Salt", dec!(0.1), dec!(0.3));
        k.store.upsert_stock(BranchStock::new(empty.id, k.downtown.id, dec!(0), dec!(5)));

        let hidden =
            stock_taking(&k.store, &ReportWindow::open(), &StockTakingFilter::default()).unwrap();
        assert!(hidden.items.is_empty());

        let shown = stock_taking(
            &k.store,
            &ReportWindow::open(),
            &StockTakingFilter {
                category_id: None,
                include_zero_stock: true,
            },
        )
        .unwrap();
        assert_eq!(shown.items.len(), 1);
        assert_eq!(shown.items[0].category, UNCATEGORIZED);
        assert_eq!(shown.items[0].unit, "pcs");
    }

    #[test]
    fn category_filter_and_sorting() {
        let k = Kitchen::new();
        let snacks = Category::new("Snacks");
        k.store.insert_category(snacks.clone());
        for (sku, name, category) in [
            ("CHS", "Cheese", k.dairy.id),
            ("BTR", "Butter", k.dairy.id),
            ("CHP", "Chips", snacks.id),
        ] {
            let p = k.product(sku, name, dec!(1), dec!(2)).in_category(category);
            k.store.insert_product(p.clone());
            k.store.upsert_stock(BranchStock::new(p.id, k.downtown.id, dec!(3), dec!(1)));
        }

        let all =
            stock_taking(&k.store, &ReportWindow::open(), &StockTakingFilter::default()).unwrap();
        let names: Vec<_> = all.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Butter", "Cheese", "Chips"]);

        let dairy = stock_taking(
            &k.store,
            &ReportWindow::open(),
            &StockTakingFilter {
                category_id: Some(k.dairy.id),
                include_zero_stock: false,
            },
        )
        .unwrap();
        assert_eq!(dairy.category_filter.as_deref(), Some("Dairy"));
        assert_eq!(dairy.total_products, 2);
        assert_eq!(dairy.total_quantity, dec!(6));
        assert_eq!(dairy.categories.len(), 1);
    }

    #[test]
    fn movement_counters_respect_the_window() {
        let k = Kitchen::new();
        let oil = k.product("OIL", "Olive Oil", dec!(5), dec!(9));
        k.store.upsert_stock(BranchStock::new(oil.id, k.downtown.id, dec!(20), dec!(5)));

        let branch = Some(k.downtown.id);
        for (kind, qty, day) in [
            (TransactionType::Purchase, dec!(10), 2),
            (TransactionType::Return, dec!(1), 3),
            (TransactionType::Sale, dec!(4), 3),
            (TransactionType::Waste, dec!(2), 4),
            (TransactionType::Adjustment, dec!(3), 4),
            (TransactionType::Transfer, dec!(7), 4),
            (TransactionType::Sale, dec!(50), 20),
        ] {
            k.store
                .record_transaction(InventoryTransaction::new(oil.id, branch, kind, qty, at(day, 9)));
        }

        let window = ReportWindow::between(at(1, 0), at(10, 0)).unwrap();
        let report = stock_taking(&k.store, &window, &StockTakingFilter::default()).unwrap();
        let row = &report.items[0];

        assert_eq!(row.items_sold, dec!(4));
        assert_eq!(row.items_received, dec!(11));
        assert_eq!(row.items_adjusted, dec!(3));
        assert_eq!(row.items_wasted, dec!(2));
    }

    #[test]
    fn serialized_report_echoes_window_bounds() {
        let store = InMemoryInventoryStore::new();
        let window = ReportWindow::between(at(1, 0), at(2, 0)).unwrap();
        let json =
            serde_json::to_value(stock_taking(&store, &window, &StockTakingFilter::default()).unwrap())
                .unwrap();

        assert_eq!(json["report_type"], "stock_taking");
        assert!(json["start_date"].is_string());
        assert!(json["end_date"].is_string());
        assert_eq!(json["total_products"], 0);
    }
}
