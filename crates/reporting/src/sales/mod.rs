//! Sales reports: summary over time, sales by category, top products and the
//! payment-method breakdown.
//!
//! Only completed orders count. Order lines are priced from the order itself;
//! product, category and branch names come from the inventory catalog.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;

use tillpoint_core::{BranchId, OrderId, ReportWindow};
use tillpoint_inventory::InventoryReader;
use tillpoint_sales::{Order, OrderItem, SalesReader};

use crate::error::{ReportError, ReportResult};

pub mod category;
pub mod payment;
pub mod product;
pub mod summary;

use category::SalesByCategoryReport;
use payment::PaymentMethodsReport;
use product::{ProductSalesFilter, ProductSalesReport};
use summary::{SalesGrouping, SalesSummaryReport};

/// Stateless façade over the sales report functions.
#[derive(Debug, Clone)]
pub struct SalesReportGenerator<S, C> {
    sales: S,
    catalog: C,
    window: ReportWindow,
    branch_id: Option<BranchId>,
}

/// Every sales report with default options, keyed by report type.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReportBundle {
    pub summary: SalesSummaryReport,
    pub sales_by_category: SalesByCategoryReport,
    pub sales_by_product: ProductSalesReport,
    pub payment_methods: PaymentMethodsReport,
}

impl<S: SalesReader, C: InventoryReader> SalesReportGenerator<S, C> {
    /// Generator over every branch with an open window.
    pub fn new(sales: S, catalog: C) -> Self {
        Self {
            sales,
            catalog,
            window: ReportWindow::open(),
            branch_id: None,
        }
    }

    pub fn with_window(mut self, window: ReportWindow) -> Self {
        self.window = window;
        self
    }

    /// Restrict every report to orders placed at one branch.
    pub fn with_branch(mut self, branch_id: Option<BranchId>) -> Self {
        self.branch_id = branch_id;
        self
    }

    pub fn window(&self) -> &ReportWindow {
        &self.window
    }

    pub fn sales_summary(&self, group_by: SalesGrouping) -> ReportResult<SalesSummaryReport> {
        Ok(summary::sales_summary(&self.scope()?, group_by))
    }

    pub fn sales_by_category(&self) -> ReportResult<SalesByCategoryReport> {
        Ok(category::sales_by_category(&self.scope()?, &self.sales, &self.catalog))
    }

    pub fn sales_by_product(&self, filter: &ProductSalesFilter) -> ReportResult<ProductSalesReport> {
        product::sales_by_product(&self.scope()?, &self.sales, &self.catalog, filter)
    }

    pub fn payment_methods(&self) -> ReportResult<PaymentMethodsReport> {
        Ok(payment::payment_methods(&self.scope()?))
    }

    pub fn generate_all(&self) -> ReportResult<SalesReportBundle> {
        Ok(SalesReportBundle {
            summary: self.sales_summary(SalesGrouping::default())?,
            sales_by_category: self.sales_by_category()?,
            sales_by_product: self.sales_by_product(&ProductSalesFilter::default())?,
            payment_methods: self.payment_methods()?,
        })
    }

    fn scope(&self) -> ReportResult<SalesScope> {
        SalesScope::load(&self.sales, &self.catalog, self.window, self.branch_id)
    }
}

/// Completed orders inside the window (and branch, when filtered).
pub(crate) struct SalesScope {
    pub window: ReportWindow,
    pub branch_filter: Option<String>,
    pub orders: HashMap<OrderId, Order>,
}

impl SalesScope {
    fn load<S, C>(
        sales: &S,
        catalog: &C,
        window: ReportWindow,
        branch_id: Option<BranchId>,
    ) -> ReportResult<Self>
    where
        S: SalesReader + ?Sized,
        C: InventoryReader + ?Sized,
    {
        let branch_filter = match branch_id {
            Some(id) => Some(catalog.branch(id).ok_or(ReportError::BranchNotFound(id))?.name),
            None => None,
        };

        let orders = sales
            .orders()
            .into_iter()
            .filter(Order::is_completed)
            .filter(|o| branch_id.is_none_or(|id| o.branch_id == id))
            .filter(|o| window.contains(o.created_at))
            .map(|o| (o.id, o))
            .collect();

        Ok(Self {
            window,
            branch_filter,
            orders,
        })
    }

    /// Lines belonging to in-scope orders.
    pub fn items<S: SalesReader + ?Sized>(&self, sales: &S) -> Vec<OrderItem> {
        sales
            .order_items()
            .into_iter()
            .filter(|item| self.orders.contains_key(&item.order_id))
            .collect()
    }
}

/// Quantity, revenue and distinct orders accumulated for one group.
#[derive(Debug, Default, Clone)]
pub(crate) struct Tally {
    pub quantity: Decimal,
    pub sales: Decimal,
    pub orders: HashSet<OrderId>,
}

impl Tally {
    pub fn record(&mut self, item: &OrderItem) {
        self.quantity += item.quantity;
        self.sales += item.subtotal();
        self.orders.insert(item.order_id);
    }

    pub fn avg_price(&self) -> Decimal {
        average(self.sales, self.quantity)
    }
}

/// `total / count` to cents; zero when there is nothing to divide by.
pub(crate) fn average(total: Decimal, count: Decimal) -> Decimal {
    if count.is_zero() {
        Decimal::ZERO
    } else {
        (total / count).round_dp(2)
    }
}

/// `part` as a percentage of `total`, to two decimals.
pub(crate) fn share(part: Decimal, total: Decimal) -> Decimal {
    if total > Decimal::ZERO {
        (part / total * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use tillpoint_core::BranchId;
    use tillpoint_inventory::{InMemoryInventoryStore, Product};
    use tillpoint_sales::{InMemorySalesStore, Order, OrderItem, OrderStatus, PaymentMethod};

    use super::SalesReportGenerator;
    use crate::inventory::fixtures::{Kitchen, at};

    /// The kitchen catalog plus three weeks of orders.
    ///
    /// Completed: two downtown orders on May 2 (cash 10, card 6), one
    /// airport order on May 9 (cash 5) and an unsettled downtown order on
    /// May 20 (4). A cancelled downtown order on May 3 never counts.
    pub struct Till {
        pub kitchen: Kitchen,
        pub sales: InMemorySalesStore,
        pub apple: Product,
        pub milk: Product,
        pub straw: Product,
    }

    impl Till {
        pub fn new() -> Self {
            let kitchen = Kitchen::new();
            let apple = kitchen
                .product("P-1", "Apple", dec!(1), dec!(2))
                .in_category(kitchen.produce.id);
            let milk = kitchen
                .product("D-1", "Milk", dec!(1.5), dec!(3))
                .in_category(kitchen.dairy.id);
            kitchen.store.insert_product(apple.clone());
            kitchen.store.insert_product(milk.clone());
            let straw = kitchen.product("X-1", "Straw", dec!(0.1), dec!(1));

            let till = Self {
                kitchen,
                sales: InMemorySalesStore::new(),
                apple,
                milk,
                straw,
            };

            let downtown = till.kitchen.downtown.id;
            let airport = till.kitchen.airport.id;
            till.order(
                Order::new("ORD-1", downtown, dec!(10), at(2, 10)).paid_with(PaymentMethod::Cash),
                &[(&till.apple, dec!(2)), (&till.milk, dec!(2))],
            );
            till.order(
                Order::new("ORD-2", downtown, dec!(6), at(2, 15)).paid_with(PaymentMethod::Card),
                &[(&till.milk, dec!(2))],
            );
            till.order(
                Order::new("ORD-3", airport, dec!(5), at(9, 12)).paid_with(PaymentMethod::Cash),
                &[(&till.apple, dec!(2)), (&till.straw, dec!(1))],
            );
            till.order(
                Order::new("ORD-4", downtown, dec!(100), at(3, 9))
                    .with_status(OrderStatus::Cancelled),
                &[(&till.apple, dec!(50))],
            );
            till.order(
                Order::new("ORD-5", downtown, dec!(4), at(20, 8))
                    .with_status(OrderStatus::Completed),
                &[(&till.straw, dec!(4))],
            );
            till
        }

        fn order(&self, order: Order, lines: &[(&Product, Decimal)]) {
            for (product, quantity) in lines {
                self.sales.add_item(OrderItem::new(
                    order.id,
                    product.id,
                    *quantity,
                    product.selling_price,
                ));
            }
            self.sales.upsert_order(order);
        }

        pub fn downtown(&self) -> BranchId {
            self.kitchen.downtown.id
        }

        pub fn generator(self) -> SalesReportGenerator<InMemorySalesStore, InMemoryInventoryStore> {
            SalesReportGenerator::new(self.sales, self.kitchen.store)
        }
    }
}
