use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tillpoint_core::ReportWindow;
use tillpoint_sales::PaymentMethod;

use super::{SalesScope, average, share};

/// Label for completed orders with no recorded payment method.
pub const UNSPECIFIED_METHOD: &str = "Unspecified";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodRow {
    /// `None` when the order never recorded a method.
    pub method: Option<PaymentMethod>,
    pub method_name: String,
    pub total_amount: Decimal,
    pub transaction_count: usize,
    pub avg_amount: Decimal,
    pub percentage: Decimal,
    /// Order count per payment status.
    pub by_status: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentTotals {
    pub total_amount: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodsReport {
    pub report_type: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub window: ReportWindow,
    pub branch_filter: Option<String>,
    pub totals: PaymentTotals,
    pub payment_methods: Vec<PaymentMethodRow>,
}

#[derive(Default)]
struct MethodTally {
    amount: Decimal,
    count: usize,
    by_status: BTreeMap<&'static str, usize>,
}

pub(crate) fn payment_methods(scope: &SalesScope) -> PaymentMethodsReport {
    let mut tallies: HashMap<Option<PaymentMethod>, MethodTally> = HashMap::new();
    for order in scope.orders.values() {
        let tally = tallies.entry(order.payment_method).or_default();
        tally.amount += order.total_amount;
        tally.count += 1;
        *tally.by_status.entry(order.payment_status.as_str()).or_default() += 1;
    }

    let totals = PaymentTotals {
        total_amount: tallies.values().map(|t| t.amount).sum(),
        transaction_count: scope.orders.len(),
    };

    let mut payment_methods: Vec<PaymentMethodRow> = tallies
        .into_iter()
        .map(|(method, tally)| PaymentMethodRow {
            method,
            method_name: method
                .map(PaymentMethod::display_name)
                .unwrap_or(UNSPECIFIED_METHOD)
                .to_string(),
            total_amount: tally.amount,
            transaction_count: tally.count,
            avg_amount: average(tally.amount, Decimal::from(tally.count)),
            percentage: share(tally.amount, totals.total_amount),
            by_status: tally.by_status,
        })
        .collect();
    payment_methods.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.method_name.cmp(&b.method_name))
    });

    tracing::debug!(
        methods = payment_methods.len(),
        orders = totals.transaction_count,
        "payment methods generated"
    );

    PaymentMethodsReport {
        report_type: "payment_methods",
        generated_at: Utc::now(),
        window: scope.window,
        branch_filter: scope.branch_filter.clone(),
        totals,
        payment_methods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sales::fixtures::Till;
    use rust_decimal_macros::dec;

    #[test]
    fn methods_are_ranked_by_amount_with_shares() {
        let report = Till::new().generator().payment_methods().unwrap();

        assert_eq!(report.totals.total_amount, dec!(25));
        assert_eq!(report.totals.transaction_count, 4);

        let methods: Vec<_> = report.payment_methods.iter().map(|m| m.method).collect();
        assert_eq!(
            methods,
            vec![Some(PaymentMethod::Cash), Some(PaymentMethod::Card), None]
        );

        let cash = &report.payment_methods[0];
        assert_eq!(cash.total_amount, dec!(15));
        assert_eq!(cash.transaction_count, 2);
        assert_eq!(cash.avg_amount, dec!(7.5));
        assert_eq!(cash.percentage, dec!(60));
        assert_eq!(cash.by_status.get("paid"), Some(&2));

        let unset = &report.payment_methods[2];
        assert_eq!(unset.method_name, UNSPECIFIED_METHOD);
        assert_eq!(unset.by_status.get("pending"), Some(&1));
    }

    #[test]
    fn percentages_cover_the_whole_amount() {
        let report = Till::new().generator().payment_methods().unwrap();
        let total: Decimal = report.payment_methods.iter().map(|m| m.percentage).sum();
        assert_eq!(total, dec!(100));
    }
}
