use core::str::FromStr;
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{DomainError, ReportWindow};

use super::{SalesScope, average};

/// Bucket size of the sales time series.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesGrouping {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl SalesGrouping {
    pub const ALL: [SalesGrouping; 5] = [
        SalesGrouping::Day,
        SalesGrouping::Week,
        SalesGrouping::Month,
        SalesGrouping::Quarter,
        SalesGrouping::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SalesGrouping::Day => "day",
            SalesGrouping::Week => "week",
            SalesGrouping::Month => "month",
            SalesGrouping::Quarter => "quarter",
            SalesGrouping::Year => "year",
        }
    }

    /// First day of the bucket holding `at`. Weeks start on Monday.
    pub fn bucket(self, at: DateTime<Utc>) -> NaiveDate {
        let date = at.date_naive();
        let first_of = |month: u32| NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date);

        match self {
            SalesGrouping::Day => date,
            SalesGrouping::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            SalesGrouping::Month => first_of(date.month()),
            SalesGrouping::Quarter => first_of(date.month0() / 3 * 3 + 1),
            SalesGrouping::Year => first_of(1),
        }
    }
}

impl FromStr for SalesGrouping {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SalesGrouping::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown grouping '{s}' (expected day, week, month, quarter or year)"
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesBucket {
    pub period: NaiveDate,
    pub total_sales: Decimal,
    pub order_count: usize,
    pub avg_order: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesMetrics {
    pub total_sales: Decimal,
    pub order_count: usize,
    pub avg_order: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummaryReport {
    pub report_type: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub window: ReportWindow,
    pub branch_filter: Option<String>,
    pub group_by: SalesGrouping,
    pub metrics: SalesMetrics,
    pub time_series: Vec<SalesBucket>,
}

pub(crate) fn sales_summary(scope: &SalesScope, group_by: SalesGrouping) -> SalesSummaryReport {
    let mut buckets: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();
    for order in scope.orders.values() {
        let bucket = buckets.entry(group_by.bucket(order.created_at)).or_default();
        bucket.0 += order.total_amount;
        bucket.1 += 1;
    }

    let time_series: Vec<SalesBucket> = buckets
        .into_iter()
        .map(|(period, (total_sales, order_count))| SalesBucket {
            period,
            total_sales,
            order_count,
            avg_order: average(total_sales, Decimal::from(order_count)),
        })
        .collect();

    let total_sales: Decimal = time_series.iter().map(|b| b.total_sales).sum();
    let order_count = scope.orders.len();

    tracing::debug!(
        orders = order_count,
        buckets = time_series.len(),
        group_by = group_by.as_str(),
        "sales summary generated"
    );

    SalesSummaryReport {
        report_type: "sales_summary",
        generated_at: Utc::now(),
        window: scope.window,
        branch_filter: scope.branch_filter.clone(),
        group_by,
        metrics: SalesMetrics {
            total_sales,
            order_count,
            avg_order: average(total_sales, Decimal::from(order_count)),
        },
        time_series,
    }
}
