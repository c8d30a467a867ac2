use core::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use tillpoint_core::{BranchId, DomainError, DomainResult, ReportWindow, TimePeriod};
use tillpoint_reporting::{
    DEFAULT_TOP_N, ProductSalesFilter, SalesGrouping, StockAdjustmentFilter, StockMovementFilter,
    StockTakingFilter,
};

// -------------------------
// Query DTOs
// -------------------------

/// Raw report query string. Everything arrives as text so that malformed
/// values map to a JSON 400 instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub threshold: Option<String>,
    pub category_id: Option<String>,
    pub include_zero_stock: Option<String>,
    pub product_id: Option<String>,
    pub movement_type: Option<String>,
    pub adjustment_type: Option<String>,
    pub status: Option<String>,
    pub branch_id: Option<String>,
    pub group_by: Option<String>,
    pub top_n: Option<String>,
}

impl ReportQuery {
    /// Window from `period`, `start` and `end`.
    ///
    /// No period and no bounds means an open window. Bounds without a period
    /// are treated as `custom`.
    pub fn window(&self, now: DateTime<Utc>) -> DomainResult<ReportWindow> {
        let start = parse_opt_with(self.start.as_deref(), |s| parse_bound(s, false))?;
        let end = parse_opt_with(self.end.as_deref(), |s| parse_bound(s, true))?;

        match parse_opt::<TimePeriod>(self.period.as_deref())? {
            Some(TimePeriod::Custom) => TimePeriod::Custom.resolve(now, start.zip(end)),
            Some(period) => period.resolve(now, None),
            None => match (start, end) {
                (None, None) => Ok(ReportWindow::until(now)),
                (None, Some(end)) => Ok(ReportWindow::until(end)),
                (Some(start), end) => ReportWindow::between(start, end.unwrap_or(now)),
            },
        }
    }

    pub fn threshold(&self) -> DomainResult<Option<Decimal>> {
        let threshold = parse_opt_with(self.threshold.as_deref(), |s| {
            Decimal::from_str(s)
                .map_err(|e| DomainError::validation(format!("threshold '{s}': {e}")))
        })?;
        if threshold.is_some_and(|t| t.is_sign_negative()) {
            return Err(DomainError::validation("threshold must not be negative"));
        }
        Ok(threshold)
    }

    pub fn stock_taking_filter(&self) -> DomainResult<StockTakingFilter> {
        Ok(StockTakingFilter {
            category_id: parse_opt(self.category_id.as_deref())?,
            include_zero_stock: parse_opt_with(self.include_zero_stock.as_deref(), parse_flag)?
                .unwrap_or(false),
        })
    }

    pub fn movement_filter(&self) -> DomainResult<StockMovementFilter> {
        Ok(StockMovementFilter {
            product_id: parse_opt(self.product_id.as_deref())?,
            movement_type: parse_opt(self.movement_type.as_deref())?,
        })
    }

    pub fn adjustment_filter(&self) -> DomainResult<StockAdjustmentFilter> {
        Ok(StockAdjustmentFilter {
            product_id: parse_opt(self.product_id.as_deref())?,
            adjustment_type: parse_opt(self.adjustment_type.as_deref())?,
            status: parse_opt(self.status.as_deref())?,
        })
    }

    pub fn branch_id(&self) -> DomainResult<Option<BranchId>> {
        parse_opt(self.branch_id.as_deref())
    }

    /// Sales summary bucket size; daily when absent.
    pub fn grouping(&self) -> DomainResult<SalesGrouping> {
        Ok(parse_opt(self.group_by.as_deref())?.unwrap_or_default())
    }

    pub fn product_sales_filter(&self) -> DomainResult<ProductSalesFilter> {
        let top_n = parse_opt_with(self.top_n.as_deref(), |s| match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(DomainError::validation(format!(
                "top_n '{s}' must be a positive integer"
            ))),
        })?;
        Ok(ProductSalesFilter {
            category_id: parse_opt(self.category_id.as_deref())?,
            top_n: top_n.unwrap_or(DEFAULT_TOP_N),
        })
    }
}

fn parse_opt<T>(raw: Option<&str>) -> DomainResult<Option<T>>
where
    T: FromStr<Err = DomainError>,
{
    parse_opt_with(raw, T::from_str)
}

/// Blank parameters (`?status=`) count as absent.
fn parse_opt_with<T>(
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> DomainResult<T>,
) -> DomainResult<Option<T>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse(s).map(Some),
        None => Ok(None),
    }
}

fn parse_flag(raw: &str) -> DomainResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(DomainError::validation(format!("expected a boolean, got '{other}'"))),
    }
}

/// RFC 3339 instant or a plain `YYYY-MM-DD` date. A date used as an end
/// bound covers the whole day.
fn parse_bound(raw: &str, is_end: bool) -> DomainResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        DomainError::validation(format!(
            "invalid date '{raw}' (expected YYYY-MM-DD or an RFC 3339 timestamp)"
        ))
    })?;
    let start = date.and_time(NaiveTime::MIN).and_utc();
    Ok(if is_end {
        start + Duration::days(1) - Duration::microseconds(1)
    } else {
        start
    })
}
