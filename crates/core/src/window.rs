//! Reporting windows.
//!
//! Every report runs against a `ReportWindow`. The end bound always exists
//! (defaults to "now"); the start bound is optional, and the window only
//! filters anything once a start is set.

use core::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};

/// Named reporting period, resolved against a reference instant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "yesterday")]
    Yesterday,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "this_month")]
    ThisMonth,
    #[serde(rename = "last_month")]
    LastMonth,
    #[serde(rename = "this_quarter")]
    ThisQuarter,
    #[serde(rename = "last_quarter")]
    LastQuarter,
    #[serde(rename = "this_year")]
    ThisYear,
    #[serde(rename = "last_year")]
    LastYear,
    #[serde(rename = "custom")]
    Custom,
}

impl TimePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::Today => "today",
            TimePeriod::Yesterday => "yesterday",
            TimePeriod::Last7Days => "last_7_days",
            TimePeriod::Last30Days => "last_30_days",
            TimePeriod::ThisMonth => "this_month",
            TimePeriod::LastMonth => "last_month",
            TimePeriod::ThisQuarter => "this_quarter",
            TimePeriod::LastQuarter => "last_quarter",
            TimePeriod::ThisYear => "this_year",
            TimePeriod::LastYear => "last_year",
            TimePeriod::Custom => "custom",
        }
    }

    /// Human-readable label used in report headers.
    pub fn display_name(self) -> &'static str {
        match self {
            TimePeriod::Today => "Today",
            TimePeriod::Yesterday => "Yesterday",
            TimePeriod::Last7Days => "Last 7 Days",
            TimePeriod::Last30Days => "Last 30 Days",
            TimePeriod::ThisMonth => "This Month",
            TimePeriod::LastMonth => "Last Month",
            TimePeriod::ThisQuarter => "This Quarter",
            TimePeriod::LastQuarter => "Last Quarter",
            TimePeriod::ThisYear => "This Year",
            TimePeriod::LastYear => "Last Year",
            TimePeriod::Custom => "Custom Period",
        }
    }

    /// Resolve the period into concrete bounds.
    ///
    /// `custom` is only consulted for [`TimePeriod::Custom`], which requires
    /// both bounds.
    pub fn resolve(
        self,
        now: DateTime<Utc>,
        custom: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> DomainResult<ReportWindow> {
        let today = now.date_naive();

        let (start, end) = match self {
            TimePeriod::Today => (start_of_day(today), now),
            TimePeriod::Yesterday => {
                let yesterday = today - Duration::days(1);
                (start_of_day(yesterday), end_of_day(yesterday))
            }
            TimePeriod::Last7Days => (start_of_day(today - Duration::days(7)), now),
            TimePeriod::Last30Days => (start_of_day(today - Duration::days(30)), now),
            TimePeriod::ThisMonth => (start_of_day(ymd(today.year(), today.month(), 1)?), now),
            TimePeriod::LastMonth => {
                let first_this_month = ymd(today.year(), today.month(), 1)?;
                let last_prev_month = first_this_month
                    .pred_opt()
                    .ok_or_else(|| DomainError::invariant("date out of range"))?;
                let first_prev_month = ymd(last_prev_month.year(), last_prev_month.month(), 1)?;
                (start_of_day(first_prev_month), end_of_day(last_prev_month))
            }
            TimePeriod::ThisQuarter => {
                let quarter = (today.month() - 1) / 3;
                (start_of_day(ymd(today.year(), quarter * 3 + 1, 1)?), now)
            }
            TimePeriod::LastQuarter => {
                let quarter = (today.month() - 1) / 3;
                if quarter == 0 {
                    let year = today.year() - 1;
                    (start_of_day(ymd(year, 10, 1)?), end_of_day(ymd(year, 12, 31)?))
                } else {
                    let start = ymd(today.year(), (quarter - 1) * 3 + 1, 1)?;
                    let end = ymd(today.year(), quarter * 3 + 1, 1)?
                        .pred_opt()
                        .ok_or_else(|| DomainError::invariant("date out of range"))?;
                    (start_of_day(start), end_of_day(end))
                }
            }
            TimePeriod::ThisYear => (start_of_day(ymd(today.year(), 1, 1)?), now),
            TimePeriod::LastYear => {
                let year = today.year() - 1;
                (start_of_day(ymd(year, 1, 1)?), end_of_day(ymd(year, 12, 31)?))
            }
            TimePeriod::Custom => match custom {
                Some((start, end)) => (start, end),
                None => {
                    return Err(DomainError::validation(
                        "custom period requires both start and end",
                    ));
                }
            },
        };

        let mut window = ReportWindow::between(start, end)?;
        window.period = Some(self);
        Ok(window)
    }
}

impl core::fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimePeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" => Ok(TimePeriod::Today),
            "yesterday" => Ok(TimePeriod::Yesterday),
            "last_7_days" => Ok(TimePeriod::Last7Days),
            "last_30_days" => Ok(TimePeriod::Last30Days),
            "this_month" => Ok(TimePeriod::ThisMonth),
            "last_month" => Ok(TimePeriod::LastMonth),
            "this_quarter" => Ok(TimePeriod::ThisQuarter),
            "last_quarter" => Ok(TimePeriod::LastQuarter),
            "this_year" => Ok(TimePeriod::ThisYear),
            "last_year" => Ok(TimePeriod::LastYear),
            "custom" => Ok(TimePeriod::Custom),
            other => Err(DomainError::validation(format!("unknown time period: {other}"))),
        }
    }
}

/// Date range a report is scoped to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    #[serde(rename = "start_date")]
    start: Option<DateTime<Utc>>,
    #[serde(rename = "end_date")]
    end: DateTime<Utc>,
    #[serde(rename = "time_period", serialize_with = "serialize_period")]
    period: Option<TimePeriod>,
}

/// Label for a window that was not built from a named period.
const CUSTOM_LABEL: &str = "Custom period";

fn serialize_period<S: Serializer>(
    period: &Option<TimePeriod>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(period.map(TimePeriod::display_name).unwrap_or(CUSTOM_LABEL))
}

impl ReportWindow {
    /// Open-start window ending at `end`. Filters nothing.
    pub fn until(end: DateTime<Utc>) -> Self {
        Self {
            start: None,
            end,
            period: None,
        }
    }

    /// Open-start window ending now.
    pub fn open() -> Self {
        Self::until(Utc::now())
    }

    /// Closed window `[start, end]`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation("window start is after its end"));
        }
        Ok(Self {
            start: Some(start),
            end,
            period: None,
        })
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn period(&self) -> Option<TimePeriod> {
        self.period
    }

    /// Whether the window restricts anything at all.
    pub fn is_bounded(&self) -> bool {
        self.start.is_some()
    }

    /// Inclusive on both ends; always true for an open-start window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        match self.start {
            Some(start) => start <= at && at <= self.end,
            None => true,
        }
    }

    pub fn period_display(&self) -> &'static str {
        self.period.map(TimePeriod::display_name).unwrap_or(CUSTOM_LABEL)
    }
}

impl Default for ReportWindow {
    fn default() -> Self {
        Self::open()
    }
}

fn ymd(year: i32, month: u32, day: u32) -> DomainResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DomainError::invariant(format!("invalid date {year}-{month}-{day}")))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::microseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn open_window_contains_everything() {
        let w = ReportWindow::until(at(2024, 1, 1, 0));
        assert!(!w.is_bounded());
        assert!(w.contains(at(2030, 1, 1, 0)));
    }

    #[test]
    fn bounded_window_is_inclusive() {
        let w = ReportWindow::between(at(2024, 3, 1, 0), at(2024, 3, 31, 0)).unwrap();
        assert!(w.contains(at(2024, 3, 1, 0)));
        assert!(w.contains(at(2024, 3, 31, 0)));
        assert!(!w.contains(at(2024, 4, 1, 0)));
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        assert!(ReportWindow::between(at(2024, 3, 2, 0), at(2024, 3, 1, 0)).is_err());
    }

    #[test]
    fn last_month_spans_the_whole_previous_month() {
        let w = TimePeriod::LastMonth.resolve(at(2024, 3, 15, 10), None).unwrap();
        assert_eq!(w.start(), Some(at(2024, 2, 1, 0)));
        assert!(w.contains(at(2024, 2, 29, 23)));
        assert!(!w.contains(at(2024, 3, 1, 0)));
        assert_eq!(w.period_display(), "Last Month");
    }

    #[test]
    fn last_quarter_wraps_to_previous_year_in_q1() {
        let w = TimePeriod::LastQuarter.resolve(at(2024, 2, 10, 0), None).unwrap();
        assert_eq!(w.start(), Some(at(2023, 10, 1, 0)));
        assert!(w.contains(at(2023, 12, 31, 23)));
    }

    #[test]
    fn custom_requires_bounds() {
        assert!(TimePeriod::Custom.resolve(Utc::now(), None).is_err());
        let w = TimePeriod::Custom
            .resolve(Utc::now(), Some((at(2024, 1, 1, 0), at(2024, 1, 2, 0))))
            .unwrap();
        assert_eq!(w.end(), at(2024, 1, 2, 0));
    }

    #[test]
    fn serializes_bounds_with_the_period_label() {
        let w = TimePeriod::LastMonth.resolve(at(2024, 3, 15, 10), None).unwrap();
        let json = serde_json::to_value(w).unwrap();
        assert_eq!(json["time_period"], "Last Month");
        assert_eq!(json["start_date"], "2024-02-01T00:00:00Z");

        let open = serde_json::to_value(ReportWindow::until(at(2024, 1, 1, 0))).unwrap();
        assert_eq!(open["time_period"], "Custom period");
        assert!(open["start_date"].is_null());
    }

    #[test]
    fn parses_period_names() {
        assert_eq!("last_7_days".parse::<TimePeriod>().unwrap(), TimePeriod::Last7Days);
        assert_eq!("THIS_YEAR".parse::<TimePeriod>().unwrap(), TimePeriod::ThisYear);
        assert!("fortnight".parse::<TimePeriod>().is_err());
    }
}
