//! # Period Windows & Bucket Calendars
//!
//! Maps a period selector to a concrete half-open date range and to the
//! fixed, ordered sequence of sub-period buckets that every time series of
//! one aggregation pass is aligned on.
//!
//! ## Bucketing Rules (fixed, not configurable)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Period   Window                      Buckets          Labels          │
//! │  ──────   ────────────────────────    ─────────────    ─────────────   │
//! │  today    [midnight, midnight+1d)     24 × 1 hour      "0".."23"       │
//! │  week     [Monday 00:00, +7d)         7 × 1 day        Mon..Sun        │
//! │  month    [1st 00:00, next 1st)       28-31 × 1 day    "1".."31"       │
//! │  year     [Jan 1, next Jan 1)         12 × 1 month     Jan..Dec        │
//! │  all      unbounded                   year scheme (for charting only)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bucket ranges partition the window with no gaps or overlaps. A
//! record outside `[start, end)` belongs to no bucket at all; it is
//! excluded entirely, never clipped into a boundary bucket.
//!
//! `now` is an explicit parameter on every method. The engine captures it
//! once per pass, so all series of that pass share one bucket axis.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Constants
// =============================================================================

/// Week bucket labels, Monday-anchored.
const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Year bucket labels.
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// =============================================================================
// Period Selector
// =============================================================================

/// The user-selectable reporting period. Drives both the filter window and
/// the bucket-label sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The current calendar day.
    #[default]
    Today,
    /// The current Monday-anchored week.
    Week,
    /// The current calendar month.
    Month,
    /// The current calendar year.
    Year,
    /// Everything ever recorded (no filtering).
    All,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Today => write!(f, "today"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
            Period::Year => write!(f, "year"),
            Period::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" | "day" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            "all" => Ok(Period::All),
            other => Err(CoreError::InvalidPeriod(other.to_string())),
        }
    }
}

// =============================================================================
// Period Window
// =============================================================================

/// A half-open time range `[start, end)`. `None` on either side means
/// unbounded (only the `all` period produces that).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl PeriodWindow {
    /// True when `ts` falls inside the window (inclusive start,
    /// exclusive end).
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts < end)
    }
}

// =============================================================================
// Calendar Helpers
// =============================================================================

/// Midnight at the start of `now`'s calendar day.
fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Midnight on the Monday at or before `now`.
fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let monday =
        now.date_naive() - Duration::days(i64::from(now.weekday().num_days_from_monday()));
    monday.and_time(NaiveTime::MIN).and_utc()
}

/// The first day of the given month. `month` is always 1-12 here, and
/// every month has a day 1, so this cannot actually fail.
fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("day 1 of a calendar month")
}

/// Midnight on the first of `now`'s month.
fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    first_of_month(now.year(), now.month())
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Midnight on the first of the month after `now`'s.
fn start_of_next_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let next = if now.month() == 12 {
        first_of_month(now.year() + 1, 1)
    } else {
        first_of_month(now.year(), now.month() + 1)
    };
    next.and_time(NaiveTime::MIN).and_utc()
}

/// Number of days in `now`'s calendar month (28-31).
fn days_in_month(now: DateTime<Utc>) -> i64 {
    (start_of_next_month(now) - start_of_month(now)).num_days()
}

/// Midnight on January 1 of the given year.
fn start_of_year(year: i32) -> DateTime<Utc> {
    first_of_month(year, 1).and_time(NaiveTime::MIN).and_utc()
}

// =============================================================================
// Window & Bucket Calculator
// =============================================================================

impl Period {
    /// The concrete filter window for this period relative to `now`.
    pub fn window(&self, now: DateTime<Utc>) -> PeriodWindow {
        match self {
            Period::Today => {
                let start = start_of_day(now);
                PeriodWindow {
                    start: Some(start),
                    end: Some(start + Duration::days(1)),
                }
            }
            Period::Week => {
                let start = start_of_week(now);
                PeriodWindow {
                    start: Some(start),
                    end: Some(start + Duration::days(7)),
                }
            }
            Period::Month => PeriodWindow {
                start: Some(start_of_month(now)),
                end: Some(start_of_next_month(now)),
            },
            Period::Year => PeriodWindow {
                start: Some(start_of_year(now.year())),
                end: Some(start_of_year(now.year() + 1)),
            },
            Period::All => PeriodWindow {
                start: None,
                end: None,
            },
        }
    }

    /// Number of buckets this period charts. Constant for every period
    /// except `month`, whose count follows the calendar (28-31).
    pub fn bucket_count(&self, now: DateTime<Utc>) -> usize {
        match self {
            Period::Today => 24,
            Period::Week => 7,
            Period::Month => days_in_month(now) as usize,
            Period::Year | Period::All => 12,
        }
    }

    /// The ordered bucket labels: the x-axis of every series produced in
    /// one aggregation pass.
    pub fn bucket_labels(&self, now: DateTime<Utc>) -> Vec<String> {
        match self {
            Period::Today => (0..24).map(|hour| hour.to_string()).collect(),
            Period::Week => WEEKDAY_LABELS.iter().map(|s| s.to_string()).collect(),
            Period::Month => (1..=days_in_month(now)).map(|day| day.to_string()).collect(),
            Period::Year | Period::All => MONTH_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The half-open time range of bucket `index`, or `None` when the
    /// index is out of range. The ranges for indices
    /// `0..bucket_count(now)` partition the window exactly.
    pub fn bucket_range(
        &self,
        index: usize,
        now: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Period::Today => {
                if index >= 24 {
                    return None;
                }
                let start = start_of_day(now) + Duration::hours(index as i64);
                Some((start, start + Duration::hours(1)))
            }
            Period::Week => {
                if index >= 7 {
                    return None;
                }
                let start = start_of_week(now) + Duration::days(index as i64);
                Some((start, start + Duration::days(1)))
            }
            Period::Month => {
                if index as i64 >= days_in_month(now) {
                    return None;
                }
                let start = start_of_month(now) + Duration::days(index as i64);
                Some((start, start + Duration::days(1)))
            }
            Period::Year | Period::All => {
                if index >= 12 {
                    return None;
                }
                let month = index as u32 + 1;
                let start = first_of_month(now.year(), month)
                    .and_time(NaiveTime::MIN)
                    .and_utc();
                let end = if month == 12 {
                    start_of_year(now.year() + 1)
                } else {
                    first_of_month(now.year(), month + 1)
                        .and_time(NaiveTime::MIN)
                        .and_utc()
                };
                Some((start, end))
            }
        }
    }

    /// The inverse of [`bucket_range`](Self::bucket_range): the unique
    /// bucket whose range contains `ts`, or `None` when `ts` lies outside
    /// every bucket of this period.
    ///
    /// For `all`, the bucketing falls back to the year scheme: records
    /// from earlier years chart nowhere even though they aggregate
    /// normally.
    pub fn bucket_index(&self, ts: DateTime<Utc>, now: DateTime<Utc>) -> Option<usize> {
        match self {
            Period::Today => {
                let start = start_of_day(now);
                if ts >= start && ts < start + Duration::days(1) {
                    Some(ts.hour() as usize)
                } else {
                    None
                }
            }
            Period::Week => {
                let start = start_of_week(now);
                if ts >= start && ts < start + Duration::days(7) {
                    Some((ts - start).num_days() as usize)
                } else {
                    None
                }
            }
            Period::Month => {
                if ts.year() == now.year() && ts.month() == now.month() {
                    Some(ts.day0() as usize)
                } else {
                    None
                }
            }
            Period::Year | Period::All => {
                if ts.year() == now.year() {
                    Some(ts.month0() as usize)
                } else {
                    None
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
