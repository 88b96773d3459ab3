//! Day quantization shared by aggregation and the drag engine.
//!
//! Everything here is civil-calendar arithmetic on [`NaiveDate`]; no timezone
//! is ever applied.

use crate::config::PlannerConfig;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// `b - a` in whole days.
#[inline]
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

#[inline]
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Every date in `[plan_start, plan_end)`, ascending.
pub fn expand_days(config: &PlannerConfig) -> Vec<NaiveDate> {
    let len = days_between(config.plan_start, config.plan_end).max(0) as usize;
    let mut days = Vec::with_capacity(len);
    let mut current = config.plan_start;
    while current < config.plan_end {
        days.push(current);
        current = add_days(current, 1);
    }
    days
}

/// Index of `date` in an ascending day index.
pub fn day_position(days: &[NaiveDate], date: NaiveDate) -> Option<usize> {
    days.binary_search(&date).ok()
}

/// Run of consecutive days inside one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSpan {
    pub year: i32,
    pub month: u32,
    pub start: NaiveDate,
    pub day_count: usize,
}

/// Groups a day index into month runs, in index order.
pub fn month_spans(days: &[NaiveDate]) -> Vec<MonthSpan> {
    let mut spans: Vec<MonthSpan> = Vec::new();
    for &day in days {
        match spans.last_mut() {
            Some(span) if span.year == day.year() && span.month == day.month() => {
                span.day_count += 1;
            }
            _ => spans.push(MonthSpan {
                year: day.year(),
                month: day.month(),
                start: day,
                day_count: 1,
            }),
        }
    }
    spans
}
