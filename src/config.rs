use crate::calendar::weekday_ordinals;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Plan-wide settings. `plan_end` is exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    pub plan_start: NaiveDate,
    pub plan_end: NaiveDate,
    /// Hours used when a working-day rule leaves its hours unspecified.
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day_default: f64,
    #[serde(with = "weekday_ordinals", default = "default_work_week")]
    pub work_week: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holidays: Vec<NaiveDate>,
}

fn default_hours_per_day() -> f64 {
    8.0
}

fn default_work_week() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            plan_start: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            plan_end: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            hours_per_day_default: default_hours_per_day(),
            work_week: default_work_week(),
            holidays: Vec::new(),
        }
    }
}

impl PlannerConfig {
    pub fn new(plan_start: NaiveDate, plan_end: NaiveDate) -> Self {
        Self {
            plan_start,
            plan_end,
            ..Self::default()
        }
    }

    pub fn with_hours_per_day_default(mut self, hours: f64) -> Self {
        self.hours_per_day_default = hours;
        self
    }

    pub fn with_holidays<I>(mut self, holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.holidays = holidays.into_iter().collect();
        self.holidays.sort();
        self.holidays.dedup();
        self
    }

    /// Plan-level working day flag for timeline shading.
    ///
    /// Resource capacity never consults this; see [`crate::calendar::working_hours`].
    pub fn is_plan_working_day(&self, date: NaiveDate) -> bool {
        self.work_week.contains(&date.weekday()) && !self.holidays.contains(&date)
    }
}
