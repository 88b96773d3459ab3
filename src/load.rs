//! Capacity aggregation over a plan snapshot.
//!
//! Nothing here fails: unknown resource ids contribute nothing and a day with
//! zero capacity has utilization 0. Over-assignment is reported, never capped.

use crate::calendar::working_hours;
use crate::plan::Plan;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Summed load of one resource on one day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCell {
    pub used_hours: f64,
    pub used_pct: f64,
}

/// Per-day load of one resource. Days without load are absent.
pub type ResourceLoad = BTreeMap<NaiveDate, LoadCell>;

/// Used hours and summed percentages per resource and day.
pub fn aggregate_resource_load(plan: &Plan) -> BTreeMap<String, ResourceLoad> {
    let days = plan.day_index();
    let resources = plan.resource_index();
    let config = plan.config();
    let mut per_resource: BTreeMap<String, ResourceLoad> = BTreeMap::new();

    for assignment in plan.assignments() {
        let Some(resource) = resources.get(assignment.resource_id.as_str()) else {
            debug!(
                assignment = %assignment.id,
                resource = %assignment.resource_id,
                "skipping assignment with unknown resource"
            );
            continue;
        };

        for &date in days.iter().filter(|&&date| assignment.covers(date)) {
            let pct = assignment.percent_at(date);
            if pct <= 0.0 {
                continue;
            }
            let hours = working_hours(resource, date, config) * pct / 100.0;
            let cell = per_resource
                .entry(resource.id.clone())
                .or_default()
                .entry(date)
                .or_default();
            cell.used_hours += hours;
            cell.used_pct += pct;
        }
    }

    per_resource
}

/// Plan-wide capacity and usage for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationRow {
    pub date: NaiveDate,
    pub capacity_hours: f64,
    pub used_hours: f64,
    pub ratio: f64,
}

/// One row per day of the plan, in date order.
pub fn utilization_rows(plan: &Plan) -> Vec<UtilizationRow> {
    let load = aggregate_resource_load(plan);
    let config = plan.config();

    plan.day_index()
        .into_iter()
        .map(|date| {
            let mut capacity_hours = 0.0;
            let mut used_hours = 0.0;
            for resource in plan.resources() {
                capacity_hours += working_hours(resource, date, config);
                used_hours += load
                    .get(&resource.id)
                    .and_then(|cells| cells.get(&date))
                    .map(|cell| cell.used_hours)
                    .unwrap_or(0.0);
            }
            let ratio = if capacity_hours > 0.0 {
                used_hours / capacity_hours
            } else {
                0.0
            };
            UtilizationRow {
                date,
                capacity_hours,
                used_hours,
                ratio,
            }
        })
        .collect()
}

/// Used hours over available hours for every plan day. Unbounded above 1.0.
pub fn compute_daily_utilization(plan: &Plan) -> BTreeMap<NaiveDate, f64> {
    utilization_rows(plan)
        .into_iter()
        .map(|row| (row.date, row.ratio))
        .collect()
}

/// A resource/day whose summed percentage exceeds the resource's parallel limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overload {
    pub resource_id: String,
    pub date: NaiveDate,
    pub used_pct: f64,
    pub limit_pct: f64,
}

/// Overloaded cells ordered by resource id, then date.
pub fn overloaded_days(plan: &Plan) -> Vec<Overload> {
    let resources = plan.resource_index();
    let mut out = Vec::new();
    for (resource_id, cells) in aggregate_resource_load(plan) {
        let Some(resource) = resources.get(resource_id.as_str()) else {
            continue;
        };
        let limit_pct = resource.parallel_limit_pct();
        for (date, cell) in cells {
            if cell.used_pct > limit_pct {
                out.push(Overload {
                    resource_id: resource_id.clone(),
                    date,
                    used_pct: cell.used_pct,
                    limit_pct,
                });
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationSummary {
    pub day_count: usize,
    /// Days with positive plan-wide capacity.
    pub working_day_count: usize,
    pub peak_date: Option<NaiveDate>,
    pub peak_ratio: f64,
    /// Mean ratio over working days.
    pub mean_ratio: f64,
    /// Days whose ratio exceeds 1.0.
    pub overloaded_day_count: usize,
}

impl UtilizationSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("days={}", self.day_count));
        parts.push(format!("working={}", self.working_day_count));
        if let Some(date) = self.peak_date {
            parts.push(format!("peak={:.1}%@{}", self.peak_ratio * 100.0, date));
        }
        parts.push(format!("mean={:.1}%", self.mean_ratio * 100.0));
        if self.overloaded_day_count > 0 {
            parts.push(format!("overloaded={}", self.overloaded_day_count));
        }
        parts.join(", ")
    }
}

pub fn summarize(plan: &Plan) -> UtilizationSummary {
    let rows = utilization_rows(plan);
    let mut peak: Option<&UtilizationRow> = None;
    let mut working_day_count = 0;
    let mut ratio_total = 0.0;
    let mut overloaded_day_count = 0;

    for row in &rows {
        if peak.is_none_or(|best| row.ratio > best.ratio) {
            peak = Some(row);
        }
        if row.capacity_hours > 0.0 {
            working_day_count += 1;
            ratio_total += row.ratio;
        }
        if row.ratio > 1.0 {
            overloaded_day_count += 1;
        }
    }

    UtilizationSummary {
        day_count: rows.len(),
        working_day_count,
        peak_date: peak.map(|row| row.date),
        peak_ratio: peak.map(|row| row.ratio).unwrap_or(0.0),
        mean_ratio: if working_day_count > 0 {
            ratio_total / working_day_count as f64
        } else {
            0.0
        },
        overloaded_day_count,
    }
}
