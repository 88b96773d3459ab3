//! Upstream checks for plans coming from outside the process.
//!
//! The engines never call into this module; they stay total over whatever
//! they are given. Loaders and the HTTP API use it to reject malformed input.

use crate::plan::Plan;
use crate::task::flatten_tasks;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanValidationError {
    #[error("plan start {start} must be before plan end {end}")]
    PlanWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("hoursPerDayDefault must be a positive number (got {0})")]
    DefaultHours(f64),
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{kind} {id} has start {start} not before end {end}")]
    EmptyInterval {
        kind: &'static str,
        id: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    #[error("assignment {assignment} fragment #{index} has non-finite percentage")]
    FragmentPercent { assignment: String, index: usize },
    #[error("resource {resource} calendar {detail}")]
    Calendar { resource: String, detail: String },
}

fn valid_hours(hours: f64) -> bool {
    hours.is_finite() && hours >= 0.0
}

pub fn validate_plan(plan: &Plan) -> Result<(), PlanValidationError> {
    let config = plan.config();
    if config.plan_start >= config.plan_end {
        return Err(PlanValidationError::PlanWindow {
            start: config.plan_start,
            end: config.plan_end,
        });
    }
    if !config.hours_per_day_default.is_finite() || config.hours_per_day_default <= 0.0 {
        return Err(PlanValidationError::DefaultHours(config.hours_per_day_default));
    }

    let mut resource_ids = HashSet::with_capacity(plan.resources().len());
    for resource in plan.resources() {
        if !resource_ids.insert(resource.id.as_str()) {
            return Err(PlanValidationError::DuplicateId {
                kind: "resource",
                id: resource.id.clone(),
            });
        }
        let mut weekdays = HashSet::new();
        for rule in &resource.calendar.working_days {
            if !weekdays.insert(rule.weekday) {
                return Err(PlanValidationError::Calendar {
                    resource: resource.id.clone(),
                    detail: format!("has more than one rule for {}", rule.weekday),
                });
            }
            if let Some(hours) = rule.hours {
                if !valid_hours(hours) {
                    return Err(PlanValidationError::Calendar {
                        resource: resource.id.clone(),
                        detail: format!("has invalid hours {hours} on {}", rule.weekday),
                    });
                }
            }
        }
        let mut exception_dates = HashSet::new();
        for exception in &resource.calendar.exceptions {
            if !exception_dates.insert(exception.date) {
                return Err(PlanValidationError::Calendar {
                    resource: resource.id.clone(),
                    detail: format!("has more than one exception for {}", exception.date),
                });
            }
            if !valid_hours(exception.hours) {
                return Err(PlanValidationError::Calendar {
                    resource: resource.id.clone(),
                    detail: format!(
                        "has invalid exception hours {} on {}",
                        exception.hours, exception.date
                    ),
                });
            }
        }
    }

    let mut task_ids = HashSet::new();
    for (_, task) in flatten_tasks(plan.tasks()) {
        if !task_ids.insert(task.id.as_str()) {
            return Err(PlanValidationError::DuplicateId {
                kind: "task",
                id: task.id.clone(),
            });
        }
        if task.start >= task.end {
            return Err(PlanValidationError::EmptyInterval {
                kind: "task",
                id: task.id.clone(),
                start: task.start,
                end: task.end,
            });
        }
    }

    let mut assignment_ids = HashSet::with_capacity(plan.assignments().len());
    for assignment in plan.assignments() {
        if !assignment_ids.insert(assignment.id.as_str()) {
            return Err(PlanValidationError::DuplicateId {
                kind: "assignment",
                id: assignment.id.clone(),
            });
        }
        if assignment.start >= assignment.end {
            return Err(PlanValidationError::EmptyInterval {
                kind: "assignment",
                id: assignment.id.clone(),
                start: assignment.start,
                end: assignment.end,
            });
        }
        for (index, fragment) in assignment.fragments.iter().enumerate() {
            if fragment.start >= fragment.end {
                return Err(PlanValidationError::EmptyInterval {
                    kind: "fragment",
                    id: format!("{}#{index}", assignment.id),
                    start: fragment.start,
                    end: fragment.end,
                });
            }
            if !fragment.pct.is_finite() {
                return Err(PlanValidationError::FragmentPercent {
                    assignment: assignment.id.clone(),
                    index,
                });
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Resource,
    Task,
}

/// An assignment pointing at an id the plan does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceMiss {
    pub assignment_id: String,
    pub kind: ReferenceKind,
    pub missing_id: String,
}

/// Dangling references, in assignment order. Aggregation skips these silently.
pub fn reference_misses(plan: &Plan) -> Vec<ReferenceMiss> {
    let mut misses = Vec::new();
    for assignment in plan.assignments() {
        if plan.find_resource(&assignment.resource_id).is_none() {
            misses.push(ReferenceMiss {
                assignment_id: assignment.id.clone(),
                kind: ReferenceKind::Resource,
                missing_id: assignment.resource_id.clone(),
            });
        }
        if plan.find_task(&assignment.task_id).is_none() {
            misses.push(ReferenceMiss {
                assignment_id: assignment.id.clone(),
                kind: ReferenceKind::Task,
                missing_id: assignment.task_id.clone(),
            });
        }
    }
    for miss in &misses {
        warn!(
            assignment = %miss.assignment_id,
            missing = %miss.missing_id,
            kind = ?miss.kind,
            "assignment references unknown id"
        );
    }
    misses
}
