//! Clamped move/resize of a single task during a drag gesture.
//!
//! The gesture is an explicit [`DragState`] value threaded through each call.
//! Requests carry the cumulative day delta since the gesture began; the state
//! remembers how much of it was actually applied, so a request that hits a
//! bound is clipped and later requests continue from the applied position
//! instead of jumping.

use crate::config::PlannerConfig;
use crate::days::{add_days, days_between};
use crate::plan::Plan;
use crate::task::{Task, update_task};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

impl DragMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DragMode::Move => "move",
            DragMode::ResizeStart => "resize-start",
            DragMode::ResizeEnd => "resize-end",
        }
    }
}

impl fmt::Display for DragMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DragMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "move" => Ok(DragMode::Move),
            "resize-start" | "resize_start" | "start" => Ok(DragMode::ResizeStart),
            "resize-end" | "resize_end" | "end" => Ok(DragMode::ResizeEnd),
            other => Err(format!("unknown drag mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDrag {
    pub task_id: String,
    pub mode: DragMode,
    /// Signed whole days already committed to the task since `begin`.
    pub applied_delta: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Active(ActiveDrag),
}

impl DragState {
    /// Starts a gesture on `task_id`.
    ///
    /// Unknown tasks and an already active gesture leave the state unchanged.
    pub fn begin(self, plan: &Plan, task_id: &str, mode: DragMode) -> DragState {
        match self {
            DragState::Idle if plan.find_task(task_id).is_some() => {
                DragState::Active(ActiveDrag {
                    task_id: task_id.to_string(),
                    mode,
                    applied_delta: 0,
                })
            }
            DragState::Idle => {
                debug!(task = task_id, "drag begin ignored: unknown task");
                DragState::Idle
            }
            active => {
                debug!(task = task_id, "drag begin ignored: gesture already active");
                active
            }
        }
    }

    /// Moves the task toward `desired_cumulative_days` from its position at `begin`.
    ///
    /// Returns the next state together with the resulting plan. The plan is
    /// returned unchanged when idle, when nothing is left to apply, or when the
    /// bounds leave no room in the requested direction.
    pub fn update(self, plan: &Plan, desired_cumulative_days: i64) -> (DragState, Plan) {
        let mut drag = match self {
            DragState::Active(drag) => drag,
            DragState::Idle => return (DragState::Idle, plan.clone()),
        };

        let step = desired_cumulative_days - drag.applied_delta;
        if step == 0 {
            return (DragState::Active(drag), plan.clone());
        }

        let Some(task) = plan.find_task(&drag.task_id) else {
            debug!(task = %drag.task_id, "drag update ignored: task no longer in plan");
            return (DragState::Active(drag), plan.clone());
        };

        let clamped = clamp_step(task, plan.config(), drag.mode, step);
        if clamped != step {
            debug!(
                task = %drag.task_id,
                mode = %drag.mode,
                requested = step,
                applied = clamped,
                "drag step clamped"
            );
        }
        if clamped == 0 {
            return (DragState::Active(drag), plan.clone());
        }

        let mode = drag.mode;
        let Some(tasks) = update_task(plan.tasks(), &drag.task_id, |task| {
            apply_step(task, mode, clamped)
        }) else {
            return (DragState::Active(drag), plan.clone());
        };

        drag.applied_delta += clamped;
        (DragState::Active(drag), plan.with_tasks(tasks))
    }

    /// Finishes the gesture. Dates already applied stay in the plan.
    pub fn end(self) -> DragState {
        DragState::Idle
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DragState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        match self {
            DragState::Active(drag) => Some(drag),
            DragState::Idle => None,
        }
    }
}

/// Largest part of `step` that keeps `task` inside the plan and at least one day long.
pub fn clamp_step(task: &Task, config: &PlannerConfig, mode: DragMode, step: i64) -> i64 {
    let width = task.duration_days();
    let room_left = -days_between(config.plan_start, task.start);
    let room_right = days_between(task.end, config.plan_end);

    let (max_left, max_right) = match mode {
        DragMode::Move => (room_left, room_right),
        DragMode::ResizeStart => (room_left, width - 1),
        DragMode::ResizeEnd => (-(width - 1), room_right),
    };
    step.min(max_right).max(max_left)
}

fn apply_step(task: &mut Task, mode: DragMode, step: i64) {
    match mode {
        DragMode::Move => {
            task.start = add_days(task.start, step);
            task.end = add_days(task.end, step);
        }
        DragMode::ResizeStart => task.start = add_days(task.start, step),
        DragMode::ResizeEnd => task.end = add_days(task.end, step),
    }
}
