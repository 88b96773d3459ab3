use crate::allocation::Assignment;
use crate::config::PlannerConfig;
use crate::days::expand_days;
use crate::load::{self, Overload, ResourceLoad, UtilizationSummary};
use crate::resource::Resource;
use crate::task::{self, Task};
use crate::transform::{DragMode, DragState};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

const DEMO_PLAN_JSON: &str = include_str!("../demos/demo_plan.json");

/// Root of ownership for one schedulable unit.
///
/// Entities refer to each other by id only. Every mutation returns a new `Plan`
/// that shares untouched data with the old one, so a `Plan` can be read from
/// several places while a gesture produces its successor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    config: PlannerConfig,
    #[serde(default)]
    resources: Arc<Vec<Resource>>,
    #[serde(default)]
    tasks: Vec<Arc<Task>>,
    #[serde(default)]
    assignments: Arc<Vec<Assignment>>,
}

impl Default for Plan {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl Plan {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            resources: Arc::new(Vec::new()),
            tasks: Vec::new(),
            assignments: Arc::new(Vec::new()),
        }
    }

    /// Two projects staffed by two people over August and September 2025.
    pub fn demo() -> Result<Self, serde_json::Error> {
        serde_json::from_str(DEMO_PLAN_JSON)
    }

    pub fn from_parts(
        config: PlannerConfig,
        resources: Vec<Resource>,
        tasks: Vec<Task>,
        assignments: Vec<Assignment>,
    ) -> Self {
        Self {
            config,
            resources: Arc::new(resources),
            tasks: tasks.into_iter().map(Arc::new).collect(),
            assignments: Arc::new(assignments),
        }
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        Arc::make_mut(&mut self.resources).push(resource);
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(Arc::new(task));
        self
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        Arc::make_mut(&mut self.assignments).push(assignment);
        self
    }

    /// Same resources and assignments, different task forest.
    pub fn with_tasks(&self, tasks: Vec<Arc<Task>>) -> Self {
        Self {
            config: self.config.clone(),
            resources: Arc::clone(&self.resources),
            tasks,
            assignments: Arc::clone(&self.assignments),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan_start(&self) -> NaiveDate {
        self.config.plan_start
    }

    pub fn plan_end(&self) -> NaiveDate {
        self.config.plan_end
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn tasks(&self) -> &[Arc<Task>] {
        &self.tasks
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn day_index(&self) -> Vec<NaiveDate> {
        expand_days(&self.config)
    }

    /// Id lookup table, built once per aggregation pass.
    pub fn resource_index(&self) -> HashMap<&str, &Resource> {
        self.resources
            .iter()
            .map(|resource| (resource.id.as_str(), resource))
            .collect()
    }

    pub fn find_resource(&self, resource_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == resource_id)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        task::find_task(&self.tasks, task_id)
    }

    pub fn find_assignment(&self, assignment_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == assignment_id)
    }

    pub fn flattened_tasks(&self) -> Vec<(usize, &Task)> {
        task::flatten_tasks(&self.tasks)
    }

    /// New plan with the fragments of `assignment_id` normalized, or `None` if
    /// the assignment is unknown.
    pub fn normalize_assignment(&self, assignment_id: &str) -> Option<Self> {
        let idx = self.assignments.iter().position(|a| a.id == assignment_id)?;
        let mut next = self.clone();
        let assignments = Arc::make_mut(&mut next.assignments);
        assignments[idx] = assignments[idx].normalized();
        Some(next)
    }

    pub fn resource_load(&self) -> BTreeMap<String, ResourceLoad> {
        load::aggregate_resource_load(self)
    }

    pub fn daily_utilization(&self) -> BTreeMap<NaiveDate, f64> {
        load::compute_daily_utilization(self)
    }

    pub fn overloads(&self) -> Vec<Overload> {
        load::overloaded_days(self)
    }

    pub fn summary(&self) -> UtilizationSummary {
        load::summarize(self)
    }

    /// Clamped one-shot move; equivalent to a complete move gesture.
    pub fn move_task_by_days(&self, task_id: &str, days: i64) -> Self {
        self.apply_gesture(task_id, DragMode::Move, days)
    }

    /// Clamped one-shot resize of the start (`DragMode::ResizeStart`) or end edge.
    pub fn resize_task_edge(&self, task_id: &str, mode: DragMode, days: i64) -> Self {
        self.apply_gesture(task_id, mode, days)
    }

    fn apply_gesture(&self, task_id: &str, mode: DragMode, days: i64) -> Self {
        let (_, next) = DragState::Idle
            .begin(self, task_id, mode)
            .update(self, days);
        next
    }
}
