use crate::days::days_between;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Planned,
    InProgress,
    Done,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Planned => "planned",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
        }
    }
}

/// Node of the task forest. `end` is exclusive.
///
/// Children are shared behind `Arc` so that rebuilding one branch leaves
/// sibling subtrees untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            start,
            end,
            effort_hours: None,
            children: Vec::new(),
            status: None,
        }
    }

    /// Appends `child`, pointing its `parent_id` at this task.
    pub fn with_child(mut self, mut child: Task) -> Self {
        child.parent_id = Some(self.id.clone());
        self.children.push(Arc::new(child));
        self
    }

    pub fn with_effort_hours(mut self, hours: f64) -> Self {
        self.effort_hours = Some(hours);
        self
    }

    pub fn duration_days(&self) -> i64 {
        days_between(self.start, self.end)
    }
}

/// Depth-first, pre-order search for `id`.
pub fn find_task<'a>(tasks: &'a [Arc<Task>], id: &str) -> Option<&'a Task> {
    for task in tasks {
        if task.id == id {
            return Some(task);
        }
        if let Some(hit) = find_task(&task.children, id) {
            return Some(hit);
        }
    }
    None
}

/// Pre-order listing of the forest with each node's depth (roots are 0).
pub fn flatten_tasks(tasks: &[Arc<Task>]) -> Vec<(usize, &Task)> {
    fn walk<'a>(tasks: &'a [Arc<Task>], depth: usize, out: &mut Vec<(usize, &'a Task)>) {
        for task in tasks {
            out.push((depth, task.as_ref()));
            walk(&task.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(tasks, 0, &mut out);
    out
}

/// Returns a new forest with the first pre-order node named `id` replaced by
/// `mutate(copy)`.
///
/// Only the ancestors of that node are rebuilt; every other subtree is shared
/// with `tasks`. `None` when no node matches.
pub fn update_task<F>(tasks: &[Arc<Task>], id: &str, mutate: F) -> Option<Vec<Arc<Task>>>
where
    F: FnOnce(&mut Task),
{
    rebuild(tasks, id, mutate).ok()
}

fn rebuild<F>(tasks: &[Arc<Task>], id: &str, mut mutate: F) -> Result<Vec<Arc<Task>>, F>
where
    F: FnOnce(&mut Task),
{
    for (idx, node) in tasks.iter().enumerate() {
        if node.id == id {
            let mut copy = Task::clone(node);
            mutate(&mut copy);
            let mut out = tasks.to_vec();
            out[idx] = Arc::new(copy);
            return Ok(out);
        }
        if node.children.is_empty() {
            continue;
        }
        match rebuild(&node.children, id, mutate) {
            Ok(children) => {
                let mut out = tasks.to_vec();
                out[idx] = Arc::new(Task {
                    children,
                    ..Task::clone(node)
                });
                return Ok(out);
            }
            Err(unused) => mutate = unused,
        }
    }
    Err(mutate)
}
