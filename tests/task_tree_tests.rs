use capacity_planner::task::{find_task, flatten_tasks, update_task};
use capacity_planner::{Plan, Task, TaskStatus};
use chrono::NaiveDate;
use std::sync::Arc;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn forest() -> Vec<Arc<Task>> {
    let alpha = Task::new("p", "Parent", d(2025, 8, 4), d(2025, 9, 12))
        .with_child(
            Task::new("c1", "Child one", d(2025, 8, 4), d(2025, 8, 20)).with_child(Task::new(
                "g1",
                "Grandchild",
                d(2025, 8, 5),
                d(2025, 8, 8),
            )),
        )
        .with_child(Task::new("c2", "Child two", d(2025, 8, 20), d(2025, 9, 12)));
    let beta = Task::new("q", "Other root", d(2025, 9, 1), d(2025, 9, 5));
    vec![Arc::new(alpha), Arc::new(beta)]
}

#[test]
fn with_child_links_parent_id() {
    let tasks = forest();
    assert_eq!(tasks[0].children[0].parent_id.as_deref(), Some("p"));
    assert_eq!(
        tasks[0].children[0].children[0].parent_id.as_deref(),
        Some("c1")
    );
    assert_eq!(tasks[0].parent_id, None);
}

#[test]
fn find_task_searches_depth_first() {
    let tasks = forest();
    assert_eq!(find_task(&tasks, "g1").map(|t| t.name.as_str()), Some("Grandchild"));
    assert_eq!(find_task(&tasks, "q").map(|t| t.duration_days()), Some(4));
    assert!(find_task(&tasks, "missing").is_none());
    assert!(find_task(&[], "p").is_none());
}

#[test]
fn flatten_lists_pre_order_with_depth() {
    let tasks = forest();
    let flat: Vec<(usize, &str)> = flatten_tasks(&tasks)
        .into_iter()
        .map(|(depth, t)| (depth, t.id.as_str()))
        .collect();
    assert_eq!(
        flat,
        vec![(0, "p"), (1, "c1"), (2, "g1"), (1, "c2"), (0, "q")]
    );
}

#[test]
fn update_task_rebuilds_only_the_ancestor_chain() {
    let tasks = forest();
    let updated = update_task(&tasks, "g1", |t| t.status = Some(TaskStatus::Done))
        .expect("g1 exists");

    assert_eq!(
        find_task(&updated, "g1").and_then(|t| t.status),
        Some(TaskStatus::Done)
    );
    assert_eq!(find_task(&tasks, "g1").and_then(|t| t.status), None);

    assert!(!Arc::ptr_eq(&tasks[0], &updated[0]));
    assert!(!Arc::ptr_eq(&tasks[0].children[0], &updated[0].children[0]));
    assert!(Arc::ptr_eq(&tasks[0].children[1], &updated[0].children[1]));
    assert!(Arc::ptr_eq(&tasks[1], &updated[1]));
}

#[test]
fn update_task_on_missing_id_returns_none() {
    let tasks = forest();
    let mut called = false;
    assert!(update_task(&tasks, "zzz", |_| called = true).is_none());
    assert!(!called);
}

#[test]
fn update_task_touches_first_match_only() {
    let tasks = vec![
        Arc::new(Task::new("dup", "First", d(2025, 8, 4), d(2025, 8, 5))),
        Arc::new(Task::new("dup", "Second", d(2025, 8, 6), d(2025, 8, 7))),
    ];
    let updated = update_task(&tasks, "dup", |t| t.name = "Renamed".into()).unwrap();
    assert_eq!(updated[0].name, "Renamed");
    assert_eq!(updated[1].name, "Second");
}

#[test]
fn task_json_uses_camel_case_and_omits_empty_fields() {
    let task = Task::new("t", "Task", d(2025, 8, 4), d(2025, 8, 8)).with_effort_hours(12.0);
    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["effortHours"], 12.0);
    assert_eq!(json["start"], "2025-08-04");
    assert!(json.get("children").is_none());
    assert!(json.get("parentId").is_none());

    let parsed: Task = serde_json::from_str(
        r#"{"id":"x","name":"X","start":"2025-08-04","end":"2025-08-06","status":"in_progress"}"#,
    )
    .unwrap();
    assert_eq!(parsed.status, Some(TaskStatus::InProgress));
    assert!(parsed.children.is_empty());
}

#[test]
fn demo_plan_tree_shape() {
    let plan = Plan::demo().unwrap();
    let ids: Vec<&str> = plan
        .flattened_tasks()
        .into_iter()
        .map(|(_, t)| t.id.as_str())
        .collect();
    assert_eq!(ids, vec!["t1", "t1.1", "t1.2", "t2", "t2.1", "t2.2"]);
    assert_eq!(plan.find_task("t1.2").map(|t| t.effort_hours), Some(Some(96.0)));
    let statuses: Vec<&str> = plan
        .flattened_tasks()
        .into_iter()
        .filter_map(|(_, t)| t.status.map(|s| s.as_str()))
        .collect();
    assert_eq!(statuses, vec!["in_progress", "planned"]);
}
