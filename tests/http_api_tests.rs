#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use capacity_planner::{
    DragState, Plan, Task,
    http_api::{self, DragResponse, TaskRow},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(Plan::demo().unwrap());
    http_api::router(state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn health_and_task_listing() {
    let app = new_router();
    let (status, bytes) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "ok");

    let (status, bytes) = send(&app, "GET", "/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows: Vec<TaskRow> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[1].id, "t1.1");
    assert_eq!(rows[1].depth, 1);
    assert_eq!(rows[1].parent_id.as_deref(), Some("t1"));

    let (status, bytes) = send(&app, "GET", "/tasks/t2.1", None).await;
    assert_eq!(status, StatusCode::OK);
    let task: Task = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(task.name, "API");

    let (status, bytes) = send(&app, "GET", "/tasks/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn load_utilization_and_overloads() {
    let app = new_router();
    let (status, bytes) = send(&app, "GET", "/load", None).await;
    assert_eq!(status, StatusCode::OK);
    let load: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(load["r1"]["2025-08-04"]["usedPct"], 10.0);

    let (_, bytes) = send(&app, "GET", "/utilization", None).await;
    let utilization: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(utilization.as_object().map(|o| o.len()), Some(61));
    assert_eq!(utilization["2025-08-23"], 0.0);

    let (_, bytes) = send(&app, "GET", "/overloads", None).await;
    let overloads: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(overloads.as_array().map(Vec::len), Some(5));
    assert_eq!(overloads[0]["resourceId"], "r2");

    let (_, bytes) = send(&app, "GET", "/summary", None).await;
    let summary: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summary["peakDate"], "2025-08-18");
    assert_eq!(summary["overloadedDayCount"], 9);
}

#[tokio::test]
async fn drag_gesture_via_http_api() {
    let app = new_router();

    let (status, _) = send(&app, "POST", "/drag/update", Some(json!({ "days": 1 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/drag/begin",
        Some(json!({ "taskId": "ghost", "mode": "move" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, bytes) = send(
        &app,
        "POST",
        "/drag/begin",
        Some(json!({ "taskId": "t1.1", "mode": "resize-end" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let started: DragResponse = serde_json::from_slice(&bytes).unwrap();
    assert!(started.drag.is_active());

    let (status, _) = send(
        &app,
        "POST",
        "/drag/begin",
        Some(json!({ "taskId": "t1.2", "mode": "move" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, bytes) = send(&app, "POST", "/drag/update", Some(json!({ "days": 100 }))).await;
    assert_eq!(status, StatusCode::OK);
    let updated: DragResponse = serde_json::from_slice(&bytes).unwrap();
    let task = updated.task.expect("task in response");
    assert_eq!((task.start, task.end), (d(2025, 8, 4), d(2025, 10, 1)));
    assert_eq!(updated.drag.active().map(|a| a.applied_delta), Some(33));

    let (status, bytes) = send(&app, "POST", "/drag/end", None).await;
    assert_eq!(status, StatusCode::OK);
    let ended: DragResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(ended.drag, DragState::Idle);

    let (_, bytes) = send(&app, "GET", "/tasks/t1.1", None).await;
    let task: Task = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(task.end, d(2025, 10, 1));
}

#[tokio::test]
async fn replacing_the_plan_validates_and_resets_drag() {
    let app = new_router();
    send(
        &app,
        "POST",
        "/drag/begin",
        Some(json!({ "taskId": "t1.1", "mode": "move" })),
    )
    .await;

    let bad = json!({ "config": { "planStart": "2025-09-01", "planEnd": "2025-08-01" } });
    let (status, bytes) = send(&app, "PUT", "/plan", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["error"], "invalid_request");

    let replacement = json!({
        "config": { "planStart": "2025-08-01", "planEnd": "2025-09-01" },
        "tasks": [ { "id": "solo", "name": "Solo", "start": "2025-08-04", "end": "2025-08-08" } ]
    });
    let (status, _) = send(&app, "PUT", "/plan", Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, bytes) = send(&app, "GET", "/plan", None).await;
    let plan: Plan = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(plan.flattened_tasks().len(), 1);

    // the gesture on the previous plan is gone
    let (status, _) = send(&app, "POST", "/drag/update", Some(json!({ "days": 2 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
