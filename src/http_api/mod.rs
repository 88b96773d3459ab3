use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    DragMode, DragState, Overload, Plan, ResourceLoad, Task, UtilizationSummary, validate_plan,
};

/// The plan being edited and the gesture currently in flight, if any.
struct Session {
    plan: Plan,
    drag: DragState,
}

#[derive(Clone)]
pub struct AppState {
    session: Arc<RwLock<Session>>,
}

impl AppState {
    pub fn new(plan: Plan) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session {
                plan,
                drag: DragState::Idle,
            })),
        }
    }

    /// Snapshot of the current plan.
    pub fn plan(&self) -> Plan {
        self.session.read().plan.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub id: String,
    pub name: String,
    pub depth: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BeginPayload {
    task_id: String,
    mode: DragMode,
}

#[derive(Debug, Deserialize)]
struct UpdatePayload {
    days: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DragResponse {
    pub drag: DragState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", get(get_plan).put(replace_plan))
        .route("/tasks", get(list_tasks))
        .route("/tasks/:id", get(get_task))
        .route("/load", get(get_load))
        .route("/utilization", get(get_utilization))
        .route("/overloads", get(get_overloads))
        .route("/summary", get(get_summary))
        .route("/drag/begin", post(drag_begin))
        .route("/drag/update", post(drag_update))
        .route("/drag/end", post(drag_end))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, plan: Plan) -> std::io::Result<()> {
    let app = router(AppState::new(plan));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "capacity planner HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_plan(State(state): State<AppState>) -> Json<Plan> {
    Json(state.plan())
}

async fn replace_plan(
    State(state): State<AppState>,
    Json(plan): Json<Plan>,
) -> Result<Json<Plan>, ApiError> {
    validate_plan(&plan).map_err(|err| ApiError::invalid(err.to_string()))?;
    {
        let mut session = state.session.write();
        session.plan = plan.clone();
        session.drag = DragState::Idle;
    }
    info!(tasks = plan.flattened_tasks().len(), "plan replaced");
    Ok(Json(plan))
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<TaskRow>> {
    let plan = state.plan();
    let rows = plan
        .flattened_tasks()
        .into_iter()
        .map(|(depth, task)| TaskRow {
            id: task.id.clone(),
            name: task.name.clone(),
            depth,
            start: task.start,
            end: task.end,
            parent_id: task.parent_id.clone(),
        })
        .collect();
    Json(rows)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let plan = state.plan();
    match plan.find_task(&task_id) {
        Some(task) => Ok(Json(task.clone())),
        None => Err(ApiError::not_found(format!("task {task_id} not found"))),
    }
}

async fn get_load(State(state): State<AppState>) -> Json<BTreeMap<String, ResourceLoad>> {
    Json(state.plan().resource_load())
}

async fn get_utilization(State(state): State<AppState>) -> Json<BTreeMap<NaiveDate, f64>> {
    Json(state.plan().daily_utilization())
}

async fn get_overloads(State(state): State<AppState>) -> Json<Vec<Overload>> {
    Json(state.plan().overloads())
}

async fn get_summary(State(state): State<AppState>) -> Json<UtilizationSummary> {
    Json(state.plan().summary())
}

async fn drag_begin(
    State(state): State<AppState>,
    Json(payload): Json<BeginPayload>,
) -> Result<Json<DragResponse>, ApiError> {
    let mut session = state.session.write();
    if session.drag.is_active() {
        return Err(ApiError::conflict("a drag gesture is already active"));
    }
    let Some(task) = session.plan.find_task(&payload.task_id).cloned() else {
        return Err(ApiError::not_found(format!(
            "task {} not found",
            payload.task_id
        )));
    };
    let drag =
        std::mem::take(&mut session.drag).begin(&session.plan, &payload.task_id, payload.mode);
    session.drag = drag.clone();
    Ok(Json(DragResponse {
        drag,
        task: Some(task),
    }))
}

async fn drag_update(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePayload>,
) -> Result<Json<DragResponse>, ApiError> {
    let mut session = state.session.write();
    let Some(task_id) = session.drag.active().map(|drag| drag.task_id.clone()) else {
        return Err(ApiError::conflict("no drag gesture is active"));
    };
    let (drag, plan) = std::mem::take(&mut session.drag).update(&session.plan, payload.days);
    let task = plan.find_task(&task_id).cloned();
    session.plan = plan;
    session.drag = drag.clone();
    Ok(Json(DragResponse { drag, task }))
}

async fn drag_end(State(state): State<AppState>) -> Json<DragResponse> {
    let mut session = state.session.write();
    let task = session
        .drag
        .active()
        .and_then(|drag| session.plan.find_task(&drag.task_id).cloned());
    session.drag = std::mem::take(&mut session.drag).end();
    Json(DragResponse {
        drag: session.drag.clone(),
        task,
    })
}
