pub mod allocation;
pub mod calendar;
pub mod config;
pub mod days;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod load;
pub mod persistence;
pub mod plan;
pub mod resource;
pub mod task;
pub mod transform;
pub mod validation;

pub use allocation::{AllocationFragment, Assignment, normalize, percent_at};
pub use calendar::{Calendar, CalendarException, WorkingDay, working_hours};
pub use config::PlannerConfig;
pub use days::{MonthSpan, add_days, day_position, days_between, expand_days, month_spans};
pub use load::{
    LoadCell, Overload, ResourceLoad, UtilizationRow, UtilizationSummary,
    aggregate_resource_load, compute_daily_utilization, overloaded_days,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    PersistenceError, PlanStore, export_resource_load_csv, export_utilization_csv,
    load_plan_from_json, save_plan_to_json,
};
pub use plan::Plan;
pub use resource::Resource;
pub use task::{Task, TaskStatus};
pub use transform::{ActiveDrag, DragMode, DragState, clamp_step};
pub use validation::{PlanValidationError, ReferenceMiss, reference_misses, validate_plan};
