use super::PersistenceResult;
use crate::Plan;
use crate::load::utilization_rows;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::info;

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    super::validate_plan(plan)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, plan)?;
    info!(path = %path.as_ref().display(), "plan saved");
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Plan> {
    let file = File::open(path.as_ref())?;
    let plan: Plan = serde_json::from_reader(file)?;
    super::validate_plan(&plan)?;
    info!(
        path = %path.as_ref().display(),
        tasks = plan.flattened_tasks().len(),
        assignments = plan.assignments().len(),
        "plan loaded"
    );
    Ok(plan)
}

#[derive(Serialize)]
struct ResourceLoadCsvRecord<'a> {
    resource_id: &'a str,
    date: String,
    used_hours: f64,
    used_pct: f64,
}

#[derive(Serialize)]
struct UtilizationCsvRecord {
    date: String,
    capacity_hours: f64,
    used_hours: f64,
    ratio: f64,
}

/// Writes `resource_id,date,used_hours,used_pct`, sorted by resource then date.
pub fn export_resource_load_csv<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let load = plan.resource_load();
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for (resource_id, cells) in &load {
        for (date, cell) in cells {
            writer.serialize(ResourceLoadCsvRecord {
                resource_id,
                date: date.to_string(),
                used_hours: cell.used_hours,
                used_pct: cell.used_pct,
            })?;
        }
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), resources = load.len(), "resource load exported");
    Ok(())
}

/// Writes `date,capacity_hours,used_hours,ratio` for every plan day.
pub fn export_utilization_csv<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let rows = utilization_rows(plan);
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for row in &rows {
        writer.serialize(UtilizationCsvRecord {
            date: row.date.to_string(),
            capacity_hours: row.capacity_hours,
            used_hours: row.used_hours,
            ratio: row.ratio,
        })?;
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), days = rows.len(), "utilization exported");
    Ok(())
}
