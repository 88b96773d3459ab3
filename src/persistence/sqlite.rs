use super::{PersistenceResult, PlanStore};
use crate::{Assignment, Plan, PlannerConfig, Resource, Task};
use rusqlite::{Connection, OptionalExtension, params};
use serde::de::DeserializeOwned;
use std::sync::Mutex;
use tracing::info;

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS plan_config (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                config_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS resources (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL,
                resource_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL,
                task_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS assignments (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL,
                assignment_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn replace_rows<'a, T, I>(
        tx: &rusqlite::Transaction,
        table: &str,
        json_column: &str,
        rows: I,
    ) -> PersistenceResult<()>
    where
        T: serde::Serialize + 'a,
        I: IntoIterator<Item = (&'a str, &'a T)>,
    {
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {table} (position, id, {json_column}) VALUES (?1, ?2, ?3)"
        ))?;
        for (position, (id, row)) in rows.into_iter().enumerate() {
            let json = serde_json::to_string(row)?;
            stmt.execute(params![position as i64, id, json])?;
        }
        Ok(())
    }

    fn load_rows<T: DeserializeOwned>(
        conn: &Connection,
        table: &str,
        json_column: &str,
    ) -> PersistenceResult<Vec<T>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {json_column} FROM {table} ORDER BY position ASC"
        ))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for json in rows {
            let json = json?;
            out.push(serde_json::from_str(&json)?);
        }
        Ok(out)
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;

        let config_json = serde_json::to_string(plan.config())?;
        tx.execute("DELETE FROM plan_config", [])?;
        tx.execute(
            "INSERT INTO plan_config (id, config_json) VALUES (1, ?1)",
            params![config_json],
        )?;

        Self::replace_rows(
            &tx,
            "resources",
            "resource_json",
            plan.resources().iter().map(|r| (r.id.as_str(), r)),
        )?;
        Self::replace_rows(
            &tx,
            "tasks",
            "task_json",
            plan.tasks().iter().map(|t| (t.id.as_str(), &**t)),
        )?;
        Self::replace_rows(
            &tx,
            "assignments",
            "assignment_json",
            plan.assignments().iter().map(|a| (a.id.as_str(), a)),
        )?;

        tx.commit()?;
        info!(
            resources = plan.resources().len(),
            tasks = plan.tasks().len(),
            assignments = plan.assignments().len(),
            "plan stored in sqlite"
        );
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<Plan>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT config_json FROM plan_config WHERE id = 1")?;
        let config_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(config_json) = config_json_opt else {
            return Ok(None);
        };
        let config: PlannerConfig = serde_json::from_str(&config_json)?;

        let resources: Vec<Resource> = Self::load_rows(&conn, "resources", "resource_json")?;
        let tasks: Vec<Task> = Self::load_rows(&conn, "tasks", "task_json")?;
        let assignments: Vec<Assignment> =
            Self::load_rows(&conn, "assignments", "assignment_json")?;

        let plan = Plan::from_parts(config, resources, tasks, assignments);
        super::validate_plan(&plan)?;
        Ok(Some(plan))
    }
}
