use crate::Plan;
use crate::validation::{self, PlanValidationError};
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<PlanValidationError> for PersistenceError {
    fn from(value: PlanValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait PlanStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<Plan>>;
}

pub fn validate_plan(plan: &Plan) -> PersistenceResult<()> {
    validation::validate_plan(plan)?;
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    export_resource_load_csv, export_utilization_csv, load_plan_from_json, save_plan_to_json,
};
