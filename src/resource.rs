use crate::calendar::Calendar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A person, crew, or piece of equipment whose capacity is planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    /// Skill name to proficiency. Carried through, never read by the engines.
    #[serde(default)]
    pub skills: BTreeMap<String, f64>,
    pub calendar: Calendar,
    /// Summed allocation percentage tolerated before a day is reported as overloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel_pct: Option<f64>,
}

impl Resource {
    pub const DEFAULT_MAX_PARALLEL_PCT: f64 = 100.0;

    pub fn new(id: impl Into<String>, name: impl Into<String>, calendar: Calendar) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skills: BTreeMap::new(),
            calendar,
            max_parallel_pct: None,
        }
    }

    pub fn with_skill(mut self, skill: impl Into<String>, proficiency: f64) -> Self {
        self.skills.insert(skill.into(), proficiency);
        self
    }

    pub fn parallel_limit_pct(&self) -> f64 {
        self.max_parallel_pct
            .unwrap_or(Self::DEFAULT_MAX_PARALLEL_PCT)
    }
}
