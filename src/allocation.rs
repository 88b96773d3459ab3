use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Allocation percentage over `[start, end)`.
///
/// Values above 100 mean over-committed staffing and are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationFragment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub pct: f64,
}

impl AllocationFragment {
    pub fn new(start: NaiveDate, end: NaiveDate, pct: f64) -> Self {
        Self { start, end, pct }
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// Staffing of one task by one resource.
///
/// Fragments need not cover the whole `[start, end)` envelope; uncovered days
/// carry no load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub task_id: String,
    pub resource_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub fragments: Vec<AllocationFragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Assignment {
    pub fn new(
        id: impl Into<String>,
        task_id: impl Into<String>,
        resource_id: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            resource_id: resource_id.into(),
            start,
            end,
            fragments: Vec::new(),
            role: None,
        }
    }

    pub fn with_fragment(mut self, start: NaiveDate, end: NaiveDate, pct: f64) -> Self {
        self.fragments.push(AllocationFragment::new(start, end, pct));
        self
    }

    #[inline]
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn percent_at(&self, date: NaiveDate) -> f64 {
        percent_at(&self.fragments, date)
    }

    /// Copy of this assignment with its fragments passed through [`normalize`].
    pub fn normalized(&self) -> Self {
        Self {
            fragments: normalize(&self.fragments),
            ..self.clone()
        }
    }
}

/// Percentage of the first fragment, in declared order, whose interval holds `date`.
///
/// Overlapping fragments are not summed: the earlier entry wins. Returns 0 when
/// nothing matches.
pub fn percent_at(fragments: &[AllocationFragment], date: NaiveDate) -> f64 {
    fragments
        .iter()
        .find(|fragment| fragment.contains(date))
        .map(|fragment| fragment.pct)
        .unwrap_or(0.0)
}

/// Sorts by start (stable) and merges touching neighbours with equal percentages.
///
/// Gaps, differing percentages and overlaps are left as separate entries.
pub fn normalize(fragments: &[AllocationFragment]) -> Vec<AllocationFragment> {
    let mut sorted = fragments.to_vec();
    sorted.sort_by_key(|fragment| fragment.start);

    let mut out: Vec<AllocationFragment> = Vec::with_capacity(sorted.len());
    for fragment in sorted {
        match out.last_mut() {
            Some(last) if last.end == fragment.start && last.pct == fragment.pct => {
                last.end = fragment.end;
            }
            _ => out.push(fragment),
        }
    }
    out
}
