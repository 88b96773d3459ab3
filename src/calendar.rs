use crate::config::PlannerConfig;
use crate::resource::Resource;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Weekly rule: the resource works `hours` on `weekday`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingDay {
    #[serde(with = "weekday_ordinal")]
    pub weekday: Weekday,
    /// `None` falls back to [`PlannerConfig::hours_per_day_default`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
}

/// Date-specific override of the weekly rule. Zero hours marks a day off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarException {
    pub date: NaiveDate,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub working_days: Vec<WorkingDay>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<CalendarException>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Calendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Same hours on every listed weekday. Duplicate weekdays collapse to one rule.
    pub fn weekly<I>(weekdays: I, hours: f64) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut days: Vec<Weekday> = weekdays.into_iter().collect();
        days.sort_by_key(|wd| wd.num_days_from_monday());
        days.dedup_by(|a, b| a.num_days_from_monday() == b.num_days_from_monday());
        Self {
            working_days: days
                .into_iter()
                .map(|weekday| WorkingDay {
                    weekday,
                    hours: Some(hours),
                })
                .collect(),
            exceptions: Vec::new(),
            timezone: None,
        }
    }

    /// Monday to Friday at `hours` per day.
    pub fn standard_week(hours: f64) -> Self {
        Self::weekly(Self::ALL_WEEKDAYS.into_iter().take(5), hours)
    }

    /// Adds or replaces the override for `date`.
    pub fn set_exception(&mut self, date: NaiveDate, hours: f64) {
        match self.exceptions.iter_mut().find(|ex| ex.date == date) {
            Some(existing) => existing.hours = hours,
            None => self.exceptions.push(CalendarException { date, hours }),
        }
    }

    pub fn exception_for(&self, date: NaiveDate) -> Option<&CalendarException> {
        self.exceptions.iter().find(|ex| ex.date == date)
    }

    pub fn rule_for(&self, weekday: Weekday) -> Option<&WorkingDay> {
        self.working_days.iter().find(|wd| wd.weekday == weekday)
    }

    pub fn hours_on(&self, date: NaiveDate, default_hours: f64) -> f64 {
        if let Some(exception) = self.exception_for(date) {
            return exception.hours;
        }
        match self.rule_for(date.weekday()) {
            Some(rule) => rule.hours.unwrap_or(default_hours),
            None => 0.0,
        }
    }
}

/// Available hours for `resource` on `date`.
///
/// An exception for the exact date wins over the weekly rule, even when it is
/// zero. A weekday without a rule yields zero.
pub fn working_hours(resource: &Resource, date: NaiveDate, config: &PlannerConfig) -> f64 {
    resource
        .calendar
        .hours_on(date, config.hours_per_day_default)
}

/// Sunday-based ordinal (`0 = Sunday`, `6 = Saturday`).
pub fn weekday_to_ordinal(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

pub fn weekday_from_ordinal(ordinal: u8) -> Option<Weekday> {
    match ordinal {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub(crate) mod weekday_ordinal {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(super::weekday_to_ordinal(*weekday))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let ordinal = u8::deserialize(deserializer)?;
        super::weekday_from_ordinal(ordinal).ok_or_else(|| {
            D::Error::custom(format!("weekday ordinal {ordinal} out of range 0..=6"))
        })
    }
}

pub(crate) mod weekday_ordinals {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error, ser::SerializeSeq};

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(days.len()))?;
        for day in days {
            seq.serialize_element(&super::weekday_to_ordinal(*day))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Weekday>, D::Error> {
        let ordinals = Vec::<u8>::deserialize(deserializer)?;
        ordinals
            .into_iter()
            .map(|ordinal| {
                super::weekday_from_ordinal(ordinal).ok_or_else(|| {
                    D::Error::custom(format!("weekday ordinal {ordinal} out of range 0..=6"))
                })
            })
            .collect()
    }
}
