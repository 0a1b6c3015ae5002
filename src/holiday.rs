//! Holiday calendar injected into day annotation.
//!
//! The annotation rules only ask "is there a holiday label for this date in
//! my scope?". Which dates exist is configuration, loaded from JSON or taken
//! from [`HolidayCalendar::legacy`].

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which annotation rules consult a holiday entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayScope {
    /// Educador Voluntário, Vigia 12x36 and contract service staff.
    Standard,
    /// Educador Voluntário 20H.
    Volunteer20h,
    All,
}

impl HolidayScope {
    fn covers(self, asked: HolidayScope) -> bool {
        self == HolidayScope::All || self == asked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    pub day: u32,
    /// None repeats the entry every month.
    #[serde(default)]
    pub month: Option<u32>,
    pub label: String,
    #[serde(default = "default_scope")]
    pub scope: HolidayScope,
}

fn default_scope() -> HolidayScope {
    HolidayScope::All
}

impl Holiday {
    fn matches(&self, date: NaiveDate) -> bool {
        self.day == date.day() && self.month.map_or(true, |m| m == date.month())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    pub holidays: Vec<Holiday>,
}

impl HolidayCalendar {
    /// Calendar with no holidays at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The two fixed dates the timesheets were historically printed with:
    /// day 7 of every month for standard staff and the city anniversary on
    /// 11 October for 20H volunteers.
    pub fn legacy() -> Self {
        Self {
            holidays: vec![
                Holiday {
                    day: 7,
                    month: None,
                    label: "FERIADO".to_string(),
                    scope: HolidayScope::Standard,
                },
                Holiday {
                    day: 11,
                    month: Some(10),
                    label: "FERIADO DIA DA CIDADE".to_string(),
                    scope: HolidayScope::Volunteer20h,
                },
            ],
        }
    }

    /// Parse `{"holidays": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let calendar: HolidayCalendar = serde_json::from_str(json)?;
        Ok(calendar)
    }

    /// Load a JSON calendar from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let calendar = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), holidays = calendar.holidays.len(), "loaded holiday calendar");
        Ok(calendar)
    }

    /// First matching label for the date within the scope.
    pub fn lookup(&self, date: NaiveDate, scope: HolidayScope) -> Option<&str> {
        self.holidays
            .iter()
            .find(|h| h.scope.covers(scope) && h.matches(date))
            .map(|h| h.label.as_str())
    }
}
