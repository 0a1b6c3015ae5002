use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::hours::{calculate_hours, format_hours};
use crate::month::month_name_portuguese;

/// Cargo (formal job title)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum Role {
    #[serde(rename = "ASG")]
    #[strum(to_string = "ASG")]
    Asg,
    #[serde(rename = "Merendeira")]
    #[strum(to_string = "Merendeira")]
    Merendeira,
    #[serde(rename = "Vigia")]
    #[strum(to_string = "Vigia")]
    Vigia,
    #[serde(rename = "Secretário(a)")]
    #[strum(to_string = "Secretário(a)")]
    Secretario,
    #[serde(rename = "Professor")]
    #[strum(to_string = "Professor")]
    Professor,
    #[serde(rename = "Professor Fundamental II")]
    #[strum(to_string = "Professor Fundamental II")]
    ProfessorFundamentalII,
    #[serde(rename = "Assistente Social")]
    #[strum(to_string = "Assistente Social")]
    AssistenteSocial,
    #[serde(rename = "Psicólogo(a)")]
    #[strum(to_string = "Psicólogo(a)")]
    Psicologo,
    #[serde(rename = "Gestor(a)")]
    #[strum(to_string = "Gestor(a)")]
    Gestor,
    #[serde(rename = "Educador Voluntário")]
    #[strum(to_string = "Educador Voluntário")]
    EducadorVoluntario,
    #[serde(rename = "Supervisor(a)")]
    #[strum(to_string = "Supervisor(a)")]
    Supervisor,
    #[serde(rename = "Nutricionista")]
    #[strum(to_string = "Nutricionista")]
    Nutricionista,
}

/// Vínculo (employment relationship)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum Bond {
    #[serde(rename = "Efetivo")]
    #[strum(to_string = "Efetivo")]
    Efetivo,
    #[serde(rename = "Contrato")]
    #[strum(to_string = "Contrato")]
    Contrato,
    #[serde(rename = "Terceirizado(a)")]
    #[strum(to_string = "Terceirizado(a)")]
    Terceirizado,
    #[serde(rename = "Educador Voluntário")]
    #[strum(to_string = "Educador Voluntário")]
    EducadorVoluntario,
    #[serde(rename = "Prestador(a) de Serviços")]
    #[strum(to_string = "Prestador(a) de Serviços")]
    PrestadorServicos,
    #[serde(rename = "Educador Voluntário 20H")]
    #[strum(to_string = "Educador Voluntário 20H")]
    EducadorVoluntario20h,
}

/// Turno
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum Shift {
    #[serde(rename = "Manhã")]
    #[strum(to_string = "Manhã")]
    Manha,
    #[serde(rename = "Tarde")]
    #[strum(to_string = "Tarde")]
    Tarde,
    #[serde(rename = "Noite")]
    #[strum(to_string = "Noite")]
    Noite,
}

/// PDF layout chosen per employee. Carries no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum TemplateVariant {
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

/// Funcionário
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    /// Owning account; every store query is scoped by it.
    #[serde(default)]
    pub account_id: String,
    pub name: String,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(rename = "employee_type")]
    pub role: Role,
    #[serde(rename = "vinculo")]
    pub bond: Bond,
    /// Free-text Função. Only ever matched after normalization.
    #[serde(rename = "function")]
    pub job_function: String,
    #[serde(default, with = "weekday_names")]
    pub work_days: Vec<Weekday>,
    #[serde(default)]
    pub shift: Vec<Shift>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub discipline: Option<String>,
    #[serde(default)]
    pub weekly_hours: Option<f64>,
}

impl Employee {
    /// Whether the weekday is one of the configured work days.
    pub fn works_on(&self, weekday: Weekday) -> bool {
        self.work_days.contains(&weekday)
    }

    pub fn has_shift(&self, shift: Shift) -> bool {
        self.shift.contains(&shift)
    }

    /// "Nome (matrícula) - escola" as listed in employee pickers.
    pub fn display_label(&self) -> String {
        format!(
            "{} ({}) - {}",
            self.name,
            self.registration_number.as_deref().unwrap_or("N/A"),
            self.school_name.as_deref().unwrap_or("N/A")
        )
    }
}

/// work_days travel as English weekday names ("Monday").
mod weekday_names {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::month::{parse_weekday_english, weekday_english};

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(days.iter().map(|d| weekday_english(*d)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Weekday>, D::Error> {
        let names: Option<Vec<String>> = Option::deserialize(deserializer)?;
        let mut days = Vec::new();
        for name in names.unwrap_or_default() {
            match parse_weekday_english(&name) {
                Some(day) if !days.contains(&day) => days.push(day),
                Some(_) => {}
                None => tracing::warn!(work_day = %name, "ignoring unknown work day name"),
            }
        }
        Ok(days)
    }
}

/// One row of the timesheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(rename = "record_date")]
    pub date: NaiveDate,
    pub entry_time_1: Option<String>,
    pub exit_time_1: Option<String>,
    pub entry_time_2: Option<String>,
    pub exit_time_2: Option<String>,
    pub total_hours_worked: f64,
    #[serde(rename = "notes")]
    pub note: Option<String>,
    /// Punch fields are disabled for manual entry on this day.
    #[serde(default)]
    pub block_time_entry: bool,
}

impl DayRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            entry_time_1: None,
            exit_time_1: None,
            entry_time_2: None,
            exit_time_2: None,
            total_hours_worked: 0.0,
            note: None,
            block_time_entry: false,
        }
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Derive total_hours_worked from the four punch fields.
    pub fn recalculate_hours(&mut self) {
        self.total_hours_worked = calculate_hours(
            self.entry_time_1.as_deref(),
            self.exit_time_1.as_deref(),
            self.entry_time_2.as_deref(),
            self.exit_time_2.as_deref(),
        );
    }

    /// Any punch field holds a non-blank value.
    pub fn has_punches(&self) -> bool {
        [&self.entry_time_1, &self.exit_time_1, &self.entry_time_2, &self.exit_time_2]
            .iter()
            .any(|t| t.as_deref().map_or(false, |s| !s.trim().is_empty()))
    }

    pub fn hours_str(&self) -> String {
        format_hours(self.total_hours_worked)
    }

    pub fn note_str(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }
}

/// Manual edit of a single day, applied on top of a stored record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayEdit {
    pub entry_time_1: Option<String>,
    pub exit_time_1: Option<String>,
    pub entry_time_2: Option<String>,
    pub exit_time_2: Option<String>,
    pub note: Option<String>,
}

impl DayEdit {
    /// Apply the edit; blank strings clear a field. Hours are recomputed.
    pub fn apply(self, record: &mut DayRecord) {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value.filter(|s| !s.trim().is_empty())
        }
        record.entry_time_1 = blank_to_none(self.entry_time_1);
        record.exit_time_1 = blank_to_none(self.exit_time_1);
        record.entry_time_2 = blank_to_none(self.entry_time_2);
        record.exit_time_2 = blank_to_none(self.exit_time_2);
        record.note = blank_to_none(self.note);
        record.recalculate_hours();
    }
}

/// Totals shown in the PDF footer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimesheetSummary {
    pub days_with_punches: u32, // dias com registro de ponto
    pub total_hours: f64,
    pub blocked_days: u32,      // dias sem expediente
}

/// A generated month for one employee
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTimesheet {
    pub employee: Employee,
    pub year: i32,
    pub month: u32,
    pub template: TemplateVariant,
    pub days: Vec<DayRecord>,
    pub summary: TimesheetSummary,
}

impl MonthlyTimesheet {
    pub fn new(employee: Employee, year: i32, month: u32, template: TemplateVariant, days: Vec<DayRecord>) -> Self {
        let mut timesheet = Self {
            employee,
            year,
            month,
            template,
            days,
            summary: TimesheetSummary::default(),
        };
        timesheet.calculate_summary();
        timesheet
    }

    /// "Outubro de 2024"
    pub fn year_month_str(&self) -> String {
        format!("{} de {}", month_name_portuguese(self.month), self.year)
    }

    /// Recompute totals from the day rows.
    pub fn calculate_summary(&mut self) {
        let mut summary = TimesheetSummary::default();
        for day in &self.days {
            if day.has_punches() {
                summary.days_with_punches += 1;
            }
            if day.block_time_entry {
                summary.blocked_days += 1;
            }
            summary.total_hours += day.total_hours_worked;
        }
        self.summary = summary;
    }

    /// Whether the day falls on one of the employee's configured work days.
    pub fn is_work_day(&self, record: &DayRecord) -> bool {
        self.employee.works_on(record.weekday())
    }

    /// PDF file name for this employee-month.
    pub fn file_name(&self) -> String {
        let safe_name: String = self
            .employee
            .name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        format!("folha_ponto_{}_{}_{:02}.pdf", safe_name, self.year, self.month)
    }
}
