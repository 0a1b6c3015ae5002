use std::env;
use std::path::{Path, PathBuf};

use crate::db::DbConfig;
use crate::error::{Result, TimesheetError};
use crate::holiday::HolidayCalendar;
use crate::pdf::PdfOptions;
use crate::timesheet_data::Employee;

const DEFAULT_PORT: u16 = 8080;

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Holiday calendar JSON. The legacy calendar when unset.
    pub holiday_calendar_path: Option<PathBuf>,
    pub pdf_font_path: Option<PathBuf>,
    pub pdf_logo_path: Option<PathBuf>,
    /// MySQL settings, present when DB_HOST is set.
    pub db: Option<DbConfig>,
    /// Employees JSON loaded into the in-memory store when no database is set.
    pub seed_employees_path: Option<PathBuf>,
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var(name).ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from)
}

impl AppConfig {
    /// Read the process environment. Unset variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| TimesheetError::Validation(format!("PORT is not a port number: {}", value)))?,
            Err(_) => DEFAULT_PORT,
        };

        let db = env::var("DB_HOST").ok().map(|_| DbConfig::from_env());

        Ok(Self {
            port,
            holiday_calendar_path: path_var("HOLIDAY_CALENDAR_PATH"),
            pdf_font_path: path_var("PDF_FONT_PATH"),
            pdf_logo_path: path_var("PDF_LOGO_PATH"),
            db,
            seed_employees_path: path_var("SEED_EMPLOYEES_PATH"),
        })
    }

    /// Calendar from `HOLIDAY_CALENDAR_PATH`, or the legacy one.
    pub fn holidays(&self) -> Result<HolidayCalendar> {
        match &self.holiday_calendar_path {
            Some(path) => HolidayCalendar::from_file(path),
            None => Ok(HolidayCalendar::legacy()),
        }
    }

    pub fn pdf_options(&self) -> Result<PdfOptions> {
        PdfOptions::load(self.pdf_font_path.as_deref(), self.pdf_logo_path.as_deref())
    }

    /// Employees for the in-memory store, empty when no seed file is set.
    pub fn seed_employees(&self) -> Result<Vec<Employee>> {
        match &self.seed_employees_path {
            Some(path) => load_employees(path),
            None => Ok(Vec::new()),
        }
    }
}

fn load_employees(path: &Path) -> Result<Vec<Employee>> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json)
        .map_err(|e| TimesheetError::Validation(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_paths() {
        let config = AppConfig {
            port: DEFAULT_PORT,
            holiday_calendar_path: None,
            pdf_font_path: None,
            pdf_logo_path: None,
            db: None,
            seed_employees_path: None,
        };
        assert_eq!(config.holidays().unwrap(), HolidayCalendar::legacy());
        assert!(config.pdf_options().unwrap().font.is_none());
        assert!(config.seed_employees().unwrap().is_empty());
    }

    #[test]
    fn test_load_seed_employees() {
        let path = env::temp_dir().join(format!("folha_ponto_seed_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"id":"1","account_id":"acc","name":"Ana","employee_type":"ASG","vinculo":"Efetivo",
                "function":"ASG","work_days":["Monday"],"shift":["Manhã"]}]"#,
        )
        .unwrap();
        let employees = load_employees(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "Ana");
    }
}
