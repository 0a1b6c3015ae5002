use thiserror::Error;

/// Errors raised while generating, storing or rendering timesheets.
#[derive(Debug, Error)]
pub enum TimesheetError {
    #[error("invalid month {month} for year {year}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("no timesheet stored for employee {employee_id} in {month:02}/{year}")]
    TimesheetNotFound { employee_id: String, year: i32, month: u32 },

    #[error("storage error: {0}")]
    Storage(#[from] mysql::Error),

    #[error("storage state error: {0}")]
    StorageState(String),

    #[error("pdf generation failed: {0}")]
    Pdf(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid holiday calendar: {0}")]
    Calendar(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TimesheetError>;
