use std::collections::HashMap;
use std::env;
use std::sync::Mutex;

use chrono::NaiveDate;
use mysql::prelude::*;
use mysql::*;

use crate::error::{Result, TimesheetError};
use crate::timesheet_data::{DayRecord, Employee};

/// Roster lookups, always scoped to the calling account.
pub trait EmployeeStore: Send + Sync {
    fn list_employees(&self, account_id: &str) -> Result<Vec<Employee>>;

    /// `EmployeeNotFound` when the id is unknown or belongs to another account.
    fn get_employee(&self, account_id: &str, employee_id: &str) -> Result<Employee>;
}

/// Stored day records of an employee-month.
pub trait TimesheetStore: Send + Sync {
    /// Delete the stored month and insert `records` in one transaction.
    /// Returns the stored rows ordered by date.
    fn replace_month(
        &self,
        account_id: &str,
        employee_id: &str,
        year: i32,
        month: u32,
        records: &[DayRecord],
    ) -> Result<Vec<DayRecord>>;

    fn load_month(&self, account_id: &str, employee_id: &str, year: i32, month: u32) -> Result<Vec<DayRecord>>;

    /// Overwrite one stored day. Hours must already be recomputed.
    fn update_day(
        &self,
        account_id: &str,
        employee_id: &str,
        year: i32,
        month: u32,
        record: &DayRecord,
    ) -> Result<DayRecord>;
}

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbConfig {
    /// Read `<PREFIX>_HOST`, `<PREFIX>_PORT`, `<PREFIX>_USER`,
    /// `<PREFIX>_PASSWORD` and `<PREFIX>_NAME`.
    pub fn from_env_with_prefix(prefix: &str) -> Self {
        Self {
            host: env::var(format!("{}_HOST", prefix)).unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var(format!("{}_PORT", prefix))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3306),
            user: env::var(format!("{}_USER", prefix)).unwrap_or_else(|_| "root".to_string()),
            password: env::var(format!("{}_PASSWORD", prefix)).unwrap_or_default(),
            database: env::var(format!("{}_NAME", prefix)).unwrap_or_else(|_| "folha_ponto".to_string()),
        }
    }

    /// DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_NAME
    pub fn from_env() -> Self {
        Self::from_env_with_prefix("DB")
    }

    /// mysql:// URL for the pool
    pub fn connection_url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

const RECORD_COLUMNS: &str = "DATE_FORMAT(record_date, '%Y-%m-%d'), entry_time_1, exit_time_1, \
     entry_time_2, exit_time_2, total_hours_worked, notes";

type RecordRow = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    f64,
    Option<String>,
);

fn record_from_row(row: RecordRow) -> Result<DayRecord> {
    let (date, entry_time_1, exit_time_1, entry_time_2, exit_time_2, total_hours_worked, note) = row;
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| TimesheetError::StorageState(format!("bad record_date {}: {}", date, e)))?;
    Ok(DayRecord {
        date,
        entry_time_1,
        exit_time_1,
        entry_time_2,
        exit_time_2,
        total_hours_worked,
        note,
        block_time_entry: false,
    })
}

fn column<T: FromValue>(row: &mut Row, name: &str) -> Result<T> {
    row.take_opt(name)
        .ok_or_else(|| TimesheetError::StorageState(format!("missing column {}", name)))?
        .map_err(|e| TimesheetError::StorageState(format!("column {}: {}", name, e)))
}

/// Build an Employee through its serde form so role, bond and weekday labels
/// are validated the same way as API input.
fn employee_from_row(mut row: Row) -> Result<Employee> {
    let id: String = column(&mut row, "id")?;
    let work_days: Option<String> = column(&mut row, "work_days")?;
    let shift: Option<String> = column(&mut row, "shift")?;
    let json_list = |field: &str, raw: Option<String>| -> Result<serde_json::Value> {
        serde_json::from_str(raw.as_deref().unwrap_or("[]"))
            .map_err(|e| TimesheetError::StorageState(format!("employee {} {}: {}", id, field, e)))
    };
    let work_days = json_list("work_days", work_days)?;
    let shift = json_list("shift", shift)?;

    let value = serde_json::json!({
        "id": id,
        "account_id": column::<String>(&mut row, "account_id")?,
        "name": column::<String>(&mut row, "name")?,
        "registration_number": column::<Option<String>>(&mut row, "registration_number")?,
        "employee_type": column::<String>(&mut row, "employee_type")?,
        "vinculo": column::<String>(&mut row, "vinculo")?,
        "function": column::<Option<String>>(&mut row, "function")?.unwrap_or_default(),
        "work_days": work_days,
        "shift": shift,
        "school_name": column::<Option<String>>(&mut row, "school_name")?,
        "discipline": column::<Option<String>>(&mut row, "discipline")?,
        "weekly_hours": column::<Option<f64>>(&mut row, "weekly_hours")?,
    });

    serde_json::from_value(value).map_err(|e| TimesheetError::Validation(format!("employee {}: {}", id, e)))
}

const EMPLOYEE_COLUMNS: &str = "id, account_id, name, registration_number, employee_type, vinculo, \
     `function`, work_days, shift, school_name, discipline, weekly_hours";

/// MySQL-backed employee and timesheet store
pub struct MySqlStore {
    pool: Pool,
}

impl MySqlStore {
    /// Open the pool. Fails when the server is unreachable.
    pub fn connect(config: &DbConfig) -> Result<Self> {
        let opts = Opts::from_url(&config.connection_url())
            .map_err(|e| TimesheetError::Validation(format!("database url: {}", e)))?;
        let pool = Pool::new(opts)?;
        tracing::info!(host = %config.host, database = %config.database, "connected to mysql");
        Ok(Self { pool })
    }

    fn load_records<Q: Queryable>(conn: &mut Q, timesheet_id: u64) -> Result<Vec<DayRecord>> {
        let rows: Vec<RecordRow> = conn.exec(
            format!(
                "SELECT {} FROM timesheet_records WHERE timesheet_id = ? ORDER BY record_date",
                RECORD_COLUMNS
            ),
            (timesheet_id,),
        )?;
        rows.into_iter().map(record_from_row).collect()
    }

    fn find_timesheet<Q: Queryable>(
        conn: &mut Q,
        account_id: &str,
        employee_id: &str,
        year: i32,
        month: u32,
        for_update: bool,
    ) -> Result<u64> {
        let lock = if for_update { " FOR UPDATE" } else { "" };
        let id: Option<u64> = conn.exec_first(
            format!(
                "SELECT id FROM timesheets \
                 WHERE account_id = ? AND employee_id = ? AND year = ? AND month = ?{}",
                lock
            ),
            (account_id, employee_id, year, month),
        )?;
        id.ok_or_else(|| TimesheetError::TimesheetNotFound {
            employee_id: employee_id.to_string(),
            year,
            month,
        })
    }
}

impl EmployeeStore for MySqlStore {
    fn list_employees(&self, account_id: &str) -> Result<Vec<Employee>> {
        let mut conn = self.pool.get_conn()?;
        let rows: Vec<Row> = conn.exec(
            format!("SELECT {} FROM employees WHERE account_id = ? ORDER BY name", EMPLOYEE_COLUMNS),
            (account_id,),
        )?;
        rows.into_iter().map(employee_from_row).collect()
    }

    fn get_employee(&self, account_id: &str, employee_id: &str) -> Result<Employee> {
        let mut conn = self.pool.get_conn()?;
        let row: Option<Row> = conn.exec_first(
            format!("SELECT {} FROM employees WHERE account_id = ? AND id = ?", EMPLOYEE_COLUMNS),
            (account_id, employee_id),
        )?;
        match row {
            Some(row) => employee_from_row(row),
            None => Err(TimesheetError::EmployeeNotFound(employee_id.to_string())),
        }
    }
}

impl TimesheetStore for MySqlStore {
    fn replace_month(
        &self,
        account_id: &str,
        employee_id: &str,
        year: i32,
        month: u32,
        records: &[DayRecord],
    ) -> Result<Vec<DayRecord>> {
        let mut conn = self.pool.get_conn()?;
        let mut tx = conn.start_transaction(TxOpts::default())?;

        // unique key (employee_id, month, year)
        tx.exec_drop(
            r"INSERT INTO timesheets (account_id, employee_id, month, year)
              VALUES (?, ?, ?, ?)
              ON DUPLICATE KEY UPDATE updated_at = CURRENT_TIMESTAMP",
            (account_id, employee_id, month, year),
        )?;
        let timesheet_id = Self::find_timesheet(&mut tx, account_id, employee_id, year, month, true)?;

        tx.exec_drop("DELETE FROM timesheet_records WHERE timesheet_id = ?", (timesheet_id,))?;
        tx.exec_batch(
            r"INSERT INTO timesheet_records
              (timesheet_id, record_date, entry_time_1, exit_time_1, entry_time_2, exit_time_2,
               total_hours_worked, notes)
              VALUES (:timesheet_id, :record_date, :entry_time_1, :exit_time_1, :entry_time_2,
               :exit_time_2, :total_hours_worked, :notes)",
            records.iter().map(|r| {
                params! {
                    "timesheet_id" => timesheet_id,
                    "record_date" => r.date.format("%Y-%m-%d").to_string(),
                    "entry_time_1" => &r.entry_time_1,
                    "exit_time_1" => &r.exit_time_1,
                    "entry_time_2" => &r.entry_time_2,
                    "exit_time_2" => &r.exit_time_2,
                    "total_hours_worked" => r.total_hours_worked,
                    "notes" => &r.note,
                }
            }),
        )?;

        let stored = Self::load_records(&mut tx, timesheet_id)?;
        tx.commit()?;

        tracing::info!(employee_id, year, month, records = stored.len(), "replaced timesheet");
        Ok(stored)
    }

    fn load_month(&self, account_id: &str, employee_id: &str, year: i32, month: u32) -> Result<Vec<DayRecord>> {
        let mut conn = self.pool.get_conn()?;
        let timesheet_id = Self::find_timesheet(&mut conn, account_id, employee_id, year, month, false)?;
        Self::load_records(&mut conn, timesheet_id)
    }

    fn update_day(
        &self,
        account_id: &str,
        employee_id: &str,
        year: i32,
        month: u32,
        record: &DayRecord,
    ) -> Result<DayRecord> {
        let mut conn = self.pool.get_conn()?;
        let mut tx = conn.start_transaction(TxOpts::default())?;
        let timesheet_id = Self::find_timesheet(&mut tx, account_id, employee_id, year, month, true)?;
        let record_date = record.date.format("%Y-%m-%d").to_string();

        tx.exec_drop(
            r"UPDATE timesheet_records
              SET entry_time_1 = :entry_time_1, exit_time_1 = :exit_time_1,
                  entry_time_2 = :entry_time_2, exit_time_2 = :exit_time_2,
                  total_hours_worked = :total_hours_worked, notes = :notes
              WHERE timesheet_id = :timesheet_id AND record_date = :record_date",
            params! {
                "entry_time_1" => &record.entry_time_1,
                "exit_time_1" => &record.exit_time_1,
                "entry_time_2" => &record.entry_time_2,
                "exit_time_2" => &record.exit_time_2,
                "total_hours_worked" => record.total_hours_worked,
                "notes" => &record.note,
                "timesheet_id" => timesheet_id,
                "record_date" => &record_date,
            },
        )?;

        let row: Option<RecordRow> = tx.exec_first(
            format!(
                "SELECT {} FROM timesheet_records WHERE timesheet_id = ? AND record_date = ?",
                RECORD_COLUMNS
            ),
            (timesheet_id, &record_date),
        )?;
        let stored = match row {
            Some(row) => record_from_row(row)?,
            None => {
                return Err(TimesheetError::TimesheetNotFound {
                    employee_id: employee_id.to_string(),
                    year,
                    month,
                })
            }
        };
        tx.commit()?;

        tracing::info!(employee_id, date = %record.date, "updated timesheet day");
        Ok(stored)
    }
}

type MonthKey = (String, String, i32, u32);

/// In-process store, used by tests and when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    employees: Mutex<Vec<Employee>>,
    months: Mutex<HashMap<MonthKey, Vec<DayRecord>>>,
}

fn poisoned<T>(_: T) -> TimesheetError {
    TimesheetError::StorageState("memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with a roster.
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees: Mutex::new(employees),
            months: Mutex::new(HashMap::new()),
        }
    }

    fn key(account_id: &str, employee_id: &str, year: i32, month: u32) -> MonthKey {
        (account_id.to_string(), employee_id.to_string(), year, month)
    }
}

impl EmployeeStore for MemoryStore {
    fn list_employees(&self, account_id: &str) -> Result<Vec<Employee>> {
        let employees = self.employees.lock().map_err(poisoned)?;
        let mut list: Vec<Employee> = employees
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    fn get_employee(&self, account_id: &str, employee_id: &str) -> Result<Employee> {
        let employees = self.employees.lock().map_err(poisoned)?;
        employees
            .iter()
            .find(|e| e.account_id == account_id && e.id == employee_id)
            .cloned()
            .ok_or_else(|| TimesheetError::EmployeeNotFound(employee_id.to_string()))
    }
}

impl TimesheetStore for MemoryStore {
    fn replace_month(
        &self,
        account_id: &str,
        employee_id: &str,
        year: i32,
        month: u32,
        records: &[DayRecord],
    ) -> Result<Vec<DayRecord>> {
        let mut stored: Vec<DayRecord> = records
            .iter()
            .map(|r| DayRecord {
                block_time_entry: false,
                ..r.clone()
            })
            .collect();
        stored.sort_by_key(|r| r.date);

        let mut months = self.months.lock().map_err(poisoned)?;
        months.insert(Self::key(account_id, employee_id, year, month), stored.clone());
        Ok(stored)
    }

    fn load_month(&self, account_id: &str, employee_id: &str, year: i32, month: u32) -> Result<Vec<DayRecord>> {
        let months = self.months.lock().map_err(poisoned)?;
        months
            .get(&Self::key(account_id, employee_id, year, month))
            .cloned()
            .ok_or_else(|| TimesheetError::TimesheetNotFound {
                employee_id: employee_id.to_string(),
                year,
                month,
            })
    }

    fn update_day(
        &self,
        account_id: &str,
        employee_id: &str,
        year: i32,
        month: u32,
        record: &DayRecord,
    ) -> Result<DayRecord> {
        let not_found = || TimesheetError::TimesheetNotFound {
            employee_id: employee_id.to_string(),
            year,
            month,
        };
        let mut months = self.months.lock().map_err(poisoned)?;
        let days = months
            .get_mut(&Self::key(account_id, employee_id, year, month))
            .ok_or_else(not_found)?;
        let slot = days.iter_mut().find(|d| d.date == record.date).ok_or_else(not_found)?;
        *slot = DayRecord {
            block_time_entry: false,
            ..record.clone()
        };
        Ok(slot.clone())
    }
}
