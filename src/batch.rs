//! Single and batch generation: generate, persist, read back.
//!
//! Each employee in a batch succeeds or fails on its own. A missing id or a
//! storage error is recorded against that employee and the loop carries on.

use serde::Deserialize;

use crate::db::TimesheetStore;
use crate::error::{Result, TimesheetError};
use crate::holiday::HolidayCalendar;
use crate::month::{generate_month, refresh_block_flags};
use crate::template;
use crate::timesheet_data::{Bond, Employee, MonthlyTimesheet, Role};

/// Roster filter. `None` means "Todos".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmployeeFilter {
    pub role: Option<Role>,
    pub bond: Option<Bond>,
}

impl EmployeeFilter {
    /// Role and bond both match, `None` matching anything.
    pub fn matches(&self, employee: &Employee) -> bool {
        self.role.map_or(true, |r| r == employee.role) && self.bond.map_or(true, |b| b == employee.bond)
    }

    /// Employees of the roster that pass the filter, in roster order.
    pub fn apply<'a>(&self, roster: &'a [Employee]) -> Vec<&'a Employee> {
        roster.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Outcome for one selected employee
#[derive(Debug)]
pub struct BatchItem {
    pub employee_id: String,
    pub result: Result<MonthlyTimesheet>,
}

/// Per-employee outcomes, in selection order
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub items: Vec<BatchItem>,
}

impl BatchOutcome {
    /// Generated timesheets, in selection order.
    pub fn successes(&self) -> impl Iterator<Item = &MonthlyTimesheet> {
        self.items.iter().filter_map(|i| i.result.as_ref().ok())
    }

    /// Failed ids with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &TimesheetError)> {
        self.items
            .iter()
            .filter_map(|i| i.result.as_ref().err().map(|e| (i.employee_id.as_str(), e)))
    }

    /// At least one employee was generated.
    pub fn is_success(&self) -> bool {
        self.successes().next().is_some()
    }
}

/// Generate, persist and read back one employee-month.
pub fn generate_single(
    employee: &Employee,
    year: i32,
    month: u32,
    holidays: &HolidayCalendar,
    store: &dyn TimesheetStore,
) -> Result<MonthlyTimesheet> {
    let records = generate_month(employee, year, month, holidays)?;
    let template = template::select(employee);
    let mut stored = store.replace_month(&employee.account_id, &employee.id, year, month, &records)?;
    refresh_block_flags(employee, &mut stored, holidays);

    tracing::info!(employee = %employee.display_label(), year, month, %template, "timesheet generated");
    Ok(MonthlyTimesheet::new(employee.clone(), year, month, template, stored))
}

/// Read a stored month back with flags and template resolved.
pub fn load_timesheet(
    employee: &Employee,
    year: i32,
    month: u32,
    holidays: &HolidayCalendar,
    store: &dyn TimesheetStore,
) -> Result<MonthlyTimesheet> {
    let mut stored = store.load_month(&employee.account_id, &employee.id, year, month)?;
    refresh_block_flags(employee, &mut stored, holidays);
    Ok(MonthlyTimesheet::new(employee.clone(), year, month, template::select(employee), stored))
}

/// Generate every selected employee against the roster.
pub fn generate_batch(
    selected_ids: &[String],
    roster: &[Employee],
    year: i32,
    month: u32,
    holidays: &HolidayCalendar,
    store: &dyn TimesheetStore,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for employee_id in selected_ids {
        let result = match roster.iter().find(|e| &e.id == employee_id) {
            Some(employee) => generate_single(employee, year, month, holidays, store),
            None => Err(TimesheetError::EmployeeNotFound(employee_id.clone())),
        };
        if let Err(e) = &result {
            tracing::warn!(employee_id = %employee_id, error = %e, "timesheet generation failed");
        }
        outcome.items.push(BatchItem {
            employee_id: employee_id.clone(),
            result,
        });
    }

    tracing::info!(
        year,
        month,
        selected = selected_ids.len(),
        succeeded = outcome.successes().count(),
        failed = outcome.failures().count(),
        "batch finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::timesheet_data::{DayRecord, TemplateVariant};
    use chrono::Weekday;

    fn employee(id: &str, role: Role, bond: Bond, function: &str) -> Employee {
        Employee {
            id: id.to_string(),
            account_id: "acc".to_string(),
            name: format!("Servidor {}", id),
            registration_number: None,
            role,
            bond,
            job_function: function.to_string(),
            work_days: vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
            shift: Vec::new(),
            school_name: None,
            discipline: None,
            weekly_hours: None,
        }
    }

    /// Fails replace_month for one employee id.
    struct FlakyStore {
        inner: MemoryStore,
        failing_id: String,
    }

    impl TimesheetStore for FlakyStore {
        fn replace_month(
            &self,
            account_id: &str,
            employee_id: &str,
            year: i32,
            month: u32,
            records: &[DayRecord],
        ) -> Result<Vec<DayRecord>> {
            if employee_id == self.failing_id {
                return Err(TimesheetError::StorageState("connection reset".to_string()));
            }
            self.inner.replace_month(account_id, employee_id, year, month, records)
        }

        fn load_month(&self, account_id: &str, employee_id: &str, year: i32, month: u32) -> Result<Vec<DayRecord>> {
            self.inner.load_month(account_id, employee_id, year, month)
        }

        fn update_day(
            &self,
            account_id: &str,
            employee_id: &str,
            year: i32,
            month: u32,
            record: &DayRecord,
        ) -> Result<DayRecord> {
            self.inner.update_day(account_id, employee_id, year, month, record)
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_batch_with_missing_employee() {
        let roster = vec![
            employee("1", Role::Asg, Bond::Efetivo, "ASG"),
            employee("3", Role::Vigia, Bond::Contrato, "Vigia 12h x 36h"),
        ];
        let store = MemoryStore::new();
        let outcome = generate_batch(&ids(&["1", "2", "3"]), &roster, 2024, 10, &HolidayCalendar::legacy(), &store);

        assert_eq!(outcome.items.len(), 3);
        assert_eq!(outcome.successes().count(), 2);
        let failures: Vec<_> = outcome.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "2");
        assert!(matches!(failures[0].1, TimesheetError::EmployeeNotFound(_)));
        assert!(outcome.is_success());

        let order: Vec<&str> = outcome.items.iter().map(|i| i.employee_id.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "3"]);
        assert_eq!(store.load_month("acc", "3", 2024, 10).unwrap().len(), 31);
    }

    #[test]
    fn test_store_failure_is_per_employee() {
        let roster = vec![
            employee("1", Role::Asg, Bond::Efetivo, "ASG"),
            employee("2", Role::Asg, Bond::Efetivo, "ASG"),
        ];
        let store = FlakyStore {
            inner: MemoryStore::new(),
            failing_id: "1".to_string(),
        };
        let outcome = generate_batch(&ids(&["1", "2"]), &roster, 2024, 10, &HolidayCalendar::legacy(), &store);
        assert_eq!(outcome.successes().count(), 1);
        assert!(matches!(outcome.items[0].result, Err(TimesheetError::StorageState(_))));
        assert!(outcome.items[1].result.is_ok());
    }

    #[test]
    fn test_batch_all_failed() {
        let outcome = generate_batch(&ids(&["x"]), &[], 2024, 10, &HolidayCalendar::legacy(), &MemoryStore::new());
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_single_generation_reads_back() {
        let e = employee("7", Role::EducadorVoluntario, Bond::EducadorVoluntario20h, "");
        let store = MemoryStore::new();
        let calendar = HolidayCalendar::legacy();
        let timesheet = generate_single(&e, 2024, 10, &calendar, &store).unwrap();
        assert_eq!(timesheet.template, TemplateVariant::V6);
        assert_eq!(timesheet.days.len(), 31);
        // 2024-10-11 is a Friday
        assert_eq!(timesheet.days[10].note.as_deref(), Some("FERIADO DIA DA CIDADE"));
        assert!(timesheet.days[10].block_time_entry);

        let loaded = load_timesheet(&e, 2024, 10, &calendar, &store).unwrap();
        assert_eq!(loaded.days, timesheet.days);
        assert!(generate_single(&e, 2024, 13, &calendar, &store).is_err());
    }

    #[test]
    fn test_employee_filter() {
        let roster = vec![
            employee("1", Role::Asg, Bond::Efetivo, "ASG"),
            employee("2", Role::Asg, Bond::Contrato, "ASG"),
            employee("3", Role::Professor, Bond::Contrato, "Docente"),
        ];
        assert_eq!(EmployeeFilter::default().apply(&roster).len(), 3);
        let filter = EmployeeFilter {
            role: Some(Role::Asg),
            bond: None,
        };
        assert_eq!(filter.apply(&roster).len(), 2);
        let filter = EmployeeFilter {
            role: None,
            bond: Some(Bond::Contrato),
        };
        let ids: Vec<&str> = filter.apply(&roster).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }
}
