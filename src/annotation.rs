//! Day annotation: what goes in a timesheet row besides punch times.
//!
//! Every generation path (single, batch, PDF rendering) goes through
//! [`annotate`]. Rules are tried in priority order; the first one that
//! applies to the employee decides the note for every day of the month.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::classification::EmployeeProfile;
use crate::holiday::{HolidayCalendar, HolidayScope};
use crate::month::weekday_portuguese;

/// Note for weekdays off under the Educador Voluntário rule.
pub const VOLUNTEER_DAY_OFF: &str = "------------------------------";
/// Note for weekdays off under the contract service rule.
pub const CONTRACT_DAY_OFF: &str = "-------------------------";
/// Note for weekdays off under the default rule. The text is fixed and does
/// not depend on the actual weekday.
pub const DEFAULT_DAY_OFF: &str = "SÁBADO E DOMINGO";

/// Annotation rule, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnnotationRule {
    Volunteer20h,
    FundamentalII,
    Volunteer,
    Vigia12x36,
    ContractService,
    Default,
}

impl AnnotationRule {
    /// Pick the first rule that matches the employee.
    pub fn for_profile(profile: &EmployeeProfile<'_>) -> Self {
        if profile.is_volunteer_20h() {
            AnnotationRule::Volunteer20h
        } else if profile.is_fundamental_ii_teacher() {
            AnnotationRule::FundamentalII
        } else if profile.is_volunteer() {
            AnnotationRule::Volunteer
        } else if profile.is_vigia_12x36() {
            AnnotationRule::Vigia12x36
        } else if profile.is_contract_service_group() {
            AnnotationRule::ContractService
        } else {
            AnnotationRule::Default
        }
    }
}

/// Result of annotating one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAnnotation {
    pub note: Option<String>,
    /// Punch fields are not open for manual entry.
    pub block_time_entry: bool,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn upper_day_name(date: NaiveDate) -> String {
    weekday_portuguese(date.weekday()).to_uppercase()
}

/// Annotate one day for an employee.
pub fn annotate(profile: &EmployeeProfile<'_>, date: NaiveDate, holidays: &HolidayCalendar) -> DayAnnotation {
    let rule = AnnotationRule::for_profile(profile);
    annotate_with_rule(rule, profile, date, holidays)
}

/// Same as [`annotate`] with the rule already resolved, for month walks.
pub fn annotate_with_rule(
    rule: AnnotationRule,
    profile: &EmployeeProfile<'_>,
    date: NaiveDate,
    holidays: &HolidayCalendar,
) -> DayAnnotation {
    let is_work_day = profile.employee.works_on(date.weekday());
    let weekend = is_weekend(date);

    // Rules 3-5 only look the calendar up on days off.
    let standard_holiday = if is_work_day {
        None
    } else {
        holidays.lookup(date, HolidayScope::Standard)
    };
    let with_standard_holiday = |note: Option<String>| match standard_holiday {
        Some(label) => (Some(label.to_string()), true),
        None => (note, false),
    };

    let (note, holiday_applied) = match rule {
        AnnotationRule::Volunteer20h => {
            if weekend {
                (Some(upper_day_name(date)), false)
            } else {
                match holidays.lookup(date, HolidayScope::Volunteer20h) {
                    Some(label) => (Some(label.to_string()), true),
                    None => (None, false),
                }
            }
        }
        AnnotationRule::FundamentalII => (weekend.then(|| upper_day_name(date)), false),
        AnnotationRule::Volunteer => with_standard_holiday(match (is_work_day, weekend) {
            (true, _) => None,
            (false, true) => Some(upper_day_name(date)),
            (false, false) => Some(VOLUNTEER_DAY_OFF.to_string()),
        }),
        AnnotationRule::Vigia12x36 => with_standard_holiday(None),
        AnnotationRule::ContractService => with_standard_holiday(match (is_work_day, weekend) {
            (true, _) => None,
            (false, true) => Some(upper_day_name(date)),
            (false, false) => Some(CONTRACT_DAY_OFF.to_string()),
        }),
        AnnotationRule::Default => {
            let note = match (is_work_day, weekend) {
                (true, _) => None,
                (false, true) => Some(weekday_portuguese(date.weekday()).to_string()),
                (false, false) => Some(DEFAULT_DAY_OFF.to_string()),
            };
            (note, false)
        }
    };

    DayAnnotation {
        note,
        block_time_entry: !is_work_day || holiday_applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timesheet_data::{Bond, Employee, Role};

    const WEEKDAYS: [Weekday; 5] = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];

    fn employee(role: Role, bond: Bond, function: &str, work_days: &[Weekday]) -> Employee {
        Employee {
            id: "e1".to_string(),
            account_id: "acc".to_string(),
            name: "Teste".to_string(),
            registration_number: Some("123".to_string()),
            role,
            bond,
            job_function: function.to_string(),
            work_days: work_days.to_vec(),
            shift: Vec::new(),
            school_name: None,
            discipline: None,
            weekly_hours: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn note(e: &Employee, d: NaiveDate) -> Option<String> {
        annotate(&EmployeeProfile::new(e), d, &HolidayCalendar::legacy()).note
    }

    #[test]
    fn test_volunteer_scenario() {
        // Wednesday off: Mon, Tue, Thu, Fri only
        let e = employee(
            Role::EducadorVoluntario,
            Bond::EducadorVoluntario,
            "Educador",
            &[Weekday::Mon, Weekday::Tue, Weekday::Thu, Weekday::Fri],
        );
        // 2024-05-08 is a Wednesday
        assert_eq!(note(&e, date(2024, 5, 8)).as_deref(), Some(VOLUNTEER_DAY_OFF));
        assert_eq!(VOLUNTEER_DAY_OFF.len(), 30);
        // 2024-05-11 is a Saturday
        assert_eq!(note(&e, date(2024, 5, 11)).as_deref(), Some("SÁBADO"));
        assert_eq!(note(&e, date(2024, 5, 12)).as_deref(), Some("DOMINGO"));
        // 2024-08-07 is a Wednesday, day 7
        assert_eq!(note(&e, date(2024, 8, 7)).as_deref(), Some("FERIADO"));
        // work day
        assert_eq!(note(&e, date(2024, 5, 9)), None);
    }

    #[test]
    fn test_volunteer_holiday_on_weekend_day_off() {
        let e = employee(Role::EducadorVoluntario, Bond::EducadorVoluntario, "", &WEEKDAYS);
        // 2024-09-07 is a Saturday
        let a = annotate(&EmployeeProfile::new(&e), date(2024, 9, 7), &HolidayCalendar::legacy());
        assert_eq!(a.note.as_deref(), Some("FERIADO"));
        assert!(a.block_time_entry);
    }

    #[test]
    fn test_vigia_12x36_blank() {
        let e = employee(Role::Vigia, Bond::Contrato, "Vigia 12h x 36h", &[Weekday::Mon, Weekday::Wed]);
        // Tuesday 2024-05-14, Saturday 2024-05-18
        let a = annotate(&EmployeeProfile::new(&e), date(2024, 5, 14), &HolidayCalendar::legacy());
        assert_eq!(a.note, None);
        assert!(a.block_time_entry);
        assert_eq!(note(&e, date(2024, 5, 18)), None);
        // Tuesday 2024-05-07 is day 7 and a day off
        assert_eq!(note(&e, date(2024, 5, 7)).as_deref(), Some("FERIADO"));
        // Wednesday 2024-08-07 is a work day: no override
        assert_eq!(note(&e, date(2024, 8, 7)), None);
    }

    #[test]
    fn test_default_fixed_day_off_text() {
        let e = employee(Role::Asg, Bond::Efetivo, "ASG", &[Weekday::Mon, Weekday::Tue]);
        // Wednesday
        assert_eq!(note(&e, date(2024, 5, 8)).as_deref(), Some("SÁBADO E DOMINGO"));
        // Saturday keeps natural case
        assert_eq!(note(&e, date(2024, 5, 11)).as_deref(), Some("Sábado"));
        assert_eq!(note(&e, date(2024, 5, 12)).as_deref(), Some("Domingo"));
        // day 7 never consulted by the default rule
        assert_eq!(note(&e, date(2024, 8, 7)).as_deref(), Some("SÁBADO E DOMINGO"));
        assert_eq!(note(&e, date(2024, 5, 6)), None);
    }

    #[test]
    fn test_contract_service_dash_run() {
        let e = employee(Role::Nutricionista, Bond::Contrato, "Nutricionista", &[Weekday::Mon]);
        let d = note(&e, date(2024, 5, 8)).unwrap();
        assert_eq!(d, CONTRACT_DAY_OFF);
        assert_eq!(d.len(), 25);
        assert_eq!(note(&e, date(2024, 5, 11)).as_deref(), Some("SÁBADO"));
        assert_eq!(note(&e, date(2024, 8, 7)).as_deref(), Some("FERIADO"));
    }

    #[test]
    fn test_fundamental_ii_weekend_even_when_work_day() {
        let mut days = WEEKDAYS.to_vec();
        days.push(Weekday::Sat);
        let e = employee(Role::ProfessorFundamentalII, Bond::Efetivo, "Matemática", &days);
        assert_eq!(note(&e, date(2024, 5, 11)).as_deref(), Some("SÁBADO"));
        let e = employee(Role::ProfessorFundamentalII, Bond::Contrato, "Matemática", &[Weekday::Mon]);
        assert_eq!(note(&e, date(2024, 5, 8)), None);
        assert_eq!(note(&e, date(2024, 8, 7)), None);
    }

    #[test]
    fn test_volunteer_20h_city_holiday() {
        let e = employee(Role::Professor, Bond::EducadorVoluntario20h, "", &WEEKDAYS);
        // 2024-10-11 is a Friday
        let a = annotate(&EmployeeProfile::new(&e), date(2024, 10, 11), &HolidayCalendar::legacy());
        assert_eq!(a.note.as_deref(), Some("FERIADO DIA DA CIDADE"));
        assert!(a.block_time_entry);
        // day 7 does not apply to 20H volunteers
        assert_eq!(note(&e, date(2024, 8, 7)), None);
        assert_eq!(note(&e, date(2024, 10, 12)).as_deref(), Some("SÁBADO"));
        // 2025-10-11 is a Saturday: weekend name wins
        assert_eq!(note(&e, date(2025, 10, 11)).as_deref(), Some("SÁBADO"));
    }

    #[test]
    fn test_priority_when_rules_overlap() {
        // ASG contrato function + 20H volunteer bond: rule 1 wins
        let e = employee(Role::Vigia, Bond::EducadorVoluntario20h, "Vigia ASG 12h x 36h", &[Weekday::Mon]);
        let p = EmployeeProfile::new(&e);
        assert_eq!(AnnotationRule::for_profile(&p), AnnotationRule::Volunteer20h);
        assert_eq!(note(&e, date(2024, 5, 8)), None);

        // Vigia 12x36 whose function also mentions ASG: rule 4 before rule 5
        let e = employee(Role::Vigia, Bond::Contrato, "vigia/asg 12h x 36h", &[Weekday::Mon]);
        let p = EmployeeProfile::new(&e);
        assert!(p.is_vigia_12x36() && p.is_contract_service_group());
        assert_eq!(AnnotationRule::for_profile(&p), AnnotationRule::Vigia12x36);
        assert_eq!(note(&e, date(2024, 5, 8)), None);

        // Fundamental II under Contrato with ASG in function: rule 2 before rule 5
        let e = employee(Role::ProfessorFundamentalII, Bond::Contrato, "ASG", &[Weekday::Mon]);
        assert_eq!(AnnotationRule::for_profile(&EmployeeProfile::new(&e)), AnnotationRule::FundamentalII);
    }

    #[test]
    fn test_injected_calendar_replaces_day_seven() {
        let e = employee(Role::Merendeira, Bond::Contrato, "Merendeira", &WEEKDAYS);
        let p = EmployeeProfile::new(&e);
        let a = annotate(&p, date(2024, 9, 7), &HolidayCalendar::empty());
        assert_eq!(a.note.as_deref(), Some("SÁBADO"));
        let calendar = HolidayCalendar::from_json(
            r#"{"holidays":[{"day":7,"month":9,"label":"INDEPENDÊNCIA","scope":"standard"}]}"#,
        )
        .unwrap();
        assert_eq!(annotate(&p, date(2024, 9, 7), &calendar).note.as_deref(), Some("INDEPENDÊNCIA"));
        assert_eq!(annotate(&p, date(2024, 10, 7), &calendar).note, None);
    }

    #[test]
    fn test_work_day_is_open_for_entry() {
        let e = employee(Role::Professor, Bond::Efetivo, "Docente", &WEEKDAYS);
        let a = annotate(&EmployeeProfile::new(&e), date(2024, 5, 8), &HolidayCalendar::legacy());
        assert_eq!(a, DayAnnotation { note: None, block_time_entry: false });
    }
}
