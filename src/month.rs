use chrono::{Datelike, NaiveDate, Weekday};

use crate::annotation::{annotate_with_rule, AnnotationRule};
use crate::classification::EmployeeProfile;
use crate::error::{Result, TimesheetError};
use crate::holiday::HolidayCalendar;
use crate::hours::calculate_hours;
use crate::timesheet_data::{DayRecord, Employee};

/// Build the rows of a month for one employee.
///
/// Punch times are never filled in here; they stay blank for manual entry,
/// so every row starts at zero hours. Same inputs, same output.
pub fn generate_month(
    employee: &Employee,
    year: i32,
    month: u32,
    holidays: &HolidayCalendar,
) -> Result<Vec<DayRecord>> {
    let days_in_month = days_in_month(year, month)?;
    let profile = EmployeeProfile::new(employee);
    let rule = AnnotationRule::for_profile(&profile);

    let mut days = Vec::with_capacity(days_in_month as usize);
    for day in 1..=days_in_month {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(TimesheetError::InvalidMonth { year, month })?;
        let annotation = annotate_with_rule(rule, &profile, date, holidays);

        let mut record = DayRecord::new(date);
        record.total_hours_worked = calculate_hours(
            record.entry_time_1.as_deref(),
            record.exit_time_1.as_deref(),
            record.entry_time_2.as_deref(),
            record.exit_time_2.as_deref(),
        );
        record.note = annotation.note;
        record.block_time_entry = annotation.block_time_entry;
        days.push(record);
    }

    tracing::debug!(employee_id = %employee.id, year, month, ?rule, days = days.len(), "generated month");
    Ok(days)
}

/// Re-derive the engine-owned flag on rows read back from storage.
pub fn refresh_block_flags(employee: &Employee, records: &mut [DayRecord], holidays: &HolidayCalendar) {
    let profile = EmployeeProfile::new(employee);
    let rule = AnnotationRule::for_profile(&profile);
    for record in records {
        record.block_time_entry = annotate_with_rule(rule, &profile, record.date, holidays).block_time_entry;
    }
}

/// Days in the month (proleptic Gregorian)
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let invalid = || TimesheetError::InvalidMonth { year, month };
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .ok_or_else(invalid)
}

/// English name, as stored in work_days
pub fn weekday_english(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a stored English day name ("Monday"). Exact match only.
pub fn parse_weekday_english(name: &str) -> Option<Weekday> {
    match name {
        "Monday" => Some(Weekday::Mon),
        "Tuesday" => Some(Weekday::Tue),
        "Wednesday" => Some(Weekday::Wed),
        "Thursday" => Some(Weekday::Thu),
        "Friday" => Some(Weekday::Fri),
        "Saturday" => Some(Weekday::Sat),
        "Sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Portuguese display name
pub fn weekday_portuguese(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Segunda-feira",
        Weekday::Tue => "Terça-feira",
        Weekday::Wed => "Quarta-feira",
        Weekday::Thu => "Quinta-feira",
        Weekday::Fri => "Sexta-feira",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// Short form used in the day column ("Seg", "Sáb")
pub fn weekday_portuguese_short(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Seg",
        Weekday::Tue => "Ter",
        Weekday::Wed => "Qua",
        Weekday::Thu => "Qui",
        Weekday::Fri => "Sex",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}

/// Portuguese month name ("Outubro"). Empty outside 1..=12.
pub fn month_name_portuguese(month: u32) -> &'static str {
    match month {
        1 => "Janeiro",
        2 => "Fevereiro",
        3 => "Março",
        4 => "Abril",
        5 => "Maio",
        6 => "Junho",
        7 => "Julho",
        8 => "Agosto",
        9 => "Setembro",
        10 => "Outubro",
        11 => "Novembro",
        12 => "Dezembro",
        _ => "",
    }
}
