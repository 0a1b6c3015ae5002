//! Punch time parsing and worked-hours calculation.
//!
//! Malformed input never raises: a pair that cannot be parsed simply
//! contributes no minutes.

/// Parse an `HH:MM` string into minutes since midnight.
///
/// Both parts must parse as integers. Anything else yields `None`.
pub fn parse_hhmm(value: &str) -> Option<i32> {
    let mut parts = value.split(':');
    let hours = parts.next()?.trim();
    let minutes = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// Minutes worked in one entry/exit pair.
/// Exit at or before entry contributes nothing (no overnight wraparound).
fn pair_minutes(entry: Option<&str>, exit: Option<&str>) -> i64 {
    match (entry.and_then(parse_hhmm), exit.and_then(parse_hhmm)) {
        (Some(start), Some(end)) if end > start => i64::from(end) - i64::from(start),
        _ => 0,
    }
}

/// Total worked hours for a day from up to two entry/exit pairs.
pub fn calculate_hours(
    entry_1: Option<&str>,
    exit_1: Option<&str>,
    entry_2: Option<&str>,
    exit_2: Option<&str>,
) -> f64 {
    let total_minutes = pair_minutes(entry_1, exit_1) + pair_minutes(entry_2, exit_2);
    let hours = total_minutes as f64 / 60.0;
    if hours.is_finite() && hours > 0.0 {
        hours
    } else {
        0.0
    }
}

/// Hours rendered with two decimals ("8.00"), as shown in the editing table.
pub fn format_hours(hours: f64) -> String {
    if hours.is_finite() {
        format!("{:.2}", hours)
    } else {
        "0.00".to_string()
    }
}
