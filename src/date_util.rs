use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Midnight at the start of the given day, as an absolute instant.
pub fn day_start(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

/// 23:59:59 of the given day, as an absolute instant.
pub fn day_end(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(23, 59, 59).unwrap().and_utc()
}

/// The Monday of the calendar week containing the given day.
pub fn week_monday(d: NaiveDate) -> NaiveDate {
    d - Duration::days(d.weekday().num_days_from_monday() as i64)
}

/// Get the first day of the month containing the given day.
pub fn month_first(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap()
}

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap() - Duration::days(1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap() - Duration::days(1)
    }
}

/// Round to one decimal place. Every rate/percentage in the payload
/// goes through this before serialization.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
