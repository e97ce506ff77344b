use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::date_util::{day_end, day_start, last_day_of_month, month_first, week_monday};

/// The caller-selected reporting period. Drives both date-range resolution
/// and the trend bucket shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
    Custom,
}

impl Period {
    /// Parse a period keyword. Anything unrecognized falls back to `week`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "today" => Period::Today,
            "month" => Period::Month,
            "custom" => Period::Custom,
            _ => Period::Week,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Custom => "custom",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Week
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An absolute time window with inclusive boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t <= self.end
    }

    pub fn contains_date(&self, d: NaiveDate) -> bool {
        d >= self.start.date_naive() && d <= self.end.date_naive()
    }

    /// Whole days between start and end (6 for a Mon–Sun week).
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The comparison window: both boundaries shifted back by the window
    /// length (`max(1, span+1)` days).
    pub fn previous(&self) -> DateRange {
        let length = (self.span_days() + 1).max(1);
        DateRange {
            start: self.start - Duration::days(length),
            end: self.end - Duration::days(length),
        }
    }
}

/// Resolve a period keyword (plus optional custom boundary dates) into an
/// absolute window relative to the injected `now`.
///
/// - `today` — 00:00:00 to 23:59:59 of the current day
/// - `week` — Monday 00:00 through Sunday 23:59:59 of the current week
/// - `month` — first through last day of the current month
/// - `custom` — `date_from` at 00:00 (else start of current month) through
///   `date_to` at 23:59:59 (else end of current day)
pub fn resolve(
    period: Period,
    date_from: Option<&str>,
    date_to: Option<&str>,
    now: DateTime<Utc>,
) -> DateRange {
    let today = now.date_naive();
    match period {
        Period::Today => DateRange {
            start: day_start(today),
            end: day_end(today),
        },
        Period::Week => {
            let monday = week_monday(today);
            DateRange {
                start: day_start(monday),
                end: day_end(monday + Duration::days(6)),
            }
        }
        Period::Month => DateRange {
            start: day_start(month_first(today)),
            end: day_end(last_day_of_month(today.year(), today.month())),
        },
        Period::Custom => {
            let start = parse_boundary(date_from)
                .map(day_start)
                .unwrap_or_else(|| day_start(month_first(today)));
            let end = parse_boundary(date_to)
                .map(day_end)
                .unwrap_or_else(|| day_end(today));
            DateRange { start, end }
        }
    }
}

/// Parse an ISO date boundary. Malformed input is treated as absent so the
/// resolver always yields a usable window.
fn parse_boundary(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(e) => {
            log::warn!("Ignoring unparseable filter date {s:?}: {e}");
            None
        }
    }
}
