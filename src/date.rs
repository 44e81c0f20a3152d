//! Date formatting and comparison helpers built on chrono.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Template applied by [`format_date`] when the caller passes it explicitly;
/// exposed so callers can reuse the default.
pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD HH:mm:ss";

/// Render a timestamp through a token template.
///
/// Recognized tokens (first occurrence replaced): `YYYY`, `MM`, `DD`, `HH`,
/// `mm`, `ss`. Month/day/hour/minute/second are zero-padded to two digits.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use satchel::date::{format_date, DEFAULT_DATE_FORMAT};
/// let dt = Utc.with_ymd_and_hms(2024, 3, 5, 8, 9, 7).unwrap();
/// assert_eq!(format_date(dt, DEFAULT_DATE_FORMAT), "2024-03-05 08:09:07");
/// assert_eq!(format_date(dt, "DD/MM/YYYY"), "05/03/2024");
/// ```
pub fn format_date(dt: DateTime<Utc>, template: &str) -> String {
    template
        .replacen("YYYY", &format!("{:04}", dt.year()), 1)
        .replacen("MM", &format!("{:02}", dt.month()), 1)
        .replacen("DD", &format!("{:02}", dt.day()), 1)
        .replacen("HH", &format!("{:02}", dt.hour()), 1)
        .replacen("mm", &format!("{:02}", dt.minute()), 1)
        .replacen("ss", &format!("{:02}", dt.second()), 1)
}

/// Human-readable description of how long ago `then` was, relative to `now`.
///
/// Buckets: under a minute is "just now", then minutes, hours, days, months
/// (over 30 days), years (over 365 days). A `then` in the future is treated
/// as "just now".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(then).num_seconds();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 365 {
        plural(days / 365, "year")
    } else if days > 30 {
        plural(days / 30, "month")
    } else if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        "just now".to_string()
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Whether two timestamps fall on the same calendar day (UTC).
pub fn is_same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}
