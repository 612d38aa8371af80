//! Human-friendly reminder time parsing for the command line.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Time of day used when only a date is given.
const DEFAULT_TIME: (u32, u32) = (9, 0);

/// Parse a reminder time relative to `now`.
///
/// Supports:
/// - "now"
/// - "in 10m", "in 2h", "in 3d", "in 1w"
/// - "today", "tomorrow", optionally followed by "HH:MM"
/// - weekday names ("fri", "friday 17:30"): the next such day, today included
/// - "YYYY-MM-DD HH:MM", "YYYY-MM-DDTHH:MM", "YYYY-MM-DD"
pub fn parse_when(input: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let s = input.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    if s == "now" {
        return Some(now);
    }

    if let Some(rest) = s.strip_prefix("in ") {
        return parse_offset(rest.trim()).and_then(|offset| now.checked_add_signed(offset));
    }

    let (day_word, time_part) = match s.split_once(' ') {
        Some((day, time)) => (day, Some(time.trim())),
        None => (s.as_str(), None),
    };
    let today = now.date_naive();

    let relative_day = match day_word {
        "today" => Some(today),
        "tomorrow" => Some(today + Duration::days(1)),
        other => weekday_offset(other, today),
    };
    if let Some(date) = relative_day {
        let time = match time_part {
            Some(t) => parse_time(t)?,
            None => now.time(),
        };
        return to_local(date.and_time(time));
    }

    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%dt%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, fmt) {
            return to_local(naive);
        }
    }
    let date = NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()?;
    let (h, m) = DEFAULT_TIME;
    to_local(date.and_time(NaiveTime::from_hms_opt(h, m, 0)?))
}

fn parse_offset(rest: &str) -> Option<Duration> {
    let unit = rest.chars().last()?;
    let amount: i64 = rest[..rest.len() - unit.len_utf8()].trim().parse().ok()?;
    if amount < 0 {
        return None;
    }
    match unit {
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        'w' => Duration::try_weeks(amount),
        _ => None,
    }
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

fn weekday_offset(name: &str, today: NaiveDate) -> Option<NaiveDate> {
    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let (_, target) = weekdays.iter().find(|(day, _)| *day == name)?;
    let current = today.weekday().num_days_from_monday() as i64;
    let days_ahead = (target + 7 - current) % 7;
    Some(today + Duration::days(days_ahead))
}

fn to_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&naive).earliest()
}
