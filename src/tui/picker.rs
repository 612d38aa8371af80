//! Date and time picker modal.
//!
//! The picker edits a local date-time one segment at a time. Confirming hands
//! back the chosen time; dismissing hands back nothing and the caller keeps
//! its previous value.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Timelike};
use crossterm::event::KeyCode;

/// Editable part of the date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

const SEGMENTS: [Segment; 5] = [
    Segment::Year,
    Segment::Month,
    Segment::Day,
    Segment::Hour,
    Segment::Minute,
];

/// What a key press did to the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerResult {
    Open,
    Picked(DateTime<Local>),
    Dismissed,
}

/// Picker state: the candidate value and the focused segment.
#[derive(Debug, Clone)]
pub struct DateTimePicker {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    segment: usize,
}

impl DateTimePicker {
    /// Open the picker on an existing value. Seconds are dropped.
    pub fn new(value: DateTime<Local>) -> Self {
        DateTimePicker {
            year: value.year(),
            month: value.month(),
            day: value.day(),
            hour: value.hour(),
            minute: value.minute(),
            segment: 0,
        }
    }

    pub fn segment(&self) -> Segment {
        SEGMENTS[self.segment]
    }

    /// Candidate fields as `(year, month, day, hour, minute)`.
    pub fn fields(&self) -> (i32, u32, u32, u32, u32) {
        (self.year, self.month, self.day, self.hour, self.minute)
    }

    pub fn handle_key(&mut self, key: KeyCode) -> PickerResult {
        match key {
            KeyCode::Left | KeyCode::BackTab => {
                self.segment = (self.segment + SEGMENTS.len() - 1) % SEGMENTS.len();
            }
            KeyCode::Right | KeyCode::Tab => {
                self.segment = (self.segment + 1) % SEGMENTS.len();
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('+') => self.adjust(1),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('-') => self.adjust(-1),
            KeyCode::Enter => {
                return match self.value() {
                    Some(value) => PickerResult::Picked(value),
                    // Inside a DST gap; the wall-clock time does not exist.
                    None => PickerResult::Dismissed,
                };
            }
            KeyCode::Esc => return PickerResult::Dismissed,
            _ => {}
        }
        PickerResult::Open
    }

    /// Step the focused segment, wrapping within its range.
    pub fn adjust(&mut self, delta: i32) {
        match self.segment() {
            Segment::Year => {
                self.year = (self.year + delta).clamp(1970, 9999);
            }
            Segment::Month => {
                self.month = wrap(self.month, delta, 1, 12);
            }
            Segment::Day => {
                self.day = wrap(self.day, delta, 1, days_in_month(self.year, self.month));
            }
            Segment::Hour => {
                self.hour = wrap(self.hour, delta, 0, 23);
            }
            Segment::Minute => {
                self.minute = wrap(self.minute, delta, 0, 59);
            }
        }
        self.day = self.day.min(days_in_month(self.year, self.month));
    }

    /// The candidate as a local time, if it exists on the wall clock.
    pub fn value(&self) -> Option<DateTime<Local>> {
        let naive = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, 0)?;
        Local.from_local_datetime(&naive).earliest()
    }
}

fn wrap(value: u32, delta: i32, min: u32, max: u32) -> u32 {
    let span = (max - min + 1) as i64;
    let offset = (value as i64 - min as i64 + delta as i64).rem_euclid(span);
    min + offset as u32
}

/// Number of days in a month, accounting for leap years.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker_at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTimePicker {
        DateTimePicker::new(Local.with_ymd_and_hms(y, mo, d, h, mi, 42).unwrap())
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 1), 31);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 4), 30);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_confirm_drops_seconds() {
        let mut picker = picker_at(2026, 10, 19, 12, 5);
        let picked = picker.handle_key(KeyCode::Enter);
        assert_eq!(
            picked,
            PickerResult::Picked(Local.with_ymd_and_hms(2026, 10, 19, 12, 5, 0).unwrap())
        );
    }

    #[test]
    fn test_escape_dismisses() {
        let mut picker = picker_at(2026, 10, 19, 12, 5);
        picker.handle_key(KeyCode::Up);
        assert_eq!(picker.handle_key(KeyCode::Esc), PickerResult::Dismissed);
    }

    #[test]
    fn test_segments_cycle() {
        let mut picker = picker_at(2026, 10, 19, 12, 5);
        assert_eq!(picker.segment(), Segment::Year);
        picker.handle_key(KeyCode::Left);
        assert_eq!(picker.segment(), Segment::Minute);
        picker.handle_key(KeyCode::Right);
        picker.handle_key(KeyCode::Right);
        assert_eq!(picker.segment(), Segment::Month);
    }

    #[test]
    fn test_minute_and_hour_wrap() {
        let mut picker = picker_at(2026, 10, 19, 23, 59);
        picker.handle_key(KeyCode::Left); // minute
        picker.handle_key(KeyCode::Up);
        assert_eq!(picker.fields().4, 0);
        picker.handle_key(KeyCode::Left); // hour
        picker.handle_key(KeyCode::Up);
        assert_eq!(picker.fields().3, 0);
        picker.handle_key(KeyCode::Down);
        assert_eq!(picker.fields().3, 23);
    }

    #[test]
    fn test_month_change_clamps_day() {
        let mut picker = picker_at(2026, 1, 31, 9, 0);
        picker.handle_key(KeyCode::Right); // month
        picker.handle_key(KeyCode::Up);
        assert_eq!(picker.fields(), (2026, 2, 28, 9, 0));
        picker.handle_key(KeyCode::Down);
        assert_eq!(picker.fields(), (2026, 1, 28, 9, 0));
    }

    #[test]
    fn test_day_wraps_within_month() {
        let mut picker = picker_at(2028, 2, 29, 9, 0);
        picker.handle_key(KeyCode::Right);
        picker.handle_key(KeyCode::Right); // day
        picker.handle_key(KeyCode::Up);
        assert_eq!(picker.fields().2, 1);
        picker.handle_key(KeyCode::Down);
        assert_eq!(picker.fields().2, 29);
    }

    #[test]
    fn test_leap_day_clamped_when_year_changes() {
        let mut picker = picker_at(2028, 2, 29, 9, 0);
        picker.handle_key(KeyCode::Up); // year
        assert_eq!(picker.fields(), (2029, 2, 28, 9, 0));
    }
}
