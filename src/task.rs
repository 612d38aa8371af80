//! Task data structure and related functionality.
//!
//! A `Task` is the only record the list persists. The stored form is a flat
//! JSON array of `{id, text, date}` objects; older lists written without an
//! `id` are still accepted and get ids assigned on load.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Display format for reminder times, matching the usual locale default
/// (`10/19/2026, 3:04:05 PM`).
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y, %-I:%M:%S %p";

/// A to-do item with its display text and formatted reminder time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier. `0` only appears transiently in legacy lists
    /// before `assign_missing_ids` runs.
    #[serde(default)]
    pub id: u64,
    pub text: String,
    pub date: String,
}

impl Task {
    /// Build a task from draft input, formatting the reminder time for display.
    pub fn new<Tz: TimeZone>(id: u64, text: &str, when: &DateTime<Tz>, date_format: &str) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Task {
            id,
            text: text.to_string(),
            date: format_reminder_time(when, date_format),
        }
    }
}

/// Whether draft text is acceptable as a task. Whitespace-only is rejected.
pub fn is_valid_text(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Format a point in time for display in the list and in alerts.
pub fn format_reminder_time<Tz: TimeZone>(when: &DateTime<Tz>, date_format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    when.format(date_format).to_string()
}

/// Next id for a new task: one past the largest id in the list.
pub fn next_id(tasks: &[Task]) -> u64 {
    tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
}

/// Give every task with `id == 0` a fresh id, in list order.
///
/// Returns `true` when anything changed so the caller can decide to re-save.
pub fn assign_missing_ids(tasks: &mut [Task]) -> bool {
    let mut next = next_id(tasks);
    let mut changed = false;
    for task in tasks.iter_mut().filter(|t| t.id == 0) {
        task.id = next;
        next += 1;
        changed = true;
    }
    changed
}
