//! Local reminder scheduling.
//!
//! The `Notifier` trait is the boundary the list controller talks to. The
//! built-in `LocalScheduler` keeps a queue of one-shot reminders in the
//! `reminders` storage slot so they outlive the process, and hands due
//! reminders to whoever polls it (the TUI tick or `todo watch`).

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::db::{load_counter, KeyValueStore};
use crate::error::{NotifyError, StoreError};

/// Slot holding the pending reminder queue.
pub const REMINDERS_KEY: &str = "reminders";

/// Slot holding the next unused reminder id.
pub const REMINDER_SEQ_KEY: &str = "reminder_seq";

/// Title used for every task reminder.
pub const REMINDER_TITLE: &str = "Reminder";

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// What a delivered notification shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: bool,
}

impl NotificationContent {
    /// Content for a task reminder: body is `Task: <text>`.
    pub fn for_task(text: &str, sound: bool) -> Self {
        NotificationContent {
            title: REMINDER_TITLE.to_string(),
            body: format!("Task: {text}"),
            sound,
        }
    }
}

/// A pending or delivered one-shot reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: u64,
    /// Task the reminder belongs to, when known.
    #[serde(default)]
    pub task_id: Option<u64>,
    #[serde(flatten)]
    pub content: NotificationContent,
    pub fire_at: DateTime<Utc>,
}

/// Something that can hold and deliver local reminders.
pub trait Notifier {
    /// Ask whether reminders may be shown.
    fn request_permission(&mut self) -> Permission;

    /// Arrange a one-shot alert at `fire_at`.
    fn schedule(
        &mut self,
        task_id: Option<u64>,
        content: NotificationContent,
        fire_at: DateTime<Local>,
    ) -> Result<u64, NotifyError>;

    /// Drop every pending reminder for a task. Returns how many were dropped.
    fn cancel_for_task(&mut self, task_id: u64) -> Result<usize, NotifyError>;

    /// Remove and return every reminder due at `now`, earliest first.
    fn take_due(&mut self, now: DateTime<Utc>) -> Vec<Reminder>;
}

/// In-process scheduler whose queue is persisted in a storage slot.
pub struct LocalScheduler {
    kv: Arc<dyn KeyValueStore>,
    enabled: bool,
    permission: Option<Permission>,
    queue: Vec<Reminder>,
    next_id: u64,
}

impl LocalScheduler {
    /// Open the scheduler, loading any reminders left by a previous run.
    ///
    /// `enabled = false` makes every permission request come back denied.
    pub fn open(kv: Arc<dyn KeyValueStore>, enabled: bool) -> Self {
        let queue = match load_queue(kv.as_ref()) {
            Ok(queue) => queue,
            Err(e) => {
                error!("event=reminders_load module=notify status=error error={e}");
                Vec::new()
            }
        };
        debug!(
            "event=reminders_load module=notify status=ok pending={} enabled={}",
            queue.len(),
            enabled
        );
        let next_id = queue
            .iter()
            .map(|r| r.id + 1)
            .max()
            .unwrap_or(1)
            .max(load_counter(kv.as_ref(), REMINDER_SEQ_KEY));
        LocalScheduler {
            kv,
            enabled,
            permission: None,
            queue,
            next_id,
        }
    }

    /// Snapshot of the pending queue, earliest first.
    pub fn pending(&self) -> Vec<Reminder> {
        let mut pending = self.queue.clone();
        pending.sort_by_key(|r| (r.fire_at, r.id));
        pending
    }

    fn persist(&self) -> Result<(), StoreError> {
        let payload = serde_json::to_string_pretty(&self.queue).map_err(|source| StoreError::Encode {
            key: REMINDERS_KEY.to_string(),
            source,
        })?;
        self.kv.set(REMINDERS_KEY, &payload)
    }
}

impl Notifier for LocalScheduler {
    fn request_permission(&mut self) -> Permission {
        let permission = if self.enabled {
            Permission::Granted
        } else {
            Permission::Denied
        };
        self.permission = Some(permission);
        permission
    }

    fn schedule(
        &mut self,
        task_id: Option<u64>,
        content: NotificationContent,
        fire_at: DateTime<Local>,
    ) -> Result<u64, NotifyError> {
        if !self.enabled || self.permission == Some(Permission::Denied) {
            return Err(NotifyError::PermissionDenied);
        }
        let reminder = Reminder {
            id: self.next_id,
            task_id,
            content,
            fire_at: fire_at.with_timezone(&Utc),
        };
        let id = reminder.id;
        self.queue.push(reminder);
        if let Err(e) = self.persist() {
            self.queue.retain(|r| r.id != id);
            return Err(e.into());
        }
        self.next_id += 1;
        if let Err(e) = self.kv.set(REMINDER_SEQ_KEY, &self.next_id.to_string()) {
            warn!("event=reminder_seq_persist module=notify status=error error={e}");
        }
        info!("event=reminder_scheduled module=notify status=ok id={id} fire_at={}", fire_at.to_rfc3339());
        Ok(id)
    }

    fn cancel_for_task(&mut self, task_id: u64) -> Result<usize, NotifyError> {
        let before = self.queue.len();
        self.queue.retain(|r| r.task_id != Some(task_id));
        let dropped = before - self.queue.len();
        if dropped > 0 {
            self.persist()?;
            info!("event=reminder_cancelled module=notify status=ok task_id={task_id} count={dropped}");
        }
        Ok(dropped)
    }

    fn take_due(&mut self, now: DateTime<Utc>) -> Vec<Reminder> {
        let (mut due, rest): (Vec<Reminder>, Vec<Reminder>) =
            self.queue.drain(..).partition(|r| r.fire_at <= now);
        self.queue = rest;
        if due.is_empty() {
            return due;
        }
        due.sort_by_key(|r| (r.fire_at, r.id));
        if let Err(e) = self.persist() {
            // Delivered reminders may come back after a restart.
            warn!("event=reminders_persist module=notify status=error error={e}");
        }
        info!("event=reminders_due module=notify status=ok count={}", due.len());
        due
    }
}

fn load_queue(kv: &dyn KeyValueStore) -> Result<Vec<Reminder>, StoreError> {
    let Some(buf) = kv.get(REMINDERS_KEY)? else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&buf).map_err(|source| StoreError::Decode {
        key: REMINDERS_KEY.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FileKv, MemoryKv};
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, h, m, 0).unwrap()
    }

    fn granted(kv: Arc<dyn KeyValueStore>) -> LocalScheduler {
        let mut s = LocalScheduler::open(kv, true);
        assert_eq!(s.request_permission(), Permission::Granted);
        s
    }

    #[test]
    fn test_content_for_task() {
        let c = NotificationContent::for_task("Buy milk", true);
        assert_eq!(c.title, "Reminder");
        assert_eq!(c.body, "Task: Buy milk");
        assert!(c.sound);
    }

    #[test]
    fn test_disabled_scheduler_denies() {
        let mut s = LocalScheduler::open(Arc::new(MemoryKv::new()), false);
        assert_eq!(s.request_permission(), Permission::Denied);
        let err = s
            .schedule(Some(1), NotificationContent::for_task("A", true), at(12, 0))
            .unwrap_err();
        assert!(matches!(err, NotifyError::PermissionDenied));
        assert!(s.pending().is_empty());
    }

    #[test]
    fn test_fires_once_at_time() {
        let mut s = granted(Arc::new(MemoryKv::new()));
        s.schedule(Some(1), NotificationContent::for_task("A", true), at(12, 0))
            .unwrap();

        let before = at(11, 59).with_timezone(&Utc);
        assert!(s.take_due(before).is_empty());

        let due = s.take_due(at(12, 0).with_timezone(&Utc));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].content.body, "Task: A");

        assert!(s.take_due(at(13, 0).with_timezone(&Utc)).is_empty());
    }

    #[test]
    fn test_past_trigger_fires_on_next_poll() {
        let mut s = granted(Arc::new(MemoryKv::new()));
        let past = Local::now() - Duration::hours(1);
        s.schedule(None, NotificationContent::for_task("late", false), past)
            .unwrap();
        assert_eq!(s.take_due(Utc::now()).len(), 1);
    }

    #[test]
    fn test_due_reminders_come_back_in_time_order() {
        let mut s = granted(Arc::new(MemoryKv::new()));
        s.schedule(Some(1), NotificationContent::for_task("second", true), at(12, 30))
            .unwrap();
        s.schedule(Some(2), NotificationContent::for_task("first", true), at(12, 10))
            .unwrap();
        let due = s.take_due(at(13, 0).with_timezone(&Utc));
        let bodies: Vec<&str> = due.iter().map(|r| r.content.body.as_str()).collect();
        assert_eq!(bodies, vec!["Task: first", "Task: second"]);
    }

    #[test]
    fn test_queue_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut s = granted(Arc::new(FileKv::new(dir.path())));
            s.schedule(Some(3), NotificationContent::for_task("A", true), at(12, 0))
                .unwrap();
        }
        let mut reopened = LocalScheduler::open(Arc::new(FileKv::new(dir.path())), true);
        let pending = reopened.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].fire_at, at(12, 0).with_timezone(&Utc));

        reopened.take_due(at(12, 1).with_timezone(&Utc));
        let again = LocalScheduler::open(Arc::new(FileKv::new(dir.path())), true);
        assert!(again.pending().is_empty());
    }

    #[test]
    fn test_reminder_ids_are_not_reused() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());
        let mut s = granted(Arc::clone(&kv));
        let first = s
            .schedule(Some(1), NotificationContent::for_task("A", true), at(12, 0))
            .unwrap();
        assert_eq!(s.take_due(at(12, 0).with_timezone(&Utc)).len(), 1);
        let second = s
            .schedule(Some(2), NotificationContent::for_task("B", true), at(12, 0))
            .unwrap();
        assert_ne!(first, second);

        s.take_due(at(12, 0).with_timezone(&Utc));
        let mut reopened = granted(kv);
        let third = reopened
            .schedule(Some(3), NotificationContent::for_task("C", true), at(12, 0))
            .unwrap();
        assert!(third > second);
    }

    #[test]
    fn test_cancel_for_task() {
        let mut s = granted(Arc::new(MemoryKv::new()));
        s.schedule(Some(1), NotificationContent::for_task("A", true), at(12, 0))
            .unwrap();
        s.schedule(Some(2), NotificationContent::for_task("B", true), at(12, 0))
            .unwrap();
        assert_eq!(s.cancel_for_task(1).unwrap(), 1);
        assert_eq!(s.cancel_for_task(1).unwrap(), 0);
        let left: Vec<Option<u64>> = s.pending().iter().map(|r| r.task_id).collect();
        assert_eq!(left, vec![Some(2)]);
    }

    #[test]
    fn test_corrupt_queue_starts_empty() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(REMINDERS_KEY, "[[[").unwrap();
        let s = LocalScheduler::open(kv, true);
        assert!(s.pending().is_empty());
    }
}
