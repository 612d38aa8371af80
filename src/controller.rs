//! State owned by the task list screen.
//!
//! A `ListController` is built when the list screen mounts and dropped when
//! it unmounts. It holds the task array and the draft fields, and mediates
//! between user input, the task store and the reminder scheduler. Mutations
//! update memory first; persistence is issued afterwards and never rolls the
//! in-memory list back.

use std::thread;

use chrono::{DateTime, Local, Utc};
use log::{error, info, warn};

use crate::config::AppConfig;
use crate::db::{SaveHandle, TaskStore};
use crate::error::StoreError;
use crate::notify::{NotificationContent, Notifier, Permission, Reminder};
use crate::task::{format_reminder_time, is_valid_text, Task};

/// Lifecycle of the list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    Loading,
    Idle,
}

/// Not-yet-committed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub when: DateTime<Local>,
}

/// User-facing advisory produced by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    PermissionDenied,
    ReminderSet { when: String },
    ReminderFired(Reminder),
}

impl Alert {
    pub fn title(&self) -> &str {
        match self {
            Alert::PermissionDenied => "Notifications",
            Alert::ReminderSet { .. } => "Reminder Set",
            Alert::ReminderFired(reminder) => &reminder.content.title,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Alert::PermissionDenied => "Enable notifications to get reminders!".to_string(),
            Alert::ReminderSet { when } => format!("Task reminder set for {when}"),
            Alert::ReminderFired(reminder) => reminder.content.body.clone(),
        }
    }

    /// Whether showing this alert should ring the terminal bell.
    pub fn wants_sound(&self) -> bool {
        matches!(self, Alert::ReminderFired(r) if r.content.sound)
    }
}

/// The slice of configuration the controller needs.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub date_format: String,
    pub sound: bool,
    pub cancel_on_delete: bool,
}

impl From<&AppConfig> for ControllerSettings {
    fn from(config: &AppConfig) -> Self {
        ControllerSettings {
            date_format: config.display.date_format.clone(),
            sound: config.notifications.sound,
            cancel_on_delete: config.notifications.cancel_on_delete,
        }
    }
}

/// Task list state for one mount of the list screen.
pub struct ListController {
    state: ScreenState,
    tasks: Vec<Task>,
    next_id: u64,
    draft: Draft,
    permission: Permission,
    alerts: Vec<Alert>,
    last_save: Option<SaveHandle>,
    settings: ControllerSettings,
    store: TaskStore,
    notifier: Box<dyn Notifier>,
}

impl ListController {
    /// Build a controller in the `Loading` state with an empty list.
    pub fn new(store: TaskStore, notifier: Box<dyn Notifier>, settings: ControllerSettings) -> Self {
        ListController {
            state: ScreenState::Loading,
            tasks: Vec::new(),
            next_id: 1,
            draft: Draft {
                text: String::new(),
                when: Local::now(),
            },
            permission: Permission::Denied,
            alerts: Vec::new(),
            last_save: None,
            settings,
            store,
            notifier,
        }
    }

    /// Build and immediately mount a controller.
    pub fn mounted(store: TaskStore, notifier: Box<dyn Notifier>, settings: ControllerSettings) -> Self {
        let mut controller = Self::new(store, notifier, settings);
        controller.mount();
        controller
    }

    /// Load tasks and request notification permission, then go `Idle`.
    ///
    /// The two requests are independent and run side by side; a denied
    /// permission only queues a one-time advisory. Mounting twice is a no-op.
    pub fn mount(&mut self) {
        if self.state == ScreenState::Idle {
            return;
        }

        let store = &self.store;
        let notifier = &mut self.notifier;
        let ((tasks, next_id), permission) = thread::scope(|s| {
            let loader = s.spawn(|| {
                let tasks = store.load();
                let next_id = store.next_task_id(&tasks);
                (tasks, next_id)
            });
            let permission = notifier.request_permission();
            let loaded = loader.join().unwrap_or_else(|_| {
                error!("event=tasks_load module=controller status=error error=loader_panicked");
                (Vec::new(), store.next_task_id(&[]))
            });
            (loaded, permission)
        });

        self.tasks = tasks;
        self.next_id = next_id;
        self.permission = permission;
        if permission == Permission::Denied {
            warn!("event=permission module=controller status=denied");
            self.alerts.push(Alert::PermissionDenied);
        }
        self.state = ScreenState::Idle;
        info!(
            "event=list_mount module=controller status=ok tasks={} permission={:?}",
            self.tasks.len(),
            permission
        );
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn set_draft_text(&mut self, text: &str) {
        self.draft.text = text.to_string();
    }

    /// Apply a picker result. `None` means the picker was dismissed.
    pub fn pick_date(&mut self, picked: Option<DateTime<Local>>) {
        if let Some(when) = picked {
            self.draft.when = when;
        }
    }

    /// Draft time rendered the way it will appear on the task.
    pub fn draft_date_label(&self) -> String {
        format_reminder_time(&self.draft.when, &self.settings.date_format)
    }

    /// Commit the draft as a new task.
    ///
    /// Returns the new task id, or `None` when the draft text is blank (in
    /// which case nothing changes).
    pub fn add_task(&mut self) -> Option<u64> {
        if !is_valid_text(&self.draft.text) {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.store.save_next_task_id(self.next_id);
        let when = self.draft.when;
        let text = std::mem::take(&mut self.draft.text);
        let task = Task::new(id, &text, &when, &self.settings.date_format);
        self.tasks.push(task);
        self.persist();

        let content = NotificationContent::for_task(&text, self.settings.sound);
        match self.notifier.schedule(Some(id), content, when) {
            Ok(reminder_id) => {
                info!("event=task_add module=controller status=ok id={id} reminder_id={reminder_id}");
                self.alerts.push(Alert::ReminderSet {
                    when: format_reminder_time(&when, &self.settings.date_format),
                });
            }
            Err(e) => {
                warn!("event=task_add module=controller status=reminder_failed id={id} error={e}");
            }
        }
        Some(id)
    }

    /// Remove the task at `index`. Out-of-range indices change nothing.
    pub fn remove_task(&mut self, index: usize) -> Option<Task> {
        if index >= self.tasks.len() {
            return None;
        }
        let removed = self.tasks.remove(index);
        self.persist();
        info!("event=task_remove module=controller status=ok id={} index={index}", removed.id);

        if self.settings.cancel_on_delete {
            if let Err(e) = self.notifier.cancel_for_task(removed.id) {
                warn!("event=reminder_cancel module=controller status=error id={} error={e}", removed.id);
            }
        }
        Some(removed)
    }

    /// Remove the task with a given id.
    pub fn remove_by_id(&mut self, id: u64) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        self.remove_task(index)
    }

    /// Deliver due reminders as alerts. Returns how many fired.
    pub fn poll_reminders(&mut self, now: DateTime<Utc>) -> usize {
        let due = self.notifier.take_due(now);
        let fired = due.len();
        self.alerts.extend(due.into_iter().map(Alert::ReminderFired));
        fired
    }

    /// Drain pending alerts, oldest first.
    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    /// Wait for the most recent save to land.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        match self.last_save.take() {
            Some(handle) => handle.wait(),
            None => Ok(()),
        }
    }

    fn persist(&mut self) {
        self.last_save = Some(self.store.save(&self.tasks));
    }
}
