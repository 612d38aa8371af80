//! Command implementations for the CLI interface.
//!
//! Every command works on the same storage slots as the interactive UI and
//! goes through the same list controller, so a task added here behaves
//! exactly like one added on the list screen.

use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::config::AppConfig;
use crate::controller::{Alert, ControllerSettings, ListController};
use crate::db::{KeyValueStore, TaskStore};
use crate::error::{AppError, Result};
use crate::notify::{LocalScheduler, Notifier, Reminder};
use crate::task::{format_reminder_time, is_valid_text, Task};
use crate::tui::run::run_tui;
use crate::when::parse_when;

/// How often `watch` checks the reminder queue.
const WATCH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (the default).
    Ui,

    /// Add a task and schedule its reminder.
    Add {
        /// What needs doing.
        text: String,
        /// Reminder time: "now", "in 10m", "in 2h", "tomorrow 09:00",
        /// "fri 17:30", "YYYY-MM-DD HH:MM". Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// List tasks in order.
    List,

    /// Delete a task by its position in `list` or by id.
    Delete {
        /// 1-based position as shown by `list`.
        #[arg(required_unless_present = "id")]
        position: Option<usize>,
        /// Stable task id.
        #[arg(long, conflicts_with = "position")]
        id: Option<u64>,
    },

    /// Show pending reminders.
    Reminders,

    /// Stay in the foreground and print reminders as they fire.
    Watch,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// What every command needs: settings and the storage both sides share.
pub struct Context {
    pub config: AppConfig,
    pub kv: Arc<dyn KeyValueStore>,
}

impl Context {
    fn mount(&self) -> Result<ListController> {
        let store = TaskStore::open(Arc::clone(&self.kv))?;
        let scheduler = LocalScheduler::open(Arc::clone(&self.kv), self.config.notifications.enabled);
        Ok(ListController::mounted(
            store,
            Box::new(scheduler),
            ControllerSettings::from(&self.config),
        ))
    }

    fn date_format(&self) -> &str {
        &self.config.display.date_format
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(ctx: Context) -> Result<()> {
    run_tui(ctx.config, ctx.kv)?;
    Ok(())
}

/// Add a task, scheduling a reminder at `at` (or now).
pub fn cmd_add(ctx: &Context, text: String, at: Option<String>) -> Result<()> {
    if !is_valid_text(&text) {
        return Err(AppError::Input("Task text cannot be empty".to_string()));
    }
    let now = Local::now();
    let when = match at {
        Some(raw) => parse_when(&raw, now).ok_or_else(|| {
            AppError::Input(format!(
                "Could not understand time '{raw}'. Try \"in 10m\", \"tomorrow 09:00\" or \"2026-12-24 18:00\""
            ))
        })?,
        None => now,
    };

    let mut controller = ctx.mount()?;
    controller.pick_date(Some(when));
    controller.set_draft_text(&text);
    let id = controller
        .add_task()
        .ok_or_else(|| AppError::Input("Task text cannot be empty".to_string()))?;
    controller.flush()?;

    for alert in controller.take_alerts() {
        print_alert(&alert);
    }
    println!("Added task {id}");
    Ok(())
}

/// Print every task with its position and id.
pub fn cmd_list(ctx: &Context) -> Result<()> {
    let store = TaskStore::open(Arc::clone(&ctx.kv))?;
    let tasks = store.load();
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    print_tasks(&tasks);
    Ok(())
}

/// Delete one task by position (1-based) or id.
pub fn cmd_delete(ctx: &Context, position: Option<usize>, id: Option<u64>) -> Result<()> {
    let mut controller = ctx.mount()?;
    let removed = match (position, id) {
        (_, Some(id)) => controller
            .remove_by_id(id)
            .ok_or_else(|| AppError::Input(format!("No task with id {id}")))?,
        (Some(pos), None) => pos
            .checked_sub(1)
            .and_then(|index| controller.remove_task(index))
            .ok_or_else(|| AppError::Input(format!("No task at position {pos}")))?,
        (None, None) => return Err(AppError::Input("Give a position or --id".to_string())),
    };
    controller.flush()?;
    println!("Deleted \"{}\"", removed.text);
    Ok(())
}

/// Print the pending reminder queue.
pub fn cmd_reminders(ctx: &Context) -> Result<()> {
    let scheduler = LocalScheduler::open(Arc::clone(&ctx.kv), ctx.config.notifications.enabled);
    let pending = scheduler.pending();
    if pending.is_empty() {
        println!("No pending reminders.");
        return Ok(());
    }
    println!("{:<5} {:<6} {:<26} {}", "ID", "Task", "Fires", "Message");
    for reminder in pending {
        let task = reminder.task_id.map_or_else(|| "-".to_string(), |id| id.to_string());
        println!(
            "{:<5} {:<6} {:<26} {}",
            reminder.id,
            task,
            format_reminder_time(&reminder.fire_at.with_timezone(&Local), ctx.date_format()),
            truncate(&reminder.content.body, 60)
        );
    }
    Ok(())
}

/// Poll the reminder queue forever, printing reminders as they fall due.
pub fn cmd_watch(ctx: &Context) -> Result<()> {
    println!("Watching for reminders. Press Ctrl+C to stop.");
    let mut stdout = io::stdout();
    loop {
        deliver_due(ctx, Utc::now(), &mut stdout)?;
        thread::sleep(WATCH_INTERVAL);
    }
}

/// One `watch` round: print every reminder due at `now` and drop it from the
/// queue. Returns how many were delivered.
pub fn deliver_due(ctx: &Context, now: DateTime<Utc>, out: &mut impl Write) -> Result<usize> {
    // Reopen each round so reminders added elsewhere are picked up.
    let mut scheduler = LocalScheduler::open(Arc::clone(&ctx.kv), ctx.config.notifications.enabled);
    let due = scheduler.take_due(now);
    for reminder in &due {
        writeln!(out, "{}", describe_reminder(reminder, ctx.date_format()))?;
        if reminder.content.sound {
            out.write_all(b"\x07")?;
        }
    }
    out.flush()?;
    Ok(due.len())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}

fn print_alert(alert: &Alert) {
    match alert {
        Alert::PermissionDenied => eprintln!("{}: {}", alert.title(), alert.message()),
        _ => println!("{}: {}", alert.title(), alert.message()),
    }
}

/// One line for a delivered reminder.
pub fn describe_reminder(reminder: &Reminder, date_format: &str) -> String {
    format!(
        "[{}] {}: {}",
        format_reminder_time(&reminder.fire_at.with_timezone(&Local), date_format),
        reminder.content.title,
        reminder.content.body
    )
}

/// Print tasks as a table with 1-based positions.
pub fn print_tasks(tasks: &[Task]) {
    println!("{:<4} {:<5} {:<26} {}", "#", "ID", "Reminder", "Task");
    for (i, t) in tasks.iter().enumerate() {
        println!("{:<4} {:<5} {:<26} {}", i + 1, t.id, truncate(&t.date, 26), t.text);
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryKv;
    use crate::notify::NotificationContent;
    use chrono::TimeZone;

    fn ctx() -> Context {
        Context {
            config: AppConfig::default(),
            kv: Arc::new(MemoryKv::new()),
        }
    }

    fn tasks(ctx: &Context) -> Vec<Task> {
        TaskStore::open(Arc::clone(&ctx.kv)).unwrap().load()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is too long", 8), "this is…");
    }

    #[test]
    fn test_add_persists_and_schedules() {
        let ctx = ctx();
        cmd_add(&ctx, "Buy milk".to_string(), Some("2030-01-02 09:30".to_string())).unwrap();
        let stored = tasks(&ctx);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "Buy milk");
        assert_eq!(stored[0].date, "01/02/2030, 9:30:00 AM");

        let pending = LocalScheduler::open(Arc::clone(&ctx.kv), true).pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].task_id, Some(stored[0].id));
        assert_eq!(pending[0].content.body, "Task: Buy milk");
    }

    #[test]
    fn test_add_rejects_blank_and_bad_time() {
        let ctx = ctx();
        assert!(matches!(cmd_add(&ctx, "  ".to_string(), None), Err(AppError::Input(_))));
        assert!(matches!(
            cmd_add(&ctx, "A".to_string(), Some("whenever".to_string())),
            Err(AppError::Input(_))
        ));
        assert!(tasks(&ctx).is_empty());
    }

    #[test]
    fn test_delete_by_position_and_id() {
        let ctx = ctx();
        for text in ["A", "B", "C"] {
            cmd_add(&ctx, text.to_string(), None).unwrap();
        }
        cmd_delete(&ctx, Some(2), None).unwrap();
        let texts: Vec<String> = tasks(&ctx).into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["A", "C"]);

        let c_id = tasks(&ctx)[1].id;
        cmd_delete(&ctx, None, Some(c_id)).unwrap();
        assert_eq!(tasks(&ctx).len(), 1);

        assert!(cmd_delete(&ctx, Some(0), None).is_err());
        assert!(cmd_delete(&ctx, Some(9), None).is_err());
        assert!(cmd_delete(&ctx, None, Some(c_id)).is_err());
        assert_eq!(tasks(&ctx).len(), 1);
    }

    #[test]
    fn test_watch_round_delivers_due_reminders_once() {
        let ctx = ctx();
        cmd_add(&ctx, "Buy milk".to_string(), Some("2030-01-02 09:30".to_string())).unwrap();
        let fire_at = Local.with_ymd_and_hms(2030, 1, 2, 9, 30, 0).unwrap().with_timezone(&Utc);

        let mut out = Vec::new();
        assert_eq!(deliver_due(&ctx, fire_at - chrono::Duration::minutes(1), &mut out).unwrap(), 0);
        assert!(out.is_empty());

        assert_eq!(deliver_due(&ctx, fire_at, &mut out).unwrap(), 1);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("[01/02/2030, 9:30:00 AM] Reminder: Task: Buy milk\n"));
        assert!(printed.ends_with('\x07'));

        let mut again = Vec::new();
        assert_eq!(deliver_due(&ctx, fire_at, &mut again).unwrap(), 0);
        assert!(LocalScheduler::open(Arc::clone(&ctx.kv), true).pending().is_empty());
    }

    #[test]
    fn test_describe_reminder() {
        let reminder = Reminder {
            id: 1,
            task_id: Some(1),
            content: NotificationContent::for_task("Buy milk", true),
            fire_at: Local.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap().with_timezone(&Utc),
        };
        assert_eq!(
            describe_reminder(&reminder, crate::task::DEFAULT_DATE_FORMAT),
            "[10/19/2026, 6:00:00 PM] Reminder: Task: Buy milk"
        );
    }
}
