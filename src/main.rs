//! # todo - Personal To-Do List with Reminders
//!
//! A single-user to-do list for the terminal. Each task carries a short text
//! and a reminder time; when that time arrives a local reminder fires with
//! the task text.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive UI (splash, then the task list)
//! todo
//!
//! # Add a task with a reminder in ten minutes
//! todo add "Buy milk" --at "in 10m"
//!
//! # List tasks, delete the second one
//! todo list
//! todo delete 2
//!
//! # Print reminders as they fire while the UI is closed
//! todo watch
//! ```
//!
//! ## Key Commands
//!
//! - `todo ui` - Interactive list with date picker and reminder alerts
//! - `todo add <text> [--at WHEN]` - Add a task and schedule its reminder
//! - `todo list` - Tasks in order with their positions and ids
//! - `todo delete <position> | --id <id>` - Remove one task
//! - `todo reminders` - Pending reminder queue
//! - `todo watch` - Foreground reminder delivery
//!
//! Tasks and reminders live as JSON slots (`tasks.json`, `reminders.json`)
//! in the data directory, by default `dirs::data_dir()/todo`. Settings are
//! read from `config.toml` in `dirs::config_dir()/todo`; logs are written to
//! `<data dir>/logs`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::error;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod logging;
pub mod notify;
pub mod task;
pub mod when;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod nav;
    pub mod picker;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{default_config_path, logs_dir, AppConfig};
use db::{FileKv, KeyValueStore};
use error::Result;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("event=command module=core status=error error={e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Completions need neither config nor storage
    if let Some(Commands::Completions { shell }) = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = AppConfig::load(&config_path)?;
    if let Some(dir) = cli.data_dir.clone() {
        config.storage.data_dir = Some(dir);
    }
    let data_dir: PathBuf = config.resolved_data_dir();

    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    if let Err(e) = logging::init_logging(&level, &logs_dir(&data_dir)) {
        eprintln!("Warning: file logging disabled: {e}");
    }

    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKv::new(&data_dir));
    let ctx = Context { config, kv };

    match cli.command {
        None | Some(Commands::Ui) => cmd_ui(ctx),
        Some(Commands::Add { text, at }) => cmd_add(&ctx, text, at),
        Some(Commands::List) => cmd_list(&ctx),
        Some(Commands::Delete { position, id }) => cmd_delete(&ctx, position, id),
        Some(Commands::Reminders) => cmd_reminders(&ctx),
        Some(Commands::Watch) => cmd_watch(&ctx),
        Some(Commands::Completions { .. }) => unreachable!("completions handled above"),
    }
}
