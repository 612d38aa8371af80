use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Personal to-do list with local reminders.
/// Runs the interactive UI when no command is given.
#[derive(Parser)]
#[command(name = "todo", version, about = "Personal to-do list with reminders")]
pub struct Cli {
    /// Directory holding the task and reminder slots.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override: error | warn | info | debug | trace | off.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
