//! TUI entry point and terminal setup.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::config::AppConfig;
use crate::db::KeyValueStore;
use crate::tui::app::App;

/// Initialise the terminal, run the app until the user quits, and restore
/// the terminal even when the app returns an error.
pub fn run_tui(config: AppConfig, kv: Arc<dyn KeyValueStore>) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, kv, Instant::now());
    let result = app.run(&mut terminal);
    // Drops the list controller, which drains queued saves.
    drop(app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
