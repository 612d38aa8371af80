//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the navigator, mounts
//! and unmounts the list controller as its screen enters and leaves the
//! stack, routes key presses to the visible screen or modal, and renders
//! the splash, list and settings screens.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::error;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::config::AppConfig;
use crate::controller::{Alert, ControllerSettings, ListController, ScreenState};
use crate::db::{KeyValueStore, TaskStore};
use crate::notify::{LocalScheduler, Permission};
use crate::tui::{
    colors::{BERRY, MUTED_GRAY, NIGHT_BLUE, SPLASH_RED},
    enums::{Focus, Route},
    input::InputField,
    nav::{Navigator, SplashTimer, SPLASH_DELAY},
    picker::{DateTimePicker, PickerResult, Segment},
    utils::centered_rect,
};

/// Interval between reminder polls and splash checks.
const TICK_RATE: Duration = Duration::from_millis(250);

/// Terminal application state.
pub struct App {
    navigator: Navigator,
    splash: SplashTimer,
    config: AppConfig,
    kv: Arc<dyn KeyValueStore>,
    controller: Option<ListController>,
    input: InputField,
    focus: Focus,
    picker: Option<DateTimePicker>,
    alerts: VecDeque<Alert>,
    list_state: TableState,
    status_message: String,
    bell_pending: bool,
}

impl App {
    /// Create the app on the splash screen.
    pub fn new(config: AppConfig, kv: Arc<dyn KeyValueStore>, started: Instant) -> Self {
        App {
            navigator: Navigator::new(Route::Splash),
            splash: SplashTimer::start(started, SPLASH_DELAY),
            config,
            kv,
            controller: None,
            input: InputField::new(),
            focus: Focus::Input,
            picker: None,
            alerts: VecDeque::new(),
            list_state: TableState::default(),
            status_message: String::new(),
            bell_pending: false,
        }
    }

    pub fn route(&self) -> Route {
        self.navigator.current()
    }

    pub fn controller(&self) -> Option<&ListController> {
        self.controller.as_ref()
    }

    pub fn front_alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    pub fn picker_open(&self) -> bool {
        self.picker.is_some()
    }

    /// Whether a reminder asked for the terminal bell since the last call.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    /// Mount the list controller when its screen is on the stack, drop it
    /// when it is not.
    fn sync_mounts(&mut self) {
        let list_mounted = self.navigator.contains(Route::TodoList);
        if list_mounted && self.controller.is_none() {
            self.mount_list();
        } else if !list_mounted && self.controller.is_some() {
            self.controller = None;
        }
    }

    fn mount_list(&mut self) {
        let store = match TaskStore::open(Arc::clone(&self.kv)) {
            Ok(store) => store,
            Err(e) => {
                error!("event=list_mount module=tui status=error error={e}");
                self.status_message = format!("Could not open task storage: {e}");
                return;
            }
        };
        let scheduler = LocalScheduler::open(Arc::clone(&self.kv), self.config.notifications.enabled);
        let controller = ListController::mounted(
            store,
            Box::new(scheduler),
            ControllerSettings::from(&self.config),
        );
        self.input = InputField::with_value(&controller.draft().text);
        self.focus = Focus::Input;
        self.controller = Some(controller);
        self.clamp_selection();
        self.collect_alerts();
    }

    /// Advance timers: hand off from the splash screen and deliver reminders.
    pub fn tick(&mut self, now: Instant, wall: DateTime<Utc>) {
        if self.navigator.current() == Route::Splash && self.splash.is_done(now) {
            self.navigator.replace(Route::TodoList);
            self.sync_mounts();
        }
        if let Some(controller) = self.controller.as_mut() {
            controller.poll_reminders(wall);
        }
        self.collect_alerts();
    }

    fn collect_alerts(&mut self) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        for alert in controller.take_alerts() {
            if alert.wants_sound() {
                self.bell_pending = true;
            }
            self.alerts.push_back(alert);
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.controller().map_or(0, |c| c.tasks().len());
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None if self.focus == Focus::List => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    /// Route a key press. Returns `true` when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        self.status_message.clear();

        if !self.alerts.is_empty() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.alerts.pop_front();
            }
            return false;
        }

        if let Some(picker) = self.picker.as_mut() {
            match picker.handle_key(key.code) {
                PickerResult::Open => {}
                PickerResult::Picked(when) => {
                    self.picker = None;
                    if let Some(controller) = self.controller.as_mut() {
                        controller.pick_date(Some(when));
                    }
                }
                PickerResult::Dismissed => {
                    self.picker = None;
                    if let Some(controller) = self.controller.as_mut() {
                        controller.pick_date(None);
                    }
                }
            }
            return false;
        }

        let quit = match self.navigator.current() {
            Route::Splash => false,
            Route::TodoList => match self.focus {
                Focus::Input => self.handle_input_focus(key),
                Focus::List => self.handle_list_focus(key),
            },
            Route::Settings => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace) {
                    self.navigator.back();
                    self.sync_mounts();
                }
                false
            }
        };
        self.collect_alerts();
        quit
    }

    fn handle_input_focus(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('t') if ctrl => self.open_picker(),
            KeyCode::Char('q') if ctrl => return true,
            KeyCode::Char(c) if !ctrl => {
                self.input.handle_char(c);
                self.sync_draft();
            }
            KeyCode::Backspace => {
                self.input.handle_backspace();
                self.sync_draft();
            }
            KeyCode::Delete => {
                self.input.handle_delete();
                self.sync_draft();
            }
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Home => self.input.move_cursor_home(),
            KeyCode::End => self.input.move_cursor_end(),
            KeyCode::Enter => self.add_task(),
            KeyCode::Tab | KeyCode::Esc | KeyCode::Down => {
                self.focus = Focus::List;
                self.clamp_selection();
            }
            _ => {}
        }
        false
    }

    fn handle_list_focus(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('r') => self.open_picker(),
            KeyCode::Char('s') => {
                self.navigator.navigate(Route::Settings);
                self.sync_mounts();
            }
            KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Tab => self.focus = Focus::Input,
            _ => {}
        }
        false
    }

    fn sync_draft(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.set_draft_text(&self.input.value);
        }
    }

    fn add_task(&mut self) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        if controller.add_task().is_some() {
            self.input.clear();
            let last = controller.tasks().len().saturating_sub(1);
            self.list_state.select(Some(last));
        }
    }

    fn delete_selected(&mut self) {
        let (Some(controller), Some(index)) = (self.controller.as_mut(), self.list_state.selected()) else {
            return;
        };
        if let Some(removed) = controller.remove_task(index) {
            self.status_message = format!("Deleted \"{}\"", removed.text);
        }
        self.clamp_selection();
    }

    fn open_picker(&mut self) {
        if let Some(controller) = self.controller.as_ref() {
            self.picker = Some(DateTimePicker::new(controller.draft().when));
        }
    }

    fn select_next(&mut self) {
        let len = self.controller().map_or(0, |c| c.tasks().len());
        if len == 0 {
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    fn select_previous(&mut self) {
        let prev = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        if self.controller.as_ref().is_some_and(|c| !c.tasks().is_empty()) {
            self.list_state.select(Some(prev));
        }
    }

    fn render_splash(&self, f: &mut Frame, area: Rect) {
        let block = Block::default().style(Style::default().bg(SPLASH_RED));
        f.render_widget(block, area);

        let title_area = centered_rect(60, 20, area);
        let title = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "To-Do App",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(title, title_area);
    }

    fn render_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(3), // reminder time
                Constraint::Min(3),    // tasks
                Constraint::Length(3), // input
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("My Tasks", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled("[s] settings", Style::default().fg(MUTED_GRAY)),
        ]);
        f.render_widget(Paragraph::new(title), chunks[0]);

        let Some(controller) = self.controller.as_ref().filter(|c| c.state() == ScreenState::Idle) else {
            let loading = Paragraph::new("Loading tasks...").block(Block::default().borders(Borders::ALL));
            f.render_widget(loading, chunks[2]);
            return;
        };

        let reminder = Paragraph::new(format!("Reminder: {}", controller.draft_date_label()))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title("Ctrl+T / r to change"));
        f.render_widget(reminder, chunks[1]);

        let rows: Vec<Row> = controller
            .tasks()
            .iter()
            .map(|task| {
                Row::new(vec![
                    Cell::from(task.text.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from(task.date.clone()).style(Style::default().fg(MUTED_GRAY)),
                ])
            })
            .collect();

        let list_border = if self.focus == Focus::List { BERRY } else { Color::White };
        let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(26)])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(list_border))
                    .title(format!("Tasks ({})", controller.tasks().len())),
            )
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[2], &mut self.list_state);

        let input_border = if self.focus == Focus::Input { BERRY } else { Color::White };
        let input_text = if self.input.value.is_empty() && self.focus != Focus::Input {
            Span::styled("Enter task", Style::default().fg(MUTED_GRAY))
        } else {
            Span::raw(self.input.value.clone())
        };
        let input = Paragraph::new(Line::from(input_text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(input_border))
                .title("New task (Enter to add)"),
        );
        f.render_widget(input, chunks[3]);

        if self.focus == Focus::Input && !self.picker_open() && self.front_alert().is_none() {
            let offset = u16::try_from(self.input.cursor_width()).unwrap_or(u16::MAX);
            let x = chunks[3].x.saturating_add(1).saturating_add(offset);
            f.set_cursor_position((x.min(chunks[3].right().saturating_sub(2)), chunks[3].y + 1));
        }
    }

    fn render_settings(&self, f: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(Span::styled("Settings", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("Feature settings coming soon..."),
        ];
        f.render_widget(Paragraph::new(text).block(Block::default().borders(Borders::ALL)), area);
    }

    fn render_picker(&self, f: &mut Frame, area: Rect) {
        let Some(picker) = self.picker.as_ref() else {
            return;
        };
        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let (year, month, day, hour, minute) = picker.fields();
        let segment_style = |segment: Segment| {
            if picker.segment() == segment {
                Style::default().bg(BERRY).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            }
        };
        let line = Line::from(vec![
            Span::styled(format!("{year:04}"), segment_style(Segment::Year)),
            Span::raw("-"),
            Span::styled(format!("{month:02}"), segment_style(Segment::Month)),
            Span::raw("-"),
            Span::styled(format!("{day:02}"), segment_style(Segment::Day)),
            Span::raw("  "),
            Span::styled(format!("{hour:02}"), segment_style(Segment::Hour)),
            Span::raw(":"),
            Span::styled(format!("{minute:02}"), segment_style(Segment::Minute)),
        ]);
        let text = vec![
            Line::from(""),
            line,
            Line::from(""),
            Line::from("←/→ field  ↑/↓ change  Enter set  Esc cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Pick reminder time"));
        f.render_widget(paragraph, area);
    }

    fn render_alert(&self, f: &mut Frame, area: Rect) {
        let Some(alert) = self.front_alert() else {
            return;
        };
        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);
        let text = vec![
            Line::from(""),
            Line::from(alert.message()),
            Line::from(""),
            Line::from(Span::styled("Press Enter to dismiss", Style::default().fg(MUTED_GRAY))),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(alert.title().to_string())
                    .style(Style::default().bg(NIGHT_BLUE).fg(Color::White)),
            );
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match (self.navigator.current(), self.focus) {
                (Route::Splash, _) => String::new(),
                (Route::TodoList, Focus::Input) => {
                    "Type a task | Enter add | Ctrl+T time | Tab list | Ctrl+C quit".to_string()
                }
                (Route::TodoList, Focus::List) => {
                    "↑/↓ select | d delete | r time | s settings | Tab type | q quit".to_string()
                }
                (Route::Settings, _) => "Esc back".to_string(),
            }
        };
        let notifications_off = self
            .controller
            .as_ref()
            .is_some_and(|c| c.permission() == Permission::Denied);
        let text = if notifications_off && self.navigator.current() == Route::TodoList {
            format!("{text} | notifications off")
        } else {
            text
        };
        let status = Paragraph::new(text).style(Style::default().bg(NIGHT_BLUE).fg(Color::White));
        f.render_widget(status, area);
    }

    /// Draw the visible screen plus any modal on top.
    pub fn render(&mut self, f: &mut Frame) {
        let full = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(full);

        match self.route() {
            Route::Splash => self.render_splash(f, full),
            Route::TodoList => self.render_list(f, chunks[0]),
            Route::Settings => self.render_settings(f, chunks[0]),
        }
        if self.navigator.current() != Route::Splash {
            self.render_status_bar(f, chunks[1]);
        }
        self.render_picker(f, chunks[0]);
        self.render_alert(f, chunks[0]);
    }

    /// Main event loop: draw, wait up to one tick for a key, advance timers.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        break;
                    }
                }
            }

            self.tick(Instant::now(), Utc::now());
            if self.take_bell() {
                ring_bell()?;
            }
        }
        Ok(())
    }
}

fn ring_bell() -> io::Result<()> {
    use std::io::Write;
    let mut stdout = io::stdout();
    stdout.write_all(b"\x07")?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryKv, TASKS_KEY};
    use crate::task::Task;
    use chrono::{Local, TimeZone};
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    /// An app already past the splash screen.
    fn listed_app(kv: Arc<dyn KeyValueStore>) -> App {
        let start = Instant::now();
        let mut app = App::new(AppConfig::default(), kv, start);
        app.tick(start + SPLASH_DELAY, Utc::now());
        assert_eq!(app.route(), Route::TodoList);
        app
    }

    fn stored(kv: &Arc<dyn KeyValueStore>) -> Vec<Task> {
        kv.get(TASKS_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }

    #[test]
    fn test_splash_hands_off_after_delay_only() {
        let start = Instant::now();
        let mut app = App::new(AppConfig::default(), Arc::new(MemoryKv::new()), start);
        app.handle_key(key(KeyCode::Enter));
        app.tick(start + Duration::from_millis(1500), Utc::now());
        assert_eq!(app.route(), Route::Splash);
        assert!(app.controller().is_none());

        app.tick(start + SPLASH_DELAY, Utc::now());
        assert_eq!(app.route(), Route::TodoList);
        assert!(app.controller().is_some());
    }

    #[test]
    fn test_type_and_add_task() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());
        let mut app = listed_app(Arc::clone(&kv));
        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));

        let tasks = app.controller().unwrap().tasks().to_vec();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Buy milk");
        assert_eq!(app.input.value, "");
        assert_eq!(app.front_alert().map(|a| a.title()), Some("Reminder Set"));

        // Dismiss the confirmation.
        app.handle_key(key(KeyCode::Enter));
        assert!(app.front_alert().is_none());

        drop(app);
        assert_eq!(stored(&kv), tasks);
    }

    #[test]
    fn test_blank_enter_does_nothing() {
        let mut app = listed_app(Arc::new(MemoryKv::new()));
        type_text(&mut app, "   ");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.controller().unwrap().tasks().is_empty());
        assert!(app.front_alert().is_none());
    }

    #[test]
    fn test_delete_selected_from_list() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());
        let mut app = listed_app(Arc::clone(&kv));
        for text in ["A", "B", "C"] {
            type_text(&mut app, text);
            app.handle_key(key(KeyCode::Enter));
            app.handle_key(key(KeyCode::Enter)); // dismiss alert
        }
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Char('d')));

        let texts: Vec<String> = app.controller().unwrap().tasks().iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, vec!["A", "C"]);
        drop(app);
        assert_eq!(stored(&kv).len(), 2);
    }

    #[test]
    fn test_settings_round_trip_keeps_controller() {
        let mut app = listed_app(Arc::new(MemoryKv::new()));
        type_text(&mut app, "draft");
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.route(), Route::Settings);
        assert!(app.controller().is_some());
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.route(), Route::TodoList);
        assert_eq!(app.controller().unwrap().draft().text, "draft");
    }

    #[test]
    fn test_picker_sets_and_cancels_draft_time() {
        let mut app = listed_app(Arc::new(MemoryKv::new()));
        let before = app.controller().unwrap().draft().when;

        app.handle_key(ctrl('t'));
        assert!(app.picker_open());
        app.handle_key(key(KeyCode::Up)); // year + 1
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.picker_open());
        assert_eq!(app.controller().unwrap().draft().when, before);

        let target = Local.with_ymd_and_hms(2030, 6, 1, 8, 30, 0).unwrap();
        app.picker = Some(DateTimePicker::new(target));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.controller().unwrap().draft().when, target);
    }

    #[test]
    fn test_disabled_notifications_show_advisory() {
        let mut config = AppConfig::default();
        config.notifications.enabled = false;
        let start = Instant::now();
        let mut app = App::new(config, Arc::new(MemoryKv::new()), start);
        app.tick(start + SPLASH_DELAY, Utc::now());
        assert_eq!(
            app.front_alert().map(|a| a.message()),
            Some("Enable notifications to get reminders!".to_string())
        );
        // Keys other than dismiss are swallowed by the modal.
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.input.value, "");
    }

    #[test]
    fn test_due_reminder_raises_alert_and_bell() {
        let mut app = listed_app(Arc::new(MemoryKv::new()));
        type_text(&mut app, "Stretch");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        assert!(!app.take_bell());

        app.tick(Instant::now(), Utc::now() + chrono::Duration::seconds(5));
        assert_eq!(app.front_alert().map(|a| a.message()), Some("Task: Stretch".to_string()));
        assert!(app.take_bell());
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let start = Instant::now();
        let mut app = App::new(AppConfig::default(), Arc::new(MemoryKv::new()), start);
        assert!(app.handle_key(ctrl('c')));
        let mut app = listed_app(Arc::new(MemoryKv::new()));
        assert!(app.handle_key(ctrl('c')));
    }

    #[test]
    fn test_renders_each_screen() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let start = Instant::now();
        let mut app = App::new(AppConfig::default(), Arc::new(MemoryKv::new()), start);
        terminal.draw(|f| app.render(f)).unwrap();
        assert!(buffer_text(&terminal).contains("To-Do App"));

        app.tick(start + SPLASH_DELAY, Utc::now());
        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        terminal.draw(|f| app.render(f)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("My Tasks"));
        assert!(text.contains("Buy milk"));
        assert!(text.contains("Reminder:"));

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('s')));
        terminal.draw(|f| app.render(f)).unwrap();
        assert!(buffer_text(&terminal).contains("Feature settings coming soon..."));
    }

    #[test]
    fn test_cursor_follows_display_width() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = listed_app(Arc::new(MemoryKv::new()));
        type_text(&mut app, "日本");
        terminal.draw(|f| app.render(f)).unwrap();
        // Border column, then two double-width characters.
        assert_eq!(terminal.get_cursor_position().unwrap().x, 5);
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }
}
