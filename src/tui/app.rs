use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::io::config_io::{config_path, load_config};
use crate::io::recovery;
use crate::io::store_io::{JsonFileGateway, TaskGateway, default_store_path};
use crate::model::AppConfig;
use crate::model::task::{Task, TaskId};
use crate::ops::store::{StoreError, TaskStore};
use crate::ops::view::{ViewSettings, ViewSnapshot};
use crate::util::unicode;

use super::input;
use super::render;
use super::theme::Theme;

/// What a text prompt is collecting. Id-targeted prompts carry the task id
/// resolved when the prompt opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Add,
    Edit(TaskId),
    Due(TaskId),
    Tags(TaskId),
    Search,
}

impl InputKind {
    /// Label on the input box border
    pub fn label(self) -> &'static str {
        match self {
            InputKind::Add => " Add Task ",
            InputKind::Edit(_) => " Edit Task ",
            InputKind::Due(_) => " Due Date (YYYY-MM-DD) ",
            InputKind::Tags(_) => " Add Tags (comma-separated) ",
            InputKind::Search => " Search Tasks ",
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Input(InputKind),
}

/// Single-line text editor state. `cursor` is a byte offset that always
/// sits on a grapheme boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    pub text: String,
    pub cursor: usize,
}

impl LineInput {
    /// Start with `text`, cursor at the end
    pub fn with_text(text: &str) -> Self {
        LineInput {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Ctrl-W
    pub fn delete_word(&mut self) {
        let start = unicode::word_start_before(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    /// Ctrl-U
    pub fn clear_to_start(&mut self) {
        self.text.replace_range(..self.cursor, "");
        self.cursor = 0;
    }
}

/// A transient message in the status bar
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

/// Main application state
pub struct App {
    pub store: TaskStore<Box<dyn TaskGateway>>,
    /// Filter, sort and search; never stored in the task store
    pub settings: ViewSettings,
    /// Row mapping of what is currently on screen
    pub snapshot: ViewSnapshot,
    pub cursor: usize,
    pub scroll_offset: usize,
    pub mode: Mode,
    pub input: LineInput,
    pub status: Option<StatusMessage>,
    pub status_timeout: Duration,
    pub show_key_hints: bool,
    pub show_help: bool,
    pub show_recovery_log: bool,
    pub recovery_log_lines: Vec<String>,
    pub recovery_log_scroll: usize,
    /// Directory holding the recovery log, when the store is file-backed
    pub recovery_dir: Option<PathBuf>,
    pub theme: Theme,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore<Box<dyn TaskGateway>>, config: &AppConfig) -> Self {
        let settings = ViewSettings {
            filter: config.view.filter,
            sort: config.view.sort,
            search: String::new(),
        };
        let mut app = App {
            store,
            settings,
            snapshot: ViewSnapshot::default(),
            cursor: 0,
            scroll_offset: 0,
            mode: Mode::Navigate,
            input: LineInput::default(),
            status: None,
            status_timeout: Duration::from_millis(config.ui.status_timeout_ms),
            show_key_hints: config.ui.show_key_hints,
            show_help: false,
            show_recovery_log: false,
            recovery_log_lines: Vec::new(),
            recovery_log_scroll: 0,
            recovery_dir: None,
            theme: Theme::from_config(&config.ui),
            should_quit: false,
        };
        app.refresh_view();
        app
    }

    /// Re-derive the view from the store and clamp the cursor.
    pub fn refresh_view(&mut self) {
        self.snapshot = self.store.view(&self.settings).snapshot();
        self.cursor = self.cursor.min(self.snapshot.len().saturating_sub(1));
    }

    /// Task id under the cursor, resolved against the current store revision.
    /// `Ok(None)` when the view is empty.
    pub fn selected_id(&self) -> Result<Option<TaskId>, StoreError> {
        if self.snapshot.is_empty() {
            return Ok(None);
        }
        self.store.resolve(&self.snapshot, self.cursor).map(Some)
    }

    /// The task under the cursor, if any. Resolution failures are shown in
    /// the status bar and the view is re-derived.
    pub fn selected_task(&mut self) -> Option<Task> {
        match self.selected_id() {
            Ok(Some(id)) => self.store.get(id).cloned(),
            Ok(None) => None,
            Err(e) => {
                self.report_error(&e);
                None
            }
        }
    }

    /// Move the cursor onto the row showing `id`, if it is visible.
    pub fn select_id(&mut self, id: TaskId) {
        if let Some(row) = self.snapshot.entries.iter().position(|e| e.id == id) {
            self.cursor = row;
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    /// Show a store error. A stale view is refreshed so the next command
    /// works against what is actually stored.
    pub fn report_error(&mut self, err: &StoreError) {
        match err {
            StoreError::StaleView { .. } | StoreError::NoSuchRow { .. } => {
                self.refresh_view();
                self.set_error("List was out of date and has been refreshed");
            }
            other => self.set_error(other.to_string()),
        }
    }

    /// The status message, if it has not timed out
    pub fn current_status(&self) -> Option<&StatusMessage> {
        self.status
            .as_ref()
            .filter(|s| s.shown_at.elapsed() < self.status_timeout)
    }

    /// Case-insensitive literal match of the active search term
    pub fn search_re(&self) -> Option<Regex> {
        if self.settings.search.is_empty() {
            return None;
        }
        Regex::new(&format!("(?i){}", regex::escape(&self.settings.search))).ok()
    }

    /// Open an input prompt pre-filled with `initial`.
    pub fn begin_input(&mut self, kind: InputKind, initial: &str) {
        self.mode = Mode::Input(kind);
        self.input = LineInput::with_text(initial);
    }

    pub fn open_recovery_log(&mut self) {
        self.recovery_log_lines = self
            .recovery_dir
            .as_deref()
            .map(recovery::read_recovery_lines)
            .unwrap_or_default();
        self.recovery_log_scroll = 0;
        self.show_recovery_log = true;
    }
}

/// Run the TUI application
pub fn run(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = JsonFileGateway::new(file.map_or_else(default_store_path, Path::to_path_buf));
    let recovery_dir = gateway.dir().to_path_buf();
    let config = load_config(&config_path());

    // Load before touching the terminal so errors print normally
    let store = TaskStore::open(Box::new(gateway) as Box<dyn TaskGateway>).map_err(|e| {
        if e.is_corrupt_store() {
            Box::<dyn std::error::Error>::from(format!(
                "{}\nrun `taskterm reset` to move it aside and start over",
                e
            ))
        } else {
            Box::<dyn std::error::Error>::from(e)
        }
    })?;

    let mut app = App::new(store, &config);
    app.recovery_dir = Some(recovery_dir);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        // The poll timeout also lets expired status messages disappear
        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
