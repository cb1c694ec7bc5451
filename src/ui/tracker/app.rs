use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, warn};

use crate::assignment::Assignment;
use crate::config::Config;
use crate::error::Result;
use crate::notifier::Notifier;
use crate::scheduler::ReminderScheduler;
use crate::storage::{ASSIGNMENTS_KEY, PERMISSION_KEY, THEME_KEY};
use crate::store::{AssignmentStore, StoreEvent};
use crate::theme::{self, Theme};
use crate::urgency::{Filter, Stats};

use super::actions::{self, ActionOutcome};
use super::editor::{EditorAction, EditorKind, EditorState};
use super::view;

const NARROW_WIDTH: u16 = 90;
const EVENT_POLL_MS: u64 = 120;
const WATCH_DEBOUNCE_MS: u64 = 200;

enum UiMsg {
    Tick,
    Reload,
    Store(StoreEvent),
    WatchError(String),
}

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum HelpContext {
    None,
    List,
}

pub(crate) struct DeleteConfirmState {
    pub(crate) assignment_id: String,
    pub(crate) title: String,
}

#[derive(Default, Clone, Copy)]
struct Viewport {
    width: u16,
    height: u16,
}

pub struct AppState {
    pub(crate) visible: Vec<Assignment>,
    pub(crate) selected: Option<usize>,
    pub(crate) filter: Filter,
    pub(crate) stats: Stats,
    pub(crate) now: DateTime<Utc>,
    pub(crate) theme: Theme,
    pub(crate) editor: Option<EditorState>,
    pub(crate) delete_confirm: Option<DeleteConfirmState>,
    pub(crate) help_context: HelpContext,
    info_message: Option<String>,
    status_message: Option<String>,
    watch_error: Option<String>,
    viewport: Viewport,
    config: Config,
    notifier: Notifier,
    store: AssignmentStore,
}

impl AppState {
    fn new(store: AssignmentStore, config: Config, notifier: Notifier) -> Self {
        let theme = theme::load(store.storage(), &config.display);
        let mut app = Self {
            visible: Vec::new(),
            selected: None,
            filter: Filter::default(),
            stats: Stats::default(),
            now: Utc::now(),
            theme,
            editor: None,
            delete_confirm: None,
            help_context: HelpContext::None,
            info_message: None,
            status_message: None,
            watch_error: None,
            viewport: Viewport::default(),
            config,
            notifier,
            store,
        };
        app.refresh_view(None);
        app
    }

    fn update_viewport(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
    }

    pub(crate) fn is_narrow(&self) -> bool {
        self.viewport.width > 0 && self.viewport.width < NARROW_WIDTH
    }

    pub(crate) fn selected_assignment(&self) -> Option<&Assignment> {
        self.selected.and_then(|idx| self.visible.get(idx))
    }

    pub(crate) fn permission_label(&self) -> &'static str {
        self.notifier.permission().as_str()
    }

    pub(crate) fn data_dir(&self) -> &Path {
        self.store.storage().data_dir()
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.config.reminders.poll_interval()
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(error) = self.watch_error.as_ref() {
            return Some((error.clone(), StatusKind::Error));
        }
        self.info_message
            .as_ref()
            .map(|info| (info.clone(), StatusKind::Info))
    }

    pub(crate) fn toggle_help(&mut self, context: HelpContext) {
        self.help_context = if self.help_context == context {
            HelpContext::None
        } else {
            context
        };
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.delete_confirm.is_some() {
            return "y confirm delete  esc cancel".to_string();
        }
        if let Some(editor) = self.editor.as_ref() {
            if editor.confirming() {
                return "enter/y save  e back  esc cancel".to_string();
            }
            return "tab/↓ next  shift-tab/↑ prev  ←/→ space reminders  enter next/save  esc cancel"
                .to_string();
        }
        "j/k move  a add  e edit  space done  d delete  tab filter  t theme  n notify  ? help  q quit"
            .to_string()
    }

    /// Recompute the visible list and stats, keeping the selection on `keep_id`
    /// (or the current row) when it is still visible.
    fn refresh_view(&mut self, keep_id: Option<String>) {
        let previous_id = keep_id.or_else(|| self.selected_assignment().map(|a| a.id.clone()));
        let previous_pos = self.selected;
        self.stats = self.store.stats(self.now);
        self.visible = self.store.filtered(self.filter);
        self.selected = select_by_id(&self.visible, previous_id.as_deref(), previous_pos);
    }

    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        let max = self.visible.len().saturating_sub(1) as isize;
        self.selected = Some((current + delta).clamp(0, max) as usize);
    }

    fn set_filter(&mut self, filter: Filter) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.refresh_view(None);
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.status_message = None;
    }

    fn apply_outcome(&mut self, outcome: ActionOutcome) {
        if outcome.changed {
            self.refresh_view(outcome.assignment_id);
        }
        self.set_info(outcome.message);
    }

    fn evaluate_reminders(&mut self) {
        self.now = Utc::now();
        if let Err(err) = self.store.apply_reminders(self.now, &self.notifier) {
            warn!(error = %err, "reminder evaluation failed");
            self.set_error(format!("reminder error: {err}"));
        }
        self.refresh_view(None);
    }

    fn reload(&mut self) {
        if !self.store.refresh() {
            debug!("reload found no assignment changes");
        }
        self.theme = theme::load(self.store.storage(), &self.config.display);
        self.notifier = Notifier::load(self.store.storage(), &self.config.notifications);
        self.refresh_view(None);
    }

    fn list_jump(&self) -> isize {
        let height = self.viewport.height.saturating_sub(10);
        (height / 2).max(1) as isize
    }
}

fn select_by_id(
    visible: &[Assignment],
    id: Option<&str>,
    fallback: Option<usize>,
) -> Option<usize> {
    if visible.is_empty() {
        return None;
    }
    if let Some(pos) = id.and_then(|id| visible.iter().position(|a| a.id == id)) {
        return Some(pos);
    }
    Some(fallback.unwrap_or(0).min(visible.len() - 1))
}

/// Open the interactive tracker on the current terminal.
pub fn run(mut store: AssignmentStore, config: Config) -> Result<()> {
    let notifier = Notifier::load(store.storage(), &config.notifications);
    let (ui_tx, ui_rx) = mpsc::channel();

    let store_tx = ui_tx.clone();
    store.subscribe(Box::new(move |event: &StoreEvent| {
        let _ = store_tx.send(UiMsg::Store(event.clone()));
    }));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("assignmate-scheduler")
        .enable_time()
        .build()?;
    let tick_tx = ui_tx.clone();
    let mut scheduler = ReminderScheduler::start(
        runtime.handle(),
        config.reminders.poll_interval(),
        move || {
            let _ = tick_tx.send(UiMsg::Tick);
        },
    );

    spawn_watch(store.storage().data_dir().to_path_buf(), ui_tx);

    let mut app = AppState::new(store, config, notifier);
    app.evaluate_reminders();
    let result = run_terminal(&mut app, ui_rx);

    scheduler.stop();
    runtime.shutdown_background();
    result
}

fn run_terminal(app: &mut AppState, ui_rx: Receiver<UiMsg>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.update_viewport(size.width, size.height);

    let result = run_loop(&mut terminal, app, ui_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg);
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| {
                app.update_viewport(frame.size().width, frame.size().height);
                view::render(frame, app);
            })?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(width, height) => {
                    app.update_viewport(width, height);
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_ui_msg(app: &mut AppState, msg: UiMsg) {
    match msg {
        UiMsg::Tick => app.evaluate_reminders(),
        UiMsg::Reload => app.reload(),
        UiMsg::Store(StoreEvent::Reminded(fired)) => {
            app.refresh_view(None);
            if let Some(last) = fired.last() {
                let message = if fired.len() == 1 {
                    format!("reminder: {}", last.body)
                } else {
                    format!("{} reminders, latest: {}", fired.len(), last.body)
                };
                app.set_info(message);
            }
        }
        UiMsg::Store(StoreEvent::Reloaded) => {
            app.refresh_view(None);
            app.set_info("reloaded from disk".to_string());
        }
        UiMsg::Store(_) => app.refresh_view(None),
        UiMsg::WatchError(err) => {
            app.watch_error = Some(format!("watch error: {err}"));
        }
    }
}

/// Returns true when the tracker should exit.
fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(confirm) = app.delete_confirm.take() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match actions::delete_assignment(&mut app.store, &confirm.assignment_id) {
                    Ok(outcome) => app.apply_outcome(outcome),
                    Err(err) => app.set_error(err.to_string()),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                app.set_info("cancelled".to_string());
            }
            _ => {
                app.delete_confirm = Some(confirm);
            }
        }
        return false;
    }

    if let Some(mut editor) = app.editor.take() {
        match editor.handle_key(key) {
            EditorAction::None => {
                app.editor = Some(editor);
            }
            EditorAction::Cancel => {
                app.set_info("cancelled".to_string());
            }
            EditorAction::Submit => submit_editor(app, editor),
        }
        return false;
    }

    if app.help_context != HelpContext::None {
        if matches!(
            key.code,
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc
        ) {
            app.help_context = HelpContext::None;
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('?') => app.toggle_help(HelpContext::List),
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('g') | KeyCode::Home => app.move_selection(isize::MIN / 2),
        KeyCode::Char('G') | KeyCode::End => app.move_selection(isize::MAX / 2),
        KeyCode::PageDown => app.move_selection(app.list_jump()),
        KeyCode::PageUp => app.move_selection(-app.list_jump()),
        KeyCode::Char('1') => app.set_filter(Filter::Active),
        KeyCode::Char('2') => app.set_filter(Filter::Completed),
        KeyCode::Char('3') => app.set_filter(Filter::All),
        KeyCode::Tab => app.set_filter(app.filter.next()),
        KeyCode::Char('a') => {
            app.editor = Some(EditorState::new_assignment(
                app.config.reminders.default_reminders(),
            ));
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            match app.selected_assignment().map(EditorState::edit_assignment) {
                Some(editor) => app.editor = Some(editor),
                None => app.set_error("no assignment selected".to_string()),
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('x') => {
            let Some(id) = app.selected_assignment().map(|a| a.id.clone()) else {
                app.set_error("no assignment selected".to_string());
                return false;
            };
            match actions::toggle_assignment(&mut app.store, &id) {
                Ok(outcome) => app.apply_outcome(outcome),
                Err(err) => app.set_error(err.to_string()),
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            let confirm = app.selected_assignment().map(|assignment| DeleteConfirmState {
                assignment_id: assignment.id.clone(),
                title: assignment.title.clone(),
            });
            match confirm {
                Some(confirm) => app.delete_confirm = Some(confirm),
                None => app.set_error("no assignment selected".to_string()),
            }
        }
        KeyCode::Char('t') => match actions::toggle_theme(&app.store, &app.config.display) {
            Ok((theme, outcome)) => {
                app.theme = theme;
                app.set_info(outcome.message);
            }
            Err(err) => app.set_error(err.to_string()),
        },
        KeyCode::Char('n') => match actions::request_notifications(&mut app.notifier) {
            Ok(outcome) => app.set_info(outcome.message),
            Err(err) => app.set_error(err.to_string()),
        },
        KeyCode::Char('r') => {
            app.reload();
            app.set_info("reloaded".to_string());
        }
        _ => {}
    }
    false
}

fn submit_editor(app: &mut AppState, mut editor: EditorState) {
    let draft = match editor.build_draft() {
        Ok(draft) => draft,
        Err(message) => {
            editor.set_error(message);
            app.editor = Some(editor);
            return;
        }
    };

    let result = match (editor.kind(), editor.assignment_id()) {
        (EditorKind::EditAssignment, Some(id)) => {
            actions::update_assignment(&mut app.store, id, draft)
        }
        _ => actions::create_assignment(&mut app.store, draft),
    };
    match result {
        Ok(outcome) => app.apply_outcome(outcome),
        Err(err) => {
            editor.set_error(err.to_string());
            app.editor = Some(editor);
        }
    }
}

fn is_tracked_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| matches!(name, ASSIGNMENTS_KEY | THEME_KEY | PERMISSION_KEY))
}

fn spawn_watch(data_dir: PathBuf, ui_tx: Sender<UiMsg>) {
    // On first run nothing has been saved yet; the directory must exist to be watched.
    if let Err(err) = fs::create_dir_all(&data_dir) {
        let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
        return;
    }

    let (event_tx, event_rx) = mpsc::channel();
    let watcher: notify::Result<RecommendedWatcher> = notify::recommended_watcher(move |res| {
        let _ = event_tx.send(res);
    });
    let mut watcher = match watcher {
        Ok(watcher) => watcher,
        Err(err) => {
            let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
            return;
        }
    };
    if let Err(err) = watcher.watch(&data_dir, RecursiveMode::NonRecursive) {
        let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
        return;
    }
    debug!(dir = %data_dir.display(), "watching data directory");

    thread::spawn(move || {
        let _watcher = watcher;
        let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);
        let mut pending: Option<Instant> = None;

        loop {
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_secs(3600));
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(event)) => {
                    if event.paths.iter().any(|path| is_tracked_file(path)) {
                        pending = Some(Instant::now() + debounce);
                    }
                }
                Ok(Err(err)) => {
                    let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if pending.take().is_some() && ui_tx.send(UiMsg::Reload).is_err() {
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}
