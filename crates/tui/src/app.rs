use std::{cmp, io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info};

use marquee_core::{
    catalog::Catalog,
    models::AlertMode,
    selection::{self, Selection},
    Identity, PreferenceRecord, PreferenceStore, StoreError,
};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_MOVIE_NAME_LEN: usize = 96;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
    info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            info: Color::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Movie,
    Mode,
    Search,
    Theatres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    fn title(self) -> &'static str {
        match self {
            NoticeKind::Info => "Info",
            NoticeKind::Success => "Success",
            NoticeKind::Warning => "Warning",
            NoticeKind::Error => "Error",
        }
    }

    fn color(self, theme: &Theme) -> Color {
        match self {
            NoticeKind::Info => theme.info,
            NoticeKind::Success => theme.success,
            NoticeKind::Warning => theme.warning,
            NoticeKind::Error => theme.danger,
        }
    }
}

/// Modal notice for confirmations, warnings, and errors.
#[derive(Debug, Clone)]
struct Notice {
    kind: NoticeKind,
    message: String,
}

/// Single-line text input with cursor editing for the movie-name field.
#[derive(Debug, Clone, Default)]
struct MovieField {
    input: String,
    cursor: usize,
}

impl MovieField {
    fn move_cursor(&mut self, delta: isize) {
        let len = self.input.len() as isize;
        let mut next = self.cursor as isize + delta;
        if next < 0 {
            next = 0;
        } else if next > len {
            next = len;
        }
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_MOVIE_NAME_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.input.insert(self.cursor, ch);
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.input.len() {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    fn value(&self) -> String {
        self.input.trim().to_string()
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    LookupFinished {
        movie: String,
        result: Result<Option<PreferenceRecord>, StoreError>,
    },
    SubmitFinished(Result<String, StoreError>),
}

struct UiState {
    rows: Vec<String>,
    filtered: Vec<String>,
    selection: Selection,
    filter: String,
    cursor: usize,
    offset: usize,
    list_height: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            filtered: Vec::new(),
            selection: Selection::default(),
            filter: String::new(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            status: "Loading theatres…".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_rows(&mut self, rows: Vec<String>) {
        self.rows = rows;
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        if self.filter.trim().is_empty() {
            self.filtered = self.rows.clone();
        } else {
            self.filtered = self
                .rows
                .iter()
                .filter(|name| selection::row_matches(name, &self.filter))
                .cloned()
                .collect();
        }
        self.cursor = 0;
        self.offset = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let len = self.filtered.len() as isize;
        let mut idx = self.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.cursor = idx as usize;
        self.ensure_cursor_visible();
    }

    fn move_to_start(&mut self) {
        self.cursor = 0;
        self.ensure_cursor_visible();
    }

    fn move_to_end(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.cursor = self.filtered.len() - 1;
        self.ensure_cursor_visible();
    }

    fn page_down(&mut self) {
        if self.filtered.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.filtered.len());
        self.move_cursor(delta as isize);
    }

    fn page_up(&mut self) {
        if self.filtered.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.filtered.len());
        self.move_cursor(-(delta as isize));
    }

    fn visible_rows(&self, height: usize) -> &[String] {
        if self.filtered.is_empty() {
            return &[];
        }
        let end = (self.offset + height).min(self.filtered.len());
        &self.filtered[self.offset..end]
    }

    fn current_row(&self) -> Option<&String> {
        self.filtered.get(self.cursor)
    }

    fn scroll_to_top(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.filtered.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.filtered.len() {
            self.cursor = self.filtered.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.filtered.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.filtered.len().saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }

    /// Back to defaults: any-theatre mode, nothing chosen, filter cleared.
    fn reset_form(&mut self) {
        self.selection.reset();
        self.filter.clear();
        self.apply_filter();
        self.scroll_to_top();
    }
}

/// High-level application state for the preference form.
pub struct MarqueeApp {
    identity: Identity,
    store: PreferenceStore,
    state: UiState,
    movie: MovieField,
    focus: Focus,
    notice: Option<Notice>,
    catalog: Option<Catalog>,
    pending_lookup: bool,
    pending_submit: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    catalog_rx: Option<mpsc::Receiver<Catalog>>,
    theme: Theme,
}

impl MarqueeApp {
    pub fn new(identity: Identity, store: PreferenceStore) -> Self {
        Self {
            identity,
            store,
            state: UiState::default(),
            movie: MovieField::default(),
            focus: Focus::Movie,
            notice: None,
            catalog: None,
            pending_lookup: false,
            pending_submit: false,
            event_tx: None,
            catalog_rx: None,
            theme: Theme::default(),
        }
    }

    pub fn attach_catalog(&mut self, receiver: mpsc::Receiver<Catalog>) {
        self.catalog_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx.clone());

        let mut catalog_rx = self.catalog_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            if catalog_rx.is_some() {
                let mut catalog_closed = false;
                let rx = catalog_rx.as_mut().unwrap();
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_catalog = rx.recv() => {
                        match maybe_catalog {
                            Some(catalog) => self.handle_catalog(catalog),
                            None => catalog_closed = true,
                        }
                    }
                }
                if catalog_closed {
                    catalog_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }

            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn handle_catalog(&mut self, catalog: Catalog) {
        let total = catalog.names.len();
        self.state.set_rows(catalog.names.clone());
        let loaded_at = catalog.loaded_at.with_timezone(&Local).format("%H:%M");
        if catalog.is_fallback {
            self.state.set_status(format!(
                "Theatre list unavailable; using the default entry ({loaded_at})"
            ));
        } else {
            self.state
                .set_status(format!("Loaded {total} theatres ({loaded_at})"));
        }
        self.catalog = Some(catalog);
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => true,
            Some(AppEvent::LookupFinished { movie, result }) => {
                self.handle_lookup_finished(movie, result);
                true
            }
            Some(AppEvent::SubmitFinished(result)) => {
                self.handle_submit_finished(result);
                true
            }
            None => false,
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };

        // Any key acknowledges an open notice.
        if self.notice.take().is_some() {
            return Ok(());
        }

        if key.modifiers == KeyModifiers::CONTROL {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.state.should_quit = true;
                    return Ok(());
                }
                KeyCode::Char('s') => {
                    self.start_submit();
                    return Ok(());
                }
                _ => {}
            }
        }

        match self.focus {
            Focus::Movie => self.handle_movie_key(key),
            Focus::Mode => self.handle_mode_key(key),
            Focus::Search => self.handle_search_key(key),
            Focus::Theatres => self.handle_theatre_key(key),
        }
        Ok(())
    }

    fn handle_movie_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Enter => {
                self.start_submit();
            }
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Left => self.movie.move_cursor(-1),
            KeyCode::Right => self.movie.move_cursor(1),
            KeyCode::Home => self.movie.move_home(),
            KeyCode::End => self.movie.move_end(),
            KeyCode::Backspace => self.movie.backspace(),
            KeyCode::Delete => self.movie.delete(),
            KeyCode::Char(ch) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
                self.movie.insert(ch);
            }
            _ => {}
        }
    }

    fn handle_mode_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Char(' ') | KeyCode::Enter => {
                let next = match self.state.selection.mode() {
                    AlertMode::Any => AlertMode::Preferred,
                    AlertMode::Preferred => AlertMode::Any,
                };
                self.state.selection.set_mode(next);
                self.state
                    .set_status(format!("Mode: {}", next.label()));
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.state.selection.set_mode(AlertMode::Any);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.state.selection.set_mode(AlertMode::Preferred);
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => self.focus_prev(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.filter.clear();
                self.state.apply_filter();
                self.focus = Focus::Theatres;
            }
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Backspace => {
                self.state.filter.pop();
                self.state.apply_filter();
            }
            KeyCode::Char(ch) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
                self.state.filter.push(ch);
                self.state.apply_filter();
            }
            _ => {}
        }
    }

    fn handle_theatre_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(name) = self.state.current_row().cloned() {
                    self.state.selection.toggle(&name);
                    self.state
                        .set_status(format!("Selected: {}", self.state.selection.summary_label()));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.state.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.state.move_cursor(-1),
            KeyCode::Home | KeyCode::Char('g') => self.state.move_to_start(),
            KeyCode::End | KeyCode::Char('G') => self.state.move_to_end(),
            KeyCode::PageDown => self.state.page_down(),
            KeyCode::PageUp => self.state.page_up(),
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            _ => {}
        }
    }

    fn focus_order(&self) -> Vec<Focus> {
        if self.state.selection.editor_visible() {
            vec![Focus::Movie, Focus::Mode, Focus::Search, Focus::Theatres]
        } else {
            vec![Focus::Movie, Focus::Mode]
        }
    }

    fn focus_next(&mut self) {
        self.shift_focus(1);
    }

    fn focus_prev(&mut self) {
        self.shift_focus(-1);
    }

    fn shift_focus(&mut self, delta: isize) {
        let order = self.focus_order();
        let current = order
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0);
        let len = order.len() as isize;
        let next = (current as isize + delta).rem_euclid(len) as usize;
        let leaving_movie = self.focus == Focus::Movie && order[next] != Focus::Movie;
        self.focus = order[next];
        if leaving_movie {
            self.start_lookup();
        }
    }

    /// Blur handler for the movie-name field: fetch any saved preference.
    fn start_lookup(&mut self) {
        if self.pending_lookup {
            return;
        }
        let movie = self.movie.value();
        if movie.is_empty() {
            return;
        }
        let Some(sender) = self.event_tx.clone() else {
            self.state
                .set_status("Internal error: event channel unavailable".to_string());
            error!("event_channel_missing");
            return;
        };

        self.pending_lookup = true;
        info!(movie = %movie, "Looking up saved preference");
        self.state
            .set_status(format!("Checking saved preference for {movie}…"));
        let store = self.store.clone();
        let identity = self.identity.clone();
        spawn(async move {
            let result = store.lookup(&movie, &identity).await;
            let _ = sender.send(AppEvent::LookupFinished { movie, result }).await;
        });
    }

    fn handle_lookup_finished(
        &mut self,
        movie: String,
        result: Result<Option<PreferenceRecord>, StoreError>,
    ) {
        self.pending_lookup = false;
        match result {
            Ok(Some(record)) => {
                info!(movie = %movie, mode = ?record.mode, "Saved preference loaded");
                self.state.selection.apply_record(&record, &self.state.rows);
                let reordered =
                    selection::reorder_chosen_first(&self.state.rows, &self.state.selection);
                self.state.filter.clear();
                self.state.set_rows(reordered);
                self.state.scroll_to_top();
                // An any-mode record hides the editor; focus must not
                // stay on an invisible widget.
                if !self.state.selection.editor_visible()
                    && matches!(self.focus, Focus::Search | Focus::Theatres)
                {
                    self.focus = Focus::Movie;
                }
                self.show_notice(NoticeKind::Info, "Previously saved preference loaded");
                self.state
                    .set_status(format!("Restored preference for {movie}"));
            }
            Ok(None) => {
                self.state
                    .set_status(format!("No saved preference for {movie}"));
            }
            Err(err) => {
                error!(movie = %movie, "Lookup failed: {err}");
                self.show_notice(NoticeKind::Error, "Server not reachable");
                self.state.set_status(format!("Lookup failed for {movie}"));
            }
        }
    }

    fn start_submit(&mut self) {
        if self.pending_submit {
            return;
        }
        let movie = self.movie.value();
        if let Err(err) = self.state.selection.validate(&movie) {
            self.show_notice(NoticeKind::Warning, &err.to_string());
            return;
        }
        let Some(sender) = self.event_tx.clone() else {
            self.state
                .set_status("Internal error: event channel unavailable".to_string());
            error!("event_channel_missing");
            return;
        };

        let record = PreferenceRecord::new(
            movie.clone(),
            self.identity.email(),
            self.state.selection.mode(),
            self.state.selection.chosen().to_vec(),
        );
        self.pending_submit = true;
        info!(movie = %movie, mode = ?record.mode, chosen = record.chosen.len(), "Submitting preference");
        self.state.set_status(format!("Saving alert for {movie}…"));
        let store = self.store.clone();
        spawn(async move {
            let result = store.submit(&record).await;
            let _ = sender.send(AppEvent::SubmitFinished(result)).await;
        });
    }

    fn handle_submit_finished(&mut self, result: Result<String, StoreError>) {
        self.pending_submit = false;
        match result {
            Ok(message) => {
                info!("Preference saved");
                self.show_notice(NoticeKind::Success, &message);
                self.movie.clear();
                self.state.reset_form();
                self.focus = Focus::Movie;
                self.state.set_status("Ready for the next alert".to_string());
            }
            Err(err) => {
                error!("Submit failed: {err}");
                self.show_notice(NoticeKind::Error, "Server not reachable");
                self.state.set_status("Submit failed".to_string());
            }
        }
    }

    fn show_notice(&mut self, kind: NoticeKind, message: &str) {
        self.notice = Some(Notice {
            kind,
            message: message.to_string(),
        });
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.render_movie_field(frame, chunks[1]);
        self.render_mode_radio(frame, chunks[2]);
        self.render_theatre_panel(frame, chunks[3]);
        self.render_status(frame, chunks[4]);

        if let Some(notice) = self.notice.clone() {
            self.render_notice(frame, &notice);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let catalog_note = match &self.catalog {
            Some(catalog) if catalog.is_fallback => "  (default theatre list)",
            Some(_) => "",
            None => "  (loading theatres…)",
        };
        let line = Line::from(vec![
            Span::styled(
                "Marquee",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  movie alerts  "),
            Span::styled(
                format!("Welcome {}{catalog_note}", self.identity.email()),
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let header = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Left);
        frame.render_widget(header, area);
    }

    fn render_movie_field(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Movie;
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Movie")
            .border_style(self.border_style(focused));
        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(self.movie.input.clone()),
        ]))
        .block(block);
        frame.render_widget(paragraph, area);

        if focused {
            let cursor_x =
                (area.x + 3 + self.movie.cursor as u16).min(area.x + area.width.saturating_sub(2));
            frame.set_cursor(cursor_x, area.y + 1);
        }
    }

    fn render_mode_radio(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Mode;
        let mode = self.state.selection.mode();
        let radio = |value: AlertMode| {
            if mode == value {
                format!("(•) {}", value.label())
            } else {
                format!("( ) {}", value.label())
            }
        };
        let style = |value: AlertMode| {
            if mode == value {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.primary_fg)
            }
        };
        let line = Line::from(vec![
            Span::styled(radio(AlertMode::Any), style(AlertMode::Any)),
            Span::raw("   "),
            Span::styled(radio(AlertMode::Preferred), style(AlertMode::Preferred)),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Alert me for")
            .border_style(self.border_style(focused));
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_theatre_panel(&mut self, frame: &mut Frame, area: Rect) {
        if !self.state.selection.editor_visible() {
            let hint = Paragraph::new(Line::from(Span::styled(
                "Alerts will cover any theatre showing the movie.",
                Style::default().fg(self.theme.muted),
            )))
            .block(Block::default().borders(Borders::ALL).title("Theatres"))
            .wrap(Wrap { trim: true });
            frame.render_widget(hint, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        self.render_search_box(frame, chunks[0]);
        self.render_theatre_list(frame, chunks[1]);
    }

    fn render_search_box(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Search;
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(self.border_style(focused));
        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled("/ ", Style::default().fg(self.theme.accent)),
            Span::raw(self.state.filter.clone()),
        ]))
        .block(block);
        frame.render_widget(paragraph, area);

        if focused {
            let cursor_x = (area.x + 3 + self.state.filter.len() as u16)
                .min(area.x + area.width.saturating_sub(2));
            frame.set_cursor(cursor_x, area.y + 1);
        }
    }

    fn render_theatre_list(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Theatres;
        self.state.list_height = area.height.saturating_sub(2) as usize;
        self.state.clamp_cursor();
        self.state.ensure_cursor_visible();

        let mut list_state = ListState::default();
        let height = self.state.list_height;
        let rows = self.state.visible_rows(height);
        if !rows.is_empty() {
            let selected = self
                .state
                .cursor
                .saturating_sub(self.state.offset)
                .min(rows.len().saturating_sub(1));
            list_state.select(Some(selected));
        }

        let items: Vec<ListItem> = if rows.is_empty() {
            vec![ListItem::new(Line::from("  No theatres match"))]
        } else {
            let view = selection::render_rows(rows, &self.state.selection);
            view.into_iter()
                .enumerate()
                .map(|(idx, row)| {
                    let global_index = self.state.offset + idx;
                    let is_cursor = focused && self.state.cursor == global_index;
                    let marker = if is_cursor {
                        Span::styled("▶ ", Style::default().fg(self.theme.accent))
                    } else {
                        Span::raw("  ")
                    };
                    let checkbox = if row.checked {
                        Span::styled(
                            "[x] ",
                            Style::default()
                                .fg(self.theme.success)
                                .add_modifier(Modifier::BOLD),
                        )
                    } else {
                        Span::raw("[ ] ")
                    };
                    ListItem::new(Line::from(vec![marker, checkbox, Span::raw(row.name)]))
                })
                .collect()
        };

        let title = format!(" {} ", self.state.selection.summary_label());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(self.border_style(focused));
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let mut status = self.state.status.clone();
        if self.pending_lookup {
            status.push_str(" • lookup in flight");
        }
        if self.pending_submit {
            status.push_str(" • saving");
        }
        let help = match self.focus {
            Focus::Movie => "Enter submit  Tab next field  Esc quit",
            Focus::Mode => "Space toggle  Tab next field  Esc quit",
            Focus::Search => "type to filter  Esc clear  Tab list",
            Focus::Theatres => "Space toggle  / search  ^S submit  Esc quit",
        };
        let line = Line::from(vec![
            Span::raw(status),
            Span::raw("  "),
            Span::styled(help, Style::default().fg(self.theme.muted)),
        ]);
        let paragraph = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_notice(&self, frame: &mut Frame, notice: &Notice) {
        let frame_area = frame.size();
        let mut width = cmp::min(56_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 24_u16);
        let height = 7_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let color = notice.kind.color(&self.theme);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                notice.kind.title(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(color));
        let paragraph = Paragraph::new(vec![
            Line::from(notice.message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "press any key",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.muted)
        }
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
