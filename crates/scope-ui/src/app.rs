//! Main application state and TUI event loop for RTU Log Scope.
//!
//! [`App`] owns the theme, the [`LogScope`] facade and the cursor of the
//! measurement list. Key presses change the selection, and every change
//! goes through the facade so series and statistics are recomputed before
//! the next frame is drawn.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};

use scope_core::formatting::{format_number, format_span};
use scope_runtime::pipeline::{LogScope, SkippedSource};

use crate::chart_view;
use crate::stats_view;
use crate::themes::Theme;

/// Width of the measurement list column.
const LIST_WIDTH: u16 = 32;

/// Upper bound for the statistics table height.
const MAX_STATS_HEIGHT: u16 = 10;

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the RTU Log Scope TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Loaded dataset and selection.
    pub scope: LogScope,
    /// Cursor position in the measurement list.
    pub list_state: ListState,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    /// Construct a new application over an already loaded `scope`.
    pub fn new(theme_name: &str, scope: LogScope) -> Self {
        let mut list_state = ListState::default();
        if !scope.measurements().is_empty() {
            list_state.select(Some(0));
        }
        Self {
            theme: Theme::from_name(theme_name),
            scope,
            list_state,
            should_quit: false,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the interactive scope until `q`, `Esc` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the loop stays
    /// responsive without busy-waiting.
    pub fn run(mut self) -> io::Result<LogScope> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result.map(|()| self.scope)
    }

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Home => self.select_row(0),
            KeyCode::End => {
                let last = self.scope.measurements().len().saturating_sub(1);
                self.select_row(last);
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current(),
            KeyCode::Char('a') => self.scope.select_all(true),
            KeyCode::Char('n') => self.scope.select_all(false),
            _ => {}
        }
    }

    /// Name of the measurement under the cursor.
    pub fn current_measurement(&self) -> Option<&str> {
        let idx = self.list_state.selected()?;
        self.scope.measurements().get(idx).map(|m| m.name.as_str())
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn move_cursor(&mut self, delta: isize) {
        let len = self.scope.measurements().len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.list_state.select(Some(next as usize));
    }

    fn select_row(&mut self, idx: usize) {
        if !self.scope.measurements().is_empty() {
            self.list_state.select(Some(idx));
        }
    }

    fn toggle_current(&mut self) {
        if let Some(name) = self.current_measurement().map(str::to_string) {
            self.scope.toggle(&name);
        }
    }

    /// Render the current application state into `frame`.
    fn render(&mut self, frame: &mut Frame) {
        let stats_height = stats_view::table_height(self.scope.statistics()).min(MAX_STATS_HEIGHT);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(stats_height),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LIST_WIDTH), Constraint::Min(20)])
            .split(rows[1]);

        self.render_header(frame, rows[0]);
        self.render_measurements(frame, columns[0]);
        chart_view::render_chart(
            frame,
            columns[1],
            self.scope.series(),
            self.scope.measurements(),
            &self.theme,
        );
        stats_view::render_statistics(frame, rows[2], self.scope.statistics(), &self.theme);
        self.render_status(frame, rows[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("RTU Log Scope", self.theme.header),
            Span::styled("  │  ", self.theme.separator),
            Span::styled(
                format!("{} source(s)", self.scope.sources().len()),
                self.theme.label,
            ),
            Span::styled("  │  ", self.theme.separator),
            Span::styled(
                format!(
                    "{} rows",
                    format_number(self.scope.table().row_count() as f64, 0)
                ),
                self.theme.label,
            ),
        ];

        let first = self.scope.series().iter().filter_map(|s| s.points.first()).map(|p| p.time).min();
        let last = self.scope.series().iter().filter_map(|s| s.points.last()).map(|p| p.time).max();
        if let (Some(first), Some(last)) = (first, last) {
            spans.push(Span::styled("  │  ", self.theme.separator));
            spans.push(Span::styled(
                format!(
                    "{} → {} ({})",
                    first.format("%Y-%m-%d %H:%M:%S"),
                    last.format("%H:%M:%S"),
                    format_span(&first, &last)
                ),
                self.theme.value,
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_measurements(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .scope
            .measurements()
            .iter()
            .map(|m| {
                let (mark, style) = if m.selected {
                    ("[x] ", self.theme.list_checked)
                } else {
                    ("[ ] ", self.theme.list_unchecked)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, style),
                    Span::styled(m.label(), self.theme.text),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.table_border)
                    .title(" Measurements "),
            )
            .highlight_style(self.theme.list_highlight);

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let skipped = self.scope.skipped_sources();
        let line = if let Some(err) = self.scope.last_error() {
            Line::from(Span::styled(err.to_string(), self.theme.error))
        } else if let Some(first) = skipped.first() {
            Line::from(Span::styled(skipped_notice(first, skipped.len()), self.theme.info))
        } else {
            Line::from(Span::styled(
                "space: toggle   a: all   n: none   ↑/↓: move   q: quit",
                self.theme.dim,
            ))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Status text for sources left out of the dataset, naming the first one.
fn skipped_notice(first: &SkippedSource, total: usize) -> String {
    let name = first
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| first.path.display().to_string());
    let more = if total > 1 {
        format!(" (+{} more)", total - 1)
    } else {
        String::new()
    };
    format!("Skipped {}: {}{}", name, first.reason, more)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
