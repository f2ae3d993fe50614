use std::mem;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::catalog::{spawn_search, ExerciseCatalog, FetchResult};
use crate::error::FetchError;
use crate::models::SearchQuery;
use crate::sync::{Cursor, ExerciseLibrary, SaveOutcome};

use super::forms::{ConfirmRemove, SearchField, SearchForm};
use super::helpers::{centered_rect, exercise_detail_lines, exercise_summary, surface_error};
use super::screens::ResultsScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows jumped by PageUp/PageDown in the results list.
const PAGE_STEP: isize = 5;

/// High-level navigation states.
enum Screen {
    Search,
    Results(ResultsScreen),
    Saved,
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    ConfirmRemove(ConfirmRemove),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// A search running on the worker thread.
struct PendingSearch {
    query: SearchQuery,
    receiver: Receiver<FetchResult>,
}

/// Central application state shared across the TUI. All store access goes
/// through `library` on the UI thread; only catalog calls leave it.
pub struct App {
    library: ExerciseLibrary,
    catalog: Arc<dyn ExerciseCatalog>,
    form: SearchForm,
    screen: Screen,
    /// Results kept around while the saved view is open, so Esc can return.
    parked_results: Option<ResultsScreen>,
    mode: Mode,
    status: Option<StatusMessage>,
    pending: Option<PendingSearch>,
}

impl App {
    pub fn new(library: ExerciseLibrary, catalog: Arc<dyn ExerciseCatalog>) -> Self {
        Self {
            library,
            catalog,
            form: SearchForm::default(),
            screen: Screen::Search,
            parked_results: None,
            mode: Mode::Normal,
            status: None,
            pending: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ConfirmRemove(confirm) => self.handle_confirm_remove(code, confirm)?,
        };

        Ok(exit)
    }

    /// Collect a finished search, if any. Called once per event-loop tick.
    pub fn poll_search(&mut self) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };

        match pending.receiver.try_recv() {
            Ok(result) => self.finish_search(pending.query, result),
            Err(TryRecvError::Empty) => {
                self.pending = Some(pending);
                Ok(())
            }
            Err(TryRecvError::Disconnected) => {
                self.finish_search(pending.query, Err(FetchError::WorkerGone))
            }
        }
    }

    pub(crate) fn is_searching(&self) -> bool {
        self.pending.is_some()
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Search => {
                match code {
                    KeyCode::Esc => *exit = true,
                    KeyCode::Tab | KeyCode::Down => self.form.next_field(),
                    KeyCode::BackTab | KeyCode::Up => self.form.previous_field(),
                    KeyCode::Left => self.form.cycle(-1),
                    KeyCode::Right => self.form.cycle(1),
                    KeyCode::Backspace => self.form.backspace(),
                    KeyCode::Enter => self.start_search(),
                    KeyCode::Char(ch) => {
                        if !self.form.push_char(ch) {
                            match ch {
                                'q' | 'Q' => *exit = true,
                                'v' | 'V' => self.open_saved_view()?,
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Results(ref mut results) => {
                let mut save = false;
                let mut back = false;
                let mut open_saved = false;
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc => back = true,
                    KeyCode::Up => results.move_selection(-1),
                    KeyCode::Down => results.move_selection(1),
                    KeyCode::PageUp => results.move_selection(-PAGE_STEP),
                    KeyCode::PageDown => results.move_selection(PAGE_STEP),
                    KeyCode::Home => results.select_first(),
                    KeyCode::End => results.select_last(),
                    KeyCode::Enter | KeyCode::Char('a') | KeyCode::Char('+') => save = true,
                    KeyCode::Char('v') | KeyCode::Char('V') => open_saved = true,
                    _ => {}
                }

                if back {
                    self.clear_status();
                    self.screen = Screen::Search;
                } else if save {
                    self.save_selected()?;
                } else if open_saved {
                    self.open_saved_view()?;
                }
                Ok(Mode::Normal)
            }
            Screen::Saved => {
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc | KeyCode::Char('v') | KeyCode::Char('V') => {
                        self.clear_status();
                        self.leave_saved_view()?;
                    }
                    KeyCode::Left | KeyCode::Up | KeyCode::Char('h') => {
                        self.library.previous();
                    }
                    KeyCode::Right | KeyCode::Down | KeyCode::Char('l') => {
                        self.library.next();
                    }
                    KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Delete => {
                        if let Some(exercise) = self.library.current().cloned() {
                            self.clear_status();
                            return Ok(Mode::ConfirmRemove(ConfirmRemove { exercise }));
                        }
                        self.set_status("No saved exercise to remove.", StatusKind::Error);
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmRemove) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = self
                    .library
                    .remove(&confirm.exercise.name)
                    .context("failed to remove exercise");
                match result {
                    Ok(cursor) => {
                        let message = if cursor.is_empty() {
                            format!("Removed {}. Nothing saved anymore.", confirm.exercise.name)
                        } else {
                            format!("Removed {}.", confirm.exercise.name)
                        };
                        self.set_status(message, StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmRemove(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmRemove(confirm)),
        }
    }

    /// Ctrl+S jumps to the saved exercises from anywhere.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        if matches!(self.mode, Mode::Normal) && !matches!(self.screen, Screen::Saved) {
            self.open_saved_view()?;
        }
        Ok(())
    }

    fn start_search(&mut self) {
        let query = self.form.to_query();
        info!(?query, "starting search");
        let receiver = spawn_search(Arc::clone(&self.catalog), query.clone());
        self.pending = Some(PendingSearch { query, receiver });
        self.set_status("Searching...", StatusKind::Info);
    }

    fn finish_search(&mut self, query: SearchQuery, result: FetchResult) -> Result<()> {
        match result {
            Ok(candidates) if candidates.is_empty() => {
                self.set_status("No exercises matched that search.", StatusKind::Info);
            }
            Ok(candidates) => {
                let total = candidates.len();
                let mut results = ResultsScreen::new(query, candidates);
                if let Err(err) = self.refresh_results(&mut results) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                    return Ok(());
                }
                let hidden = total - results.display.len();
                let message = if hidden > 0 {
                    format!("Found {total} exercises ({hidden} already saved).")
                } else {
                    format!("Found {total} exercises.")
                };
                self.parked_results = None;
                self.screen = Screen::Results(results);
                self.set_status(message, StatusKind::Info);
            }
            Err(err) => {
                warn!(error = %err, "search failed");
                self.set_status(format!("Error: {err}"), StatusKind::Error);
            }
        }
        Ok(())
    }

    /// Re-read the saved set and re-apply the dedup filter to the results.
    fn refresh_results(&mut self, results: &mut ResultsScreen) -> Result<()> {
        self.library
            .reload()
            .context("failed to load saved exercises")?;
        results.set_display(self.library.unsaved(&results.candidates));
        Ok(())
    }

    fn save_selected(&mut self) -> Result<()> {
        let mut screen = mem::replace(&mut self.screen, Screen::Search);
        if let Screen::Results(results) = &mut screen {
            if let Some(exercise) = results.current().cloned() {
                let outcome = self
                    .library
                    .save_if_absent(&exercise)
                    .context("failed to save exercise");
                match outcome {
                    Ok(SaveOutcome::Saved) => {
                        self.set_status(format!("Saved {}.", exercise.name), StatusKind::Info)
                    }
                    Ok(SaveOutcome::AlreadySaved) => self.set_status(
                        format!("{} is already saved.", exercise.name),
                        StatusKind::Info,
                    ),
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                results.set_display(self.library.unsaved(&results.candidates));
            } else {
                self.set_status("Nothing left to save.", StatusKind::Error);
            }
        }
        self.screen = screen;
        Ok(())
    }

    fn open_saved_view(&mut self) -> Result<()> {
        if let Err(err) = self
            .library
            .reload()
            .context("failed to load saved exercises")
        {
            self.set_status(surface_error(&err), StatusKind::Error);
            return Ok(());
        }

        let previous = mem::replace(&mut self.screen, Screen::Saved);
        if let Screen::Results(results) = previous {
            self.parked_results = Some(results);
        }
        Ok(())
    }

    fn leave_saved_view(&mut self) -> Result<()> {
        match self.parked_results.take() {
            Some(mut results) => {
                if let Err(err) = self.refresh_results(&mut results) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
                self.screen = Screen::Results(results);
            }
            None => self.screen = Screen::Search,
        }
        Ok(())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Search => self.draw_search(frame, content_area),
            Screen::Results(results) => self.draw_results(frame, content_area, results),
            Screen::Saved => self.draw_saved(frame, content_area),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::ConfirmRemove(confirm) = &self.mode {
            self.draw_confirm_remove(frame, area, confirm);
        }
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            self.form.build_line("Name", SearchField::Name),
            self.form.build_line("Type", SearchField::Type),
            self.form.build_line("Muscle", SearchField::Muscle),
            self.form.build_line("Difficulty", SearchField::Difficulty),
            Line::from(""),
        ];
        if self.is_searching() {
            lines.push(Line::from(Span::styled(
                "Loading...",
                Style::default().fg(Color::Yellow),
            )));
        }
        lines.push(Line::from(Span::styled(
            format!("{} exercises saved.", self.library.saved().len()),
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL).title("Exercise Guide"));
        frame.render_widget(paragraph, area);
    }

    fn draw_results(&self, frame: &mut Frame, area: Rect, results: &ResultsScreen) {
        let title = format!("Exercise Results ({})", results.display.len());
        let block = Block::default().borders(Borders::ALL).title(title);

        if results.display.is_empty() {
            let message = Paragraph::new("Every result is already saved.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = results
            .display
            .iter()
            .map(|exercise| ListItem::new(exercise_summary(exercise)))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(results.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_saved(&self, frame: &mut Frame, area: Rect) {
        let saved = self.library.saved();
        let (exercise, position) = match (self.library.current(), self.library.cursor()) {
            (Some(exercise), Cursor::Positioned(idx)) => (exercise, idx),
            _ => {
                let message = Paragraph::new("No saved exercises yet.")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Saved Exercises"));
                frame.render_widget(message, area);
                return;
            }
        };

        let title = format!("Saved Exercises  {}/{}", position + 1, saved.len());
        let paragraph = Paragraph::new(exercise_detail_lines(exercise))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::ConfirmRemove(_)) => &[("[y]", "Remove"), ("[n/Esc]", "Cancel")],
            (Screen::Search, _) => &[
                ("[Tab/↑↓]", "Field"),
                ("[←→]", "Change"),
                ("[Enter]", "Search"),
                ("[Ctrl+S]", "Saved"),
                ("[Esc]", "Quit"),
            ],
            (Screen::Results(_), _) => &[
                ("[↑↓]", "Select"),
                ("[Enter/a]", "Add to Guide"),
                ("[v]", "Saved"),
                ("[Esc]", "Back"),
                ("[q]", "Quit"),
            ],
            (Screen::Saved, _) => &[
                ("[←→]", "Previous/Next"),
                ("[d]", "Remove"),
                ("[Esc]", "Back"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (idx, (key, label)) in hints.iter().enumerate() {
            spans.push(Span::styled(key.to_string(), key_style));
            let sep = if idx + 1 < hints.len() { "   " } else { "" };
            spans.push(Span::raw(format!(" {label}{sep}")));
        }
        Line::from(spans)
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Remove Saved Exercise")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove '{}' from your guide?", confirm.exercise.name)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ExerciseStore;
    use crate::models::ExerciseRecord;
    use std::time::Duration;

    struct CannedCatalog(Vec<ExerciseRecord>);

    impl ExerciseCatalog for CannedCatalog {
        fn fetch(&self, _query: &SearchQuery) -> FetchResult {
            Ok(self.0.clone())
        }
    }

    fn named(name: &str) -> ExerciseRecord {
        ExerciseRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    fn app_with(saved: &[&str], catalog: Vec<ExerciseRecord>) -> App {
        let mut store = ExerciseStore::open_in_memory(false).unwrap();
        for name in saved {
            store.insert(&named(name)).unwrap();
        }
        let library = ExerciseLibrary::open(store).unwrap();
        App::new(library, Arc::new(CannedCatalog(catalog)))
    }

    fn wait_for_search(app: &mut App) {
        for _ in 0..200 {
            app.poll_search().unwrap();
            if !app.is_searching() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("search never finished");
    }

    fn displayed(app: &App) -> Vec<String> {
        match &app.screen {
            Screen::Results(results) => results.display.iter().map(|r| r.name.clone()).collect(),
            _ => panic!("not on the results screen"),
        }
    }

    #[test]
    fn search_hides_saved_exercises_and_saving_removes_from_list() {
        let mut app = app_with(&["Y"], vec![named("X"), named("Y"), named("Z")]);

        app.handle_key(KeyCode::Enter).unwrap();
        wait_for_search(&mut app);
        assert_eq!(displayed(&app), vec!["X", "Z"]);

        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(displayed(&app), vec!["Z"]);
        let names: Vec<_> = app.library.saved().iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["Y", "X"]);
    }

    #[test]
    fn removing_from_saved_view_requires_confirmation() {
        let mut app = app_with(&["A", "B"], Vec::new());
        app.handle_ctrl_s().unwrap();
        app.handle_key(KeyCode::Right).unwrap();

        app.handle_key(KeyCode::Char('d')).unwrap();
        assert_eq!(app.library.saved().len(), 2);

        app.handle_key(KeyCode::Char('y')).unwrap();
        assert_eq!(app.library.saved().len(), 1);
        assert_eq!(app.library.cursor(), Cursor::Positioned(0));
        assert_eq!(app.library.current().unwrap().name, "A");
    }

    #[test]
    fn returning_from_saved_view_recomputes_results() {
        let mut app = app_with(&[], vec![named("X"), named("Y")]);
        app.handle_key(KeyCode::Enter).unwrap();
        wait_for_search(&mut app);
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(displayed(&app), vec!["Y"]);

        app.handle_key(KeyCode::Char('v')).unwrap();
        app.handle_key(KeyCode::Char('d')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        app.handle_key(KeyCode::Esc).unwrap();

        assert_eq!(displayed(&app), vec!["X", "Y"]);
    }

    #[test]
    fn store_failure_after_search_is_reported_not_fatal() {
        let mut app = app_with(&["A"], vec![named("X")]);
        app.library
            .store()
            .conn
            .execute("DROP TABLE SavedExercises", [])
            .unwrap();

        app.handle_key(KeyCode::Enter).unwrap();
        wait_for_search(&mut app);

        assert!(matches!(app.screen, Screen::Search));
        let status = app.status.as_ref().unwrap();
        assert!(matches!(status.kind, StatusKind::Error));
    }

    #[test]
    fn typing_q_in_name_field_does_not_quit() {
        let mut app = app_with(&[], Vec::new());
        assert!(!app.handle_key(KeyCode::Char('q')).unwrap());
        assert_eq!(app.form.name, "q");
        assert!(app.handle_key(KeyCode::Esc).unwrap());
    }
}
