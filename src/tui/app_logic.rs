use super::app_state::{AppMode, VisibleRow};
use crate::clipboard;
use crate::file_scanner::Node;
use crate::filters::FilterField;
use crate::output::OutputMode;
use crate::poller::{PollOutcome, PollTimer, Poller};
use crate::selection::SelectionStore;
use crate::session::Session;
use crate::utils;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};
use tracing::debug;

pub struct TuiApp {
    pub(super) session: Session,
    pub(super) rows: Vec<VisibleRow>,
    pub(super) cursor: usize,
    pub(super) scroll_offset: usize,
    pub(super) quit: bool,
    pub(super) mode: AppMode,
    pub(super) filter_input: String,
    pub(super) filter_cursor_pos: usize,
    pub(super) list_viewport_height: usize,
    pub(super) output_mode: OutputMode,
    pub(super) output: Option<String>,
    pub(super) timer: PollTimer,
    pub(super) status: String,
}

/// Flattens the tree in display order, skipping the children of collapsed directories.
pub fn visible_rows(root: &Node, store: &SelectionStore) -> Vec<VisibleRow> {
    fn visit(node: &Node, depth: usize, store: &SelectionStore, out: &mut Vec<VisibleRow>) {
        let is_expanded = node.is_dir && store.is_expanded(&node.path);
        out.push(VisibleRow {
            path: node.path.clone(),
            name: node.name.clone(),
            depth,
            is_dir: node.is_dir,
            is_expanded,
        });
        if is_expanded {
            for child in &node.children {
                visit(child, depth + 1, store, out);
            }
        }
    }
    let mut rows = Vec::new();
    visit(root, 0, store, &mut rows);
    rows
}

impl TuiApp {
    pub fn new(session: Session, output_mode: OutputMode, poll_interval: Duration) -> Self {
        let mut app = TuiApp {
            session,
            rows: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
            quit: false,
            mode: AppMode::Normal,
            filter_input: String::new(),
            filter_cursor_pos: 0,
            list_viewport_height: 0, // Updated by ui_renderer
            output_mode,
            output: None,
            timer: PollTimer::new(poll_interval),
            status: String::from("Ready"),
        };
        app.rebuild_rows();
        app.timer.arm(Instant::now());
        app
    }

    /// Re-flattens the tree, keeping the cursor on the same path when it is still shown.
    pub(super) fn rebuild_rows(&mut self) {
        let current = self.rows.get(self.cursor).map(|row| row.path.clone());
        self.rows = visible_rows(self.session.tree(), self.session.store());
        self.cursor = current
            .and_then(|path| self.rows.iter().position(|row| row.path == path))
            .unwrap_or_else(|| self.cursor.min(self.rows.len().saturating_sub(1)));
        self.ensure_selection_is_visible_in_viewport();
    }

    pub(super) fn move_cursor(&mut self, delta: i32) {
        if self.rows.is_empty() {
            return;
        }
        let len = self.rows.len() as i32;
        self.cursor = (self.cursor as i32 + delta).rem_euclid(len) as usize;
        self.ensure_selection_is_visible_in_viewport();
    }

    pub(super) fn ensure_selection_is_visible_in_viewport(&mut self) {
        let height = self.list_viewport_height;
        if height == 0 || self.rows.is_empty() {
            self.scroll_offset = 0;
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + height {
            self.scroll_offset = self.cursor + 1 - height;
        }
        let max_offset = self.rows.len().saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub(super) fn is_selected(&self, row: &VisibleRow) -> bool {
        self.session.effective_state(&row.path)
    }

    pub(super) fn toggle_current_item_selection(&mut self) {
        let Some(row) = self.rows.get(self.cursor) else {
            return;
        };
        let path = row.path.clone();
        if let Some(state) = self.session.toggle(&path) {
            self.status = format!(
                "{} {}",
                if state { "Selected" } else { "Deselected" },
                row_label(&self.session, &path)
            );
        }
    }

    pub(super) fn toggle_expansion(&mut self) {
        let Some(row) = self.rows.get(self.cursor) else {
            return;
        };
        if row.is_dir && row.depth > 0 {
            let path = row.path.clone();
            self.session.toggle_expanded(&path);
            self.rebuild_rows();
        }
    }

    pub(super) fn set_all_expanded(&mut self, expanded: bool) {
        let dirs: Vec<_> = self
            .session
            .index()
            .iter()
            .filter(|(path, kind)| {
                *kind == crate::file_scanner::EntryKind::Dir && path.as_path() != self.session.root()
            })
            .map(|(path, _)| path.clone())
            .collect();
        for dir in dirs {
            self.session.set_expanded(&dir, expanded);
        }
        self.rebuild_rows();
    }

    pub(super) fn clear_selection(&mut self) {
        self.session.clear_selections();
        self.status = String::from("Cleared all selections");
    }

    /// Manual refresh: the pending poll is cancelled and re-armed afterwards.
    pub(super) fn refresh(&mut self) {
        self.timer.cancel();
        match self.session.refresh() {
            Ok(()) => self.status = format!("Refreshed {} entries", self.session.index().len()),
            Err(e) => self.status = format!("Refresh failed: {}", e),
        }
        self.rebuild_rows();
        self.timer.arm(Instant::now());
    }

    fn regenerate_output(&mut self) -> &str {
        let output = self.session.generate_output(self.output_mode);
        self.output.insert(output)
    }

    pub(super) fn generate_and_copy(&mut self) {
        self.timer.cancel();
        let output = self.regenerate_output().to_string();
        let count = self.session.selected_paths(self.output_mode).len();
        self.status = if count == 0 {
            String::from("Nothing selected; clipboard not affected")
        } else {
            match clipboard::copy_text_to_clipboard(&output) {
                Ok(()) => format!(
                    "Copied {} items (≈ {} tokens, {})",
                    count,
                    utils::approx_tokens(&output),
                    self.output_mode.label()
                ),
                Err(e) => format!("Copy failed: {}", e),
            }
        };
        self.timer.arm(Instant::now());
    }

    pub(super) fn import_from_clipboard(&mut self) {
        self.timer.cancel();
        let result = clipboard::read_text_from_clipboard()
            .and_then(|text| self.session.import_selection(&text).map_err(Into::into));
        match result {
            Ok(count) => {
                self.rebuild_rows();
                self.regenerate_output();
                self.status = format!("Imported selection: {} files", count);
            }
            Err(e) => self.status = format!("Import failed: {:#}", e),
        }
        self.timer.arm(Instant::now());
    }

    pub(super) fn cycle_output_mode(&mut self) {
        self.output_mode = self.output_mode.next();
        self.status = format!("Output mode: {}", self.output_mode.label());
    }

    /// Opens the input line on one filter list, prefilled with its current value.
    pub(super) fn start_filter_edit(&mut self, field: FilterField) {
        self.mode = AppMode::EditingFilter(field);
        self.filter_input = self.session.filters().field_text(field);
        self.filter_cursor_pos = self.filter_input.chars().count();
    }

    /// Rescans with the edited list; the session keeps the old rules if that fails.
    pub(super) fn apply_filter_input(&mut self, field: FilterField) {
        let mut filters = self.session.filters().clone();
        filters.set_field_text(field, &self.filter_input);
        if filters == *self.session.filters() {
            return;
        }
        self.timer.cancel();
        match self.session.set_filters(filters) {
            Ok(()) => {
                self.status = match self.session.filters().field_text(field) {
                    text if text.is_empty() => format!("{}: cleared", field.label()),
                    text => format!("{}: {}", field.label(), text),
                };
            }
            Err(e) => self.status = format!("Filter not applied: {}", e),
        }
        self.rebuild_rows();
        self.timer.arm(Instant::now());
    }

    /// Runs the scheduled poll once it is due, then re-arms it.
    pub(super) fn run_due_poll(&mut self, now: Instant) {
        if !self.timer.fire(now) {
            return;
        }
        let outcome = self.session.tick();
        debug!("poll: {:?}", outcome);
        match outcome {
            PollOutcome::Unchanged => {}
            PollOutcome::PathsChanged => {
                self.rebuild_rows();
                self.regenerate_output();
                self.status = String::from("Files added or removed; tree refreshed");
            }
            PollOutcome::ContentChanged => {
                self.regenerate_output();
                self.status = String::from("Selected files changed; output regenerated");
            }
        }
        self.timer.arm(Instant::now());
    }

    // --- Event handling sub-methods ---
    pub(super) fn handle_normal_mode_input(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('/') => self.start_filter_edit(FilterField::Extensions),
            KeyCode::Char('e') => self.start_filter_edit(FilterField::ExcludedDirs),
            KeyCode::Char('x') => self.start_filter_edit(FilterField::ExcludedFiles),
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('y') => {
                self.generate_and_copy();
                self.quit = true;
            }
            KeyCode::Char('g') => self.generate_and_copy(),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current_item_selection(),
            KeyCode::Char('o') | KeyCode::Tab => self.toggle_expansion(),
            KeyCode::Char('*') => self.set_all_expanded(true),
            KeyCode::Char('-') => self.set_all_expanded(false),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('i') => self.import_from_clipboard(),
            KeyCode::Char('m') => self.cycle_output_mode(),
            KeyCode::Char('c') => self.clear_selection(),
            _ => {}
        }
    }

    pub(super) fn handle_filtering_mode_input(&mut self, field: FilterField, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
                self.apply_filter_input(field);
            }
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.filter_input.clear();
                self.filter_cursor_pos = 0;
            }
            KeyCode::Char(c) => {
                let at = byte_index(&self.filter_input, self.filter_cursor_pos);
                self.filter_input.insert(at, c);
                self.filter_cursor_pos += 1;
            }
            KeyCode::Backspace => {
                if self.filter_cursor_pos > 0 {
                    self.filter_cursor_pos -= 1;
                    let at = byte_index(&self.filter_input, self.filter_cursor_pos);
                    self.filter_input.remove(at);
                }
            }
            KeyCode::Left => {
                self.filter_cursor_pos = self.filter_cursor_pos.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.filter_cursor_pos < self.filter_input.chars().count() {
                    self.filter_cursor_pos += 1;
                }
            }
            _ => {}
        }
    }
}

fn byte_index(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map_or(s.len(), |(i, _)| i)
}

fn row_label(session: &Session, path: &std::path::Path) -> String {
    match utils::relative_unix(path, session.root()) {
        Some(rel) if !rel.is_empty() => rel,
        _ => crate::file_scanner::root_name(session.root()),
    }
}
