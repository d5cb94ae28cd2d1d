use super::app_logic::TuiApp;
use super::app_state::AppMode;
use crate::filters::FilterField;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

fn draw_help_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let help_text_lines_content = vec![
        Line::from("Arrows/jk: Nav | Space/Enter: Sel | Tab/o: Fold | g: Copy | y: Copy+Quit | q/Esc: Quit"),
        Line::from("*/-: Expand/Collapse All | /: Extensions | e: Excl. dirs | x: Excl. files | r: Refresh | i: Import | c: Clear | m: Mode"),
    ];
    let title = format!(
        "repostitch – {} ({})",
        app.session.root().display(),
        app.output_mode.label()
    );
    let help_paragraph =
        Paragraph::new(help_text_lines_content).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(help_paragraph, area);
}

fn draw_filter_input_block(f: &mut Frame, app: &TuiApp, field: FilterField, area: Rect) {
    let filter_paragraph = Paragraph::new(app.filter_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} (Esc to cancel, Enter to apply)", field.label())),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(filter_paragraph, area);
    f.set_cursor_position((area.x + 1 + app.filter_cursor_pos as u16, area.y + 1));
}

fn draw_tree_block(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    app.list_viewport_height = area.height.saturating_sub(2) as usize;
    app.ensure_selection_is_visible_in_viewport();

    let end = (app.scroll_offset + app.list_viewport_height).min(app.rows.len());
    let list_items: Vec<ListItem> = app.rows[app.scroll_offset..end]
        .iter()
        .map(|row| {
            let checkbox = if app.is_selected(row) { "[x] " } else { "[ ] " };
            let fold = match (row.is_dir, row.is_expanded) {
                (true, true) => "▾ ",
                (true, false) => "▸ ",
                (false, _) => "  ",
            };
            let suffix = if row.is_dir { "/" } else { "" };
            ListItem::new(format!(
                "{}{}{}{}{}",
                "  ".repeat(row.depth),
                fold,
                checkbox,
                row.name,
                suffix
            ))
        })
        .collect();

    let list_title = match app.session.filters().extensions_text() {
        exts if exts.is_empty() => "Select files/directories".to_string(),
        exts => format!("Files (extensions: {})", exts),
    };
    let list_widget = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(list_title))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("❯ ");

    let mut list_state = ListState::default();
    if app.cursor >= app.scroll_offset && app.cursor < end {
        list_state.select(Some(app.cursor - app.scroll_offset));
    }
    f.render_stateful_widget(list_widget, area, &mut list_state);
}

fn draw_preview_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let text = app
        .output
        .as_deref()
        .unwrap_or("Press g to generate the output.");
    let preview = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Output"))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, area);
}

fn draw_status_line(f: &mut Frame, app: &TuiApp, area: Rect) {
    let since_refresh = app.session.last_refresh().elapsed().as_secs();
    let line = format!(
        " {} | {} explicit | last refresh {}s ago",
        app.status,
        app.session.store().explicit_count(),
        since_refresh
    );
    f.render_widget(
        Paragraph::new(line).style(Style::default().fg(Color::Gray)),
        area,
    );
}

pub(super) fn ui_frame(frame: &mut Frame, app: &mut TuiApp) {
    let help_lines = 2;
    let editing = match app.mode {
        AppMode::EditingFilter(field) => Some(field),
        AppMode::Normal => None,
    };
    let filter_input_height = if editing.is_some() { 3 } else { 0 };

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(help_lines + 2),
            Constraint::Length(filter_input_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[2]);

    draw_help_block(frame, app, main_chunks[0]);
    if let Some(field) = editing {
        draw_filter_input_block(frame, app, field, main_chunks[1]);
    }
    draw_tree_block(frame, app, body[0]);
    draw_preview_block(frame, app, body[1]);
    draw_status_line(frame, app, main_chunks[3]);
}
