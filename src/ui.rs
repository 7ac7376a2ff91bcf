//! The UI renders the application state into something visible and vim-able.
//!
//! The draw function dispatches based on the current view (list, command or editor).
//! The list view paints the latest layout, one row per rendered line, indented by depth.

use crate::app_state::{AppState, LoadStatus, MoveState, View};
use edtui::{EditorTheme, EditorView, SyntaxHighlighter};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &mut AppState) {
    match app.current_view {
        View::Command if app.editor_state.is_some() => draw_detail(f, app),
        View::List | View::Command => draw_list(f, app),
        View::Detail => draw_detail(f, app),
    }
}

fn line_style(app: &AppState, section_id: Option<&str>) -> Style {
    let selected = section_id.is_some() && section_id == app.current_section_id();
    if !selected {
        return Style::default();
    }
    match app.move_state {
        MoveState::Selected => Style::default()
            .fg(Color::Rgb(255, 165, 0)) // Orange
            .add_modifier(Modifier::BOLD),
        MoveState::Moved => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        MoveState::None => Style::default().add_modifier(Modifier::REVERSED),
    }
}

fn draw_list(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let items: Vec<ListItem> = match &app.load_status {
        LoadStatus::Loading => vec![ListItem::new("Loading sections…")],
        LoadStatus::Failed(reason) => vec![ListItem::new(Line::from(Span::styled(
            format!("Could not load sections: {reason}"),
            Style::default().fg(Color::Red),
        )))],
        LoadStatus::Ready => app
            .layout
            .lines()
            .map(|line| {
                let indent = "  ".repeat(line.indent);
                let spans = vec![Span::raw(indent), Span::raw(line.text.clone())];
                ListItem::new(Line::from(spans))
                    .style(line_style(app, line.section_id.as_deref()))
            })
            .collect(),
    };

    let title = match (app.renderer.options().is_preview, &app.move_state) {
        (true, _) => "Sections (PREVIEW)",
        (false, MoveState::None) => "Sections",
        (false, _) => "Sections (MOVING)",
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, chunks[0]);

    let bottom = if app.current_view == View::Command {
        Paragraph::new(format!(":{}", app.command_buffer))
            .block(Block::default().borders(Borders::ALL).title("Command"))
    } else {
        let help = if let Some(ref msg) = app.message {
            msg.clone()
        } else if app.move_state == MoveState::None {
            "↑/↓: Navigate | Enter: Edit | a: Add After | d: Delete | Ctrl+↑/↓: Start Move | q: Quit"
                .to_string()
        } else {
            "Ctrl+↑/↓: Move | Ctrl+Home/End: Top/Bottom | :w Save | Esc: Cancel".to_string()
        };
        Paragraph::new(help).block(Block::default().borders(Borders::ALL))
    };
    f.render_widget(bottom, chunks[1]);
}

fn draw_detail(f: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Breadcrumb
            Constraint::Min(0),    // Editor
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let section_id = app.current_section_id().unwrap_or_default().to_string();
    let owner = app
        .layout
        .block_for(&section_id)
        .and_then(|block| block.context.as_ref())
        .and_then(|context| context.id())
        .filter(|owner| *owner != section_id)
        .map(str::to_string);
    let breadcrumb = match owner {
        Some(owner) => format!("{owner} > {section_id}"),
        None => section_id.clone(),
    };
    let breadcrumb_widget = Paragraph::new(breadcrumb)
        .block(Block::default().borders(Borders::ALL).title("Navigation"));
    f.render_widget(breadcrumb_widget, chunks[0]);

    let max_width = app.get_max_line_width();
    let title = format!("Section: {section_id} (max line: {max_width} chars)");

    if let Some(ref mut editor_state) = app.editor_state {
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(chunks[1]);
        f.render_widget(block, chunks[1]);

        let syntax_highlighter = SyntaxHighlighter::new("dracula", "md");
        let editor = EditorView::new(editor_state)
            .theme(EditorTheme::default())
            .syntax_highlighter(Some(syntax_highlighter))
            .wrap(true);

        f.render_widget(editor, inner);
    }

    let help_text = if app.current_view == View::Command {
        format!(":{}", app.command_buffer)
    } else if let Some(ref msg) = app.message {
        msg.clone()
    } else {
        ":w Save | :x Save & Exit | :q Quit | :wn Save & Next | :wp Save & Prev".to_string()
    };

    let help = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

#[cfg(test)]
#[path = "tests/ui.rs"]
mod tests;
