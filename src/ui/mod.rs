pub mod spinner;
pub mod table;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, Phase};

/// Lines below the table: total and quit hint
pub const FOOTER_HEIGHT: u16 = 2;

/// Draw the current state. Reads `app` only.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    match app.phase {
        Phase::Loading => {
            let line = Line::from(vec![app.spinner.view(), Span::raw("Fetching issues...")]);
            frame.render_widget(Paragraph::new(line), area);
        }
        Phase::Error => {
            let error = app.error.as_deref().unwrap_or_default();
            frame.render_widget(Paragraph::new(error).wrap(Wrap { trim: false }), area);
        }
        Phase::Ready => {
            let footer = vec![
                Line::from(format!("Total: {} ", app.total)),
                Line::from(Span::styled(" Press q to quit.", hint_style())),
            ];
            render_table_with_footer(frame, app, area, footer);
        }
        _ => {
            let footer = vec![Line::from(Span::styled("Press q to quit.", hint_style()))];
            render_table_with_footer(frame, app, area, footer);
        }
    }
}

fn render_table_with_footer(frame: &mut Frame, app: &App, area: Rect, footer: Vec<Line>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Max(app.table.outer_height()),
            Constraint::Length(footer.len() as u16),
            Constraint::Min(0),
        ])
        .split(area);

    app.table.render(frame, chunks[0]);
    frame.render_widget(Paragraph::new(footer), chunks[1]);
}

fn hint_style() -> Style {
    Style::default().fg(Color::Gray)
}
