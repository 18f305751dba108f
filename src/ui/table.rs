use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Row, Table, TableState};
use ratatui::Frame;

use crate::message::Message;

const COLUMNS: [(&str, u16); 4] = [("#", 5), ("Title", 50), ("Reactions", 9), ("Labels", 50)];

/// Selectable grid of issue rows.
///
/// Only reacts to input while focused. Rows are plain strings so the widget
/// knows nothing about issues.
#[derive(Debug, Clone)]
pub struct IssueTable {
    rows: Vec<Vec<String>>,
    cursor: usize,
    focused: bool,
    height: u16,
}

impl IssueTable {
    pub fn new(height: u16) -> Self {
        Self {
            rows: Vec::new(),
            cursor: 0,
            focused: true,
            height: height.max(1),
        }
    }

    pub fn set_rows(&mut self, rows: Vec<Vec<String>>) {
        self.rows = rows;
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_row(&self) -> Option<&[String]> {
        self.rows.get(self.cursor).map(Vec::as_slice)
    }

    /// Rows plus header and borders
    pub fn outer_height(&self) -> u16 {
        self.height + 3
    }

    pub fn update(&mut self, msg: &Message) {
        if !self.focused {
            return;
        }
        let Message::Key(key) = msg else {
            return;
        };

        let page = self.height as usize;
        let half = (page / 2).max(1);
        match (key.code, key.modifiers) {
            (KeyCode::Up | KeyCode::Char('k'), KeyModifiers::NONE) => self.move_up(1),
            (KeyCode::Down | KeyCode::Char('j'), KeyModifiers::NONE) => self.move_down(1),
            (KeyCode::Char('u'), KeyModifiers::NONE | KeyModifiers::CONTROL) => {
                self.move_up(half)
            }
            (KeyCode::Char('d'), KeyModifiers::NONE | KeyModifiers::CONTROL) => {
                self.move_down(half)
            }
            (KeyCode::PageUp | KeyCode::Char('b'), KeyModifiers::NONE) => self.move_up(page),
            (
                KeyCode::PageDown | KeyCode::Char('f') | KeyCode::Char(' '),
                KeyModifiers::NONE,
            ) => self.move_down(page),
            (KeyCode::Home | KeyCode::Char('g'), KeyModifiers::NONE) => self.cursor = 0,
            (KeyCode::End, KeyModifiers::NONE)
            | (KeyCode::Char('G'), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.cursor = self.rows.len().saturating_sub(1)
            }
            _ => {}
        }
    }

    fn move_up(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    fn move_down(&mut self, n: usize) {
        let last = self.rows.len().saturating_sub(1);
        self.cursor = (self.cursor + n).min(last);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(COLUMNS.iter().map(|(title, _)| *title))
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.rows.iter().map(|row| Row::new(row.iter().map(String::as_str)));

        let highlight = if self.focused {
            Style::default()
                .fg(Color::Indexed(229))
                .bg(Color::Indexed(57))
        } else {
            Style::default().fg(Color::Indexed(229))
        };

        let table = Table::new(rows, COLUMNS.iter().map(|(_, w)| Constraint::Length(*w)))
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Indexed(240))),
            )
            .highlight_style(highlight);

        let mut state = TableState::default();
        if !self.rows.is_empty() {
            state.select(Some(self.cursor));
        }

        frame.render_stateful_widget(table, area, &mut state);
    }
}
