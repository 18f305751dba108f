use crossterm::event::{KeyCode, KeyEvent};

use crate::message::{is_quit_key, Command, Message};
use crate::types::Issue;
use crate::ui::spinner::Spinner;
use crate::ui::table::IssueTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    /// Reserved; no transition leads here.
    #[allow(dead_code)]
    Idle,
    Ready,
    Error,
}

pub struct App {
    pub phase: Phase,
    pub issues: Vec<Issue>,
    pub total: u64,
    pub error: Option<String>,
    pub table: IssueTable,
    pub spinner: Spinner,
    pub should_quit: bool,
}

impl App {
    pub fn new(table_height: u16) -> Self {
        Self {
            phase: Phase::Loading,
            issues: Vec::new(),
            total: 0,
            error: None,
            table: IssueTable::new(table_height),
            spinner: Spinner::default(),
            should_quit: false,
        }
    }

    /// Startup effect: the one and only issue fetch.
    pub fn init(&self) -> Command {
        Command::FetchIssues
    }

    pub fn update(&mut self, msg: Message) -> Option<Command> {
        if self.should_quit {
            return None;
        }

        match msg {
            Message::FetchFailed(error) => {
                self.phase = Phase::Error;
                self.error = Some(error);
                None
            }
            Message::FetchSucceeded { issues, total } => {
                self.table.set_rows(issues.iter().map(Issue::to_row).collect());
                self.issues = issues;
                self.total = total;
                self.phase = Phase::Ready;
                tracing::debug!(shown = self.issues.len(), total, "issues loaded");
                None
            }
            Message::Key(key) => self.handle_key(key),
            Message::Tick => {
                if self.phase == Phase::Loading {
                    self.spinner.tick();
                }
                self.table.update(&Message::Tick);
                None
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if is_quit_key(&key) {
            self.should_quit = true;
            return None;
        }

        // Nothing but quit works once loading has failed
        if self.phase == Phase::Error {
            return None;
        }

        match key.code {
            KeyCode::Esc => {
                if self.table.focused() {
                    self.table.blur();
                } else {
                    self.table.focus();
                }
                None
            }
            KeyCode::Enter => {
                let title = self.table.selected_row()?.get(1)?;
                Some(Command::Print(format!("Let's go to {}!", title)))
            }
            _ => {
                self.table.update(&Message::Key(key));
                None
            }
        }
    }
}
